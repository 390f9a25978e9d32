//! Operational features fed to the baseline CO₂ predictor.

use serde::{Deserialize, Serialize};

/// Knots to km/h.
pub const KNOTS_TO_KMH: f64 = 1.852;

/// Operational profile of a vessel, as the emission model expects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmissionFeatures {
    pub avg_speed_knots: f64,
    pub speed_std_knots: f64,
    pub distance_km: f64,
    pub time_at_sea_hours: f64,
    pub acceleration_events: u32,
    pub length_m: f64,
    pub width_m: f64,
    pub draft_m: f64,
    /// kg CO₂ per unit of fuel.
    pub co2_factor: f64,
}

/// Fleet-average fallbacks and training ranges for one feature.
struct FeatureRange {
    name: &'static str,
    default: f64,
    min: f64,
    max: f64,
}

const AVG_SPEED: FeatureRange = FeatureRange {
    name: "avg_speed",
    default: 10.0,
    min: 0.0,
    max: 50.0,
};
const SPEED_STD: FeatureRange = FeatureRange {
    name: "speed_std",
    default: 2.0,
    min: 0.0,
    max: 20.0,
};
const DISTANCE: FeatureRange = FeatureRange {
    name: "total_distance_km",
    default: 100.0,
    min: 0.0,
    max: f64::MAX,
};
const TIME_AT_SEA: FeatureRange = FeatureRange {
    name: "time_at_sea_hours",
    default: 24.0,
    min: 0.0,
    max: f64::MAX,
};
const LENGTH: FeatureRange = FeatureRange {
    name: "length",
    default: 100.0,
    min: 0.0,
    max: 500.0,
};
const WIDTH: FeatureRange = FeatureRange {
    name: "width",
    default: 20.0,
    min: 0.0,
    max: 100.0,
};
const DRAFT: FeatureRange = FeatureRange {
    name: "draft",
    default: 8.0,
    min: 0.0,
    max: 50.0,
};
const CO2_FACTOR: FeatureRange = FeatureRange {
    name: "co2_factor",
    default: 3.206,
    min: 0.0,
    max: 10.0,
};

impl FeatureRange {
    fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            tracing::debug!(
                feature = self.name,
                value,
                default = self.default,
                "Non-finite feature, using default"
            );
            return self.default;
        }
        let clamped = value.clamp(self.min, self.max);
        if clamped != value {
            tracing::debug!(
                feature = self.name,
                value,
                clamped,
                "Feature outside training range, clamping"
            );
        }
        clamped
    }
}

impl EmissionFeatures {
    /// Default hull used when projecting a live position: a Panamax bulker.
    pub const PANAMAX_LENGTH_M: f64 = 225.0;
    pub const PANAMAX_WIDTH_M: f64 = 32.0;
    pub const PANAMAX_DRAFT_M: f64 = 12.0;

    /// Emission factor for heavy fuel oil.
    pub const HFO_CO2_FACTOR: f64 = 3.114;

    /// Projection window for live positions.
    pub const PROJECTION_HOURS: f64 = 24.0;

    /// Projects an instantaneous speed into a 24-hour voyage.
    ///
    /// A live position carries only speed over ground, while the emission
    /// model wants a voyage profile. The projection assumes the vessel holds
    /// its speed for a day, with one acceleration event per 4 knots.
    pub fn projected_day(speed_knots: f64, speed_std_knots: f64) -> Self {
        let speed = if speed_knots.is_finite() {
            speed_knots.max(0.0)
        } else {
            0.0
        };
        Self {
            avg_speed_knots: speed,
            speed_std_knots,
            distance_km: speed * KNOTS_TO_KMH * Self::PROJECTION_HOURS,
            time_at_sea_hours: Self::PROJECTION_HOURS,
            acceleration_events: (speed / 4.0).floor() as u32,
            length_m: Self::PANAMAX_LENGTH_M,
            width_m: Self::PANAMAX_WIDTH_M,
            draft_m: Self::PANAMAX_DRAFT_M,
            co2_factor: Self::HFO_CO2_FACTOR,
        }
    }

    /// Returns a copy clamped to the ranges the model was trained on.
    ///
    /// Non-finite values fall back to fleet averages.
    pub fn sanitized(&self) -> Self {
        Self {
            avg_speed_knots: AVG_SPEED.clamp(self.avg_speed_knots),
            speed_std_knots: SPEED_STD.clamp(self.speed_std_knots),
            distance_km: DISTANCE.clamp(self.distance_km),
            time_at_sea_hours: TIME_AT_SEA.clamp(self.time_at_sea_hours),
            acceleration_events: self.acceleration_events,
            length_m: LENGTH.clamp(self.length_m),
            width_m: WIDTH.clamp(self.width_m),
            draft_m: DRAFT.clamp(self.draft_m),
            co2_factor: CO2_FACTOR.clamp(self.co2_factor),
        }
    }
}
