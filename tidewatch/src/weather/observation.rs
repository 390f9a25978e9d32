//! Weather observation value type.

use chrono::{DateTime, Utc};

use crate::emissions::Resistance;

/// Raw upstream reading, before any derived fields are computed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawWeather {
    pub wind_speed_mps: f64,
    pub wind_direction_deg: f64,
    /// `None` when the upstream carries no sea-state data.
    pub wave_height_m: Option<f64>,
    pub temperature_c: f64,
    pub condition: String,
}

/// Immutable weather observation for one grid cell.
///
/// Superseded on refresh, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherObservation {
    /// m/s, >= 0
    pub wind_speed_mps: f64,
    /// degrees, [0, 360)
    pub wind_direction_deg: f64,
    /// m, >= 0
    pub wave_height_m: f64,
    /// Wave height was estimated from wind rather than measured.
    pub wave_estimated: bool,
    pub temperature_c: f64,
    pub condition: String,
    pub resistance: Resistance,
    pub fetched_at: DateTime<Utc>,
}

impl WeatherObservation {
    /// Builds an observation from a raw reading.
    ///
    /// Missing wave data is estimated as 1 m plus 0.1 m per m/s of wind.
    pub fn from_raw(raw: RawWeather, fetched_at: DateTime<Utc>) -> Self {
        let wind_speed_mps = non_negative(raw.wind_speed_mps);
        let (wave_height_m, wave_estimated) = match raw.wave_height_m {
            Some(h) => (non_negative(h), false),
            None => (estimate_wave_height(wind_speed_mps), true),
        };
        let wind_direction_deg = if raw.wind_direction_deg.is_finite() {
            raw.wind_direction_deg.rem_euclid(360.0)
        } else {
            0.0
        };

        Self {
            wind_speed_mps,
            wind_direction_deg,
            wave_height_m,
            wave_estimated,
            temperature_c: raw.temperature_c,
            condition: raw.condition,
            resistance: Resistance::compute(wind_speed_mps, wave_height_m),
            fetched_at,
        }
    }
}

/// Rough sea-state estimate for upstreams without wave data.
pub fn estimate_wave_height(wind_speed_mps: f64) -> f64 {
    if wind_speed_mps > 0.0 {
        1.0 + wind_speed_mps * 0.1
    } else {
        1.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}
