//! Inbound snapshots and outbound enriched records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::emissions::{Adjustment, EmissionFeatures, EsgAssessment, Rating};
use crate::weather::WeatherObservation;

/// Condition label carried by a neutral weather report.
pub const CONDITION_UNAVAILABLE: &str = "unavailable";

/// One position update for one vessel, with its operational features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselSnapshot {
    /// Nine-digit MMSI kept as text; leading zeros are significant.
    pub mmsi: String,
    pub lat: f64,
    pub lon: f64,
    /// knots
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
    pub features: EmissionFeatures,
}

/// Weather block of an enriched record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub wind_speed_ms: f64,
    pub wind_direction_deg: f64,
    pub wave_height_m: f64,
    pub wave_estimated: bool,
    pub temperature_c: f64,
    pub condition: String,
    pub resistance_factor: f64,
    pub storm_flag: bool,
    pub rough_sea_flag: bool,
    /// False when the upstream could not be reached and neutral conditions
    /// were assumed.
    pub available: bool,
    pub fetched_at: Option<DateTime<Utc>>,
}

impl WeatherReport {
    /// Calm, flagless conditions used when no observation is available.
    pub fn neutral() -> Self {
        Self {
            wind_speed_ms: 0.0,
            wind_direction_deg: 0.0,
            wave_height_m: 0.0,
            wave_estimated: false,
            temperature_c: 0.0,
            condition: CONDITION_UNAVAILABLE.to_string(),
            resistance_factor: 1.0,
            storm_flag: false,
            rough_sea_flag: false,
            available: false,
            fetched_at: None,
        }
    }
}

impl From<WeatherObservation> for WeatherReport {
    fn from(obs: WeatherObservation) -> Self {
        Self {
            wind_speed_ms: obs.wind_speed_mps,
            wind_direction_deg: obs.wind_direction_deg,
            wave_height_m: obs.wave_height_m,
            wave_estimated: obs.wave_estimated,
            temperature_c: obs.temperature_c,
            condition: obs.condition,
            resistance_factor: obs.resistance.factor,
            storm_flag: obs.resistance.storm,
            rough_sea_flag: obs.resistance.rough_sea,
            available: true,
            fetched_at: Some(obs.fetched_at),
        }
    }
}

/// A vessel update with weather, emissions and ESG attached.
///
/// Shared with subscribers as `Arc<EnrichedRecord>` and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub mmsi: String,
    pub lat: f64,
    pub lon: f64,
    pub speed: f64,
    pub timestamp: DateTime<Utc>,
    pub weather: WeatherReport,
    pub base_co2: f64,
    pub adjusted_co2: f64,
    pub delta_weather: f64,
    pub adjusted_speed_factor: f64,
    pub esg_score: u8,
    pub rating: Rating,
    pub risk_flags: Vec<String>,
}

impl EnrichedRecord {
    pub(crate) fn assemble(
        snapshot: &VesselSnapshot,
        weather: WeatherReport,
        base_co2: f64,
        adjustment: Adjustment,
        assessment: EsgAssessment,
    ) -> Self {
        Self {
            mmsi: snapshot.mmsi.clone(),
            lat: snapshot.lat,
            lon: snapshot.lon,
            speed: snapshot.speed,
            timestamp: snapshot.timestamp,
            weather,
            base_co2,
            adjusted_co2: adjustment.adjusted_co2_kg,
            delta_weather: adjustment.delta_co2_kg,
            adjusted_speed_factor: adjustment.speed_factor,
            esg_score: assessment.score,
            rating: assessment.rating,
            risk_flags: assessment.risk_flags,
        }
    }

    /// The ESG verdict carried by this record.
    pub fn assessment(&self) -> EsgAssessment {
        EsgAssessment {
            score: self.esg_score,
            rating: self.rating,
            risk_flags: self.risk_flags.clone(),
        }
    }

    /// Serialises the record as a single JSON line, without the newline.
    pub fn to_json_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::RawWeather;
    use chrono::TimeZone;

    fn snapshot() -> VesselSnapshot {
        VesselSnapshot {
            mmsi: "563001".to_string(),
            lat: 1.2834,
            lon: 103.8607,
            speed: 14.2,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap(),
            features: EmissionFeatures::projected_day(14.2, 2.0),
        }
    }

    fn record(weather: WeatherReport) -> EnrichedRecord {
        let adjustment = Adjustment::apply(450.0, weather.resistance_factor).unwrap();
        EnrichedRecord::assemble(
            &snapshot(),
            weather,
            450.0,
            adjustment,
            EsgAssessment {
                score: 85,
                rating: Rating::Good,
                risk_flags: vec!["Rough sea".to_string()],
            },
        )
    }

    #[test]
    fn test_neutral_report() {
        let report = WeatherReport::neutral();
        assert!(!report.available);
        assert_eq!(report.condition, "unavailable");
        assert_eq!(report.resistance_factor, 1.0);
        assert!(!report.storm_flag && !report.rough_sea_flag);
        assert!(report.fetched_at.is_none());
    }

    #[test]
    fn test_report_from_observation() {
        let fetched_at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let obs = WeatherObservation::from_raw(
            RawWeather {
                wind_speed_mps: 16.0,
                wind_direction_deg: 45.0,
                wave_height_m: None,
                temperature_c: 24.5,
                condition: "rain".to_string(),
            },
            fetched_at,
        );
        let report = WeatherReport::from(obs);

        assert!(report.available);
        assert!(report.wave_estimated);
        assert!(report.storm_flag);
        assert_eq!(report.fetched_at, Some(fetched_at));
    }

    #[test]
    fn test_json_field_names() {
        let line = record(WeatherReport::neutral()).to_json_line().unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        for key in [
            "mmsi",
            "lat",
            "lon",
            "speed",
            "timestamp",
            "weather",
            "base_co2",
            "adjusted_co2",
            "delta_weather",
            "adjusted_speed_factor",
            "esg_score",
            "rating",
            "risk_flags",
        ] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert!(value["mmsi"].is_string());
        assert_eq!(value["mmsi"], "563001");
        assert_eq!(value["rating"], "Good");
        assert_eq!(value["weather"]["condition"], "unavailable");
        assert_eq!(value["weather"]["resistance_factor"], 1.0);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_json_round_trip() {
        let mut weather = WeatherReport::neutral();
        weather.available = true;
        weather.wind_speed_ms = 12.0;
        weather.wave_height_m = 2.5;
        weather.resistance_factor = 1.145;
        weather.fetched_at = Some(Utc::now());
        let original = record(weather);

        let parsed: EnrichedRecord =
            serde_json::from_str(&original.to_json_line().unwrap()).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_mmsi_keeps_leading_zeros() {
        let mut snapshot = snapshot();
        snapshot.mmsi = "002442000".to_string();

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains(r#""mmsi":"002442000""#));
        let parsed: VesselSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.mmsi, "002442000");
    }

    #[test]
    fn test_assessment_matches_record() {
        let record = record(WeatherReport::neutral());
        let assessment = record.assessment();

        assert_eq!(assessment.score, 85);
        assert_eq!(assessment.rating, Rating::Good);
        assert_eq!(assessment.risk_flags, vec!["Rough sea".to_string()]);
    }
}
