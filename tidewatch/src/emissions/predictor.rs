//! Baseline CO₂ predictor seam.
//!
//! The emission model is an external collaborator. The [`Co2Predictor`] trait
//! is the only thing the pipeline knows about it; [`HttpPredictor`] talks to
//! a model-serving endpoint over HTTP.

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::PredictorError;
use super::features::EmissionFeatures;

/// Default timeout for a single prediction request.
pub const DEFAULT_PREDICTOR_TIMEOUT: Duration = Duration::from_secs(5);

/// Default model-serving endpoint.
pub const DEFAULT_PREDICTOR_URL: &str = "http://localhost:8000/predict-emissions";

/// Trait for the weather-independent CO₂ predictor.
pub trait Co2Predictor: Send + Sync {
    /// Predict baseline CO₂ (kg) for the given operational features.
    fn predict_base_co2(
        &self,
        features: &EmissionFeatures,
    ) -> impl Future<Output = Result<f64, PredictorError>> + Send;
}

/// Request body understood by the model-serving endpoint.
#[derive(Debug, Serialize)]
struct PredictionRequest {
    avg_speed: f64,
    speed_std: f64,
    total_distance_km: f64,
    time_at_sea_hours: f64,
    acceleration_events: u32,
    length: f64,
    width: f64,
    draft: f64,
    co2_factor: f64,
}

impl From<&EmissionFeatures> for PredictionRequest {
    fn from(f: &EmissionFeatures) -> Self {
        Self {
            avg_speed: f.avg_speed_knots,
            speed_std: f.speed_std_knots,
            total_distance_km: f.distance_km,
            time_at_sea_hours: f.time_at_sea_hours,
            acceleration_events: f.acceleration_events,
            length: f.length_m,
            width: f.width_m,
            draft: f.draft_m,
            co2_factor: f.co2_factor,
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictionResponse {
    estimated_co2_kg: f64,
}

/// Predictor backed by an HTTP model endpoint.
///
/// Uses a reusable `reqwest::Client` with connection pooling and a request
/// timeout.
pub struct HttpPredictor {
    http: reqwest::Client,
    url: String,
}

impl HttpPredictor {
    /// Create a predictor for the given endpoint.
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, PredictorError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| PredictorError::Http(e.to_string()))?;

        Ok(Self {
            http,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Co2Predictor for HttpPredictor {
    async fn predict_base_co2(&self, features: &EmissionFeatures) -> Result<f64, PredictorError> {
        let response = self
            .http
            .post(&self.url)
            .json(&PredictionRequest::from(features))
            .send()
            .await
            .map_err(|e| PredictorError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PredictorError::Status(status.as_u16()));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PredictorError::Http(e.to_string()))?;

        parse_prediction(&bytes)
    }
}

/// Parses a prediction body. Negative predictions clamp to zero.
fn parse_prediction(body: &[u8]) -> Result<f64, PredictorError> {
    let parsed: PredictionResponse =
        serde_json::from_slice(body).map_err(|e| PredictorError::Parse(e.to_string()))?;

    let kg = parsed.estimated_co2_kg;
    if !kg.is_finite() {
        return Err(PredictorError::InvalidPrediction(kg));
    }
    Ok(kg.max(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_uses_model_feature_names() {
        let features = EmissionFeatures::projected_day(12.5, 2.1);
        let json = serde_json::to_value(PredictionRequest::from(&features)).unwrap();

        for key in [
            "avg_speed",
            "speed_std",
            "total_distance_km",
            "time_at_sea_hours",
            "acceleration_events",
            "length",
            "width",
            "draft",
            "co2_factor",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["avg_speed"], 12.5);
        assert_eq!(json["acceleration_events"], 3);
    }

    #[test]
    fn test_parse_prediction() {
        let body = br#"{"mmsi": "367123456", "estimated_co2_kg": 5432.18}"#;
        assert_eq!(parse_prediction(body).unwrap(), 5432.18);
    }

    #[test]
    fn test_parse_negative_prediction_clamps_to_zero() {
        let body = br#"{"estimated_co2_kg": -3.5}"#;
        assert_eq!(parse_prediction(body).unwrap(), 0.0);
    }

    #[test]
    fn test_parse_rejects_malformed_body() {
        assert!(matches!(
            parse_prediction(b"{\"co2\": 1.0}"),
            Err(PredictorError::Parse(_))
        ));
        assert!(matches!(
            parse_prediction(b"not json"),
            Err(PredictorError::Parse(_))
        ));
    }

    #[test]
    fn test_http_predictor_creation() {
        let predictor = HttpPredictor::new(DEFAULT_PREDICTOR_URL, DEFAULT_PREDICTOR_TIMEOUT).unwrap();
        assert_eq!(predictor.url(), DEFAULT_PREDICTOR_URL);
    }
}
