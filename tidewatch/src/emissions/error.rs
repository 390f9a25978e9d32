//! Error types for emission adjustment and baseline prediction.

use thiserror::Error;

/// Errors from the pure emission adjustment step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EmissionError {
    /// Baseline CO₂ was negative or not finite.
    #[error("Invalid baseline CO2: {0} kg")]
    InvalidBaseline(f64),

    /// Resistance factor was zero, negative or not finite.
    #[error("Invalid resistance factor: {0}")]
    InvalidResistance(f64),
}

/// Errors from the external CO₂ predictor.
#[derive(Debug, Clone, Error)]
pub enum PredictorError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Predictor answered with a non-success status.
    #[error("Predictor returned status {0}")]
    Status(u16),

    /// Response body could not be parsed.
    #[error("Failed to parse prediction: {0}")]
    Parse(String),

    /// No answer within the configured timeout.
    #[error("Prediction timed out after {0}ms")]
    Timeout(u64),

    /// Predictor produced a value that is not a finite number.
    #[error("Predictor returned an invalid value: {0}")]
    InvalidPrediction(f64),
}
