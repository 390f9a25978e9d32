//! Service error types.

use thiserror::Error;

use crate::emissions::PredictorError;
use crate::weather::WeatherError;

/// Errors that can occur starting or stopping the live service.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Weather client could not be built.
    #[error("Weather client error: {0}")]
    Weather(#[from] WeatherError),

    /// Predictor client could not be built.
    #[error("Predictor client error: {0}")]
    Predictor(#[from] PredictorError),

    /// A setting is unusable.
    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    /// A background task panicked or was aborted.
    #[error("Service task failed: {0}")]
    TaskFailed(String),
}
