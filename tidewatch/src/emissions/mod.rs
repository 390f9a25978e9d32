//! Weather-adjusted emissions and ESG scoring.
//!
//! The chain is pure and deterministic apart from the external predictor:
//!
//! ```text
//! wind, wave ──► Resistance ──┐
//!                             ├──► Adjustment ──► EsgScorer ──► score, rating, flags
//! features ──► Co2Predictor ──┘
//! ```
//!
//! # Components
//!
//! - [`resistance`] - wind/wave → resistance factor, storm and rough-sea flags
//! - [`adjust`] - baseline CO₂ × resistance → adjusted CO₂ and delta
//! - [`esg`] - adjusted CO₂ + operational metrics → 0-100 score
//! - [`predictor`] - seam for the external baseline CO₂ model
//! - [`features`] - operational feature vector and sanitation

pub mod adjust;
mod error;
pub mod esg;
pub mod features;
pub mod predictor;
pub mod resistance;

pub use adjust::Adjustment;
pub use error::{EmissionError, PredictorError};
pub use esg::{EsgAssessment, EsgInputs, EsgPolicy, EsgScorer, FleetSummary, Rating};
pub use features::EmissionFeatures;
pub use predictor::{
    Co2Predictor, HttpPredictor, DEFAULT_PREDICTOR_TIMEOUT, DEFAULT_PREDICTOR_URL,
};
pub use resistance::Resistance;
