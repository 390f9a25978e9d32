//! CLI command implementations.
//!
//! - [`config`] - Configuration management (init, path, show)
//! - [`run`] - Live service streaming JSON records to stdout
//! - [`score`] - Offline weather adjustment and ESG scoring

pub mod config;
pub mod run;
pub mod score;
