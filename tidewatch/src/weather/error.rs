//! Error types for weather lookups.

use thiserror::Error;

/// Errors that can occur when fetching weather for a grid cell.
///
/// `Clone` because one fetch outcome is broadcast to every coalesced waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    /// No API key configured for the upstream.
    #[error("Weather API key not configured")]
    MissingApiKey,

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Upstream answered with a non-success status.
    #[error("Weather API returned status {0}")]
    Status(u16),

    /// Response body could not be parsed.
    #[error("Failed to parse weather response: {0}")]
    Parse(String),

    /// Upstream did not answer within the fetch timeout.
    #[error("Weather fetch timed out after {0}ms")]
    Timeout(u64),

    /// The fetch this lookup was waiting on was dropped before completing.
    #[error("In-flight weather fetch was abandoned")]
    Abandoned,
}
