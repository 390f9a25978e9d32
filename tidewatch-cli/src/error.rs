//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent formatting
//! and appropriate exit codes.

use std::fmt;
use std::process;

use tidewatch::config::{ConfigFileError, API_KEY_ENV_VAR};
use tidewatch::emissions::EmissionError;
use tidewatch::service::ServiceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Configuration error
    Config(String),
    /// Failed to start the async runtime
    Runtime(std::io::Error),
    /// Failed to start or stop the live service
    Service(ServiceError),
    /// Offline scoring rejected its inputs
    Score(EmissionError),
    /// Failed to write to stdout
    Output(std::io::Error),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Service(ServiceError::Predictor(_)) = self {
            eprintln!();
            eprintln!("Check that the emissions model service is reachable:");
            eprintln!("  tidewatch config show   (see [predictor] url)");
        }
        if let CliError::Config(_) = self {
            eprintln!();
            eprintln!("The weather API key can also be supplied via {API_KEY_ENV_VAR}.");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Failed to initialize logging: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Runtime(e) => write!(f, "Failed to start async runtime: {}", e),
            CliError::Service(e) => write!(f, "Live service error: {}", e),
            CliError::Score(e) => write!(f, "Cannot score voyage: {}", e),
            CliError::Output(e) => write!(f, "Failed to write output: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Runtime(e) => Some(e),
            CliError::Service(e) => Some(e),
            CliError::Score(e) => Some(e),
            CliError::Output(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<ServiceError> for CliError {
    fn from(e: ServiceError) -> Self {
        CliError::Service(e)
    }
}

impl From<EmissionError> for CliError {
    fn from(e: EmissionError) -> Self {
        CliError::Score(e)
    }
}
