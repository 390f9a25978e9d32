//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::emissions::EsgPolicy;

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    pub weather: WeatherSettings,
    pub predictor: PredictorSettings,
    pub pipeline: PipelineSettings,
    pub broadcast: BroadcastSettings,
    /// `[esg]` maps directly onto the scoring policy.
    pub esg: EsgPolicy,
    pub simulation: SimulationSettings,
    pub logging: LoggingSettings,
}

/// Weather upstream and grid cache.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSettings {
    /// OpenWeatherMap API key. Without one every vessel gets neutral weather.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Observation lifetime in seconds.
    pub ttl_secs: u64,
    /// Bound on a single upstream fetch in seconds.
    pub fetch_timeout_secs: u64,
}

/// Baseline CO₂ model endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorSettings {
    pub url: String,
    pub timeout_secs: u64,
}

/// Dispatcher concurrency.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSettings {
    pub max_concurrent: usize,
    pub lane_queue_depth: usize,
    pub lane_idle_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BroadcastSettings {
    /// Records buffered per subscriber before the oldest is shed.
    pub subscriber_buffer: usize,
}

/// Simulated feed.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSettings {
    pub vessels_per_sector: u32,
    pub tick_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}
