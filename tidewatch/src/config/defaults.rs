//! Default values for all configuration settings, and the conversions from
//! settings into the runtime config types each component takes.

use std::time::Duration;

use super::file::config_directory;
use super::settings::*;
use crate::broadcast::DEFAULT_SUBSCRIBER_BUFFER;
use crate::emissions::{EsgPolicy, DEFAULT_PREDICTOR_TIMEOUT, DEFAULT_PREDICTOR_URL};
use crate::feed::{SimulationConfig, DEFAULT_TICK, DEFAULT_VESSELS_PER_SECTOR};
use crate::pipeline::{
    DispatcherConfig, DEFAULT_LANE_IDLE, DEFAULT_LANE_QUEUE_DEPTH, DEFAULT_MAX_CONCURRENT,
};
use crate::weather::{
    WeatherCacheConfig, DEFAULT_FETCH_TIMEOUT, DEFAULT_WEATHER_TTL, DEFAULT_WEATHER_URL,
};

/// Environment variable consulted when no API key is configured.
pub const API_KEY_ENV_VAR: &str = "OPENWEATHER_API_KEY";

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "tidewatch.log";

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            weather: WeatherSettings {
                api_key: None,
                base_url: DEFAULT_WEATHER_URL.to_string(),
                ttl_secs: DEFAULT_WEATHER_TTL.as_secs(),
                fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
            },
            predictor: PredictorSettings {
                url: DEFAULT_PREDICTOR_URL.to_string(),
                timeout_secs: DEFAULT_PREDICTOR_TIMEOUT.as_secs(),
            },
            pipeline: PipelineSettings {
                max_concurrent: DEFAULT_MAX_CONCURRENT,
                lane_queue_depth: DEFAULT_LANE_QUEUE_DEPTH,
                lane_idle_secs: DEFAULT_LANE_IDLE.as_secs(),
            },
            broadcast: BroadcastSettings {
                subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
            },
            esg: EsgPolicy::default(),
            simulation: SimulationSettings {
                vessels_per_sector: DEFAULT_VESSELS_PER_SECTOR,
                tick_ms: DEFAULT_TICK.as_millis() as u64,
            },
            logging: LoggingSettings {
                file: config_directory().join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}

impl ConfigFile {
    /// API key from the file, or from `OPENWEATHER_API_KEY` when the file has none.
    pub fn weather_api_key(&self) -> Option<String> {
        self.weather.api_key.clone().or_else(|| {
            std::env::var(API_KEY_ENV_VAR)
                .ok()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
        })
    }

    pub fn weather_cache_config(&self) -> WeatherCacheConfig {
        WeatherCacheConfig {
            ttl: Duration::from_secs(self.weather.ttl_secs),
            fetch_timeout: Duration::from_secs(self.weather.fetch_timeout_secs),
        }
    }

    pub fn predictor_timeout(&self) -> Duration {
        Duration::from_secs(self.predictor.timeout_secs)
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            max_concurrent: self.pipeline.max_concurrent,
            lane_queue_depth: self.pipeline.lane_queue_depth,
            lane_idle: Duration::from_secs(self.pipeline.lane_idle_secs),
        }
    }

    pub fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            vessels_per_sector: self.simulation.vessels_per_sector,
            tick: Duration::from_millis(self.simulation.tick_ms),
        }
    }
}
