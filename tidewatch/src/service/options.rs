//! Runtime options for the live service.

use std::time::Duration;

use crate::broadcast::DEFAULT_SUBSCRIBER_BUFFER;
use crate::config::ConfigFile;
use crate::emissions::{EsgPolicy, DEFAULT_PREDICTOR_TIMEOUT};
use crate::pipeline::DispatcherConfig;
use crate::weather::WeatherCacheConfig;

use super::error::ServiceError;

/// Default depth of the feed → dispatcher channel.
pub const DEFAULT_FEED_BUFFER: usize = 1024;

/// Everything the service needs besides its collaborators.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceOptions {
    pub cache: WeatherCacheConfig,
    pub predictor_timeout: Duration,
    pub esg: EsgPolicy,
    pub dispatcher: DispatcherConfig,
    pub subscriber_buffer: usize,
    pub feed_buffer: usize,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            cache: WeatherCacheConfig::default(),
            predictor_timeout: DEFAULT_PREDICTOR_TIMEOUT,
            esg: EsgPolicy::default(),
            dispatcher: DispatcherConfig::default(),
            subscriber_buffer: DEFAULT_SUBSCRIBER_BUFFER,
            feed_buffer: DEFAULT_FEED_BUFFER,
        }
    }
}

impl ServiceOptions {
    pub fn from_config(config: &ConfigFile) -> Self {
        Self {
            cache: config.weather_cache_config(),
            predictor_timeout: config.predictor_timeout(),
            esg: config.esg.clone(),
            dispatcher: config.dispatcher_config(),
            subscriber_buffer: config.broadcast.subscriber_buffer,
            feed_buffer: DEFAULT_FEED_BUFFER,
        }
    }

    /// Rejects settings that would stall the pipeline.
    pub fn validate(&self) -> Result<(), ServiceError> {
        if self.dispatcher.max_concurrent == 0 {
            return Err(ServiceError::ConfigError(
                "max_concurrent must be at least 1".to_string(),
            ));
        }
        if self.dispatcher.lane_queue_depth == 0 {
            return Err(ServiceError::ConfigError(
                "lane_queue_depth must be at least 1".to_string(),
            ));
        }
        if self.feed_buffer == 0 {
            return Err(ServiceError::ConfigError(
                "feed_buffer must be at least 1".to_string(),
            ));
        }
        if self.predictor_timeout.is_zero() || self.cache.fetch_timeout.is_zero() {
            return Err(ServiceError::ConfigError(
                "timeouts must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
