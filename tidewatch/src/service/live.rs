//! The running service: feed → dispatcher → hub.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::error::ServiceError;
use super::options::ServiceOptions;
use crate::broadcast::{BroadcastHub, HubStats, Subscription};
use crate::config::ConfigFile;
use crate::emissions::{Co2Predictor, EsgScorer, HttpPredictor};
use crate::feed::PositionSource;
use crate::pipeline::{DispatchMetrics, DispatchStats, EnrichmentPipeline, VesselDispatcher};
use crate::weather::{OpenWeatherClient, WeatherCacheStats, WeatherClient, WeatherGridCache};

/// Combined counters across the service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceStats {
    pub cache: WeatherCacheStats,
    pub dispatch: DispatchStats,
    pub hub: HubStats,
}

/// Handle on a running live service.
///
/// Dropping the handle cancels the background tasks without waiting for
/// them; call [`shutdown`](Self::shutdown) to stop and join cleanly.
pub struct LiveService<W> {
    hub: BroadcastHub,
    cache: Arc<WeatherGridCache<W>>,
    metrics: Arc<DispatchMetrics>,
    cancel: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveService<OpenWeatherClient> {
    /// Starts the service with the shipped HTTP weather client and predictor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start_from_config<S: PositionSource>(
        config: &ConfigFile,
        hub: BroadcastHub,
        source: S,
    ) -> Result<Self, ServiceError> {
        let weather = OpenWeatherClient::new(
            config.weather.base_url.clone(),
            config.weather_api_key(),
            Duration::from_secs(config.weather.fetch_timeout_secs),
        )?;
        let predictor =
            HttpPredictor::new(config.predictor.url.clone(), config.predictor_timeout())?;

        Self::start_with_hub(
            ServiceOptions::from_config(config),
            hub,
            weather,
            predictor,
            source,
        )
    }
}

impl<W: WeatherClient + 'static> LiveService<W> {
    /// Starts the service with a fresh hub.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start<P, S>(
        options: ServiceOptions,
        weather: W,
        predictor: P,
        source: S,
    ) -> Result<Self, ServiceError>
    where
        P: Co2Predictor + 'static,
        S: PositionSource,
    {
        let hub = BroadcastHub::new(options.subscriber_buffer);
        Self::start_with_hub(options, hub, weather, predictor, source)
    }

    /// Starts the service publishing into an existing hub, so subscribers
    /// registered beforehand see the very first records.
    pub fn start_with_hub<P, S>(
        options: ServiceOptions,
        hub: BroadcastHub,
        weather: W,
        predictor: P,
        source: S,
    ) -> Result<Self, ServiceError>
    where
        P: Co2Predictor + 'static,
        S: PositionSource,
    {
        options.validate()?;

        let cache = Arc::new(WeatherGridCache::new(weather, options.cache));
        let pipeline = Arc::new(EnrichmentPipeline::new(
            Arc::clone(&cache),
            predictor,
            EsgScorer::new(options.esg.clone()),
            options.predictor_timeout,
        ));
        let dispatcher = VesselDispatcher::new(pipeline, hub.clone(), options.dispatcher);
        let metrics = dispatcher.metrics();

        let cancel = CancellationToken::new();
        let (tx, rx) = mpsc::channel(options.feed_buffer);

        let tasks = vec![
            tokio::spawn(dispatcher.run(rx, cancel.child_token())),
            tokio::spawn(source.run(tx, cancel.child_token())),
        ];

        info!(
            ttl_secs = options.cache.ttl.as_secs(),
            max_concurrent = options.dispatcher.max_concurrent,
            subscriber_buffer = options.subscriber_buffer,
            "Live service started"
        );

        Ok(Self {
            hub,
            cache,
            metrics,
            cancel,
            tasks,
        })
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    pub fn stats(&self) -> ServiceStats {
        ServiceStats {
            cache: self.cache.stats(),
            dispatch: self.metrics.snapshot(),
            hub: self.hub.stats(),
        }
    }

    pub fn log_stats(&self) {
        self.cache.log_stats();
        let dispatch = self.metrics.snapshot();
        let hub = self.hub.stats();
        info!(
            received = dispatch.received,
            enriched = dispatch.enriched,
            skipped = dispatch.skipped,
            overflowed = dispatch.overflowed,
            weather_degraded = dispatch.weather_degraded,
            active_lanes = dispatch.active_lanes,
            subscribers = self.hub.subscriber_count(),
            published = hub.published,
            dropped = hub.dropped,
            "Pipeline statistics"
        );
    }

    /// Drops expired weather entries.
    pub fn purge_weather(&self) -> usize {
        self.cache.purge_expired()
    }

    /// Cancellation token observed by every background task.
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// True once every background task has exited, e.g. because a finite
    /// source ran dry and the dispatcher drained.
    pub fn is_finished(&self) -> bool {
        self.tasks.iter().all(|t| t.is_finished())
    }

    /// Cancels the feed and dispatcher and waits for both to exit.
    ///
    /// Updates still queued or mid-enrichment are abandoned.
    pub async fn shutdown(mut self) -> Result<(), ServiceError> {
        self.cancel.cancel();
        let mut failure = None;
        for task in std::mem::take(&mut self.tasks) {
            if let Err(e) = task.await {
                failure.get_or_insert(ServiceError::TaskFailed(e.to_string()));
            }
        }
        info!("Live service stopped");
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

impl<W> Drop for LiveService<W> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
