//! Per-vessel lanes over a shared enrichment pipeline.
//!
//! ```text
//!                   ┌──► lane 563001 ──┐
//! snapshots ──► Dispatcher ──► lane 419001 ──┼──► enrich ──► BroadcastHub
//!                   └──► lane 419501 ──┘
//!                          (≤ max_concurrent enriching at once)
//! ```
//!
//! A lane is a task plus a bounded queue for one MMSI. It enriches its
//! vessel's snapshots one at a time in arrival order, so records for a
//! vessel are published in the order its positions arrived. Different
//! vessels proceed in parallel, bounded by a global semaphore.
//!
//! The routing loop never waits on a lane. When a lane's queue is full the
//! incoming update for that vessel is dropped and counted as overflow; other
//! vessels keep flowing.
//!
//! Only the dispatcher loop sends to lanes, so it can retire an idle lane
//! (nothing queued, nothing running) without racing a new snapshot.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::enrich::EnrichmentPipeline;
use super::record::VesselSnapshot;
use crate::broadcast::BroadcastHub;
use crate::emissions::Co2Predictor;
use crate::weather::WeatherClient;

pub const DEFAULT_MAX_CONCURRENT: usize = 32;
pub const DEFAULT_LANE_QUEUE_DEPTH: usize = 16;
pub const DEFAULT_LANE_IDLE: Duration = Duration::from_secs(60);

/// Dispatcher tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatcherConfig {
    /// Enrichments allowed to run at once across all vessels.
    pub max_concurrent: usize,
    /// Snapshots a lane buffers; further updates for that vessel are dropped.
    pub lane_queue_depth: usize,
    /// Idle time after which a lane is retired.
    pub lane_idle: Duration,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            lane_queue_depth: DEFAULT_LANE_QUEUE_DEPTH,
            lane_idle: DEFAULT_LANE_IDLE,
        }
    }
}

/// Live dispatcher counters, shared with whoever wants to watch them.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    received: AtomicU64,
    enriched: AtomicU64,
    skipped: AtomicU64,
    overflowed: AtomicU64,
    weather_degraded: AtomicU64,
    active_lanes: AtomicUsize,
}

/// Point-in-time copy of [`DispatchMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub received: u64,
    /// Records published.
    pub enriched: u64,
    /// Updates dropped because enrichment failed.
    pub skipped: u64,
    /// Updates dropped because their vessel's lane was full.
    pub overflowed: u64,
    /// Published records that carry neutral weather.
    pub weather_degraded: u64,
    pub active_lanes: usize,
}

impl DispatchMetrics {
    pub fn snapshot(&self) -> DispatchStats {
        DispatchStats {
            received: self.received.load(Ordering::Relaxed),
            enriched: self.enriched.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            overflowed: self.overflowed.load(Ordering::Relaxed),
            weather_degraded: self.weather_degraded.load(Ordering::Relaxed),
            active_lanes: self.active_lanes.load(Ordering::Relaxed),
        }
    }
}

struct Lane {
    tx: mpsc::Sender<VesselSnapshot>,
    /// Snapshots sent but not yet fully processed.
    pending: Arc<AtomicUsize>,
    last_used: Instant,
}

/// Routes snapshots to per-vessel lanes and publishes the results.
pub struct VesselDispatcher<W, P> {
    pipeline: Arc<EnrichmentPipeline<W, P>>,
    hub: BroadcastHub,
    config: DispatcherConfig,
    permits: Arc<Semaphore>,
    metrics: Arc<DispatchMetrics>,
}

impl<W, P> VesselDispatcher<W, P>
where
    W: WeatherClient + 'static,
    P: Co2Predictor + 'static,
{
    pub fn new(
        pipeline: Arc<EnrichmentPipeline<W, P>>,
        hub: BroadcastHub,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            pipeline,
            hub,
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            config,
            metrics: Arc::new(DispatchMetrics::default()),
        }
    }

    pub fn metrics(&self) -> Arc<DispatchMetrics> {
        Arc::clone(&self.metrics)
    }

    /// Runs until `cancel` fires or the input closes.
    ///
    /// A closed input lets every lane finish what it already holds.
    /// Cancellation aborts the lanes, dropping whatever they still hold.
    pub async fn run(self, mut rx: mpsc::Receiver<VesselSnapshot>, cancel: CancellationToken) {
        let mut lanes: HashMap<String, Lane> = HashMap::new();
        let mut tasks = JoinSet::new();
        let mut sweep = tokio::time::interval(sweep_period(self.config.lane_idle));
        sweep.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        info!(
            max_concurrent = self.config.max_concurrent,
            lane_queue_depth = self.config.lane_queue_depth,
            "Vessel dispatcher started"
        );

        let cancelled = loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    debug!("Dispatcher cancelled");
                    break true;
                }

                maybe = rx.recv() => match maybe {
                    Some(snapshot) => self.route(snapshot, &mut lanes, &mut tasks),
                    None => {
                        debug!("Snapshot feed closed");
                        break false;
                    }
                },

                _ = sweep.tick() => self.retire_idle(&mut lanes),

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        warn!(error = %e, "Lane task ended abnormally");
                    }
                }
            }
        };

        let abandoned: usize = lanes
            .values()
            .map(|lane| lane.pending.load(Ordering::Acquire))
            .sum();
        // Closing every sender lets each lane drain and exit.
        lanes.clear();
        self.metrics.active_lanes.store(0, Ordering::Relaxed);

        if cancelled {
            tasks.shutdown().await;
            if abandoned > 0 {
                debug!(abandoned, "Dropped queued updates on cancellation");
            }
        } else {
            while let Some(joined) = tasks.join_next().await {
                if let Err(e) = joined {
                    warn!(error = %e, "Lane task ended abnormally");
                }
            }
        }

        let stats = self.metrics.snapshot();
        info!(
            received = stats.received,
            enriched = stats.enriched,
            skipped = stats.skipped,
            overflowed = stats.overflowed,
            weather_degraded = stats.weather_degraded,
            "Vessel dispatcher stopped"
        );
    }

    /// Hands a snapshot to its vessel's lane without waiting.
    fn route(
        &self,
        snapshot: VesselSnapshot,
        lanes: &mut HashMap<String, Lane>,
        tasks: &mut JoinSet<()>,
    ) {
        self.metrics.received.fetch_add(1, Ordering::Relaxed);

        let lane = lanes
            .entry(snapshot.mmsi.clone())
            .or_insert_with(|| self.open_lane(&snapshot.mmsi, tasks));
        lane.last_used = Instant::now();

        // Count before sending so the lane can never observe a negative total.
        lane.pending.fetch_add(1, Ordering::AcqRel);
        match lane.tx.try_send(snapshot) {
            Ok(()) => {}
            Err(TrySendError::Full(snapshot)) => {
                lane.pending.fetch_sub(1, Ordering::AcqRel);
                self.metrics.overflowed.fetch_add(1, Ordering::Relaxed);
                debug!(mmsi = %snapshot.mmsi, "Lane full, dropping update");
            }
            Err(TrySendError::Closed(snapshot)) => {
                // Lane task is gone (it panicked); start over on the next update.
                warn!(mmsi = %snapshot.mmsi, "Lane closed unexpectedly, dropping update");
                lanes.remove(&snapshot.mmsi);
                self.metrics.skipped.fetch_add(1, Ordering::Relaxed);
            }
        }
        self.metrics
            .active_lanes
            .store(lanes.len(), Ordering::Relaxed);
    }

    fn open_lane(&self, mmsi: &str, tasks: &mut JoinSet<()>) -> Lane {
        let (tx, rx) = mpsc::channel(self.config.lane_queue_depth.max(1));
        let pending = Arc::new(AtomicUsize::new(0));

        tasks.spawn(run_lane(
            mmsi.to_string(),
            rx,
            Arc::clone(&pending),
            Arc::clone(&self.pipeline),
            self.hub.clone(),
            Arc::clone(&self.permits),
            Arc::clone(&self.metrics),
        ));
        debug!(mmsi, "Lane opened");

        Lane {
            tx,
            pending,
            last_used: Instant::now(),
        }
    }

    fn retire_idle(&self, lanes: &mut HashMap<String, Lane>) {
        let idle = self.config.lane_idle;
        let before = lanes.len();
        lanes.retain(|_, lane| {
            lane.pending.load(Ordering::Acquire) > 0 || lane.last_used.elapsed() < idle
        });
        let retired = before - lanes.len();
        if retired > 0 {
            debug!(retired, remaining = lanes.len(), "Retired idle lanes");
        }
        self.metrics
            .active_lanes
            .store(lanes.len(), Ordering::Relaxed);
    }
}

async fn run_lane<W, P>(
    mmsi: String,
    mut rx: mpsc::Receiver<VesselSnapshot>,
    pending: Arc<AtomicUsize>,
    pipeline: Arc<EnrichmentPipeline<W, P>>,
    hub: BroadcastHub,
    permits: Arc<Semaphore>,
    metrics: Arc<DispatchMetrics>,
) where
    W: WeatherClient,
    P: Co2Predictor,
{
    while let Some(snapshot) = rx.recv().await {
        let Ok(permit) = permits.acquire().await else {
            break;
        };

        match pipeline.enrich(&snapshot).await {
            Ok(record) => {
                if !record.weather.available {
                    metrics.weather_degraded.fetch_add(1, Ordering::Relaxed);
                }
                hub.publish(record);
                metrics.enriched.fetch_add(1, Ordering::Relaxed);
            }
            Err(e) => {
                metrics.skipped.fetch_add(1, Ordering::Relaxed);
                warn!(mmsi = %mmsi, error = %e, "Skipping vessel update");
            }
        }

        drop(permit);
        pending.fetch_sub(1, Ordering::AcqRel);
    }
    debug!(mmsi = %mmsi, "Lane closed");
}

fn sweep_period(lane_idle: Duration) -> Duration {
    (lane_idle / 2).max(Duration::from_millis(100))
}
