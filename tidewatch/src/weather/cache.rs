//! TTL cache of weather observations keyed by grid cell.
//!
//! Expiry is lazy: an entry older than the TTL is simply treated as absent
//! and replaced by the next successful fetch. Failures are never cached.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::client::WeatherClient;
use super::coalesce::{wait_for, CellCoalescer, FetchOutcome, Registration};
use super::error::WeatherError;
use super::observation::WeatherObservation;
use crate::geo::GeoCell;

/// Default observation lifetime.
pub const DEFAULT_WEATHER_TTL: Duration = Duration::from_secs(600);

/// Default bound on a single upstream fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Cache tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeatherCacheConfig {
    pub ttl: Duration,
    pub fetch_timeout: Duration,
}

impl Default for WeatherCacheConfig {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_WEATHER_TTL,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    observation: WeatherObservation,
    inserted_at: Instant,
}

impl CacheEntry {
    fn is_live(&self, ttl: Duration) -> bool {
        self.inserted_at.elapsed() < ttl
    }
}

/// Snapshot of cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WeatherCacheStats {
    /// Lookups answered from a live entry.
    pub hits: u64,
    /// Lookups that found no live entry.
    pub misses: u64,
    /// Misses that waited on another caller's fetch.
    pub coalesced: u64,
    /// Upstream calls actually issued.
    pub fetches: u64,
    /// Upstream calls that failed or timed out.
    pub failures: u64,
}

impl WeatherCacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Process-wide weather cache over a [`WeatherClient`].
///
/// Concurrent lookups for the same cell share a single upstream fetch.
/// Lookups for different cells never contend on anything wider than a
/// `DashMap` shard.
pub struct WeatherGridCache<C> {
    client: C,
    config: WeatherCacheConfig,
    entries: DashMap<GeoCell, CacheEntry>,
    coalescer: CellCoalescer,
    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    fetches: AtomicU64,
    failures: AtomicU64,
}

impl<C: WeatherClient> WeatherGridCache<C> {
    pub fn new(client: C, config: WeatherCacheConfig) -> Self {
        Self {
            client,
            config,
            entries: DashMap::new(),
            coalescer: CellCoalescer::new(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            fetches: AtomicU64::new(0),
            failures: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> WeatherCacheConfig {
        self.config
    }

    /// Returns weather for the cell containing `(lat, lon)`.
    ///
    /// A live entry is returned without touching the upstream. Otherwise at
    /// most one fetch per cell is in flight; concurrent callers receive that
    /// fetch's outcome, including its error.
    pub async fn get(&self, lat: f64, lon: f64) -> Result<WeatherObservation, WeatherError> {
        let cell = GeoCell::containing(lat, lon);

        if let Some(observation) = self.live(cell) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(observation);
        }
        self.misses.fetch_add(1, Ordering::Relaxed);

        let leader = match self.coalescer.register(cell) {
            Registration::Follower(rx) => {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                return wait_for(rx).await;
            }
            Registration::Leader(leader) => leader,
        };

        // A fetch may have completed between our miss and registering.
        if let Some(observation) = self.live(cell) {
            leader.complete(Ok(observation.clone()));
            return Ok(observation);
        }

        let outcome = self.fetch(cell).await;
        if let Ok(observation) = &outcome {
            // Insert before releasing the cell so the next caller hits.
            self.entries.insert(
                cell,
                CacheEntry {
                    observation: observation.clone(),
                    inserted_at: Instant::now(),
                },
            );
        }
        leader.complete(outcome.clone());
        outcome
    }

    async fn fetch(&self, cell: GeoCell) -> FetchOutcome {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        let (lat, lon) = cell.center();
        let timeout = self.config.fetch_timeout;

        let result = match tokio::time::timeout(timeout, self.client.fetch(lat, lon)).await {
            Ok(result) => result,
            Err(_) => Err(WeatherError::Timeout(timeout.as_millis() as u64)),
        };

        match result {
            Ok(raw) => {
                let observation = WeatherObservation::from_raw(raw, Utc::now());
                debug!(
                    %cell,
                    resistance = observation.resistance.factor,
                    "Cached fresh weather"
                );
                Ok(observation)
            }
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(%cell, error = %e, "Weather fetch failed");
                Err(e)
            }
        }
    }

    fn live(&self, cell: GeoCell) -> Option<WeatherObservation> {
        self.entries
            .get(&cell)
            .filter(|entry| entry.is_live(self.config.ttl))
            .map(|entry| entry.observation.clone())
    }

    /// Drops every expired entry. Lookups never need this; it only bounds memory.
    pub fn purge_expired(&self) -> usize {
        let before = self.entries.len();
        let ttl = self.config.ttl;
        self.entries.retain(|_, entry| entry.is_live(ttl));
        before.saturating_sub(self.entries.len())
    }

    /// Number of cells with an entry, live or expired.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> WeatherCacheStats {
        WeatherCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            fetches: self.fetches.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    pub fn log_stats(&self) {
        let stats = self.stats();
        info!(
            hits = stats.hits,
            misses = stats.misses,
            coalesced = stats.coalesced,
            fetches = stats.fetches,
            failures = stats.failures,
            cells = self.len(),
            hit_rate = format!("{:.1}%", stats.hit_rate() * 100.0),
            "Weather cache statistics"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::observation::RawWeather;
    use std::sync::atomic::AtomicUsize;

    /// Counts upstream calls and answers with a fixed reading.
    struct CountingClient {
        calls: AtomicUsize,
        wind: f64,
    }

    impl CountingClient {
        fn new(wind: f64) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                wind,
            }
        }
    }

    impl WeatherClient for CountingClient {
        async fn fetch(&self, _lat: f64, _lon: f64) -> Result<RawWeather, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawWeather {
                wind_speed_mps: self.wind,
                wind_direction_deg: 180.0,
                wave_height_m: Some(2.5),
                temperature_c: 26.0,
                condition: "rain".to_string(),
            })
        }
    }

    struct FailingClient;

    impl WeatherClient for FailingClient {
        async fn fetch(&self, _lat: f64, _lon: f64) -> Result<RawWeather, WeatherError> {
            Err(WeatherError::Status(500))
        }
    }

    struct HangingClient;

    impl WeatherClient for HangingClient {
        async fn fetch(&self, _lat: f64, _lon: f64) -> Result<RawWeather, WeatherError> {
            std::future::pending::<Result<RawWeather, WeatherError>>().await
        }
    }

    #[tokio::test]
    async fn test_second_lookup_hits() {
        let cache = WeatherGridCache::new(CountingClient::new(12.0), WeatherCacheConfig::default());

        let first = cache.get(1.25, 103.8).await.unwrap();
        let second = cache.get(1.26, 103.81).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.client.calls.load(Ordering::SeqCst), 1);
        assert!((first.resistance.factor - 1.145).abs() < 1e-9);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.fetches, 1);
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_different_cells_fetch_separately() {
        let cache = WeatherGridCache::new(CountingClient::new(6.0), WeatherCacheConfig::default());
        cache.get(1.25, 103.8).await.unwrap();
        cache.get(18.9, 72.8).await.unwrap();
        assert_eq!(cache.client.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expired_entry_refetches() {
        let config = WeatherCacheConfig {
            ttl: Duration::from_secs(600),
            ..Default::default()
        };
        let cache = WeatherGridCache::new(CountingClient::new(8.0), config);

        cache.get(12.9, 74.8).await.unwrap();
        tokio::time::advance(Duration::from_secs(599)).await;
        cache.get(12.9, 74.8).await.unwrap();
        assert_eq!(cache.client.calls.load(Ordering::SeqCst), 1);

        tokio::time::advance(Duration::from_secs(2)).await;
        cache.get(12.9, 74.8).await.unwrap();
        assert_eq!(cache.client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = WeatherGridCache::new(FailingClient, WeatherCacheConfig::default());

        assert_eq!(cache.get(1.25, 103.8).await, Err(WeatherError::Status(500)));
        assert_eq!(cache.get(1.25, 103.8).await, Err(WeatherError::Status(500)));

        let stats = cache.stats();
        assert_eq!(stats.fetches, 2);
        assert_eq!(stats.failures, 2);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_timeout() {
        let config = WeatherCacheConfig {
            fetch_timeout: Duration::from_millis(250),
            ..Default::default()
        };
        let cache = WeatherGridCache::new(HangingClient, config);

        assert_eq!(cache.get(1.25, 103.8).await, Err(WeatherError::Timeout(250)));
        assert_eq!(cache.stats().failures, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_purge_expired() {
        let cache = WeatherGridCache::new(CountingClient::new(5.0), WeatherCacheConfig::default());
        cache.get(1.25, 103.8).await.unwrap();
        assert_eq!(cache.purge_expired(), 0);

        tokio::time::advance(DEFAULT_WEATHER_TTL).await;
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hit_rate() {
        let stats = WeatherCacheStats {
            hits: 3,
            misses: 1,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(WeatherCacheStats::default().hit_rate(), 0.0);
    }
}
