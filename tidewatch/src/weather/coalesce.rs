//! Single-flight coalescing of upstream weather fetches.
//!
//! When several vessels in the same grid cell miss the cache at once, only
//! the first caller (the leader) hits the upstream. Everyone else subscribes
//! to the leader's broadcast and receives the same outcome, success or error.
//!
//! ```text
//! lookup A ─┐
//!           │                        leader
//! lookup B ─┼──► CellCoalescer ───► fetch(cell) ───► upstream
//!           │         │                  │
//! lookup C ─┘         │                  │
//!                     ▼                  ▼
//!              [B, C wait on      complete(cell, outcome)
//!               broadcast] ◄─────────────┘
//! ```

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::broadcast;
use tracing::debug;

use super::error::WeatherError;
use super::observation::WeatherObservation;
use crate::geo::GeoCell;

/// Outcome of one upstream fetch, shared by every waiter on the cell.
pub type FetchOutcome = Result<WeatherObservation, WeatherError>;

/// Result of registering interest in a cell.
pub enum Registration<'a> {
    /// Caller is the leader and must fetch, then complete the guard.
    Leader(InFlightFetch<'a>),
    /// A fetch is already running; wait on the receiver.
    Follower(broadcast::Receiver<FetchOutcome>),
}

/// Tracks in-flight fetches keyed by grid cell.
pub struct CellCoalescer {
    in_flight: DashMap<GeoCell, broadcast::Sender<FetchOutcome>>,
    leaders: AtomicU64,
    followers: AtomicU64,
}

impl CellCoalescer {
    pub fn new() -> Self {
        Self {
            in_flight: DashMap::new(),
            leaders: AtomicU64::new(0),
            followers: AtomicU64::new(0),
        }
    }

    /// Registers a lookup for `cell`.
    ///
    /// Check-and-insert happens under the shard lock, so exactly one caller
    /// per cell becomes leader until that leader completes or is dropped.
    pub fn register(&self, cell: GeoCell) -> Registration<'_> {
        match self.in_flight.entry(cell) {
            Entry::Occupied(entry) => {
                let rx = entry.get().subscribe();
                self.followers.fetch_add(1, Ordering::Relaxed);
                debug!(%cell, "Joining in-flight weather fetch");
                Registration::Follower(rx)
            }
            Entry::Vacant(entry) => {
                // Capacity 1: exactly one outcome is ever sent per fetch.
                let (tx, _rx) = broadcast::channel(1);
                entry.insert(tx);
                self.leaders.fetch_add(1, Ordering::Relaxed);
                debug!(%cell, in_flight = self.in_flight.len(), "Leading weather fetch");
                Registration::Leader(InFlightFetch {
                    coalescer: self,
                    cell,
                    finished: false,
                })
            }
        }
    }

    fn complete(&self, cell: GeoCell, outcome: FetchOutcome) {
        if let Some((_, tx)) = self.in_flight.remove(&cell) {
            let waiters = tx.receiver_count();
            // No receivers is fine: nobody joined this fetch.
            let _ = tx.send(outcome);
            if waiters > 0 {
                debug!(%cell, waiters, "Delivered weather outcome to waiters");
            }
        }
    }

    fn abandon(&self, cell: GeoCell) {
        // Dropping the sender closes the channel; waiters see RecvError.
        if self.in_flight.remove(&cell).is_some() {
            debug!(%cell, "Abandoned in-flight weather fetch");
        }
    }

    /// Number of cells with a fetch currently running.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Total lookups that became leaders.
    pub fn leader_count(&self) -> u64 {
        self.leaders.load(Ordering::Relaxed)
    }

    /// Total lookups that joined an existing fetch.
    pub fn follower_count(&self) -> u64 {
        self.followers.load(Ordering::Relaxed)
    }
}

impl Default for CellCoalescer {
    fn default() -> Self {
        Self::new()
    }
}

/// Leader's handle on an in-flight fetch.
///
/// Dropping it without calling [`complete`](Self::complete) removes the cell
/// from the in-flight map, so followers get [`WeatherError::Abandoned`]
/// instead of waiting forever.
pub struct InFlightFetch<'a> {
    coalescer: &'a CellCoalescer,
    cell: GeoCell,
    finished: bool,
}

impl InFlightFetch<'_> {
    pub fn cell(&self) -> GeoCell {
        self.cell
    }

    /// Publishes the outcome to all followers and releases the cell.
    pub fn complete(mut self, outcome: FetchOutcome) {
        self.finished = true;
        self.coalescer.complete(self.cell, outcome);
    }
}

impl Drop for InFlightFetch<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.coalescer.abandon(self.cell);
        }
    }
}

/// Waits for a leader's outcome.
///
/// A closed channel means the leader was dropped mid-fetch.
pub async fn wait_for(mut rx: broadcast::Receiver<FetchOutcome>) -> FetchOutcome {
    match rx.recv().await {
        Ok(outcome) => outcome,
        Err(_) => Err(WeatherError::Abandoned),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::observation::RawWeather;
    use chrono::Utc;
    use std::sync::Arc;

    fn observation(wind: f64) -> WeatherObservation {
        WeatherObservation::from_raw(
            RawWeather {
                wind_speed_mps: wind,
                wind_direction_deg: 90.0,
                wave_height_m: Some(1.5),
                temperature_c: 28.0,
                condition: "clouds".to_string(),
            },
            Utc::now(),
        )
    }

    fn cell() -> GeoCell {
        GeoCell::containing(1.25, 103.8)
    }

    #[test]
    fn test_first_registration_leads() {
        let coalescer = CellCoalescer::new();
        let first = coalescer.register(cell());
        assert!(matches!(first, Registration::Leader(_)));
        assert_eq!(coalescer.in_flight_count(), 1);

        let second = coalescer.register(cell());
        assert!(matches!(second, Registration::Follower(_)));
        assert_eq!(coalescer.leader_count(), 1);
        assert_eq!(coalescer.follower_count(), 1);
    }

    #[test]
    fn test_distinct_cells_lead_independently() {
        let coalescer = CellCoalescer::new();
        let a = coalescer.register(GeoCell::containing(1.25, 103.8));
        let b = coalescer.register(GeoCell::containing(18.9, 72.8));
        assert!(matches!(a, Registration::Leader(_)));
        assert!(matches!(b, Registration::Leader(_)));
        assert_eq!(coalescer.in_flight_count(), 2);
    }

    #[tokio::test]
    async fn test_followers_receive_leader_outcome() {
        let coalescer = Arc::new(CellCoalescer::new());

        let Registration::Leader(leader) = coalescer.register(cell()) else {
            panic!("expected leader");
        };
        let Registration::Follower(rx1) = coalescer.register(cell()) else {
            panic!("expected follower");
        };
        let Registration::Follower(rx2) = coalescer.register(cell()) else {
            panic!("expected follower");
        };

        let expected = observation(12.0);
        leader.complete(Ok(expected.clone()));

        assert_eq!(wait_for(rx1).await, Ok(expected.clone()));
        assert_eq!(wait_for(rx2).await, Ok(expected));
        assert_eq!(coalescer.in_flight_count(), 0);
    }

    #[tokio::test]
    async fn test_errors_are_shared() {
        let coalescer = CellCoalescer::new();
        let Registration::Leader(leader) = coalescer.register(cell()) else {
            panic!("expected leader");
        };
        let Registration::Follower(rx) = coalescer.register(cell()) else {
            panic!("expected follower");
        };

        leader.complete(Err(WeatherError::Status(503)));
        assert_eq!(wait_for(rx).await, Err(WeatherError::Status(503)));
    }

    #[tokio::test]
    async fn test_dropped_leader_abandons_waiters() {
        let coalescer = CellCoalescer::new();
        let leader = coalescer.register(cell());
        let Registration::Follower(rx) = coalescer.register(cell()) else {
            panic!("expected follower");
        };

        drop(leader);
        assert_eq!(coalescer.in_flight_count(), 0);
        assert_eq!(wait_for(rx).await, Err(WeatherError::Abandoned));

        // Cell is free again.
        assert!(matches!(coalescer.register(cell()), Registration::Leader(_)));
    }

    #[test]
    fn test_complete_releases_cell() {
        let coalescer = CellCoalescer::new();
        if let Registration::Leader(leader) = coalescer.register(cell()) {
            assert_eq!(leader.cell(), cell());
            leader.complete(Ok(observation(3.0)));
        }
        assert_eq!(coalescer.in_flight_count(), 0);
        assert!(matches!(coalescer.register(cell()), Registration::Leader(_)));
    }
}
