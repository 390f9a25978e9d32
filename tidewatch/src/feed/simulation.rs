//! Synthetic vessel traffic around the monitored ports.
//!
//! Each tick every vessel drifts up to 0.001° along its course quadrant and
//! its speed random-walks within [0, 25] knots. The resulting snapshot
//! carries a 24-hour projection of its current speed as emission features.

use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::sector::Sector;
use super::source::PositionSource;
use crate::emissions::EmissionFeatures;
use crate::pipeline::VesselSnapshot;

pub const DEFAULT_VESSELS_PER_SECTOR: u32 = 5;
pub const DEFAULT_TICK: Duration = Duration::from_secs(2);

/// Keeps each sector's MMSIs inside its own block.
pub const MAX_VESSELS_PER_SECTOR: u32 = 300;

const MAX_SPEED_KNOTS: f64 = 25.0;
const MAX_DRIFT_DEG: f64 = 0.001;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimulationConfig {
    pub vessels_per_sector: u32,
    pub tick: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            vessels_per_sector: DEFAULT_VESSELS_PER_SECTOR,
            tick: DEFAULT_TICK,
        }
    }
}

/// One simulated vessel's kinematic state.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulatedVessel {
    pub mmsi: String,
    pub sector: Sector,
    pub lat: f64,
    pub lon: f64,
    pub speed_knots: f64,
    /// degrees, [0, 360)
    pub course_deg: f64,
}

impl SimulatedVessel {
    fn spawn(sector: Sector, index: u32, rng: &mut impl Rng) -> Self {
        let (lat, lon) = sector.anchor();
        let (lat_spread, lon_spread) = sector.spread();
        Self {
            mmsi: sector.mmsi(index),
            sector,
            lat: lat + (rng.gen::<f64>() - 0.5) * lat_spread,
            lon: lon + (rng.gen::<f64>() - 0.5) * lon_spread,
            speed_knots: rng.gen_range(sector.speed_range()),
            course_deg: rng.gen_range(0.0..360.0),
        }
    }

    /// Advances the vessel by one tick.
    pub fn step(&mut self, rng: &mut impl Rng) {
        let lat_sign = if self.course_deg < 180.0 { 1.0 } else { -1.0 };
        let lon_sign = if self.course_deg > 90.0 && self.course_deg < 270.0 {
            1.0
        } else {
            -1.0
        };
        self.lat += rng.gen::<f64>() * MAX_DRIFT_DEG * lat_sign;
        self.lon += rng.gen::<f64>() * MAX_DRIFT_DEG * lon_sign;
        self.speed_knots =
            (self.speed_knots + rng.gen::<f64>() - 0.5).clamp(0.0, MAX_SPEED_KNOTS);
    }

    fn snapshot(&self, rng: &mut impl Rng) -> VesselSnapshot {
        let speed_std = 0.5 + rng.gen::<f64>() * 0.5;
        VesselSnapshot {
            mmsi: self.mmsi.clone(),
            lat: self.lat,
            lon: self.lon,
            speed: self.speed_knots,
            timestamp: Utc::now(),
            features: EmissionFeatures::projected_day(self.speed_knots, speed_std),
        }
    }
}

/// Position source that simulates a fixed fleet in every sector.
pub struct SimulatedFeed {
    config: SimulationConfig,
    fleet: Vec<SimulatedVessel>,
    rng: StdRng,
}

impl SimulatedFeed {
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic fleet for tests and demos.
    pub fn with_seed(config: SimulationConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimulationConfig, mut rng: StdRng) -> Self {
        let per_sector = config.vessels_per_sector.min(MAX_VESSELS_PER_SECTOR);
        let fleet = Sector::ALL
            .into_iter()
            .flat_map(|sector| (0..per_sector).map(move |i| (sector, i)))
            .map(|(sector, i)| SimulatedVessel::spawn(sector, i, &mut rng))
            .collect();
        Self { config, fleet, rng }
    }

    pub fn fleet(&self) -> &[SimulatedVessel] {
        &self.fleet
    }

    /// Advances every vessel once and returns their snapshots.
    pub fn tick(&mut self) -> Vec<VesselSnapshot> {
        let rng = &mut self.rng;
        self.fleet
            .iter_mut()
            .map(|vessel| {
                vessel.step(rng);
                vessel.snapshot(rng)
            })
            .collect()
    }
}

impl PositionSource for SimulatedFeed {
    async fn run(mut self, tx: mpsc::Sender<VesselSnapshot>, cancel: CancellationToken) {
        info!(
            vessels = self.fleet.len(),
            tick_ms = self.config.tick.as_millis() as u64,
            "Simulated feed started"
        );
        let mut interval = tokio::time::interval(self.config.tick);
        let mut ticks = 0u64;

        'feed: loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            for snapshot in self.tick() {
                let sent = tokio::select! {
                    _ = cancel.cancelled() => break 'feed,
                    sent = tx.send(snapshot) => sent,
                };
                if sent.is_err() {
                    debug!("Snapshot receiver dropped");
                    break 'feed;
                }
            }
            ticks += 1;
        }

        info!(ticks, "Simulated feed stopped");
    }
}
