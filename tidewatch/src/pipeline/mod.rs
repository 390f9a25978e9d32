//! Enrichment of vessel snapshots and their dispatch to the hub.
//!
//! - [`enrich`] - weather + baseline CO₂ + adjustment + ESG for one snapshot
//! - [`dispatch`] - per-vessel ordering and cross-vessel parallelism
//! - [`record`] - inbound snapshot and outbound record types

pub mod dispatch;
pub mod enrich;
pub mod record;

pub use dispatch::{
    DispatchMetrics, DispatchStats, DispatcherConfig, VesselDispatcher, DEFAULT_LANE_IDLE,
    DEFAULT_LANE_QUEUE_DEPTH, DEFAULT_MAX_CONCURRENT,
};
pub use enrich::{EnrichError, EnrichmentPipeline};
pub use record::{EnrichedRecord, VesselSnapshot, WeatherReport, CONDITION_UNAVAILABLE};
