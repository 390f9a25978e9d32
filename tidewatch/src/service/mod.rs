//! Live service facade.
//!
//! Wires a [`PositionSource`](crate::feed::PositionSource) through the
//! enrichment pipeline into a [`BroadcastHub`](crate::broadcast::BroadcastHub)
//! and owns the background tasks.
//!
//! ```ignore
//! let hub = BroadcastHub::new(256);
//! let mut records = hub.subscribe();
//! let service = LiveService::start_from_config(&config, hub, SimulatedFeed::new(sim))?;
//! while let Some(record) = records.recv().await { /* ... */ }
//! service.shutdown().await?;
//! ```

mod error;
mod live;
mod options;

pub use error::ServiceError;
pub use live::{LiveService, ServiceStats};
pub use options::{ServiceOptions, DEFAULT_FEED_BUFFER};
