//! Fan-out of enriched records to live subscribers.
//!
//! ```text
//!                         ┌──► [queue] ──► Subscription (fast viewer)
//! publish(record) ──► Hub ┼──► [queue] ──► Subscription (fast viewer)
//!                         └──► [queue] ──► Subscription (slow viewer, sheds oldest)
//! ```
//!
//! Every subscriber has its own bounded FIFO. Publishing never waits; when a
//! queue is full its oldest record is discarded. Order within a queue is
//! publish order, so updates for one vessel are never reordered.

mod hub;
mod queue;
mod subscription;

pub use hub::{BroadcastHub, HubStats, SubscriberId, DEFAULT_SUBSCRIBER_BUFFER};
pub use subscription::Subscription;
