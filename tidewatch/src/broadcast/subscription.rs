//! Receiving side of the hub.

use std::sync::{Arc, Weak};

use super::hub::{detach, HubInner, SubscriberId};
use super::queue::SubscriberQueue;
use crate::pipeline::EnrichedRecord;

/// One subscriber's view of the stream.
///
/// Dropping the subscription unsubscribes it.
pub struct Subscription {
    id: SubscriberId,
    queue: Arc<SubscriberQueue>,
    hub: Weak<HubInner>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriberId, queue: Arc<SubscriberQueue>, hub: Weak<HubInner>) -> Self {
        Self { id, queue, hub }
    }

    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Waits for the next record, or `None` once unsubscribed.
    pub async fn recv(&mut self) -> Option<Arc<EnrichedRecord>> {
        self.queue.pop().await
    }

    /// Returns the next record if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<EnrichedRecord>> {
        self.queue.try_pop()
    }

    /// Records shed from this subscriber's queue because it fell behind.
    pub fn dropped(&self) -> u64 {
        self.queue.dropped()
    }

    /// Records waiting to be received.
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        detach(&self.hub, self.id);
    }
}
