//! Subscriber registry and non-blocking publish.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use tracing::{debug, trace};

use super::queue::{Push, SubscriberQueue};
use crate::pipeline::EnrichedRecord;

/// Default per-subscriber queue depth.
pub const DEFAULT_SUBSCRIBER_BUFFER: usize = 256;

/// Opaque subscriber identity, unique for the life of a hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// Hub counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    /// Records handed to `publish`.
    pub published: u64,
    /// Record copies queued across all subscribers.
    pub delivered: u64,
    /// Records shed from full subscriber queues.
    pub dropped: u64,
}

pub(crate) struct HubInner {
    subscribers: DashMap<SubscriberId, Arc<SubscriberQueue>>,
    next_id: AtomicU64,
    buffer: usize,
    published: AtomicU64,
    delivered: AtomicU64,
    dropped: AtomicU64,
}

impl HubInner {
    pub(crate) fn remove(&self, id: SubscriberId) -> bool {
        match self.subscribers.remove(&id) {
            Some((_, queue)) => {
                queue.close();
                debug!(subscriber = %id, remaining = self.subscribers.len(), "Subscriber removed");
                true
            }
            None => false,
        }
    }
}

impl Drop for HubInner {
    // Last hub handle gone: wake readers so `recv` returns `None`.
    fn drop(&mut self) {
        for entry in self.subscribers.iter() {
            entry.value().close();
        }
    }
}

/// Fans enriched records out to every registered subscriber.
///
/// Cheap to clone; clones share one registry. Each subscriber owns a bounded
/// queue, so a slow reader only ever loses its own oldest records and never
/// delays the publisher or other readers.
#[derive(Clone)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl BroadcastHub {
    /// Creates a hub whose subscribers buffer up to `subscriber_buffer` records.
    pub fn new(subscriber_buffer: usize) -> Self {
        Self {
            inner: Arc::new(HubInner {
                subscribers: DashMap::new(),
                next_id: AtomicU64::new(1),
                buffer: subscriber_buffer.max(1),
                published: AtomicU64::new(0),
                delivered: AtomicU64::new(0),
                dropped: AtomicU64::new(0),
            }),
        }
    }

    /// Registers a new subscriber.
    ///
    /// The subscriber sees records published after this call returns.
    pub fn subscribe(&self) -> super::Subscription {
        let queue = Arc::new(SubscriberQueue::new(self.inner.buffer));
        let id = self.attach(Arc::clone(&queue));
        super::Subscription::new(id, queue, Arc::downgrade(&self.inner))
    }

    pub(super) fn attach(&self, queue: Arc<SubscriberQueue>) -> SubscriberId {
        let id = SubscriberId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.inner.subscribers.insert(id, queue);
        debug!(subscriber = %id, total = self.inner.subscribers.len(), "Subscriber added");
        id
    }

    /// Removes a subscriber. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.inner.remove(id)
    }

    /// Queues `record` for every current subscriber without waiting.
    ///
    /// Returns the number of subscribers it was queued for. A subscriber
    /// that is mid-unsubscribe is not counted.
    pub fn publish(&self, record: EnrichedRecord) -> usize {
        let record = Arc::new(record);
        let mut queued = 0usize;
        let mut shed = 0u64;

        for entry in self.inner.subscribers.iter() {
            match entry.value().push(Arc::clone(&record)) {
                Push::Queued => queued += 1,
                Push::Shed => {
                    queued += 1;
                    shed += 1;
                }
                Push::Closed => {}
            }
        }

        self.inner.published.fetch_add(1, Ordering::Relaxed);
        self.inner
            .delivered
            .fetch_add(queued as u64, Ordering::Relaxed);
        if shed > 0 {
            self.inner.dropped.fetch_add(shed, Ordering::Relaxed);
            trace!(mmsi = %record.mmsi, shed, "Slow subscribers shed oldest records");
        }
        queued
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    pub fn stats(&self) -> HubStats {
        HubStats {
            published: self.inner.published.load(Ordering::Relaxed),
            delivered: self.inner.delivered.load(Ordering::Relaxed),
            dropped: self.inner.dropped.load(Ordering::Relaxed),
        }
    }
}

impl Default for BroadcastHub {
    fn default() -> Self {
        Self::new(DEFAULT_SUBSCRIBER_BUFFER)
    }
}

/// Detach handle used by [`Subscription`](super::Subscription) on drop.
pub(crate) fn detach(hub: &Weak<HubInner>, id: SubscriberId) {
    if let Some(inner) = hub.upgrade() {
        inner.remove(id);
    }
}
