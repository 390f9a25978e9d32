//! Bounded drop-oldest queue feeding one subscriber.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::pipeline::EnrichedRecord;

struct QueueState {
    records: VecDeque<Arc<EnrichedRecord>>,
    closed: bool,
}

/// What happened to a pushed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Push {
    /// Queued with room to spare.
    Queued,
    /// Queued after discarding the oldest record.
    Shed,
    /// Refused: the subscriber is gone.
    Closed,
}

/// Single-consumer queue. Pushing never blocks; a full queue sheds its
/// oldest record.
pub(crate) struct SubscriberQueue {
    state: Mutex<QueueState>,
    notify: Notify,
    capacity: usize,
    dropped: AtomicU64,
}

impl SubscriberQueue {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Mutex::new(QueueState {
                records: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            notify: Notify::new(),
            capacity,
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueues a record unless the queue is closed.
    pub(crate) fn push(&self, record: Arc<EnrichedRecord>) -> Push {
        let outcome = {
            let mut state = self.state.lock();
            if state.closed {
                return Push::Closed;
            }
            let outcome = if state.records.len() >= self.capacity {
                state.records.pop_front();
                Push::Shed
            } else {
                Push::Queued
            };
            state.records.push_back(record);
            outcome
        };
        if outcome == Push::Shed {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
        self.notify.notify_one();
        outcome
    }

    pub(crate) fn try_pop(&self) -> Option<Arc<EnrichedRecord>> {
        self.state.lock().records.pop_front()
    }

    /// Waits for the next record. `None` once the queue is closed.
    pub(crate) async fn pop(&self) -> Option<Arc<EnrichedRecord>> {
        loop {
            {
                let mut state = self.state.lock();
                if state.closed {
                    return None;
                }
                if let Some(record) = state.records.pop_front() {
                    return Some(record);
                }
            }
            // notify_one leaves a permit if we are not yet waiting.
            self.notify.notified().await;
        }
    }

    /// Closes the queue, discarding anything undelivered.
    pub(crate) fn close(&self) {
        {
            let mut state = self.state.lock();
            state.closed = true;
            state.records.clear();
        }
        self.notify.notify_one();
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub(crate) fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
