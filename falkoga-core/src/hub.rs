//! Broadcast hub: fan-out of serialized event frames to live subscribers.
//!
//! The hub optimizes for "many viewers see the live firehose", not "no
//! viewer ever misses an event": there is no queuing or backpressure
//! toward the publisher. A subscriber whose buffer is full is skipped for
//! that frame; a subscriber whose transport closed is removed. Neither
//! outcome is surfaced to the publisher or affects other subscribers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, trace};

use crate::events::{AttackEvent, Frame};

pub type SubscriberId = u64;

/// Per-publish delivery tally, for metrics at the boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishOutcome {
    /// Frames handed to a subscriber buffer.
    pub delivered: usize,
    /// Subscribers skipped because their buffer was full.
    pub skipped: usize,
    /// Subscribers removed because their transport had closed.
    pub removed: usize,
}

/// Concurrency-safe registry of live subscribers.
///
/// Additions and removals are rare relative to delivery, so the registry
/// sits behind a read/write lock: fan-out takes the read side and does not
/// serialize against other readers.
pub struct BroadcastHub {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::Sender<Arc<str>>>>,
    next_id: AtomicU64,
    buffer: usize,
}

impl BroadcastHub {
    /// `buffer` is the per-subscriber frame buffer; once full, further
    /// frames are dropped for that subscriber until it drains.
    pub fn new(buffer: usize) -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            buffer,
        }
    }

    /// Registers a live subscriber and returns its frame stream.
    ///
    /// A subscriber that connects late receives only frames published
    /// after registration.
    pub fn subscribe(&self) -> (SubscriberId, mpsc::Receiver<Arc<str>>) {
        let (tx, rx) = mpsc::channel(self.buffer);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers.write().insert(id, tx);
        debug!(id, "subscriber added");
        (id, rx)
    }

    /// Removes a subscriber explicitly. Returns whether it was present.
    /// Dropping the receiver has the same effect on the next publish.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let removed = self.subscribers.write().remove(&id).is_some();
        if removed {
            debug!(id, "subscriber removed");
        }
        removed
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().len()
    }

    /// Serializes the events once and delivers the shared payload to every
    /// currently-connected subscriber. Never blocks and never fails.
    pub fn publish(&self, events: &[AttackEvent]) -> PublishOutcome {
        let mut outcome = PublishOutcome::default();
        if events.is_empty() {
            return outcome;
        }

        let payload: Arc<str> = Frame::for_events(events).encode().into();
        let mut dead = Vec::new();
        {
            let subscribers = self.subscribers.read();
            for (&id, tx) in subscribers.iter() {
                match tx.try_send(payload.clone()) {
                    Ok(()) => outcome.delivered += 1,
                    Err(TrySendError::Full(_)) => {
                        trace!(id, "subscriber buffer full, frame skipped");
                        outcome.skipped += 1;
                    }
                    Err(TrySendError::Closed(_)) => dead.push(id),
                }
            }
        }

        if !dead.is_empty() {
            let mut subscribers = self.subscribers.write();
            for id in &dead {
                subscribers.remove(id);
                debug!(id, "closed subscriber removed");
            }
            outcome.removed = dead.len();
        }

        outcome
    }

    /// Drops every subscriber handle, closing their frame streams.
    /// Part of graceful shutdown.
    pub fn close_all(&self) {
        let mut subscribers = self.subscribers.write();
        let count = subscribers.len();
        subscribers.clear();
        if count > 0 {
            debug!(count, "closed all subscribers");
        }
    }
}
