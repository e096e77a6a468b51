//! # Event Feed
//!
//! The publishing side of the fan-out.

use crate::subscription::{EventFilter, EventStream, Subscription};
use crate::DEFAULT_FEED_CAPACITY;
use bridge_types::PeerEvent;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

/// Fan-out feed of peer events.
///
/// Uses `tokio::sync::broadcast` for multi-producer, multi-consumer
/// semantics: every subscriber gets its own bounded buffer, so no event is
/// "consumed" by one subscriber and hidden from another, and a slow
/// subscriber can never stall the publisher.
///
/// Cheap to clone and share via `Arc`.
pub struct EventFeed {
    /// Broadcast sender for events.
    sender: broadcast::Sender<PeerEvent>,

    /// Active subscription count.
    subscribers: Arc<AtomicUsize>,

    /// Total events published.
    events_published: AtomicU64,

    /// Per-subscriber buffer size.
    capacity: usize,
}

impl EventFeed {
    /// Create a feed with the default per-subscriber capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_FEED_CAPACITY)
    }

    /// Create a feed with the given per-subscriber capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscribers: Arc::new(AtomicUsize::new(0)),
            events_published: AtomicU64::new(0),
            capacity,
        }
    }

    /// Publish an event to every live subscriber.
    ///
    /// Never blocks the caller. Returns the number of subscribers the event
    /// was delivered to; `0` when nobody is listening, which is not an
    /// error.
    pub fn publish(&self, event: PeerEvent) -> usize {
        self.events_published.fetch_add(1, Ordering::Relaxed);

        match self.sender.send(event) {
            Ok(receiver_count) => {
                trace!(receivers = receiver_count, "peer event published");
                receiver_count
            }
            Err(_) => {
                // No receivers; the event is discarded.
                trace!("peer event dropped (no subscribers)");
                0
            }
        }
    }

    /// Subscribe to events matching `filter`.
    #[must_use]
    pub fn subscribe(&self, filter: EventFilter) -> Subscription {
        let receiver = self.sender.subscribe();
        self.subscribers.fetch_add(1, Ordering::Relaxed);
        debug!(filter = ?filter, "new feed subscription");
        Subscription::new(receiver, filter, self.subscribers.clone())
    }

    /// Subscribe and wrap the subscription as a `Stream`.
    #[must_use]
    pub fn event_stream(&self, filter: EventFilter) -> EventStream {
        EventStream::new(self.subscribe(filter))
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::Relaxed)
    }

    /// Total events published over the feed's lifetime.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Per-subscriber buffer size.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventFeed {
    fn default() -> Self {
        Self::new()
    }
}
