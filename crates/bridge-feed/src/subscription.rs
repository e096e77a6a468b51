//! # Subscriptions
//!
//! The receiving side of the fan-out: filters, subscription handles and a
//! `Stream` wrapper.

use bridge_types::{PeerEvent, PeerEventKind};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use thiserror::Error;
use tokio::sync::broadcast;
use tokio_stream::Stream;
use tracing::debug;

/// Errors from subscription operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubscriptionError {
    /// The feed was dropped.
    #[error("event feed closed")]
    Closed,
}

/// Selects which peer events a subscription receives.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Kinds to deliver; empty means every kind.
    kinds: Vec<PeerEventKind>,
}

impl EventFilter {
    /// Match every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Match only the given kinds.
    #[must_use]
    pub fn kinds(kinds: Vec<PeerEventKind>) -> Self {
        Self { kinds }
    }

    /// Whether `event` passes this filter.
    #[must_use]
    pub fn matches(&self, event: &PeerEvent) -> bool {
        self.kinds.is_empty() || self.kinds.contains(&event.kind)
    }
}

/// A live subscription to the feed.
///
/// Dropping the handle unsubscribes and releases the buffer; this is safe
/// to do concurrently with publishing.
pub struct Subscription {
    /// The broadcast receiver.
    receiver: broadcast::Receiver<PeerEvent>,

    /// Filter for this subscription.
    filter: EventFilter,

    /// Shared live-subscription counter (decremented on drop).
    subscribers: Arc<AtomicUsize>,
}

impl Subscription {
    pub(crate) fn new(
        receiver: broadcast::Receiver<PeerEvent>,
        filter: EventFilter,
        subscribers: Arc<AtomicUsize>,
    ) -> Self {
        Self {
            receiver,
            filter,
            subscribers,
        }
    }

    /// Receive the next matching event.
    ///
    /// Returns `None` once the feed has been dropped. Lag (events shed for
    /// this subscriber alone) is logged and skipped.
    pub async fn recv(&mut self) -> Option<PeerEvent> {
        loop {
            let event = match self.receiver.recv().await {
                Ok(ev) => ev,
                Err(broadcast::error::RecvError::Closed) => return None,
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    debug!(lagged = count, "feed subscriber lagged, events shed");
                    continue;
                }
            };

            if self.filter.matches(&event) {
                return Some(event);
            }
        }
    }

    /// Receive the next matching event without waiting.
    ///
    /// `Ok(None)` means no event is currently queued.
    pub fn try_recv(&mut self) -> Result<Option<PeerEvent>, SubscriptionError> {
        loop {
            let event = match self.receiver.try_recv() {
                Ok(ev) => ev,
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(SubscriptionError::Closed)
                }
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
            };

            if self.filter.matches(&event) {
                return Ok(Some(event));
            }
        }
    }

    /// The filter this subscription was created with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        &self.filter
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.subscribers.fetch_sub(1, Ordering::Relaxed);
        debug!("feed subscription dropped");
    }
}

/// `Stream` adapter over a [`Subscription`].
pub struct EventStream {
    subscription: Subscription,
}

impl EventStream {
    #[must_use]
    pub fn new(subscription: Subscription) -> Self {
        Self { subscription }
    }

    /// The filter this stream was created with.
    #[must_use]
    pub fn filter(&self) -> &EventFilter {
        self.subscription.filter()
    }
}

impl Stream for EventStream {
    type Item = PeerEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.subscription.try_recv() {
            Ok(Some(event)) => Poll::Ready(Some(event)),
            Ok(None) => {
                cx.waker().wake_by_ref();
                Poll::Pending
            }
            Err(SubscriptionError::Closed) => Poll::Ready(None),
        }
    }
}
