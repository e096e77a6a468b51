//! # Bridge Feed - Peer Event Fan-Out
//!
//! Publish/subscribe fan-out of [`bridge_types::PeerEvent`] to any number
//! of independently-paced subscribers.
//!
//! ## Delivery Contract
//!
//! - Publishing never blocks and never fails: a publish with zero
//!   subscribers is a successful no-op.
//! - Every subscriber observes every matching event at most once,
//!   independent of other subscribers' consumption speed.
//! - **Backpressure policy**: each subscriber has a bounded buffer; a
//!   subscriber that falls more than the buffer size behind loses its own
//!   oldest events. The publisher and other subscribers are unaffected.
//! - Dropping a [`Subscription`] unsubscribes; this is safe concurrently
//!   with publishing and leaks nothing.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod feed;
pub mod subscription;

// Re-export main types
pub use feed::EventFeed;
pub use subscription::{EventFilter, EventStream, Subscription, SubscriptionError};

/// Maximum events buffered per subscriber before old events are shed.
pub const DEFAULT_FEED_CAPACITY: usize = 1000;
