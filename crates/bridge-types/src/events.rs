//! # Batches and Peer Events
//!
//! The two transient payload types that flow through the bridge: committed
//! batches arriving from the consensus engine and peer events broadcast to
//! observers.

use crate::identity::NodeId;
use serde::{Deserialize, Serialize};

/// One totally-ordered delivery of raw transactions from the consensus
/// engine, representing a finalized decision.
///
/// The bridge never reorders the contained transactions. `Clone` exists
/// only for fan-out to per-peer translators; each translator consumes its
/// copy within one translation step.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommittedBatch {
    /// Raw transaction byte-strings, in consensus order.
    pub transactions: Vec<Vec<u8>>,
}

impl CommittedBatch {
    #[must_use]
    pub fn new(transactions: Vec<Vec<u8>>) -> Self {
        Self { transactions }
    }
}

/// Kind of a [`PeerEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeerEventKind {
    /// A peer joined the set.
    Add,
    /// A peer left the set.
    Drop,
    /// A message was written to a peer's channel.
    MsgSend,
    /// A message was read from a peer's channel.
    MsgRecv,
}

/// A fire-and-forget observability event about one peer.
///
/// Immutable after creation; broadcast to zero or more subscribers and
/// then discarded. Message events carry code and size, never the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerEvent {
    pub kind: PeerEventKind,
    pub peer: NodeId,
    pub protocol: Option<String>,
    pub msg_code: Option<u64>,
    pub msg_size: Option<u32>,
    pub error: Option<String>,
}

impl PeerEvent {
    /// A peer joined the set.
    #[must_use]
    pub fn add(peer: NodeId) -> Self {
        Self::bare(PeerEventKind::Add, peer)
    }

    /// A peer left the set.
    #[must_use]
    pub fn drop(peer: NodeId) -> Self {
        Self::bare(PeerEventKind::Drop, peer)
    }

    /// A message crossed the peer's channel.
    #[must_use]
    pub fn message(
        kind: PeerEventKind,
        peer: NodeId,
        protocol: impl Into<String>,
        msg_code: u64,
        msg_size: u32,
    ) -> Self {
        Self {
            kind,
            peer,
            protocol: Some(protocol.into()),
            msg_code: Some(msg_code),
            msg_size: Some(msg_size),
            error: None,
        }
    }

    fn bare(kind: PeerEventKind, peer: NodeId) -> Self {
        Self {
            kind,
            peer,
            protocol: None,
            msg_code: None,
            msg_size: None,
            error: None,
        }
    }
}
