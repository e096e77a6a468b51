//! # Bridge Core - Consensus-to-Wire-Protocol Bridge
//!
//! Makes an asynchronous, push-based consensus engine look, to a generic
//! p2p networking stack, like a set of connected peers speaking the host
//! request/response wire protocol.
//!
//! ## Architecture
//!
//! ```text
//! consensus engine ──commits──→ [MessageBridge] ──NEW_BLOCK──→ run-loop ──→ peer
//!                                     ↑  │
//!                    TRANSACTIONS ────┘  └──synthetic STATUS reply
//!                                        (looped back onto the read path)
//!
//!        [BridgeServer] = [PeerSetController] + [MessageBridge]×N + event feed
//! ```
//!
//! - [`bridge::MessageBridge`] translates per peer: committed batches out,
//!   inbound protocol messages in.
//! - [`channel::InstrumentedChannel`] reports every message that actually
//!   crossed a channel to the event feed.
//! - [`peers::PeerSetController`] owns the synthetic peer set and its
//!   run-loop tasks.
//! - [`server::BridgeServer`] is the facade implementing the generic
//!   server contract ([`ports::NetworkServer`]).
//!
//! ## Concurrency
//!
//! One task per peer run-loop; everything coordinates over channels. The
//! only shared mutable state is the server phase, the peer list and the
//! feed's subscriber count, each behind its own short-held lock, never
//! across an await point.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod adapters;
pub mod admission;
pub mod bridge;
pub mod channel;
pub mod peers;
pub mod ports;
pub mod protocol;
pub mod server;

// Re-export main types
pub use admission::BanRegistry;
pub use bridge::MessageBridge;
pub use channel::{InstrumentedChannel, MsgReadWrite};
pub use peers::PeerSetController;
pub use ports::{BlockCodec, ConsensusEngine, EngineConnector, NetworkServer};
pub use protocol::Protocol;
pub use server::BridgeServer;
