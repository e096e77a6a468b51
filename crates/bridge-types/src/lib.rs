//! # Bridge Types Crate
//!
//! Single source of truth for every type that crosses a crate boundary in
//! the consensus bridge: peer identities, protocol messages, committed
//! batches, peer events, configuration and the error taxonomy.
//!
//! ## Design Principles
//!
//! - **Opaque identities**: a [`NodeId`] is a fixed-length byte string; no
//!   component may assume anything about its contents.
//! - **One-shot payloads**: a [`Payload`] can be consumed exactly once.
//!   Reads past exhaustion yield zero bytes, never an error that could be
//!   mistaken for fresh data.
//! - **Externally fixed wire codes**: the constants in [`codes`] belong to
//!   the host protocol and must never be renumbered here.

// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod config;
pub mod errors;
pub mod events;
pub mod identity;
pub mod message;

// Re-export main types
pub use config::{BridgeConfig, ConfigError};
pub use errors::BridgeError;
pub use events::{CommittedBatch, PeerEvent, PeerEventKind};
pub use identity::{Capability, NodeId, NodeInfo, PeerIdentity, PeerInfo};
pub use message::{codes, Payload, ProtocolMessage, Transaction};

/// Name of the host wire protocol the synthetic peers speak.
pub const PROTOCOL_NAME: &str = "eth";

/// Version of the host wire protocol the synthetic peers speak.
pub const PROTOCOL_VERSION: u32 = 63;
