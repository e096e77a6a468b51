//! Port traits: the seams between the bridge and its collaborators.
//!
//! Inbound is the server contract the networking stack consumes; outbound
//! is everything the bridge itself calls out to (consensus engine, codec).

pub mod inbound;
pub mod outbound;

pub use inbound::NetworkServer;
pub use outbound::{BlockCodec, ConsensusEngine, EngineConnector};
