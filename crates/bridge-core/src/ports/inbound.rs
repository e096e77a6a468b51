//! Inbound port (API): the generic server contract the networking stack
//! consumes.
//!
//! Method-for-method this mirrors the host stack's server interface; the
//! bridge must not alter caller-visible semantics (notably: `stop` blocks
//! until every peer connection has closed).

use crate::protocol::Protocol;
use async_trait::async_trait;
use bridge_feed::{EventFilter, Subscription};
use bridge_types::{BridgeConfig, BridgeError, NodeId, NodeInfo, PeerInfo};

/// Generic p2p server contract.
#[async_trait]
pub trait NetworkServer: Send + Sync {
    /// Bring the server up.
    ///
    /// Fails with [`BridgeError::AlreadyRunning`] when already running and
    /// [`BridgeError::Connection`] when the consensus engine is
    /// unreachable, in which case no peers are created.
    async fn start(&self) -> Result<(), BridgeError>;

    /// Tear the server down, blocking until every peer run-loop has
    /// returned. A stop issued while a start is still in flight waits for
    /// that start to resolve and then tears down whatever it built.
    /// Idempotent; never fails from the caller's perspective.
    async fn stop(&self);

    /// Metadata about the host node.
    fn node_info(&self) -> NodeInfo;

    /// Subscribe to peer lifecycle and message events.
    fn subscribe_events(&self, filter: EventFilter) -> Subscription;

    /// Contract no-op: the peer set is driven by consensus membership.
    fn add_peer(&self, node: NodeId);

    /// Contract no-op: the peer set is driven by consensus membership.
    fn remove_peer(&self, node: NodeId);

    /// Contract no-op: the peer set is driven by consensus membership.
    fn add_trusted_peer(&self, node: NodeId);

    /// Contract no-op: the peer set is driven by consensus membership.
    fn remove_trusted_peer(&self, node: NodeId);

    /// Number of connected peers.
    fn peer_count(&self) -> usize;

    /// Metadata for each connected peer.
    fn peers_info(&self) -> Vec<PeerInfo>;

    /// Register additional sub-protocols. Effective before `start`.
    fn add_protocols(&self, protocols: Vec<Protocol>);

    /// The server's configuration.
    fn config(&self) -> BridgeConfig;
}
