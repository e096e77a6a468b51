//! Outbound ports (SPI): the consensus engine and the block codec.

use async_trait::async_trait;
use bridge_types::{BridgeError, CommittedBatch, Transaction};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Handle to a connected consensus engine.
///
/// The engine totally orders submitted transactions and announces each
/// finalized decision exactly once, in order.
#[async_trait]
pub trait ConsensusEngine: Send + Sync {
    /// Subscribe to committed batches.
    ///
    /// Each subscriber observes every decision at most once, in consensus
    /// order. Called once per synthetic peer.
    fn subscribe_commits(&self) -> broadcast::Receiver<CommittedBatch>;

    /// Submit one transaction, already in the engine's expected format.
    ///
    /// Fails with [`BridgeError::Rejected`] if the engine declines it; the
    /// bridge never retries.
    async fn submit_transaction(&self, raw: Vec<u8>) -> Result<(), BridgeError>;

    /// Tear down the connection. Best effort.
    async fn disconnect(&self);
}

/// Factory for consensus engine connections.
#[async_trait]
pub trait EngineConnector: Send + Sync {
    /// Connect to the engine at `addr`.
    ///
    /// Fails with [`BridgeError::Connection`] if it is unreachable.
    async fn connect(&self, addr: &str) -> Result<Arc<dyn ConsensusEngine>, BridgeError>;
}

/// External serialization service for transactions and block payloads.
///
/// The bridge never interprets transaction contents; everything it knows
/// about the wire format goes through this trait.
pub trait BlockCodec: Send + Sync {
    /// Decode (and thereby validate) one raw transaction from a committed
    /// batch. Fails with [`BridgeError::Encoding`] on malformed bytes.
    fn decode_transaction(&self, raw: &[u8]) -> Result<Transaction, BridgeError>;

    /// Encode an ordered transaction list into a new-block payload.
    fn encode_block(&self, txs: &[Transaction]) -> Result<Vec<u8>, BridgeError>;

    /// Decode the transaction list carried by an inbound
    /// transaction-submission payload.
    fn decode_transactions(&self, payload: &[u8]) -> Result<Vec<Transaction>, BridgeError>;

    /// Re-encode one transaction into the engine's submission format.
    fn encode_submission(&self, tx: &Transaction) -> Result<Vec<u8>, BridgeError>;
}
