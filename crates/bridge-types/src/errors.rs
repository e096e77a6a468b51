//! # Error Taxonomy
//!
//! Every failure the bridge can surface, with its propagation policy:
//! structural errors (`Connection`, `AlreadyRunning`) abort the operation
//! and reach the caller; local errors (`Encoding`, `Rejected`) are absorbed
//! or forwarded at the translation boundary; `StreamEnded` is the normal
//! terminal signal for read loops, not a failure.

use thiserror::Error;

/// Errors produced by the consensus bridge.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The consensus engine could not be reached. Fatal to `start()`.
    #[error("cannot connect to consensus engine: {0}")]
    Connection(String),

    /// `start()` was invoked while the server is already running.
    #[error("server already running")]
    AlreadyRunning,

    /// Transaction bytes failed to decode. The transaction is dropped and
    /// processing continues.
    #[error("malformed transaction: {0}")]
    Encoding(String),

    /// No valid transactions survived filtering; the batch is skipped
    /// without emitting a message.
    #[error("no valid transactions in committed batch")]
    EmptyBatch,

    /// The consensus engine declined a submitted transaction. Propagated to
    /// the inbound caller; never retried by the bridge.
    #[error("transaction rejected by consensus engine: {0}")]
    Rejected(String),

    /// Normal end-of-stream on shutdown. Terminal signal for read loops.
    #[error("stream ended")]
    StreamEnded,

    /// An internal channel was torn down mid-operation.
    #[error("channel closed: {0}")]
    ChannelClosed(&'static str),
}

impl BridgeError {
    /// Whether this value signals normal shutdown rather than a failure.
    #[must_use]
    pub fn is_stream_end(&self) -> bool {
        matches!(self, Self::StreamEnded)
    }
}
