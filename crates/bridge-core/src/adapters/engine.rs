//! # In-Memory Consensus Engine
//!
//! [`ConsensusEngine`] implementation backed by channels, used by the test
//! suite and local runs: commits are delivered by hand, submissions are
//! recorded, and rejection is scriptable.

use crate::ports::outbound::{ConsensusEngine, EngineConnector};
use async_trait::async_trait;
use bridge_types::{BridgeError, CommittedBatch};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

/// Scriptable in-memory engine.
pub struct InMemoryEngine {
    commits: broadcast::Sender<CommittedBatch>,
    submissions: Mutex<Vec<Vec<u8>>>,
    reject_reason: Mutex<Option<String>>,
    connected: AtomicBool,
}

impl InMemoryEngine {
    /// Engine with room for `capacity` undelivered commits per subscriber.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (commits, _) = broadcast::channel(capacity);
        Self {
            commits,
            submissions: Mutex::new(Vec::new()),
            reject_reason: Mutex::new(None),
            connected: AtomicBool::new(true),
        }
    }

    /// Deliver one committed batch to every subscribed peer.
    ///
    /// Returns the number of subscribers that received it.
    pub fn deliver(&self, batch: CommittedBatch) -> usize {
        self.commits.send(batch).unwrap_or(0)
    }

    /// Every submission accepted so far, in order.
    #[must_use]
    pub fn submissions(&self) -> Vec<Vec<u8>> {
        self.submissions.lock().clone()
    }

    /// Make every subsequent submission fail with the given reason.
    pub fn reject_with(&self, reason: impl Into<String>) {
        *self.reject_reason.lock() = Some(reason.into());
    }

    /// Whether `disconnect` has not been called yet.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConsensusEngine for InMemoryEngine {
    fn subscribe_commits(&self) -> broadcast::Receiver<CommittedBatch> {
        self.commits.subscribe()
    }

    async fn submit_transaction(&self, raw: Vec<u8>) -> Result<(), BridgeError> {
        if let Some(reason) = self.reject_reason.lock().clone() {
            return Err(BridgeError::Rejected(reason));
        }
        self.submissions.lock().push(raw);
        Ok(())
    }

    async fn disconnect(&self) {
        self.connected.store(false, Ordering::SeqCst);
        debug!("in-memory engine disconnected");
    }
}

/// Connector handing out a pre-built [`InMemoryEngine`].
///
/// Connection fails for an empty address or one prefixed `unreachable`,
/// which is how tests exercise the start-failure path.
pub struct InMemoryConnector {
    engine: Arc<InMemoryEngine>,
}

impl InMemoryConnector {
    #[must_use]
    pub fn new(engine: Arc<InMemoryEngine>) -> Self {
        Self { engine }
    }

    /// The engine this connector hands out.
    #[must_use]
    pub fn engine(&self) -> Arc<InMemoryEngine> {
        self.engine.clone()
    }
}

#[async_trait]
impl EngineConnector for InMemoryConnector {
    async fn connect(&self, addr: &str) -> Result<Arc<dyn ConsensusEngine>, BridgeError> {
        if addr.is_empty() || addr.starts_with("unreachable") {
            return Err(BridgeError::Connection(format!(
                "no consensus engine at {addr:?}"
            )));
        }
        debug!(addr, "connected to in-memory engine");
        Ok(self.engine.clone())
    }
}
