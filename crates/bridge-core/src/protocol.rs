//! # Protocol Registration
//!
//! A [`Protocol`] is what the host networking stack registers with the
//! server: a name/version pair and the run-loop to drive against each peer
//! whose capabilities match. The run-loop is written once against the
//! [`MsgReadWrite`] capability; the synthetic engine-backed peer is just
//! one implementation of that capability.

use crate::channel::MsgReadWrite;
use bridge_types::{BridgeError, PeerIdentity};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a protocol run-loop.
pub type RunLoopFuture = Pin<Box<dyn Future<Output = Result<(), BridgeError>> + Send>>;

/// The run-loop entry point, invoked once per matched peer.
///
/// Returning `Ok(())` or [`BridgeError::StreamEnded`] is a normal close;
/// any other error is logged by the controller and affects no other peer.
pub type RunLoopFn =
    Arc<dyn Fn(Arc<PeerIdentity>, Arc<dyn MsgReadWrite>) -> RunLoopFuture + Send + Sync>;

/// A registered sub-protocol.
#[derive(Clone)]
pub struct Protocol {
    /// Protocol name (e.g. "eth").
    pub name: String,
    /// Protocol version.
    pub version: u32,
    /// Run-loop launched for each matching peer.
    pub run: RunLoopFn,
}

impl Protocol {
    /// Register a run-loop under `name`/`version`.
    pub fn new<F, Fut>(name: impl Into<String>, version: u32, run: F) -> Self
    where
        F: Fn(Arc<PeerIdentity>, Arc<dyn MsgReadWrite>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), BridgeError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            version,
            run: Arc::new(move |peer, channel| Box::pin(run(peer, channel))),
        }
    }
}

impl fmt::Debug for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Protocol")
            .field("name", &self.name)
            .field("version", &self.version)
            .finish_non_exhaustive()
    }
}
