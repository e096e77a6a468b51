//! # Message Bridge
//!
//! The per-peer translator between consensus-engine vocabulary and
//! protocol-message vocabulary. One instance exists per synthetic peer;
//! it implements [`MsgReadWrite`] so a protocol run-loop can drive it like
//! any other peer channel.
//!
//! ## Translation
//!
//! - Read path: committed batches become NEW_BLOCK messages; handshake
//!   replies queued by the write path are delivered ahead of commits.
//! - Write path: inbound messages are dispatched by code — STATUS loops a
//!   synthetic reply back, TRANSACTIONS become engine submissions, every
//!   other code is drained and discarded.
//!
//! ## Blocking discipline
//!
//! `read_msg` suspends until a shutdown signal, a queued reply or a fresh
//! commit arrives, in that priority order; shutdown is polled first so a
//! continuously busy commit stream can never starve it. `write_msg` fully
//! drains the payload on every path before returning so the framing of the
//! next message survives; a handshake flood suspends the writer on the
//! bounded reply queue instead of dropping replies.

use crate::channel::MsgReadWrite;
use crate::ports::outbound::{BlockCodec, ConsensusEngine};
use async_trait::async_trait;
use bridge_types::{
    codes, BridgeError, CommittedBatch, PeerIdentity, ProtocolMessage, Transaction,
};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, watch, Mutex};
use tracing::{debug, trace, warn};

/// Per-peer consensus-to-wire translator.
pub struct MessageBridge {
    peer: Arc<PeerIdentity>,
    engine: Arc<dyn ConsensusEngine>,
    codec: Arc<dyn BlockCodec>,
    /// Commit subscription for this peer. Locked only by the read path.
    commits: Mutex<broadcast::Receiver<CommittedBatch>>,
    /// Synthetic replies queued by the write path for the read path.
    replies: Mutex<mpsc::Receiver<ProtocolMessage>>,
    reply_tx: mpsc::Sender<ProtocolMessage>,
    shutdown: watch::Receiver<bool>,
}

impl MessageBridge {
    /// Bind a translator to `peer`, subscribing it to the engine's commit
    /// stream.
    pub fn new(
        peer: Arc<PeerIdentity>,
        engine: Arc<dyn ConsensusEngine>,
        codec: Arc<dyn BlockCodec>,
        shutdown: watch::Receiver<bool>,
        reply_capacity: usize,
    ) -> Self {
        let commits = engine.subscribe_commits();
        let (reply_tx, reply_rx) = mpsc::channel(reply_capacity);
        Self {
            peer,
            engine,
            codec,
            commits: Mutex::new(commits),
            replies: Mutex::new(reply_rx),
            reply_tx,
            shutdown,
        }
    }

    /// The peer this translator is bound to.
    pub fn peer(&self) -> &Arc<PeerIdentity> {
        &self.peer
    }

    /// Convert one committed batch into a NEW_BLOCK message.
    ///
    /// Individual malformed transactions are logged and dropped; the batch
    /// is still emitted as long as one transaction survives. Fails with
    /// [`BridgeError::EmptyBatch`] when none do, in which case the caller
    /// must emit nothing for this batch.
    pub fn on_commit(&self, batch: CommittedBatch) -> Result<ProtocolMessage, BridgeError> {
        let mut txs: Vec<Transaction> = Vec::with_capacity(batch.transactions.len());
        for raw in &batch.transactions {
            match self.codec.decode_transaction(raw) {
                Ok(tx) => txs.push(tx),
                Err(err) => {
                    warn!(peer = %self.peer.id, error = %err, "dropping malformed transaction");
                }
            }
        }
        if txs.is_empty() {
            return Err(BridgeError::EmptyBatch);
        }

        let payload = self.codec.encode_block(&txs)?;
        Ok(ProtocolMessage::new(codes::NEW_BLOCK, payload))
    }

    /// Submit every transaction in `payload`, in payload order,
    /// short-circuiting on the first failure.
    async fn submit_transactions(&self, payload: &[u8]) -> Result<(), BridgeError> {
        let txs = self.codec.decode_transactions(payload)?;
        for tx in &txs {
            let raw = self.codec.encode_submission(tx)?;
            self.engine.submit_transaction(raw).await?;
        }
        trace!(peer = %self.peer.id, count = txs.len(), "transactions submitted");
        Ok(())
    }

    /// Queue the synthetic handshake reply onto this peer's read path.
    ///
    /// Every handshake gets exactly one reply: a full queue suspends the
    /// write until the read path has drained a slot, it never drops one.
    async fn enqueue_status_reply(&self) -> Result<(), BridgeError> {
        self.reply_tx
            .send(ProtocolMessage::empty(codes::STATUS))
            .await
            .map_err(|_| BridgeError::ChannelClosed("synthetic reply queue"))
    }
}

#[async_trait]
impl MsgReadWrite for MessageBridge {
    /// Wait for the next outbound message.
    ///
    /// Races three sources with shutdown polled first: the broadcast
    /// shutdown signal (returns [`BridgeError::StreamEnded`]), a queued
    /// synthetic reply, and the next consensus commit. Batches with no
    /// valid transactions are skipped without emitting a message; a lagged
    /// commit subscription logs the miss and continues.
    async fn read_msg(&self) -> Result<ProtocolMessage, BridgeError> {
        let mut shutdown = self.shutdown.clone();
        if *shutdown.borrow_and_update() {
            return Err(BridgeError::StreamEnded);
        }

        let mut replies = self.replies.lock().await;
        let mut commits = self.commits.lock().await;

        loop {
            tokio::select! {
                biased;

                changed = shutdown.changed() => {
                    // A dropped sender also means teardown.
                    let _ = changed;
                    return Err(BridgeError::StreamEnded);
                }

                reply = replies.recv() => match reply {
                    Some(msg) => return Ok(msg),
                    None => return Err(BridgeError::ChannelClosed("synthetic reply queue")),
                },

                commit = commits.recv() => match commit {
                    Ok(batch) => match self.on_commit(batch) {
                        Ok(msg) => return Ok(msg),
                        Err(BridgeError::EmptyBatch) => {
                            debug!(peer = %self.peer.id, "skipping batch with no valid transactions");
                            continue;
                        }
                        Err(err) => {
                            warn!(peer = %self.peer.id, error = %err, "commit translation failed");
                            continue;
                        }
                    },
                    Err(broadcast::error::RecvError::Closed) => {
                        return Err(BridgeError::StreamEnded);
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(peer = %self.peer.id, missed, "commit stream lagged");
                        continue;
                    }
                },
            }
        }
    }

    /// Dispatch one inbound message.
    ///
    /// Every path drains the payload before returning.
    async fn write_msg(&self, mut msg: ProtocolMessage) -> Result<(), BridgeError> {
        match msg.code {
            codes::STATUS => {
                let _ = msg.payload.read_to_end();
                trace!(peer = %self.peer.id, "status handshake received");
                self.enqueue_status_reply().await
            }
            codes::TRANSACTIONS => {
                let payload = msg.payload.read_to_end();
                self.submit_transactions(&payload).await
            }
            code if codes::is_recognized(code) => {
                // The bridge only drives the announcement direction; header
                // and body chatter is accepted and discarded.
                let _ = msg.payload.read_to_end();
                trace!(peer = %self.peer.id, code, "recognized message discarded");
                Ok(())
            }
            code => {
                let _ = msg.payload.read_to_end();
                debug!(peer = %self.peer.id, code, "unrecognized message code discarded");
                Ok(())
            }
        }
    }

    /// No resource of its own to release; shutdown is broadcast by the
    /// controller.
    async fn close(&self) -> Result<(), BridgeError> {
        Ok(())
    }
}
