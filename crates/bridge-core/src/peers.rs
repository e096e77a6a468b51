//! # Peer Set Controller
//!
//! Owns the synthetic peer identities and their protocol run-loops. Each
//! peer moves `absent → active → absent`: created and announced on start,
//! dropped and joined on stop. Shutdown is broadcast over a single watch
//! channel so no peer is ever targeted individually.

use crate::admission::BanRegistry;
use crate::bridge::MessageBridge;
use crate::channel::InstrumentedChannel;
use crate::ports::outbound::{BlockCodec, ConsensusEngine};
use crate::protocol::Protocol;
use bridge_feed::EventFeed;
use bridge_types::{
    BridgeConfig, BridgeError, Capability, NodeId, PeerEvent, PeerIdentity, PeerInfo,
    PROTOCOL_NAME, PROTOCOL_VERSION,
};
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, trace, warn};

/// One spawned run-loop, kept for the join on stop.
struct RunLoopTask {
    peer_name: String,
    protocol: String,
    version: u32,
    handle: JoinHandle<Result<(), BridgeError>>,
}

/// Controller for the synthetic peer set.
pub struct PeerSetController {
    feed: Arc<EventFeed>,
    bans: Arc<BanRegistry>,
    /// Active peers, sorted by identifier.
    peers: Mutex<Vec<Arc<PeerIdentity>>>,
    /// Run-loop tasks awaiting the join on stop.
    tasks: Mutex<Vec<RunLoopTask>>,
    /// Shutdown broadcast; `None` while stopped.
    shutdown_tx: Mutex<Option<watch::Sender<bool>>>,
}

impl PeerSetController {
    #[must_use]
    pub fn new(feed: Arc<EventFeed>, bans: Arc<BanRegistry>) -> Self {
        Self {
            feed,
            bans,
            peers: Mutex::new(Vec::new()),
            tasks: Mutex::new(Vec::new()),
            shutdown_tx: Mutex::new(None),
        }
    }

    /// Bring up the synthetic peer set.
    ///
    /// For every non-banned peer index: create the identity, publish an
    /// Add event, and launch the run-loop of every registered protocol
    /// the peer's capabilities match. Must be called from within a tokio
    /// runtime.
    pub fn start(
        &self,
        engine: Arc<dyn ConsensusEngine>,
        codec: Arc<dyn BlockCodec>,
        protocols: &[Protocol],
        config: &BridgeConfig,
    ) {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        *self.shutdown_tx.lock() = Some(shutdown_tx);

        let caps = vec![Capability::new(PROTOCOL_NAME, PROTOCOL_VERSION)];
        let mut peers = Vec::with_capacity(config.peer_count);

        // Indices produce ids that already sort in peer order.
        for index in 0..config.peer_count {
            let id = NodeId::from_index(index as u64);
            if self.bans.is_banned(&id) {
                warn!(id = %id, "banned identity excluded from peer set");
                continue;
            }

            let peer = Arc::new(PeerIdentity::new(
                id,
                format!("fake-node-{index}"),
                caps.clone(),
            ));
            debug!(name = %peer.name, id = ?peer.id, "synthetic peer created");
            peers.push(peer.clone());
            self.feed.publish(PeerEvent::add(id));

            for proto in protocols {
                if peer.supports(&proto.name, proto.version) {
                    self.start_protocol(
                        peer.clone(),
                        proto,
                        engine.clone(),
                        codec.clone(),
                        shutdown_rx.clone(),
                        config.reply_capacity,
                    );
                }
            }
        }

        *self.peers.lock() = peers;
    }

    fn start_protocol(
        &self,
        peer: Arc<PeerIdentity>,
        proto: &Protocol,
        engine: Arc<dyn ConsensusEngine>,
        codec: Arc<dyn BlockCodec>,
        shutdown: watch::Receiver<bool>,
        reply_capacity: usize,
    ) {
        debug!(
            protocol = %proto.name,
            version = proto.version,
            peer = %peer.name,
            "starting protocol run-loop"
        );

        let bridge = MessageBridge::new(peer.clone(), engine, codec, shutdown, reply_capacity);
        let channel = Arc::new(InstrumentedChannel::new(
            bridge,
            self.feed.clone(),
            peer.id,
            proto.name.clone(),
        ));

        let run = proto.run.clone();
        let task = RunLoopTask {
            peer_name: peer.name.clone(),
            protocol: proto.name.clone(),
            version: proto.version,
            handle: tokio::spawn(async move { run(peer, channel).await }),
        };
        self.tasks.lock().push(task);
    }

    /// Tear the peer set down.
    ///
    /// Publishes a Drop event per active peer, broadcasts shutdown, then
    /// blocks until every launched run-loop has returned. A run-loop
    /// finishing with `StreamEnded` is a normal close; any other error is
    /// logged and aborts nothing else.
    pub async fn stop(&self) {
        let Some(shutdown_tx) = self.shutdown_tx.lock().take() else {
            return; // never started, or already stopped
        };

        let peers = std::mem::take(&mut *self.peers.lock());
        for peer in &peers {
            self.feed.publish(PeerEvent::drop(peer.id));
        }

        let _ = shutdown_tx.send(true);

        let tasks = std::mem::take(&mut *self.tasks.lock());
        for task in tasks {
            match task.handle.await {
                Ok(Ok(())) => trace!(
                    protocol = %task.protocol,
                    version = task.version,
                    peer = %task.peer_name,
                    "run-loop returned"
                ),
                Ok(Err(err)) if err.is_stream_end() => trace!(
                    protocol = %task.protocol,
                    version = task.version,
                    peer = %task.peer_name,
                    "run-loop closed"
                ),
                Ok(Err(err)) => warn!(
                    protocol = %task.protocol,
                    peer = %task.peer_name,
                    error = %err,
                    "run-loop failed"
                ),
                Err(err) => warn!(
                    protocol = %task.protocol,
                    peer = %task.peer_name,
                    error = %err,
                    "run-loop task aborted"
                ),
            }
        }
        // Dropping the sender closes the watch for any straggler.
    }

    /// Number of active peers.
    #[must_use]
    pub fn peer_count(&self) -> usize {
        self.peers.lock().len()
    }

    /// Directory view of every active peer, sorted by identifier.
    #[must_use]
    pub fn peers_info(&self) -> Vec<PeerInfo> {
        self.peers.lock().iter().map(|p| p.info()).collect()
    }
}
