//! # Bridge Server
//!
//! The [`NetworkServer`] facade the networking stack talks to. Explicit
//! composition: the server holds its collaborators by name and forwards
//! each call deliberately, so every forwarded method is visible and
//! independently testable.
//!
//! ## Lifecycle
//!
//! `Stopped → Starting → Running → Stopping → Stopped`, all transitions
//! under one short-held mutex. The server is reusable: `stop()` tears
//! everything down and `start()` rebuilds the engine connection and peer
//! set from scratch.

use crate::admission::BanRegistry;
use crate::peers::PeerSetController;
use crate::ports::inbound::NetworkServer;
use crate::ports::outbound::{BlockCodec, ConsensusEngine, EngineConnector};
use crate::protocol::Protocol;
use async_trait::async_trait;
use bridge_feed::{EventFeed, EventFilter, Subscription};
use bridge_types::{BridgeConfig, BridgeError, ConfigError, NodeId, NodeInfo, PeerInfo};
use parking_lot::{Mutex, RwLock};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, trace, warn};

/// Server lifecycle phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Stopped,
    Starting,
    Running,
    Stopping,
}

/// Consensus-bridge implementation of the generic p2p server contract.
pub struct BridgeServer {
    config: BridgeConfig,
    node_id: NodeId,
    connector: Arc<dyn EngineConnector>,
    codec: Arc<dyn BlockCodec>,
    feed: Arc<EventFeed>,
    bans: Arc<BanRegistry>,
    controller: PeerSetController,
    protocols: RwLock<Vec<Protocol>>,
    /// Live engine handle; `Some` between start and stop.
    engine: Mutex<Option<Arc<dyn ConsensusEngine>>>,
    phase: Mutex<Phase>,
}

impl BridgeServer {
    /// Build a server. Fails if the configuration is invalid.
    pub fn new(
        config: BridgeConfig,
        connector: Arc<dyn EngineConnector>,
        codec: Arc<dyn BlockCodec>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let feed = Arc::new(EventFeed::with_capacity(config.feed_capacity));
        let bans = Arc::new(BanRegistry::new());
        let controller = PeerSetController::new(feed.clone(), bans.clone());
        let node_id = NodeId::from_name(&config.node_name);

        Ok(Self {
            config,
            node_id,
            connector,
            codec,
            feed,
            bans,
            controller,
            protocols: RwLock::new(Vec::new()),
            engine: Mutex::new(None),
            phase: Mutex::new(Phase::Stopped),
        })
    }

    /// The admission-control registry, for the host to pre-populate.
    #[must_use]
    pub fn ban_registry(&self) -> Arc<BanRegistry> {
        self.bans.clone()
    }

    /// The event feed, for collaborators that publish their own events.
    #[must_use]
    pub fn event_feed(&self) -> Arc<EventFeed> {
        self.feed.clone()
    }
}

#[async_trait]
impl NetworkServer for BridgeServer {
    async fn start(&self) -> Result<(), BridgeError> {
        {
            let mut phase = self.phase.lock();
            if *phase != Phase::Stopped {
                return Err(BridgeError::AlreadyRunning);
            }
            *phase = Phase::Starting;
        }

        // The engine connection comes first: if it fails, the whole start
        // fails and no partial peer set is created.
        let engine = match self.connector.connect(&self.config.engine_addr).await {
            Ok(engine) => engine,
            Err(err) => {
                *self.phase.lock() = Phase::Stopped;
                warn!(addr = %self.config.engine_addr, error = %err, "engine connection failed");
                return Err(err);
            }
        };
        *self.engine.lock() = Some(engine.clone());

        let protocols = self.protocols.read().clone();
        self.controller
            .start(engine, self.codec.clone(), &protocols, &self.config);

        *self.phase.lock() = Phase::Running;
        info!(
            peers = self.controller.peer_count(),
            protocols = protocols.len(),
            "bridge server started"
        );
        Ok(())
    }

    async fn stop(&self) {
        loop {
            {
                let mut phase = self.phase.lock();
                match *phase {
                    // Idempotent: a second stop observes the teardown already
                    // done (or in progress) and returns.
                    Phase::Stopped | Phase::Stopping => return,
                    // A start is mid-flight. Wait until it resolves into
                    // Running or Stopped, then tear down whatever it built.
                    Phase::Starting => {}
                    Phase::Running => {
                        *phase = Phase::Stopping;
                        break;
                    }
                }
            }
            trace!("stop waiting for in-progress start");
            tokio::task::yield_now().await;
        }

        self.controller.stop().await;

        // Take the handle out before awaiting so no lock spans the await.
        let engine = self.engine.lock().take();
        if let Some(engine) = engine {
            engine.disconnect().await;
        }

        *self.phase.lock() = Phase::Stopped;
        info!("bridge server stopped");
    }

    fn node_info(&self) -> NodeInfo {
        let mut protocols = BTreeMap::new();
        for proto in self.protocols.read().iter() {
            // One entry per distinct protocol name.
            protocols
                .entry(proto.name.clone())
                .or_insert_with(|| proto.version.to_string());
        }
        NodeInfo {
            id: self.node_id.to_hex(),
            name: self.config.node_name.clone(),
            listen_addr: self.config.listen_addr.clone(),
            protocols,
        }
    }

    fn subscribe_events(&self, filter: EventFilter) -> Subscription {
        self.feed.subscribe(filter)
    }

    fn add_peer(&self, node: NodeId) {
        // Contract no-op: membership belongs to the consensus engine.
        debug!(node = %node, "add_peer ignored");
    }

    fn remove_peer(&self, node: NodeId) {
        debug!(node = %node, "remove_peer ignored");
    }

    fn add_trusted_peer(&self, node: NodeId) {
        debug!(node = %node, "add_trusted_peer ignored");
    }

    fn remove_trusted_peer(&self, node: NodeId) {
        debug!(node = %node, "remove_trusted_peer ignored");
    }

    fn peer_count(&self) -> usize {
        self.controller.peer_count()
    }

    fn peers_info(&self) -> Vec<PeerInfo> {
        self.controller.peers_info()
    }

    fn add_protocols(&self, protocols: Vec<Protocol>) {
        self.protocols.write().extend(protocols);
    }

    fn config(&self) -> BridgeConfig {
        self.config.clone()
    }
}
