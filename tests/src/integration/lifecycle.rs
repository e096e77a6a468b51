//! Server lifecycle: start/stop semantics, idempotence, restart and
//! directory queries, end to end against the in-memory engine.

#![cfg(test)]

use super::{forwarding_protocol, test_server};
use bridge_core::NetworkServer;
use bridge_feed::EventFilter;
use bridge_types::{BridgeConfig, BridgeError, NodeId, PeerEventKind};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

#[tokio::test]
async fn start_brings_up_configured_peer_set() {
    let config = BridgeConfig {
        peer_count: 3,
        ..BridgeConfig::default()
    };
    let (server, _engine) = test_server(config);
    let (tx, _rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);

    let mut events = server.subscribe_events(EventFilter::kinds(vec![PeerEventKind::Add]));
    server.start().await.unwrap();

    assert_eq!(server.peer_count(), 3);
    for _ in 0..3 {
        let ev = timeout(Duration::from_millis(200), events.recv())
            .await
            .expect("timeout")
            .expect("add event");
        assert_eq!(ev.kind, PeerEventKind::Add);
    }

    let infos = server.peers_info();
    assert_eq!(infos.len(), 3);
    assert_eq!(infos[0].name, "fake-node-0");
    assert_eq!(infos[0].caps, vec!["eth/63".to_string()]);

    server.stop().await;
}

#[tokio::test]
async fn start_while_running_fails_and_changes_nothing() {
    let (server, _engine) = test_server(BridgeConfig::default());
    server.start().await.unwrap();

    let before = server.peers_info();
    assert_eq!(server.start().await.unwrap_err(), BridgeError::AlreadyRunning);
    assert_eq!(server.peers_info(), before);

    server.stop().await;
}

#[tokio::test]
async fn engine_connection_failure_aborts_start_cleanly() {
    let config = BridgeConfig {
        engine_addr: "unreachable:7777".to_string(),
        ..BridgeConfig::default()
    };
    let (server, engine) = test_server(config);

    let err = server.start().await.unwrap_err();
    assert!(matches!(err, BridgeError::Connection(_)));

    // No partial peer set, no run-loop subscribed to the engine.
    assert_eq!(server.peer_count(), 0);
    assert_eq!(engine.deliver(bridge_types::CommittedBatch::default()), 0);
}

#[tokio::test]
async fn stop_joins_run_loops_and_is_idempotent() {
    let (server, engine) = test_server(BridgeConfig::default());
    let (tx, _rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);
    server.start().await.unwrap();

    let mut drops = server.subscribe_events(EventFilter::kinds(vec![PeerEventKind::Drop]));

    timeout(Duration::from_millis(500), server.stop())
        .await
        .expect("stop must block only until run-loops return");

    let ev = drops.try_recv().unwrap().expect("drop event");
    assert_eq!(ev.kind, PeerEventKind::Drop);
    assert_eq!(server.peer_count(), 0);
    assert!(!engine.is_connected());

    // Same end state on a second stop, no panic, no double teardown.
    timeout(Duration::from_millis(100), server.stop())
        .await
        .expect("second stop returns immediately");
    assert_eq!(server.peer_count(), 0);
}

#[tokio::test]
async fn concurrent_stops_race_safely() {
    let (server, _engine) = test_server(BridgeConfig::default());
    let (tx, _rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);
    server.start().await.unwrap();

    let server = std::sync::Arc::new(server);
    let a = {
        let server = server.clone();
        tokio::spawn(async move { server.stop().await })
    };
    let b = {
        let server = server.clone();
        tokio::spawn(async move { server.stop().await })
    };

    timeout(Duration::from_secs(1), async {
        a.await.unwrap();
        b.await.unwrap();
    })
    .await
    .expect("both stops return");
    assert_eq!(server.peer_count(), 0);
}

#[tokio::test]
async fn server_restarts_with_a_fresh_peer_set() {
    let (server, _engine) = test_server(BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);

    server.start().await.unwrap();
    server.stop().await;
    assert_eq!(server.peer_count(), 0);

    server.start().await.unwrap();
    assert_eq!(server.peer_count(), 1);

    // The restarted run-loop is live: a handshake flows through it.
    // (Nothing was delivered yet; just verify shutdown drains cleanly.)
    server.stop().await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn banned_identity_never_joins_the_peer_set() {
    let config = BridgeConfig {
        peer_count: 2,
        ..BridgeConfig::default()
    };
    let (server, _engine) = test_server(config);
    server.ban_registry().ban(NodeId::from_index(0));

    server.start().await.unwrap();
    assert_eq!(server.peer_count(), 1);
    assert_eq!(server.peers_info()[0].name, "fake-node-1");
    assert_eq!(
        server.ban_registry().list_banned(),
        vec![NodeId::from_index(0)]
    );

    server.stop().await;
}

#[tokio::test]
async fn node_info_reflects_config_and_protocols() {
    let config = BridgeConfig {
        node_name: "observer".to_string(),
        listen_addr: "10.0.0.1:30303".to_string(),
        ..BridgeConfig::default()
    };
    let (server, _engine) = test_server(config);
    let (tx, _rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);

    let info = server.node_info();
    assert_eq!(info.name, "observer");
    assert_eq!(info.listen_addr, "10.0.0.1:30303");
    assert_eq!(info.protocols.get("eth").map(String::as_str), Some("63"));
    assert_eq!(info.id.len(), 64);
}

#[tokio::test]
async fn dynamic_peer_management_is_inert() {
    let (server, _engine) = test_server(BridgeConfig::default());
    server.start().await.unwrap();

    let node = NodeId::from_index(42);
    server.add_peer(node);
    server.add_trusted_peer(node);
    server.remove_trusted_peer(node);
    server.remove_peer(NodeId::from_index(0));

    assert_eq!(server.peer_count(), 1);
    server.stop().await;
}
