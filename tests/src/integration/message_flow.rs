//! End-to-end message flow: consensus commits surfacing as NEW_BLOCK
//! messages in a run-loop, inbound traffic reaching the engine, and the
//! event feed reflecting exactly what crossed each channel.

#![cfg(test)]

use super::{forwarding_protocol, raw_tx, test_server, writing_protocol};
use bridge_core::adapters::codec::BincodeCodec;
use bridge_core::NetworkServer;
use bridge_feed::EventFilter;
use bridge_types::{
    codes, BridgeConfig, CommittedBatch, PeerEventKind, Transaction,
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;

#[tokio::test]
async fn commits_reach_the_run_loop_as_new_block_messages() {
    let (server, engine) = test_server(BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);
    server.start().await.unwrap();

    engine.deliver(CommittedBatch::new(vec![raw_tx(1), raw_tx(2)]));
    engine.deliver(CommittedBatch::new(vec![raw_tx(3)]));

    let mut first = timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timeout")
        .expect("message");
    assert_eq!(first.code, codes::NEW_BLOCK);
    let txs = BincodeCodec
        .decode_block(&first.payload.read_to_end())
        .unwrap();
    assert_eq!(txs.iter().map(|t| t.nonce).collect::<Vec<_>>(), vec![1, 2]);

    let mut second = timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timeout")
        .expect("message");
    let txs = BincodeCodec
        .decode_block(&second.payload.read_to_end())
        .unwrap();
    assert_eq!(txs[0].nonce, 3);

    server.stop().await;
}

#[tokio::test]
async fn malformed_middle_transaction_is_dropped_not_fatal() {
    let (server, engine) = test_server(BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);
    server.start().await.unwrap();

    // 3 raw transactions, the 2nd malformed: one message with 1 and 3.
    engine.deliver(CommittedBatch::new(vec![
        raw_tx(1),
        b"malformed".to_vec(),
        raw_tx(3),
    ]));

    let mut msg = timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timeout")
        .expect("message");
    let txs = BincodeCodec
        .decode_block(&msg.payload.read_to_end())
        .unwrap();
    assert_eq!(txs.iter().map(|t| t.nonce).collect::<Vec<_>>(), vec![1, 3]);

    server.stop().await;
}

#[tokio::test]
async fn fully_malformed_batch_yields_no_message() {
    let (server, engine) = test_server(BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);
    server.start().await.unwrap();

    engine.deliver(CommittedBatch::new(vec![b"junk".to_vec()]));
    // A following valid batch proves the stream did not desynchronize.
    engine.deliver(CommittedBatch::new(vec![raw_tx(9)]));

    let mut msg = timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timeout")
        .expect("message");
    let txs = BincodeCodec
        .decode_block(&msg.payload.read_to_end())
        .unwrap();
    assert_eq!(txs[0].nonce, 9);
    assert!(rx.try_recv().is_err());

    server.stop().await;
}

#[tokio::test]
async fn handshake_gets_exactly_one_synthetic_reply() {
    let (server, engine) = test_server(BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![writing_protocol(
        vec![(codes::STATUS, Vec::new())],
        tx,
    )]);
    server.start().await.unwrap();

    let reply = timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timeout")
        .expect("status reply");
    assert_eq!(reply.code, codes::STATUS);
    assert_eq!(reply.size, 0);

    // No engine interaction and no second reply.
    assert!(engine.submissions().is_empty());
    assert!(rx.try_recv().is_err());

    server.stop().await;
}

#[tokio::test]
async fn submissions_preserve_order_across_messages() {
    let (server, engine) = test_server(BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();

    let first = BincodeCodec.encode_transactions(&[
        Transaction::new(1, vec![]),
        Transaction::new(2, vec![]),
    ]);
    let second = BincodeCodec.encode_transactions(&[Transaction::new(3, vec![])]);
    server.add_protocols(vec![writing_protocol(
        vec![
            (codes::TRANSACTIONS, first),
            (codes::TRANSACTIONS, second),
            // Ends with a handshake so the test can await completion.
            (codes::STATUS, Vec::new()),
        ],
        tx,
    )]);
    server.start().await.unwrap();

    // The status reply arrives only after both writes completed.
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timeout")
        .expect("status reply");

    let nonces: Vec<u64> = engine
        .submissions()
        .iter()
        .map(|raw| {
            bridge_core::BlockCodec::decode_transaction(&BincodeCodec, raw)
                .unwrap()
                .nonce
        })
        .collect();
    assert_eq!(nonces, vec![1, 2, 3]);

    server.stop().await;
}

#[tokio::test]
async fn header_and_body_chatter_is_accepted_and_ignored() {
    let (server, engine) = test_server(BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![writing_protocol(
        vec![
            (codes::GET_BLOCK_HEADERS, vec![1, 2, 3]),
            (codes::BLOCK_BODIES, vec![4, 5]),
            (0x42, vec![6]), // unrecognized code, also tolerated
            (codes::STATUS, Vec::new()),
        ],
        tx,
    )]);
    server.start().await.unwrap();

    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timeout")
        .expect("status reply after ignored messages");
    assert!(engine.submissions().is_empty());

    server.stop().await;
}

#[tokio::test]
async fn feed_reports_only_traffic_that_crossed_a_channel() {
    let (server, engine) = test_server(BridgeConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);

    let mut events = server.subscribe_events(EventFilter::kinds(vec![
        PeerEventKind::MsgRecv,
        PeerEventKind::MsgSend,
    ]));
    server.start().await.unwrap();

    engine.deliver(CommittedBatch::new(vec![raw_tx(5)]));
    let msg = timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("timeout")
        .expect("message");

    let ev = timeout(Duration::from_millis(500), events.recv())
        .await
        .expect("timeout")
        .expect("recv event");
    assert_eq!(ev.kind, PeerEventKind::MsgRecv);
    assert_eq!(ev.msg_code, Some(codes::NEW_BLOCK));
    assert_eq!(ev.msg_size, Some(msg.size));
    assert_eq!(ev.protocol.as_deref(), Some("eth"));

    // Exactly one event for exactly one message.
    assert!(events.try_recv().unwrap().is_none());

    server.stop().await;
}

#[tokio::test]
async fn every_peer_sees_every_commit_independently() {
    let config = BridgeConfig {
        peer_count: 2,
        ..BridgeConfig::default()
    };
    let (server, engine) = test_server(config);
    let (tx, mut rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);
    server.start().await.unwrap();

    engine.deliver(CommittedBatch::new(vec![raw_tx(1)]));

    // One NEW_BLOCK per peer for the same decision.
    for _ in 0..2 {
        let msg = timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timeout")
            .expect("message");
        assert_eq!(msg.code, codes::NEW_BLOCK);
    }
    assert!(rx.try_recv().is_err());

    server.stop().await;
}

#[tokio::test]
async fn shutdown_wins_against_a_flooded_commit_stream() {
    let (server, engine) = test_server(BridgeConfig::default());
    let (tx, _rx) = mpsc::unbounded_channel();
    server.add_protocols(vec![forwarding_protocol(tx)]);
    server.start().await.unwrap();

    // Keep the commit stream continuously active while stopping.
    let flooder = {
        let engine = engine.clone();
        tokio::spawn(async move {
            for i in 0..10_000u64 {
                engine.deliver(CommittedBatch::new(vec![raw_tx(i)]));
                tokio::task::yield_now().await;
            }
        })
    };

    timeout(Duration::from_secs(1), server.stop())
        .await
        .expect("stop must not be starved by commit traffic");

    flooder.abort();
    assert_eq!(server.peer_count(), 0);
}
