//! # Message Channels
//!
//! The paired read/write capability every protocol run-loop is written
//! against, and the instrumentation decorator that reports traffic to the
//! event feed.

use async_trait::async_trait;
use bridge_feed::EventFeed;
use bridge_types::{BridgeError, NodeId, PeerEvent, PeerEventKind, ProtocolMessage};
use std::sync::Arc;

/// A paired read/write message channel.
///
/// Reads block until the next message is available or the stream ends
/// ([`BridgeError::StreamEnded`]); a returned message's payload must be
/// fully drained before the next read on the same logical stream.
#[async_trait]
pub trait MsgReadWrite: Send + Sync {
    /// Read the next message.
    async fn read_msg(&self) -> Result<ProtocolMessage, BridgeError>;

    /// Write a message. The payload is consumed by the receiving side.
    async fn write_msg(&self, msg: ProtocolMessage) -> Result<(), BridgeError>;

    /// Close the channel if it is closable; otherwise a no-op success.
    async fn close(&self) -> Result<(), BridgeError>;
}

/// Decorator that publishes a feed event for every message that actually
/// crossed the wrapped channel.
///
/// Events carry the message's code and size, never its payload. A failed
/// write publishes nothing; speculative sends are never reported.
pub struct InstrumentedChannel<T: MsgReadWrite> {
    inner: T,
    feed: Arc<EventFeed>,
    peer: NodeId,
    protocol: String,
}

impl<T: MsgReadWrite> InstrumentedChannel<T> {
    pub fn new(inner: T, feed: Arc<EventFeed>, peer: NodeId, protocol: impl Into<String>) -> Self {
        Self {
            inner,
            feed,
            peer,
            protocol: protocol.into(),
        }
    }

    /// The wrapped channel.
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: MsgReadWrite> MsgReadWrite for InstrumentedChannel<T> {
    async fn read_msg(&self) -> Result<ProtocolMessage, BridgeError> {
        let msg = self.inner.read_msg().await?;
        self.feed.publish(PeerEvent::message(
            PeerEventKind::MsgRecv,
            self.peer,
            self.protocol.clone(),
            msg.code,
            msg.size,
        ));
        Ok(msg)
    }

    async fn write_msg(&self, msg: ProtocolMessage) -> Result<(), BridgeError> {
        let (code, size) = (msg.code, msg.size);
        self.inner.write_msg(msg).await?;
        // Only reached when the underlying write succeeded.
        self.feed.publish(PeerEvent::message(
            PeerEventKind::MsgSend,
            self.peer,
            self.protocol.clone(),
            code,
            size,
        ));
        Ok(())
    }

    async fn close(&self) -> Result<(), BridgeError> {
        self.inner.close().await
    }
}
