//! # Protocol Messages
//!
//! Wire-facing message framing: externally fixed message codes, the
//! one-shot [`Payload`] buffer and the [`ProtocolMessage`] envelope.

use serde::{Deserialize, Serialize};

/// Message codes of the host wire protocol (eth/63 numbering).
///
/// These values are an externally fixed contract shared with the host
/// ecosystem; they must never be renumbered here.
pub mod codes {
    /// Status / handshake exchange.
    pub const STATUS: u64 = 0x00;
    /// Announcement of new block hashes.
    pub const NEW_BLOCK_HASHES: u64 = 0x01;
    /// Transaction submission.
    pub const TRANSACTIONS: u64 = 0x02;
    /// Block header request.
    pub const GET_BLOCK_HEADERS: u64 = 0x03;
    /// Block header response.
    pub const BLOCK_HEADERS: u64 = 0x04;
    /// Block body request.
    pub const GET_BLOCK_BODIES: u64 = 0x05;
    /// Block body response.
    pub const BLOCK_BODIES: u64 = 0x06;
    /// Full new-block announcement.
    pub const NEW_BLOCK: u64 = 0x07;

    /// Whether `code` is one of the codes above.
    #[must_use]
    pub fn is_recognized(code: u64) -> bool {
        code <= NEW_BLOCK
    }
}

/// A validated transaction in its decoded form.
///
/// The bridge never interprets transaction contents; this is the opaque
/// unit the codec decodes raw bytes into and re-encodes for submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Sender-assigned sequence number.
    pub nonce: u64,
    /// Opaque transaction body.
    pub payload: Vec<u8>,
}

impl Transaction {
    #[must_use]
    pub fn new(nonce: u64, payload: Vec<u8>) -> Self {
        Self { nonce, payload }
    }
}

/// A one-shot, drainable message payload.
///
/// Owned buffer plus read cursor. A payload is consumed at most once: the
/// cursor only advances, and reads after exhaustion return zero bytes.
/// This replaces a live reader so that "fully drained before the next
/// message" is a checkable property rather than a convention.
#[derive(Debug, Default)]
pub struct Payload {
    buf: Vec<u8>,
    pos: usize,
}

impl Payload {
    #[must_use]
    pub fn new(buf: Vec<u8>) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Whether every byte has been consumed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Copy up to `out.len()` bytes into `out`, advancing the cursor.
    ///
    /// Returns the number of bytes copied; `0` once exhausted.
    pub fn read(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.remaining());
        out[..n].copy_from_slice(&self.buf[self.pos..self.pos + n]);
        self.pos += n;
        n
    }

    /// Consume and return every remaining byte.
    pub fn read_to_end(&mut self) -> Vec<u8> {
        let rest = self.buf[self.pos..].to_vec();
        self.pos = self.buf.len();
        rest
    }
}

/// A framed protocol message: code, declared size, one-shot payload.
///
/// Ownership transfers to whoever reads the message; the payload must be
/// fully drained before the next message on the same logical stream is
/// processed, or framing in the host protocol layer is corrupted.
#[derive(Debug)]
pub struct ProtocolMessage {
    /// Semantic message tag (see [`codes`]).
    pub code: u64,
    /// Payload length in bytes.
    pub size: u32,
    /// The message body.
    pub payload: Payload,
}

impl ProtocolMessage {
    /// Frame `payload` under `code`, with `size` set to the exact length.
    #[must_use]
    pub fn new(code: u64, payload: Vec<u8>) -> Self {
        Self {
            code,
            size: payload.len() as u32,
            payload: Payload::new(payload),
        }
    }

    /// An empty-bodied message (handshake replies).
    #[must_use]
    pub fn empty(code: u64) -> Self {
        Self::new(code, Vec::new())
    }
}
