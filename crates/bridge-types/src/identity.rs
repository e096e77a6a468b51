//! # Peer Identities
//!
//! Synthetic peer identities and the directory-query views derived from
//! them. A [`PeerIdentity`] is immutable once created; the controller owns
//! it and everything else holds an `Arc` reference.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Unique identifier for a node in the network.
///
/// Opaque 32-byte value. Synthetic peers derive theirs deterministically
/// from the peer index so the set is stable across restarts.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub [u8; 32]);

impl NodeId {
    /// Deterministic identity for the `index`-th synthetic peer.
    ///
    /// The index is big-endian encoded into the low bytes so that ids sort
    /// in peer order.
    #[must_use]
    pub fn from_index(index: u64) -> Self {
        let mut id = [0u8; 32];
        id[24..].copy_from_slice(&index.to_be_bytes());
        Self(id)
    }

    /// Identity derived from a human-readable name (the host node's own).
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        use std::hash::{Hash, Hasher};
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        name.hash(&mut hasher);
        Self::from_index(hasher.finish())
    }

    /// Lower-hex rendering of the full identifier.
    #[must_use]
    pub fn to_hex(&self) -> String {
        let mut s = String::with_capacity(64);
        for b in &self.0 {
            s.push_str(&format!("{b:02x}"));
        }
        s
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Truncated form keeps log lines readable.
        write!(f, "NodeId({}..)", &self.to_hex()[..8])
    }
}

/// A protocol name + version pair a peer declares support for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub name: String,
    pub version: u32,
}

impl Capability {
    #[must_use]
    pub fn new(name: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.version)
    }
}

/// A (possibly synthetic) peer identity.
///
/// Immutable once created. Owned by the peer-set controller; protocol
/// run-loops and events only ever hold references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeerIdentity {
    /// Opaque node identifier.
    pub id: NodeId,
    /// Human-readable peer name.
    pub name: String,
    /// Capabilities this peer declares.
    pub caps: Vec<Capability>,
}

impl PeerIdentity {
    #[must_use]
    pub fn new(id: NodeId, name: impl Into<String>, caps: Vec<Capability>) -> Self {
        Self {
            id,
            name: name.into(),
            caps,
        }
    }

    /// Whether this peer declared support for `name`/`version`.
    #[must_use]
    pub fn supports(&self, name: &str, version: u32) -> bool {
        self.caps
            .iter()
            .any(|c| c.name == name && c.version == version)
    }

    /// Directory view of this peer.
    #[must_use]
    pub fn info(&self) -> PeerInfo {
        PeerInfo {
            id: self.id.to_hex(),
            name: self.name.clone(),
            caps: self.caps.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Metadata describing one connected peer, as answered to directory queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerInfo {
    /// Hex-encoded node identifier.
    pub id: String,
    /// Human-readable peer name.
    pub name: String,
    /// Declared capabilities, rendered as `name/version`.
    pub caps: Vec<String>,
}

/// Metadata describing the host node itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    /// Hex-encoded node identifier.
    pub id: String,
    /// Configured node name.
    pub name: String,
    /// Configured listen address (informational; the bridge opens no socket).
    pub listen_addr: String,
    /// One entry per distinct registered protocol name.
    pub protocols: BTreeMap<String, String>,
}
