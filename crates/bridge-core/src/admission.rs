//! # Admission Control
//!
//! Explicitly constructed banned-identity registry. Owned by whoever
//! performs admission control (here: the peer-set controller) and passed
//! by reference to collaborators; never ambient global state.

use bridge_types::NodeId;
use parking_lot::RwLock;
use std::collections::HashSet;
use tracing::debug;

/// Registry of banned node identities.
#[derive(Debug, Default)]
pub struct BanRegistry {
    banned: RwLock<HashSet<NodeId>>,
}

impl BanRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ban `id`. Idempotent.
    pub fn ban(&self, id: NodeId) {
        if self.banned.write().insert(id) {
            debug!(id = %id, "identity banned");
        }
    }

    /// Whether `id` is banned.
    #[must_use]
    pub fn is_banned(&self, id: &NodeId) -> bool {
        self.banned.read().contains(id)
    }

    /// Every banned identity, sorted.
    #[must_use]
    pub fn list_banned(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.banned.read().iter().copied().collect();
        ids.sort();
        ids
    }
}
