//! # Bridge Configuration
//!
//! Runtime parameters for the bridge server. All fields have sane defaults;
//! `validate()` rejects combinations that would deadlock or misbehave at
//! startup rather than at first use.

use serde::{Deserialize, Serialize};

/// Complete bridge configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Address of the external consensus engine.
    pub engine_addr: String,
    /// Name reported by `node_info()`.
    pub node_name: String,
    /// Listen address reported by `node_info()`. Informational only; the
    /// bridge opens no socket.
    pub listen_addr: String,
    /// Number of synthetic peers to present to the networking stack.
    pub peer_count: usize,
    /// Event feed buffer size per subscriber.
    pub feed_capacity: usize,
    /// Synthetic-reply queue depth per peer.
    pub reply_capacity: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            engine_addr: "127.0.0.1:9000".to_string(),
            node_name: "bridge-node".to_string(),
            listen_addr: "0.0.0.0:0".to_string(),
            peer_count: 1,
            feed_capacity: 1000,
            reply_capacity: 16,
        }
    }
}

impl BridgeConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine_addr.is_empty() {
            return Err(ConfigError::MissingEngineAddress);
        }
        if self.feed_capacity == 0 || self.reply_capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// No consensus engine address was supplied.
    MissingEngineAddress,
    /// A channel capacity was set to zero, which would stall delivery.
    ZeroCapacity,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingEngineAddress => {
                write!(f, "consensus engine address is not set")
            }
            ConfigError::ZeroCapacity => {
                write!(f, "channel capacities must be non-zero")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
