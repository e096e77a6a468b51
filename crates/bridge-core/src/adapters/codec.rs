//! # Bincode Block Codec
//!
//! [`BlockCodec`] implementation over bincode. A real deployment
//! substitutes the host chain's codec behind the same trait; this adapter
//! keeps the workspace self-contained and gives tests a codec whose
//! round-trip behavior is exact.

use crate::ports::outbound::BlockCodec;
use bridge_types::{BridgeError, Transaction};
use serde::{Deserialize, Serialize};

/// Envelope carried by NEW_BLOCK payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockPayload {
    /// Transactions in consensus order.
    pub transactions: Vec<Transaction>,
}

/// Stateless bincode codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeCodec;

impl BincodeCodec {
    /// Encode one transaction into its raw (batch entry) form.
    #[must_use]
    pub fn encode_raw_transaction(&self, tx: &Transaction) -> Vec<u8> {
        // Serialization of a plain struct cannot fail under bincode.
        bincode::serialize(tx).unwrap_or_default()
    }

    /// Encode a transaction list into a TRANSACTIONS message payload.
    #[must_use]
    pub fn encode_transactions(&self, txs: &[Transaction]) -> Vec<u8> {
        bincode::serialize(txs).unwrap_or_default()
    }

    /// Decode a NEW_BLOCK payload back into its ordered transaction list.
    pub fn decode_block(&self, payload: &[u8]) -> Result<Vec<Transaction>, BridgeError> {
        let block: BlockPayload = bincode::deserialize(payload)
            .map_err(|err| BridgeError::Encoding(err.to_string()))?;
        Ok(block.transactions)
    }
}

impl BlockCodec for BincodeCodec {
    fn decode_transaction(&self, raw: &[u8]) -> Result<Transaction, BridgeError> {
        bincode::deserialize(raw).map_err(|err| BridgeError::Encoding(err.to_string()))
    }

    fn encode_block(&self, txs: &[Transaction]) -> Result<Vec<u8>, BridgeError> {
        let block = BlockPayload {
            transactions: txs.to_vec(),
        };
        bincode::serialize(&block).map_err(|err| BridgeError::Encoding(err.to_string()))
    }

    fn decode_transactions(&self, payload: &[u8]) -> Result<Vec<Transaction>, BridgeError> {
        bincode::deserialize(payload).map_err(|err| BridgeError::Encoding(err.to_string()))
    }

    fn encode_submission(&self, tx: &Transaction) -> Result<Vec<u8>, BridgeError> {
        bincode::serialize(tx).map_err(|err| BridgeError::Encoding(err.to_string()))
    }
}
