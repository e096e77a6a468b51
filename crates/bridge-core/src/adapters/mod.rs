//! Port implementations shipped with the crate: the bincode block codec
//! and the in-memory consensus engine used by tests and local runs.

pub mod codec;
pub mod engine;

pub use codec::BincodeCodec;
pub use engine::{InMemoryConnector, InMemoryEngine};
