//! # Consensus-Bridge Test Suite
//!
//! Unified test crate for cross-crate behavior: full server lifecycle,
//! commit-to-peer message flow and event observability.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── lifecycle.rs     # start/stop, idempotence, restart, directory
//!     └── message_flow.rs  # commits, handshakes, submissions, events
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bridge-tests
//! cargo test -p bridge-tests integration::
//! ```

#![allow(dead_code)]
