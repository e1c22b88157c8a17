//! Nullable infrastructure for deterministic testing.
//!
//! The distributor reaches the outside world through two seams: backend
//! peers and the PoW validator. This crate provides test-friendly
//! implementations of both that:
//! - Return scripted values
//! - Can be controlled programmatically
//! - Never touch the network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod peer;
pub mod validator;

pub use peer::{NullReply, NullWorkPeer};
pub use validator::{NullWorkValidator, ValidationCheck};
