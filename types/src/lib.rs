//! Fundamental types for the PoW distributor.
//!
//! Shared by every other crate in the workspace: the hash work is computed
//! against, the request callers make, and the opaque result backends return.

pub mod error;
pub mod hash;
pub mod work;

pub use error::TypesError;
pub use hash::WorkHash;
pub use work::{DifficultyParam, WorkRequest, WorkResult};
