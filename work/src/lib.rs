//! Proof-of-work primitives for the distributor.
//!
//! The distributor never generates work itself; it only checks what backend
//! nodes return and remembers accepted results.

pub mod cache;
pub mod error;
pub mod thresholds;
pub mod validator;

pub use cache::WorkCache;
pub use error::WorkError;
pub use thresholds::{from_multiplier, to_multiplier, DEFAULT_THRESHOLD, RECEIVE_THRESHOLD};
pub use validator::{
    check_work, parse_work, validate_work, work_value, NanoWorkValidator, WorkValidator,
};

/// Number of results kept when no capacity is configured.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;
