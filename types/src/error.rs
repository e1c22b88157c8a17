//! Top-level error type shared across crates.

use thiserror::Error;

/// Errors raised while parsing distributor types from caller or backend input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypesError {
    #[error("invalid block hash: {0}")]
    InvalidHash(String),

    #[error("invalid work token: {0}")]
    InvalidWork(String),

    #[error("invalid difficulty: {0}")]
    InvalidDifficulty(String),
}
