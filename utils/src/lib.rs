//! Shared utilities for the PoW distributor.

pub mod logging;

pub use logging::{init_logging, LogFormat};
