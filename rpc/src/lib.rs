//! HTTP request boundary for the PoW distributor.
//!
//! - `POST /pow` takes `{"hash": ..., "difficulty": ...}` and returns the
//!   winning backend's reply verbatim
//! - `GET /metrics` serves Prometheus text when enabled

pub mod error;
pub mod handlers;
pub mod server;

pub use error::RpcError;
pub use handlers::PowRequest;
pub use server::{router, serve, RpcServer, RpcState};
