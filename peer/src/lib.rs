//! Backend work peers.
//!
//! A peer is one backend node capable of generating work. The distributor
//! only ever talks to peers through [`WorkPeer`], so tests can swap the HTTP
//! client for scripted peers.

pub mod client;
pub mod error;
pub mod message;

use futures_util::future::BoxFuture;
use serde_json::Value;

pub use client::HttpWorkPeer;
pub use error::PeerError;
pub use message::{WorkGenerateMessage, WORK_GENERATE_ACTION};

/// One backend node.
pub trait WorkPeer: Send + Sync {
    /// Address used in logs and metrics.
    fn endpoint(&self) -> &str;

    /// Send one `work_generate` request and return the parsed reply.
    ///
    /// The future owns everything it needs so it can run on a spawned task.
    fn work_generate(
        &self,
        message: &WorkGenerateMessage,
    ) -> BoxFuture<'static, Result<Value, PeerError>>;
}
