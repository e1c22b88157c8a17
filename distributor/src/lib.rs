//! PoW distributor core.
//!
//! Given a hash, asks every configured backend node for work at once,
//! accepts the first reply whose work validates, caches it, and retries the
//! whole round when every node fails.
//!
//! - [`fetcher`]: one call to one node, absorbing every failure
//! - [`orchestrator`]: the fan-out/race/retry/cache loop
//! - [`config`]: process configuration
//! - [`metrics`]: Prometheus counters for the above

pub mod config;
pub mod error;
pub mod fetcher;
pub mod metrics;
pub mod orchestrator;
pub mod shutdown;
pub mod tracing_spans;

pub use config::DistributorConfig;
pub use error::DistributorError;
pub use fetcher::{accept_reply, fetch_work, ReplyRejection};
pub use metrics::DistributorMetrics;
pub use orchestrator::{RaceSettings, WorkDistributor};
pub use shutdown::shutdown_signal;
