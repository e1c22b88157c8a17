//! Pre-built [`tracing::Span`] constructors for the distributor.
//!
//! Consistent span names and field sets make it easy to follow one request
//! through its attempts and node calls in the logs.

use tracing::{debug_span, info_span, Span};

/// Span covering one inbound work request, cache lookup through outcome.
pub fn pow_request_span(hash: &str) -> Span {
    info_span!("pow_request", hash = %hash)
}

/// Span covering one fan-out round.
pub fn race_attempt_span(attempt: u32) -> Span {
    debug_span!("race_attempt", attempt = attempt)
}

/// Span covering a single call to one backend node.
pub fn node_fetch_span(endpoint: &str) -> Span {
    debug_span!("node_fetch", endpoint = %endpoint)
}
