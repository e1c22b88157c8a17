//! Node fetcher: one work_generate call to one backend node.
//!
//! Every failure (transport, protocol or validation) is absorbed here and
//! reported to the orchestrator only as "no result from this node".

use powdist_peer::{WorkGenerateMessage, WorkPeer};
use powdist_types::{DifficultyParam, WorkRequest, WorkResult};
use powdist_work::{to_multiplier, WorkValidator, DEFAULT_THRESHOLD};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::DistributorMetrics;

/// Why a parsed backend reply was not accepted.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplyRejection {
    #[error("reply is not a JSON object")]
    NotAnObject,

    #[error("backend reported an error: {0}")]
    BackendError(String),

    #[error("reply has no work token")]
    MissingWork,

    #[error("reply difficulty is unusable: {0}")]
    InvalidDifficulty(String),

    #[error("work {work} failed validation")]
    InvalidWork { work: String },
}

/// Decide whether a backend reply carries valid work for `request`.
///
/// The work is checked against the difficulty the backend reports, or the
/// validator's default when it reports none. The caller's requested
/// difficulty is only forwarded to the backend and plays no part here.
pub fn accept_reply(
    reply: Value,
    validator: &dyn WorkValidator,
    request: &WorkRequest,
) -> Result<WorkResult, ReplyRejection> {
    let result = WorkResult::from_value(reply).map_err(|_| ReplyRejection::NotAnObject)?;

    if let Some(error) = result.get("error") {
        let reason = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return Err(ReplyRejection::BackendError(reason));
    }

    let work = result.work().ok_or(ReplyRejection::MissingWork)?;

    let reported = match result.difficulty() {
        Some(raw) => Some(
            DifficultyParam::from_json(raw)
                .threshold()
                .map_err(|e| ReplyRejection::InvalidDifficulty(e.to_string()))?,
        ),
        None => None,
    };

    if !validator.validate(work, &request.hash, reported) {
        return Err(ReplyRejection::InvalidWork {
            work: work.to_string(),
        });
    }
    Ok(result)
}

/// Ask one node for work and return its reply only if the work is valid.
pub async fn fetch_work(
    peer: &dyn WorkPeer,
    validator: &dyn WorkValidator,
    request: &WorkRequest,
    message: &WorkGenerateMessage,
    metrics: &DistributorMetrics,
) -> Option<WorkResult> {
    let reply = match peer.work_generate(message).await {
        Ok(reply) => reply,
        Err(e) => {
            metrics.node_failures.inc();
            debug!(endpoint = peer.endpoint(), error = %e, "node call failed");
            return None;
        }
    };

    match accept_reply(reply, validator, request) {
        Ok(result) => {
            metrics.work_accepted.inc();
            let multiplier = result
                .difficulty()
                .and_then(|raw| DifficultyParam::from_json(raw).threshold().ok())
                .map(|d| to_multiplier(d, DEFAULT_THRESHOLD));
            debug!(endpoint = peer.endpoint(), ?multiplier, "node returned valid work");
            Some(result)
        }
        Err(rejection) => {
            if matches!(rejection, ReplyRejection::InvalidWork { .. }) {
                metrics.work_rejected.inc();
            } else {
                metrics.node_failures.inc();
            }
            debug!(endpoint = peer.endpoint(), reason = %rejection, "discarding node reply");
            None
        }
    }
}
