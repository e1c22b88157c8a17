//! RPC request handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use tracing::{debug, error, warn};

use powdist_types::{DifficultyParam, WorkRequest, WorkResult};

use crate::error::RpcError;
use crate::server::RpcState;

// ── Work ─────────────────────────────────────────────────────────────────

/// Inbound body of `POST /pow`.
#[derive(Debug, Deserialize)]
pub struct PowRequest {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(default)]
    pub difficulty: Option<DifficultyParam>,
}

impl PowRequest {
    /// Convert to a work request, rejecting a missing or empty hash.
    pub fn into_work_request(self) -> Result<WorkRequest, RpcError> {
        let hash = self
            .hash
            .filter(|h| !h.is_empty())
            .ok_or(RpcError::MissingHash)?;
        Ok(WorkRequest {
            hash,
            difficulty: self.difficulty,
        })
    }
}

/// `POST /pow`: obtain work for a hash from the fastest valid backend.
pub async fn pow(
    State(state): State<RpcState>,
    body: Result<Json<PowRequest>, JsonRejection>,
) -> Result<Json<WorkResult>, RpcError> {
    let Json(body) = body.map_err(|rejection| {
        debug!(%rejection, "unreadable request body");
        RpcError::MissingHash
    })?;
    let request = body.into_work_request()?;

    match state.distributor.generate(&request).await {
        Ok(result) => Ok(Json(result)),
        Err(e) => {
            warn!(hash = %request.hash, error = %e, "work request failed");
            Err(RpcError::WorkUnavailable)
        }
    }
}

// ── Metrics ──────────────────────────────────────────────────────────────

/// `GET /metrics`: Prometheus text exposition.
pub async fn metrics(State(state): State<RpcState>) -> Response {
    match state.distributor.metrics().encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!("failed to encode metrics: {e}");
            RpcError::Server(e.to_string()).into_response()
        }
    }
}
