//! RPC error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

pub const MISSING_HASH_MESSAGE: &str = "hash_value is required";
pub const WORK_UNAVAILABLE_MESSAGE: &str = "Unable to generate work. Please try again later.";

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("hash_value is required")]
    MissingHash,

    #[error("unable to generate work")]
    WorkUnavailable,

    #[error("server error: {0}")]
    Server(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            RpcError::MissingHash => StatusCode::BAD_REQUEST,
            RpcError::WorkUnavailable | RpcError::Server(_) | RpcError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RpcError {
    /// Callers only ever see one of two fixed messages; details stay in the logs.
    fn into_response(self) -> Response {
        let message = match self {
            RpcError::MissingHash => MISSING_HASH_MESSAGE,
            _ => WORK_UNAVAILABLE_MESSAGE,
        };
        (self.status(), Json(json!({ "error": message }))).into_response()
    }
}
