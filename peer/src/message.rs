//! The `work_generate` action sent to backend nodes.

use powdist_types::{DifficultyParam, WorkRequest};
use serde::Serialize;

pub const WORK_GENERATE_ACTION: &str = "work_generate";

/// Outbound payload: `{"action": "work_generate", "hash": ..., "difficulty"?: ...}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct WorkGenerateMessage {
    pub action: &'static str,
    pub hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyParam>,
}

impl WorkGenerateMessage {
    pub fn new(request: &WorkRequest) -> Self {
        Self {
            action: WORK_GENERATE_ACTION,
            hash: request.hash.clone(),
            difficulty: request.difficulty.clone(),
        }
    }
}

impl From<&WorkRequest> for WorkGenerateMessage {
    fn from(request: &WorkRequest) -> Self {
        Self::new(request)
    }
}
