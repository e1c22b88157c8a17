//! Work requests and the opaque results backends return for them.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::TypesError;

/// Difficulty as supplied by a caller or reported by a backend.
///
/// Nano-style nodes speak hex strings (`"fffffff800000000"`), but numeric
/// values are accepted too. Any other JSON is kept in [`Other`](Self::Other)
/// so it can still be forwarded to backends untouched.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DifficultyParam {
    Hex(String),
    Number(Number),
    Other(Value),
}

impl DifficultyParam {
    /// Classify an arbitrary JSON value as a difficulty.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::String(s) => Self::Hex(s.clone()),
            Value::Number(n) => Self::Number(n.clone()),
            other => Self::Other(other.clone()),
        }
    }

    /// Resolve to an absolute 64-bit threshold.
    pub fn threshold(&self) -> Result<u64, TypesError> {
        match self {
            Self::Hex(s) => {
                if s.is_empty() || s.len() > 16 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
                    return Err(TypesError::InvalidDifficulty(s.clone()));
                }
                u64::from_str_radix(s, 16).map_err(|e| TypesError::InvalidDifficulty(e.to_string()))
            }
            Self::Number(n) => n
                .as_u64()
                .ok_or_else(|| TypesError::InvalidDifficulty(n.to_string())),
            Self::Other(v) => Err(TypesError::InvalidDifficulty(format!(
                "expected hex string or number, got {v}"
            ))),
        }
    }
}

/// A request for proof-of-work on one hash.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkRequest {
    /// The hash exactly as the caller sent it; also the cache key.
    pub hash: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<DifficultyParam>,
}

impl WorkRequest {
    pub fn new(hash: impl Into<String>) -> Self {
        Self {
            hash: hash.into(),
            difficulty: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: DifficultyParam) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

/// A backend's work reply, passed through to callers without modification.
///
/// Always a JSON object; beyond `work` (and usually `hash`/`difficulty`)
/// its fields are whatever the backend chose to send.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkResult(Map<String, Value>);

impl WorkResult {
    pub fn new(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    /// Wrap a raw reply. Fails unless the reply is a JSON object.
    pub fn from_value(value: Value) -> Result<Self, TypesError> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(TypesError::InvalidWork(format!(
                "reply is not an object: {other}"
            ))),
        }
    }

    /// The work token, when present as a string.
    pub fn work(&self) -> Option<&str> {
        self.0.get("work").and_then(Value::as_str)
    }

    pub fn hash(&self) -> Option<&str> {
        self.0.get("hash").and_then(Value::as_str)
    }

    /// The raw `difficulty` field, if the backend reported one.
    pub fn difficulty(&self) -> Option<&Value> {
        self.0.get("difficulty")
    }

    /// Whether the backend flagged the reply with an `error` field.
    pub fn has_error(&self) -> bool {
        self.0.contains_key("error")
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}
