use thiserror::Error;

/// Why a single backend call produced no usable reply.
#[derive(Debug, Error)]
pub enum PeerError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("backend returned HTTP {0}")]
    Status(u16),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl From<reqwest::Error> for PeerError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            PeerError::Timeout(e.to_string())
        } else if e.is_decode() {
            PeerError::InvalidResponse(e.to_string())
        } else {
            PeerError::Transport(e.to_string())
        }
    }
}
