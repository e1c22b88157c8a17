use thiserror::Error;

#[derive(Debug, Error)]
pub enum DistributorError {
    #[error("no valid work after {attempts} attempts")]
    Exhausted { attempts: u32 },

    #[error("config error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] powdist_peer::PeerError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
