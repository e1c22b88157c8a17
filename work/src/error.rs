use powdist_types::TypesError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WorkError {
    #[error("malformed work token: {0}")]
    MalformedWork(String),

    #[error(transparent)]
    Types(#[from] TypesError),

    #[error("work value {actual:016x} below difficulty {required:016x}")]
    InsufficientDifficulty { actual: u64, required: u64 },
}
