//! PoW validation.
//!
//! A work token is a 64-bit nonce written as 16 big-endian hex digits. Its
//! value is the 8-byte Blake2b digest of `nonce (little-endian) || hash`,
//! read as a little-endian `u64`; the work is valid when that value reaches
//! the required difficulty.

use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};
use powdist_types::WorkHash;

use crate::thresholds::DEFAULT_THRESHOLD;
use crate::WorkError;

type Blake2b64 = Blake2b<U8>;

/// Pluggable PoW check used by the fetcher on every backend reply.
pub trait WorkValidator: Send + Sync {
    /// Whether `work` satisfies `difficulty` (or the protocol default) for `hash`.
    fn validate(&self, work: &str, hash: &str, difficulty: Option<u64>) -> bool;
}

/// Nano's Blake2b work check.
#[derive(Clone, Copy, Debug)]
pub struct NanoWorkValidator {
    default_threshold: u64,
}

impl NanoWorkValidator {
    pub fn new() -> Self {
        Self {
            default_threshold: DEFAULT_THRESHOLD,
        }
    }

    /// Use a different fallback threshold (e.g. a low-difficulty devnet).
    pub fn with_default_threshold(default_threshold: u64) -> Self {
        Self { default_threshold }
    }

    pub fn default_threshold(&self) -> u64 {
        self.default_threshold
    }
}

impl Default for NanoWorkValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkValidator for NanoWorkValidator {
    fn validate(&self, work: &str, hash: &str, difficulty: Option<u64>) -> bool {
        check_work(work, hash, difficulty.unwrap_or(self.default_threshold)).is_ok()
    }
}

/// Parse a 16-digit hex work token into its nonce.
pub fn parse_work(work: &str) -> Result<u64, WorkError> {
    if work.len() != 16 || !work.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(WorkError::MalformedWork(work.to_string()));
    }
    u64::from_str_radix(work, 16).map_err(|e| WorkError::MalformedWork(e.to_string()))
}

/// Compute the difficulty value a nonce achieves for a hash.
pub fn work_value(hash: &WorkHash, nonce: u64) -> u64 {
    let mut hasher = Blake2b64::new();
    hasher.update(nonce.to_le_bytes());
    hasher.update(hash.as_bytes());
    let digest = hasher.finalize();
    let mut output = [0u8; 8];
    output.copy_from_slice(&digest);
    u64::from_le_bytes(output)
}

/// Parse both inputs and return the achieved work value when it meets `required`.
pub fn check_work(work: &str, hash: &str, required: u64) -> Result<u64, WorkError> {
    let nonce = parse_work(work)?;
    let hash = WorkHash::from_hex(hash)?;
    let actual = work_value(&hash, nonce);
    if actual < required {
        return Err(WorkError::InsufficientDifficulty { actual, required });
    }
    Ok(actual)
}

/// Validate a work token against a hash, falling back to [`DEFAULT_THRESHOLD`].
///
/// Malformed input never panics; it is simply invalid.
pub fn validate_work(work: &str, hash: &str, difficulty: Option<u64>) -> bool {
    check_work(work, hash, difficulty.unwrap_or(DEFAULT_THRESHOLD)).is_ok()
}
