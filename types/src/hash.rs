//! Block hash type that work is computed against.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::TypesError;

/// A 32-byte block hash, the root a work token is generated for.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkHash([u8; 32]);

impl WorkHash {
    pub const ZERO: Self = Self([0u8; 32]);

    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// Parse a hash from exactly 64 hex characters (either case).
    pub fn from_hex(s: &str) -> Result<Self, TypesError> {
        if s.len() != 64 {
            return Err(TypesError::InvalidHash(format!(
                "expected 64 hex characters, got {}",
                s.len()
            )));
        }
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes)
            .map_err(|e| TypesError::InvalidHash(e.to_string()))?;
        Ok(Self(bytes))
    }
}

impl FromStr for WorkHash {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl fmt::Debug for WorkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WorkHash({}\u{2026})", hex::encode_upper(&self.0[..4]))
    }
}

impl fmt::Display for WorkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode_upper(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HASH: &str = "718CC2121C3E641059BC1C2CFC45666C99E8AE922F7A807B7D07B62C995D79E2";

    #[test]
    fn parses_uppercase_and_lowercase() {
        let upper = WorkHash::from_hex(HASH).unwrap();
        let lower = WorkHash::from_hex(&HASH.to_lowercase()).unwrap();
        assert_eq!(upper, lower);
        assert_eq!(upper.as_bytes()[0], 0x71);
        assert_eq!(upper.as_bytes()[31], 0xE2);
    }

    #[test]
    fn display_is_uppercase_hex() {
        let hash: WorkHash = HASH.to_lowercase().parse().unwrap();
        assert_eq!(hash.to_string(), HASH);
    }

    #[test]
    fn rejects_wrong_length() {
        assert!(matches!(
            WorkHash::from_hex("718CC2"),
            Err(TypesError::InvalidHash(_))
        ));
        assert!(WorkHash::from_hex("").is_err());
    }

    #[test]
    fn rejects_non_hex() {
        let bad = "Z".repeat(64);
        assert!(WorkHash::from_hex(&bad).is_err());
    }

    #[test]
    fn zero_hash() {
        assert!(WorkHash::ZERO.is_zero());
        assert!(!WorkHash::from_hex(HASH).unwrap().is_zero());
    }
}
