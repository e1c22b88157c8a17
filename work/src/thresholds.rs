//! Nano work thresholds and multiplier conversions.
//!
//! Higher threshold values mean harder work. A multiplier expresses a
//! difficulty relative to a base: scaling shrinks the "inverse gap"
//! (`2^64 - threshold`) by the multiplier.

/// Threshold used when neither caller nor backend names a difficulty
/// (send/change blocks).
pub const DEFAULT_THRESHOLD: u64 = 0xfffffff8_00000000;

/// Lower threshold accepted for receive/open blocks.
pub const RECEIVE_THRESHOLD: u64 = 0xfffffe00_00000000;

/// `2^64 - value` as a float, without overflowing `u64`.
fn inverse_gap(value: u64) -> f64 {
    (u64::MAX - value) as f64 + 1.0
}

/// Absolute difficulty that is `multiplier` times harder than `base`.
///
/// A zero base means work is disabled and stays zero.
pub fn from_multiplier(base: u64, multiplier: f64) -> u64 {
    if base == 0 || multiplier <= 0.0 {
        return base;
    }
    let scaled = inverse_gap(base) / multiplier;
    if scaled < 1.0 {
        return u64::MAX;
    }
    u64::MAX - (scaled as u64 - 1)
}

/// How many times harder `difficulty` is than `base`.
pub fn to_multiplier(difficulty: u64, base: u64) -> f64 {
    inverse_gap(base) / inverse_gap(difficulty)
}
