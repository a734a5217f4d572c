//! Common helper functions and thresholds for wave detection
//!
//! Fibonacci zones, price comparison tolerance and the ratio helpers shared by the
//! rule, scoring and signal modules.

// ============================================================
// THRESHOLDS
// ============================================================

/// Relative tolerance used when comparing prices.
/// A bar only extends a swing when it beats the extreme by more than this fraction.
pub const PRICE_TOLERANCE: f64 = 1e-9;

/// Number of waves in an impulsive pattern
pub const WAVE_COUNT: usize = 5;

/// Base confidence of any validated pattern
pub const BASE_CONFIDENCE: f64 = 0.5;
/// Bonus when wave 3 is the longest of 1/3/5
pub const WAVE3_DOMINANCE_BONUS: f64 = 0.20;
/// Bonus when wave 2 retraces inside [`FIB_RETRACE_ZONE`]
pub const WAVE2_FIB_BONUS: f64 = 0.15;
/// Bonus when wave 4 retraces inside [`SHALLOW_RETRACE_ZONE`]
pub const WAVE4_SHALLOW_BONUS: f64 = 0.15;
/// Bonus when the pattern spans at least `min_wave_duration` bars
pub const DURATION_BONUS: f64 = 0.10;

/// Fibonacci retracement zone for wave 2 (0.382 - 0.618)
pub const FIB_RETRACE_ZONE: (f64, f64) = (0.382, 0.618);
/// Shallow correction zone for wave 4 (0.25 - 0.5)
pub const SHALLOW_RETRACE_ZONE: (f64, f64) = (0.25, 0.5);

// ============================================================
// HELPER FUNCTIONS
// ============================================================

/// True when `candidate` lies beyond `extreme` in the given sign
/// (+1.0 = above, -1.0 = below), by more than [`PRICE_TOLERANCE`].
#[inline]
pub fn beyond(candidate: f64, extreme: f64, sign: f64) -> bool {
    let tolerance = extreme.abs().max(1.0) * PRICE_TOLERANCE;
    sign * (candidate - extreme) > tolerance
}

/// Ratio `part / whole`. Returns None if `whole` ≈ 0
#[inline]
pub fn retracement_ratio(part: f64, whole: f64) -> Option<f64> {
    (whole > f64::EPSILON).then(|| part / whole)
}

/// Inclusive zone check
#[inline]
pub fn in_zone(value: f64, zone: (f64, f64)) -> bool {
    value >= zone.0 && value <= zone.1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beyond_respects_sign() {
        assert!(beyond(101.0, 100.0, 1.0));
        assert!(!beyond(99.0, 100.0, 1.0));
        assert!(beyond(99.0, 100.0, -1.0));
        assert!(!beyond(100.0, 100.0, 1.0));
        assert!(!beyond(100.0, 100.0, -1.0));
    }

    #[test]
    fn test_retracement_ratio() {
        assert_eq!(retracement_ratio(15.0, 30.0), Some(0.5));
        assert_eq!(retracement_ratio(1.0, 0.0), None);
    }

    #[test]
    fn test_in_zone_inclusive() {
        assert!(in_zone(0.382, FIB_RETRACE_ZONE));
        assert!(in_zone(0.618, FIB_RETRACE_ZONE));
        assert!(!in_zone(0.62, FIB_RETRACE_ZONE));
    }
}
