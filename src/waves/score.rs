//! Confidence scoring for validated patterns
//!
//! Base score 0.5 plus fixed bonuses for wave 3 dominance, a Fibonacci wave 2
//! retracement, a shallow wave 4 and a minimum overall duration. The total is
//! clamped to `[0, 1]`.

use super::{
    helpers::{
        in_zone, retracement_ratio, BASE_CONFIDENCE, DURATION_BONUS, FIB_RETRACE_ZONE,
        SHALLOW_RETRACE_ZONE, WAVE2_FIB_BONUS, WAVE3_DOMINANCE_BONUS, WAVE4_SHALLOW_BONUS,
    },
    pattern::WavePattern,
};
use crate::Period;

/// Scoring parameters
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoreParams {
    /// Minimum bars from wave1 start to wave5 end for the duration bonus
    pub min_wave_duration: Period,
}

impl Default for ScoreParams {
    fn default() -> Self {
        Self {
            min_wave_duration: Period::new_const(5),
        }
    }
}

/// Which bonuses a pattern earned
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ConfidenceBreakdown {
    pub wave3_dominant: bool,
    pub wave2_fibonacci: bool,
    pub wave4_shallow: bool,
    pub duration_met: bool,
    /// wave2.length / wave1.length
    pub wave2_retracement: Option<f64>,
    /// wave4.length / wave3.length
    pub wave4_retracement: Option<f64>,
}

impl ConfidenceBreakdown {
    /// Total score in `[0, 1]`
    pub fn total(&self) -> f64 {
        let mut score = BASE_CONFIDENCE;
        if self.wave3_dominant {
            score += WAVE3_DOMINANCE_BONUS;
        }
        if self.wave2_fibonacci {
            score += WAVE2_FIB_BONUS;
        }
        if self.wave4_shallow {
            score += WAVE4_SHALLOW_BONUS;
        }
        if self.duration_met {
            score += DURATION_BONUS;
        }
        score.clamp(0.0, 1.0)
    }

    /// Short human-readable list of the bonuses that fired
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.wave3_dominant {
            parts.push("wave 3 longest".to_string());
        }
        if let (true, Some(r)) = (self.wave2_fibonacci, self.wave2_retracement) {
            parts.push(format!("wave 2 retrace {r:.3}"));
        }
        if let (true, Some(r)) = (self.wave4_shallow, self.wave4_retracement) {
            parts.push(format!("wave 4 retrace {r:.3}"));
        }
        if self.duration_met {
            parts.push("duration ok".to_string());
        }
        if parts.is_empty() {
            "no bonuses".to_string()
        } else {
            parts.join(", ")
        }
    }
}

/// Evaluate each bonus condition for `pattern`
pub fn score_breakdown(pattern: &WavePattern, params: &ScoreParams) -> ConfidenceBreakdown {
    let [l1, l2, l3, l4, l5] = pattern.lengths();
    let wave2_retracement = retracement_ratio(l2, l1);
    let wave4_retracement = retracement_ratio(l4, l3);

    ConfidenceBreakdown {
        wave3_dominant: l3 >= l1.max(l5),
        wave2_fibonacci: wave2_retracement.is_some_and(|r| in_zone(r, FIB_RETRACE_ZONE)),
        wave4_shallow: wave4_retracement.is_some_and(|r| in_zone(r, SHALLOW_RETRACE_ZONE)),
        duration_met: pattern.duration() >= params.min_wave_duration.get(),
        wave2_retracement,
        wave4_retracement,
    }
}

/// Confidence score in `[0, 1]`
#[inline]
pub fn score(pattern: &WavePattern, params: &ScoreParams) -> f64 {
    score_breakdown(pattern, params).total()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        waves::{options::WaveOptions, pattern::assemble},
        Bar, Direction,
    };

    fn line(prices: &[f64]) -> Vec<Bar> {
        prices.iter().map(|&p| Bar::new(p, p, p, p)).collect()
    }

    fn pattern_from(prices: &[f64]) -> WavePattern {
        assemble(&line(prices), 0, WaveOptions([0; 5]), Direction::Bullish).unwrap()
    }

    #[test]
    fn test_fibonacci_wave2_bonus() {
        // wave1 = 30, wave2 = 15 -> 0.5
        let pattern = pattern_from(&[100.0, 130.0, 115.0, 170.0, 150.0, 190.0, 180.0]);
        let breakdown = score_breakdown(&pattern, &ScoreParams::default());
        assert!(breakdown.wave2_fibonacci);
        assert_eq!(breakdown.wave2_retracement, Some(0.5));
    }

    #[test]
    fn test_full_score() {
        // lengths 30, 15, 55, 20, 40: wave3 longest, 0.5 and 0.364 retraces, 5 bars
        let pattern = pattern_from(&[100.0, 130.0, 115.0, 170.0, 150.0, 190.0, 180.0]);
        let breakdown = score_breakdown(&pattern, &ScoreParams::default());
        assert!(breakdown.wave3_dominant);
        assert!(breakdown.wave4_shallow);
        assert!(breakdown.duration_met);
        assert!((breakdown.total() - 1.0).abs() < 1e-12);
        assert!((score(&pattern, &ScoreParams::default()) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_duration_threshold() {
        let pattern = pattern_from(&[100.0, 130.0, 115.0, 170.0, 150.0, 190.0, 180.0]);
        let params = ScoreParams {
            min_wave_duration: Period::new(6).unwrap(),
        };
        let breakdown = score_breakdown(&pattern, &params);
        assert!(!breakdown.duration_met);
        // remaining bonuses already reach the cap
        assert!((breakdown.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_base_score_only() {
        // lengths 40, 5, 35, 30, 45: no bonus conditions hold
        let pattern = pattern_from(&[100.0, 140.0, 135.0, 170.0, 140.0, 185.0, 180.0]);
        let params = ScoreParams {
            min_wave_duration: Period::new(50).unwrap(),
        };
        let breakdown = score_breakdown(&pattern, &params);
        assert_eq!(breakdown.describe(), "no bonuses");
        assert!((breakdown.total() - BASE_CONFIDENCE).abs() < 1e-12);
    }

    #[test]
    fn test_describe_lists_bonuses() {
        let pattern = pattern_from(&[100.0, 130.0, 115.0, 170.0, 150.0, 190.0, 180.0]);
        let text = score_breakdown(&pattern, &ScoreParams::default()).describe();
        assert!(text.contains("wave 3 longest"));
        assert!(text.contains("wave 2 retrace 0.500"));
    }
}
