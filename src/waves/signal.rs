//! Trade signal synthesis from scored patterns
//!
//! A pattern produces a signal in two situations, judged against the latest bar:
//!
//! - **Completed**: wave 5 ended within `completion_window` bars and cleared wave 3.
//!   Trade against the pattern (an ABC correction is expected): stop beyond the wave 5
//!   extreme, targets at the wave 4 and wave 1 origins.
//! - **Wave 4 correction**: the latest bar sits within `entry_window` bars of wave 4's
//!   end and price is inside the wave 4 zone. Trade with the pattern for wave 5: stop
//!   beyond the wave 4 extreme, targets at wave 3's extreme and an extension past it.
//!
//! Bullish patterns give SELL / BUY respectively, bearish ones the mirror image.

use std::collections::HashMap;

use super::{
    helpers::beyond,
    options::WaveOptions,
    pattern::WavePattern,
    rules::RuleId,
    score::ConfidenceBreakdown,
};
use crate::{
    params::{get_period, get_ratio, ParamMeta, Parameterized},
    Direction, Period, Ratio, Result,
};

/// Side of the trade a signal proposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum TradeSide {
    Buy,
    Sell,
}

/// Where the latest bar sits relative to a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternPhase {
    /// Wave 5 ended within the completion window
    Completed,
    /// Latest bar is shortly after wave 4's end
    Wave4Correction,
    /// Too old, or not yet reached
    Inactive,
}

/// Signal synthesis parameters
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SignalParams {
    /// Bars after wave 5's end during which the pattern counts as just completed
    pub completion_window: Period,
    /// Bars after wave 4's end during which a wave 5 entry is considered
    pub entry_window: Period,
    /// Stop distance beyond the protective extreme, as a fraction of its price
    pub stop_buffer: Ratio,
    /// Second continuation target beyond wave 3, as a fraction of its price
    pub target_extension: Ratio,
    /// Fraction of wave 3 that must be given back before price is in the wave 4 zone
    pub wave4_zone_ratio: Ratio,
}

impl Default for SignalParams {
    fn default() -> Self {
        Self {
            completion_window: Period::new_const(5),
            entry_window: Period::new_const(2),
            stop_buffer: Ratio::new_const(0.02),
            target_extension: Ratio::new_const(0.1),
            wave4_zone_ratio: Ratio::new_const(0.2),
        }
    }
}

/// Which pattern and rule produced a signal
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Provenance {
    pub rule: RuleId,
    pub pattern_direction: Direction,
    pub options: WaveOptions,
    /// wave1 start followed by each wave's end
    pub pivot_indices: [usize; 6],
}

/// Actionable trade signal derived from a validated pattern
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Signal {
    pub side: TradeSide,
    pub entry_price: f64,
    pub stop_loss: f64,
    pub take_profit_1: f64,
    pub take_profit_2: Option<f64>,
    /// Pattern confidence 0.0..=1.0
    pub confidence: f64,
    /// Reward to the first target over risk to the stop
    pub risk_reward_ratio: f64,
    pub rationale: String,
    pub provenance: Provenance,
}

impl Signal {
    /// True when the signal clears both quality thresholds
    pub fn passes(&self, min_confidence: Option<f64>, min_risk_reward: Option<f64>) -> bool {
        min_confidence.map_or(true, |min| self.confidence >= min)
            && min_risk_reward.map_or(true, |min| self.risk_reward_ratio >= min)
    }
}

/// `|target - entry| / |entry - stop|`, 0.0 when entry and stop coincide
#[inline]
pub fn risk_reward(entry: f64, stop: f64, target: f64) -> f64 {
    let risk = (entry - stop).abs();
    if risk > f64::EPSILON {
        (target - entry).abs() / risk
    } else {
        0.0
    }
}

/// Units to trade so that hitting the stop loses `risk_amount`; 0.0 when entry == stop
#[inline]
pub fn position_size(risk_amount: f64, entry: f64, stop: f64) -> f64 {
    let distance = (entry - stop).abs();
    if distance > f64::EPSILON {
        risk_amount / distance
    } else {
        0.0
    }
}

/// Sort by confidence, then risk/reward, best first
pub fn rank_signals(signals: &mut [Signal]) {
    signals.sort_by(|a, b| {
        b.confidence
            .total_cmp(&a.confidence)
            .then(b.risk_reward_ratio.total_cmp(&a.risk_reward_ratio))
    });
}

/// Classify the latest bar against the pattern
pub fn phase(pattern: &WavePattern, current_index: usize, params: &SignalParams) -> PatternPhase {
    let end = pattern.end_index();
    if current_index >= end && current_index - end < params.completion_window.get() {
        return PatternPhase::Completed;
    }
    let wave4_end = pattern.wave4().end_index;
    if current_index >= wave4_end && current_index <= wave4_end + params.entry_window.get() {
        return PatternPhase::Wave4Correction;
    }
    PatternPhase::Inactive
}

/// Price scaled by `1 + sign * fraction`
#[inline]
fn shifted(price: f64, sign: f64, fraction: f64) -> f64 {
    price * (1.0 + sign * fraction)
}

fn side_for(direction: Direction, with_trend: bool) -> TradeSide {
    match (direction, with_trend) {
        (Direction::Bullish, true) | (Direction::Bearish, false) => TradeSide::Buy,
        (Direction::Bullish, false) | (Direction::Bearish, true) => TradeSide::Sell,
    }
}

/// Build a signal for `pattern` as seen from the bar at `current_index`.
///
/// Returns `None` when the pattern is stale, completed without wave 5 passing wave 3,
/// not yet at a tradeable point, or price sits outside the wave 4 zone.
pub fn synthesize(
    pattern: &WavePattern,
    rule: RuleId,
    breakdown: &ConfidenceBreakdown,
    current_price: f64,
    current_index: usize,
    params: &SignalParams,
) -> Option<Signal> {
    let p = pattern.pivots();
    let sign = pattern.sign();
    let provenance = Provenance {
        rule,
        pattern_direction: pattern.direction,
        options: pattern.options,
        pivot_indices: pattern.pivot_indices(),
    };
    let current_phase = phase(pattern, current_index, params);

    if current_phase == PatternPhase::Completed && beyond(p[5], p[3], sign) {
        let stop_loss = shifted(p[5], sign, params.stop_buffer.get());
        let take_profit_1 = p[4];
        return Some(Signal {
            side: side_for(pattern.direction, false),
            entry_price: current_price,
            stop_loss,
            take_profit_1,
            take_profit_2: Some(p[0]),
            confidence: breakdown.total(),
            risk_reward_ratio: risk_reward(current_price, stop_loss, take_profit_1),
            rationale: format!(
                "Elliott Wave {rule} completion - expect ABC correction ({})",
                breakdown.describe()
            ),
            provenance,
        });
    }

    // A completed pattern never falls through to the wave 5 entry
    if current_phase == PatternPhase::Wave4Correction {
        let zone_edge = p[3] - sign * params.wave4_zone_ratio.get() * pattern.wave3().length();
        let (low, high) = if sign > 0.0 {
            (p[4], zone_edge)
        } else {
            (zone_edge, p[4])
        };
        if current_price >= low && current_price <= high {
            let stop_loss = shifted(p[4], -sign, params.stop_buffer.get());
            let take_profit_1 = p[3];
            return Some(Signal {
                side: side_for(pattern.direction, true),
                entry_price: current_price,
                stop_loss,
                take_profit_1,
                take_profit_2: Some(shifted(p[3], sign, params.target_extension.get())),
                confidence: breakdown.total(),
                risk_reward_ratio: risk_reward(current_price, stop_loss, take_profit_1),
                rationale: format!(
                    "Elliott Wave {rule} wave 4 correction - expect wave 5 ({})",
                    breakdown.describe()
                ),
                provenance,
            });
        }
    }

    None
}

// ============================================================
// PARAMETER METADATA
// ============================================================

const SIGNAL_PARAMS: &[ParamMeta] = &[
    ParamMeta::period(
        "completion_window",
        5.0,
        (1.0, 20.0, 1.0),
        "Bars after wave 5 during which the pattern counts as just completed",
    ),
    ParamMeta::period(
        "entry_window",
        2.0,
        (1.0, 10.0, 1.0),
        "Bars after wave 4 during which a wave 5 entry is considered",
    ),
    ParamMeta::ratio("stop_buffer", 0.02, (0.005, 0.05, 0.005), "Stop distance beyond the extreme"),
    ParamMeta::ratio(
        "target_extension",
        0.1,
        (0.0, 0.3, 0.05),
        "Second continuation target beyond wave 3",
    ),
    ParamMeta::ratio(
        "wave4_zone_ratio",
        0.2,
        (0.0, 0.5, 0.05),
        "Share of wave 3 given back before price enters the wave 4 zone",
    ),
];

impl Parameterized for SignalParams {
    fn param_meta() -> &'static [ParamMeta] {
        SIGNAL_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            completion_window: get_period(params, "completion_window", 5)?,
            entry_window: get_period(params, "entry_window", 2)?,
            stop_buffer: get_ratio(params, "stop_buffer", 0.02)?,
            target_extension: get_ratio(params, "target_extension", 0.1)?,
            wave4_zone_ratio: get_ratio(params, "wave4_zone_ratio", 0.2)?,
        })
    }

    fn param_set_name() -> &'static str {
        "SIGNAL"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        waves::{
            pattern::assemble,
            score::{score_breakdown, ScoreParams},
        },
        Bar,
    };

    fn line(prices: &[f64]) -> Vec<Bar> {
        prices.iter().map(|&p| Bar::new(p, p, p, p)).collect()
    }

    fn pattern_from(prices: &[f64], direction: Direction) -> WavePattern {
        assemble(&line(prices), 0, WaveOptions([0; 5]), direction).unwrap()
    }

    fn bullish() -> WavePattern {
        // pivots 100, 130, 115, 170, 150, 190 at indices 0..=5
        pattern_from(&[100.0, 130.0, 115.0, 170.0, 150.0, 190.0, 180.0], Direction::Bullish)
    }

    fn breakdown(pattern: &WavePattern) -> ConfidenceBreakdown {
        score_breakdown(pattern, &ScoreParams::default())
    }

    #[test]
    fn test_completed_bullish_gives_sell() {
        let pattern = bullish();
        let b = breakdown(&pattern);
        let signal =
            synthesize(&pattern, RuleId("IMPULSE"), &b, 185.0, 6, &SignalParams::default()).unwrap();

        assert_eq!(signal.side, TradeSide::Sell);
        assert!((signal.stop_loss - 193.8).abs() < 1e-9);
        assert_eq!(signal.take_profit_1, 150.0);
        assert_eq!(signal.take_profit_2, Some(100.0));
        assert!((signal.risk_reward_ratio - 35.0 / 8.8).abs() < 1e-9);
        assert_eq!(signal.provenance.rule, RuleId("IMPULSE"));
        assert_eq!(signal.provenance.pivot_indices, [0, 1, 2, 3, 4, 5]);
        assert!(signal.rationale.contains("IMPULSE completion"));
        assert!((signal.confidence - b.total()).abs() < 1e-12);
    }

    #[test]
    fn test_stale_pattern_gives_nothing() {
        let pattern = bullish();
        let b = breakdown(&pattern);
        assert!(synthesize(&pattern, RuleId("IMPULSE"), &b, 185.0, 10, &SignalParams::default()).is_none());
        assert_eq!(phase(&pattern, 10, &SignalParams::default()), PatternPhase::Inactive);
    }

    #[test]
    fn test_truncated_completion_gives_nothing() {
        let pattern =
            pattern_from(&[100.0, 130.0, 115.0, 170.0, 150.0, 165.0, 155.0], Direction::Bullish);
        let b = breakdown(&pattern);
        assert_eq!(phase(&pattern, 6, &SignalParams::default()), PatternPhase::Completed);
        assert!(synthesize(&pattern, RuleId("TRUNCATED_IMPULSE"), &b, 160.0, 6, &SignalParams::default())
            .is_none());
    }

    #[test]
    fn test_truncated_completion_inside_wave4_zone_gives_nothing() {
        // Wave 5 stalls at 155 and the next bar sits at 152, inside [150, 159]
        let pattern =
            pattern_from(&[100.0, 130.0, 115.0, 170.0, 150.0, 155.0, 152.0], Direction::Bullish);
        let b = breakdown(&pattern);
        let params = SignalParams::default();
        assert_eq!(phase(&pattern, 6, &params), PatternPhase::Completed);
        assert!(synthesize(&pattern, RuleId("TRUNCATED_IMPULSE"), &b, 152.0, 6, &params).is_none());
        // The same price one bar earlier, before wave 5 ended, is a wave 4 entry
        assert_eq!(phase(&pattern, 4, &params), PatternPhase::Wave4Correction);
        let entry = synthesize(&pattern, RuleId("TRUNCATED_IMPULSE"), &b, 152.0, 4, &params).unwrap();
        assert_eq!(entry.side, TradeSide::Buy);
    }

    #[test]
    fn test_wave4_correction_gives_buy() {
        let pattern = bullish();
        let b = breakdown(&pattern);
        // Viewed from wave 4's end: zone is [150, 170 - 0.2 * 55 = 159]
        let signal =
            synthesize(&pattern, RuleId("IMPULSE"), &b, 152.0, 4, &SignalParams::default()).unwrap();

        assert_eq!(signal.side, TradeSide::Buy);
        assert!((signal.stop_loss - 147.0).abs() < 1e-9);
        assert_eq!(signal.take_profit_1, 170.0);
        assert!((signal.take_profit_2.unwrap() - 187.0).abs() < 1e-9);
        assert!((signal.risk_reward_ratio - 18.0 / 5.0).abs() < 1e-9);
        assert!(signal.rationale.contains("wave 4 correction"));
    }

    #[test]
    fn test_price_outside_wave4_zone() {
        let pattern = bullish();
        let b = breakdown(&pattern);
        assert!(synthesize(&pattern, RuleId("IMPULSE"), &b, 165.0, 4, &SignalParams::default()).is_none());
        assert!(synthesize(&pattern, RuleId("IMPULSE"), &b, 140.0, 4, &SignalParams::default()).is_none());
    }

    #[test]
    fn test_bearish_mirror() {
        // pivots 200, 170, 185, 130, 150, 110
        let pattern =
            pattern_from(&[200.0, 170.0, 185.0, 130.0, 150.0, 110.0, 120.0], Direction::Bearish);
        let b = breakdown(&pattern);

        let completion =
            synthesize(&pattern, RuleId("IMPULSE"), &b, 115.0, 6, &SignalParams::default()).unwrap();
        assert_eq!(completion.side, TradeSide::Buy);
        assert!((completion.stop_loss - 107.8).abs() < 1e-9);
        assert_eq!(completion.take_profit_1, 150.0);

        // zone is [130 + 0.2 * 55 = 141, 150]
        let continuation =
            synthesize(&pattern, RuleId("IMPULSE"), &b, 145.0, 4, &SignalParams::default()).unwrap();
        assert_eq!(continuation.side, TradeSide::Sell);
        assert!((continuation.stop_loss - 153.0).abs() < 1e-9);
        assert!((continuation.take_profit_2.unwrap() - 117.0).abs() < 1e-9);
    }

    #[test]
    fn test_risk_reward_zero_guard() {
        assert_eq!(risk_reward(100.0, 100.0, 120.0), 0.0);
        assert!((risk_reward(100.0, 95.0, 110.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_position_size() {
        assert!((position_size(200.0, 100.0, 98.0) - 100.0).abs() < 1e-9);
        assert_eq!(position_size(200.0, 100.0, 100.0), 0.0);
    }

    #[test]
    fn test_rank_and_filter() {
        let pattern = bullish();
        let b = breakdown(&pattern);
        let base =
            synthesize(&pattern, RuleId("IMPULSE"), &b, 185.0, 6, &SignalParams::default()).unwrap();

        let mut weak = base.clone();
        weak.confidence = 0.55;
        let mut strong_low_rr = base.clone();
        strong_low_rr.risk_reward_ratio = 1.0;

        let mut signals = vec![weak.clone(), strong_low_rr.clone(), base.clone()];
        rank_signals(&mut signals);
        assert_eq!(signals[0], base);
        assert_eq!(signals[1], strong_low_rr);
        assert_eq!(signals[2], weak);

        assert!(base.passes(Some(0.6), Some(1.2)));
        assert!(!weak.passes(Some(0.6), None));
        assert!(!strong_low_rr.passes(None, Some(1.2)));
        assert!(weak.passes(None, None));
    }

    #[test]
    fn test_signal_params_with_params() {
        let mut params = HashMap::new();
        params.insert("completion_window", 8.0);
        let parsed = SignalParams::with_params(&params).unwrap();
        assert_eq!(parsed.completion_window.get(), 8);
        assert_eq!(parsed.entry_window.get(), 2);

        params.insert("completion_window", 0.0);
        assert!(SignalParams::with_params(&params).is_err());
    }
}
