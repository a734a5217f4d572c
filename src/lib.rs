//! # ewscan - Elliott Wave scanner
//!
//! Bounded combinatorial search for five-wave Elliott patterns in a price series,
//! structural validation, confidence scoring and trade signal synthesis.
//!
//! ## Quick Start
//!
//! ```rust
//! use ewscan::prelude::*;
//!
//! // Any type implementing OHLCV works; `Bar` is provided for convenience
//! let closes = [100.0, 130.0, 115.0, 170.0, 150.0, 190.0, 180.0];
//! let bars: Vec<Bar> = closes.iter().map(|&p| Bar::new(p, p, p, p)).collect();
//!
//! // Create engine with the default rules (Impulse + Leading Diagonal)
//! let engine = EngineBuilder::new()
//!     .with_default_rules()
//!     .start_range(Ratio::new(0.0).unwrap(), Ratio::new(0.5).unwrap())
//!     .start_step(1)
//!     .build()
//!     .unwrap();
//!
//! // Scan your data
//! let report = engine.scan(&bars).unwrap();
//! assert!(!report.matches.is_empty());
//! for signal in &report.signals {
//!     println!("{:?} @ {:.2} (r/r {:.2})", signal.side, signal.entry_price, signal.risk_reward_ratio);
//! }
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

pub mod params;
pub mod waves;

pub mod prelude {
    pub use crate::{
        // Parameters
        params::{get_count, get_period, get_ratio, ParamMeta, ParamType, Parameterized},
        // Parallel
        scan_parallel,
        // Pipeline
        waves::*,
        // Engine
        Bar,
        Direction,
        EngineBuilder,
        OHLCVExt,
        Period,
        Ratio,
        Result,
        ScanConfig,
        ScanError,
        ScanReport,
        ScanResult,
        SearchSpace,
        WaveEngine,
        // Errors
        WaveError,
        WaveMatch,
        WaveMatches,
        OHLCV,
    };
}

use waves::{
    assemble, rank_signals, score_breakdown, synthesize, BuiltinRule, ConfidenceBreakdown,
    DynWaveRule, ImpulseRule, LeadingDiagonalRule, RuleId, ScoreParams, Signal, SignalParams,
    TruncatedImpulseRule, WaveDirection, WaveOptions, WaveOptionsGenerator, WaveOptionsIter,
    WavePattern,
};

// ============================================================
// ERRORS
// ============================================================

pub type Result<T> = std::result::Result<T, WaveError>;

/// Errors raised at configuration and data boundaries
#[derive(Debug, Clone, thiserror::Error)]
pub enum WaveError {
    #[error("Invalid value: {0}")]
    InvalidValue(&'static str),

    #[error("{field} = {value} out of range [{min}, {max}]")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid OHLCV at index {index}: {reason}")]
    InvalidOHLCV { index: usize, reason: &'static str },
}

// ============================================================
// VALIDATED TYPES
// ============================================================

/// Normalized value in range 0.0..=1.0
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Ratio(f64);

impl Ratio {
    /// Create a new Ratio, validating the value is in [0.0, 1.0]
    pub fn new(value: f64) -> Result<Self> {
        if value.is_nan() || value.is_infinite() {
            return Err(WaveError::InvalidValue("Ratio cannot be NaN or infinite"));
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(WaveError::OutOfRange {
                field: "Ratio",
                value,
                min: 0.0,
                max: 1.0,
            });
        }
        Ok(Self(value))
    }

    /// Create a Ratio from a compile-time constant (library internal use)
    #[doc(hidden)]
    pub const fn new_const(value: f64) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> f64 {
        self.0
    }
}

impl serde::Serialize for Ratio {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Ratio {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = f64::deserialize(d)?;
        Ratio::new(value).map_err(serde::de::Error::custom)
    }
}

/// Period in bars (must be > 0)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Period(usize);

impl Period {
    /// Create a new Period, validating value is > 0
    pub fn new(value: usize) -> Result<Self> {
        if value == 0 {
            return Err(WaveError::InvalidValue("Period must be > 0"));
        }
        Ok(Self(value))
    }

    #[doc(hidden)]
    pub const fn new_const(value: usize) -> Self {
        Self(value)
    }

    #[inline]
    pub fn get(self) -> usize {
        self.0
    }
}

impl serde::Serialize for Period {
    fn serialize<S: serde::Serializer>(&self, s: S) -> std::result::Result<S::Ok, S::Error> {
        self.0.serialize(s)
    }
}

impl<'de> serde::Deserialize<'de> for Period {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> std::result::Result<Self, D::Error> {
        let value = usize::deserialize(d)?;
        Period::new(value).map_err(serde::de::Error::custom)
    }
}

// ============================================================
// OHLCV TRAITS
// ============================================================

/// Core OHLCV data trait
pub trait OHLCV {
    fn open(&self) -> f64;
    fn high(&self) -> f64;
    fn low(&self) -> f64;
    fn close(&self) -> f64;
    fn volume(&self) -> f64;

    fn timestamp(&self) -> Option<i64> {
        None
    }
}

/// Extension trait with consistency checks for OHLCV data
pub trait OHLCVExt: OHLCV {
    /// Validate OHLCV data consistency
    fn validate(&self) -> Result<()> {
        let prices = [self.open(), self.high(), self.low(), self.close()];
        if prices.iter().any(|p| p.is_nan()) {
            return Err(WaveError::InvalidOHLCV {
                index: 0,
                reason: "NaN in OHLCV",
            });
        }
        if prices.iter().any(|p| p.is_infinite()) {
            return Err(WaveError::InvalidOHLCV {
                index: 0,
                reason: "Infinite value in OHLCV",
            });
        }
        if self.high() < self.low() {
            return Err(WaveError::InvalidOHLCV {
                index: 0,
                reason: "high < low",
            });
        }
        Ok(())
    }
}

impl<T: OHLCV> OHLCVExt for T {}

/// Plain OHLCV bar
#[derive(Debug, Clone, Copy, PartialEq, Default, serde::Serialize, serde::Deserialize)]
pub struct Bar {
    /// Open time in milliseconds since the epoch
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp: None,
            open,
            high,
            low,
            close,
            volume: 0.0,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn with_volume(mut self, volume: f64) -> Self {
        self.volume = volume;
        self
    }
}

impl OHLCV for Bar {
    fn open(&self) -> f64 {
        self.open
    }

    fn high(&self) -> f64 {
        self.high
    }

    fn low(&self) -> f64 {
        self.low
    }

    fn close(&self) -> f64 {
        self.close
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn timestamp(&self) -> Option<i64> {
        self.timestamp
    }
}

// ============================================================
// DIRECTION & MATCHES
// ============================================================

/// Trend direction of a five-wave pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Direction {
    /// Starts from a low with an up swing
    Bullish,
    /// Starts from a high with a down swing
    Bearish,
}

impl Direction {
    #[inline]
    pub fn is_bullish(self) -> bool {
        matches!(self, Direction::Bullish)
    }

    #[inline]
    pub fn is_bearish(self) -> bool {
        matches!(self, Direction::Bearish)
    }

    /// +1.0 for bullish, -1.0 for bearish
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            Direction::Bullish => 1.0,
            Direction::Bearish => -1.0,
        }
    }

    /// Direction of wave 1
    #[inline]
    pub fn first_wave(self) -> WaveDirection {
        match self {
            Direction::Bullish => WaveDirection::Up,
            Direction::Bearish => WaveDirection::Down,
        }
    }
}

/// A pattern that satisfied a rule
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct WaveMatch {
    pub pattern: WavePattern,
    pub rule: RuleId,
    /// Quality/confidence score 0.0..=1.0
    pub confidence: f64,
    pub breakdown: ConfidenceBreakdown,
}

// ============================================================
// SCAN CONFIGURATION
// ============================================================

/// Upper bound for `max_skip`; keeps `(max_skip + 1)^5` well inside `usize`
pub const MAX_SKIP_LIMIT: usize = 50;

/// Immutable configuration of a scan
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Largest skip value tried for any wave
    pub max_skip: usize,
    /// Configurations tried per start index, simplest first
    pub max_options: usize,
    /// First start index, as a fraction of the series length
    pub start_fraction: Ratio,
    /// End (exclusive) of the start index range, as a fraction of the series length
    pub end_fraction: Ratio,
    /// Distance between consecutive start indices
    pub start_step: usize,
    /// Stop searching after this many validated patterns
    pub max_patterns: usize,
    /// Pattern directions to search for
    pub trends: Vec<Direction>,
    pub min_confidence: Option<f64>,
    pub min_risk_reward: Option<f64>,
    /// Check every bar for NaN / inverted ranges before scanning
    pub validate_data: bool,
    pub score: ScoreParams,
    pub signal: SignalParams,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_skip: 10,
            max_options: 50,
            start_fraction: Ratio::new_const(0.2),
            end_fraction: Ratio::new_const(0.8),
            start_step: 10,
            max_patterns: 10,
            trends: vec![Direction::Bullish],
            min_confidence: None,
            min_risk_reward: None,
            validate_data: false,
            score: ScoreParams::default(),
            signal: SignalParams::default(),
        }
    }
}

impl ScanConfig {
    /// Check internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.max_skip > MAX_SKIP_LIMIT {
            return Err(WaveError::OutOfRange {
                field: "max_skip",
                value: self.max_skip as f64,
                min: 0.0,
                max: MAX_SKIP_LIMIT as f64,
            });
        }
        if self.max_options == 0 || self.start_step == 0 || self.max_patterns == 0 {
            return Err(WaveError::InvalidConfig(
                "max_options, start_step and max_patterns must be > 0".to_string(),
            ));
        }
        if self.start_fraction.get() >= self.end_fraction.get() {
            return Err(WaveError::InvalidConfig(format!(
                "start_fraction {} must be below end_fraction {}",
                self.start_fraction.get(),
                self.end_fraction.get()
            )));
        }
        if self.trends.is_empty() {
            return Err(WaveError::InvalidConfig("no trend direction selected".to_string()));
        }
        if let Some(min) = self.min_confidence {
            Ratio::new(min)?;
        }
        if let Some(min) = self.min_risk_reward {
            if min.is_nan() || min < 0.0 {
                return Err(WaveError::InvalidValue("min_risk_reward must be >= 0"));
            }
        }
        Ok(())
    }

    /// Start indices searched for a series of `len` bars
    pub fn start_range(&self, len: usize) -> std::ops::Range<usize> {
        let start = (len as f64 * self.start_fraction.get()) as usize;
        let end = (len as f64 * self.end_fraction.get()) as usize;
        start..end.max(start)
    }
}

const SCAN_PARAMS: &[ParamMeta] = &[
    ParamMeta::count("max_skip", 10.0, (0.0, 12.0, 1.0), "Largest skip value tried per wave"),
    ParamMeta::period("max_options", 50.0, (10.0, 200.0, 10.0), "Configurations per start index"),
    ParamMeta::ratio("start_fraction", 0.2, (0.0, 0.5, 0.1), "Start of the start index range"),
    ParamMeta::ratio("end_fraction", 0.8, (0.5, 1.0, 0.1), "End of the start index range"),
    ParamMeta::period("start_step", 10.0, (1.0, 20.0, 1.0), "Distance between start indices"),
    ParamMeta::period("max_patterns", 10.0, (1.0, 50.0, 1.0), "Validated pattern budget"),
    ParamMeta::period(
        "min_wave_duration",
        5.0,
        (1.0, 50.0, 1.0),
        "Bars required for the duration bonus",
    ),
];

use params::{get_count, get_period, get_ratio, ParamMeta, Parameterized};

impl Parameterized for ScanConfig {
    fn param_meta() -> &'static [ParamMeta] {
        SCAN_PARAMS
    }

    /// Signal keys (`completion_window`, `stop_buffer`, ...) are read from the same map.
    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        let config = Self {
            max_skip: get_count(params, "max_skip", 10)?,
            max_options: get_period(params, "max_options", 50)?.get(),
            start_fraction: get_ratio(params, "start_fraction", 0.2)?,
            end_fraction: get_ratio(params, "end_fraction", 0.8)?,
            start_step: get_period(params, "start_step", 10)?.get(),
            max_patterns: get_period(params, "max_patterns", 10)?.get(),
            min_confidence: params.get("min_confidence").copied(),
            min_risk_reward: params.get("min_risk_reward").copied(),
            score: ScoreParams {
                min_wave_duration: get_period(params, "min_wave_duration", 5)?,
            },
            signal: SignalParams::with_params(params)?,
            ..Self::default()
        };
        config.validate()?;
        Ok(config)
    }

    fn param_set_name() -> &'static str {
        "SCAN"
    }
}

// ============================================================
// SEARCH SPACE
// ============================================================

/// Lazy, restartable sequence of `(start_index, configuration)` candidates.
///
/// Start indices advance in the outer loop; for each, the first `max_options`
/// configurations are produced in simplest-first order.
#[derive(Debug, Clone)]
pub struct SearchSpace {
    starts: std::iter::StepBy<std::ops::Range<usize>>,
    current_start: Option<usize>,
    generator: WaveOptionsGenerator,
    options: std::iter::Take<WaveOptionsIter>,
    per_start: usize,
}

impl SearchSpace {
    pub fn new(
        starts: std::ops::Range<usize>,
        step: usize,
        generator: WaveOptionsGenerator,
        max_options: usize,
    ) -> Self {
        Self {
            starts: starts.step_by(step.max(1)),
            current_start: None,
            generator,
            options: generator.iter().take(0),
            per_start: max_options.min(generator.len()),
        }
    }
}

impl Iterator for SearchSpace {
    type Item = (usize, WaveOptions);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(start) = self.current_start {
                if let Some(options) = self.options.next() {
                    return Some((start, options));
                }
            }
            self.current_start = Some(self.starts.next()?);
            self.options = self.generator.iter().take(self.per_start);
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .options
            .len()
            .saturating_add(self.starts.len().saturating_mul(self.per_start));
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SearchSpace {}

// ============================================================
// PATTERN ENGINE
// ============================================================

/// Main wave detection engine
pub struct WaveEngine {
    rules: Vec<BuiltinRule>,
    custom: Vec<Box<dyn DynWaveRule>>,
    config: ScanConfig,
}

impl WaveEngine {
    #[inline]
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Ids of all registered rules, builtin first
    pub fn rule_ids(&self) -> Vec<RuleId> {
        self.rules
            .iter()
            .map(BuiltinRule::id)
            .chain(self.custom.iter().map(|r| r.id()))
            .collect()
    }

    // ===========================================
    // LOW-LEVEL: Single candidate
    // ===========================================

    /// Candidates the engine will consider for a series of `len` bars
    pub fn search_space(&self, len: usize) -> SearchSpace {
        SearchSpace::new(
            self.config.start_range(len),
            self.config.start_step,
            WaveOptionsGenerator::new(self.config.max_skip),
            self.config.max_options,
        )
    }

    /// Assemble one candidate and check it against every rule.
    pub fn find_at<T: OHLCV>(
        &self,
        bars: &[T],
        start_index: usize,
        options: WaveOptions,
        direction: Direction,
    ) -> Vec<WaveMatch> {
        let Some(pattern) = assemble(bars, start_index, options, direction) else {
            return Vec::new();
        };
        self.validated_rules(&pattern)
            .map(|rule| self.make_match(pattern, rule))
            .collect()
    }

    /// First failing predicate of every rule, for diagnostics
    pub fn diagnose(&self, pattern: &WavePattern) -> Vec<(RuleId, Option<&'static str>)> {
        self.rules
            .iter()
            .map(|r| (r.id(), r.first_failure(pattern)))
            .chain(self.custom.iter().map(|r| (r.id(), r.first_failure(pattern))))
            .collect()
    }

    /// Signal for a single match as seen from `current_index`
    pub fn signal_for(&self, m: &WaveMatch, current_price: f64, current_index: usize) -> Option<Signal> {
        synthesize(
            &m.pattern,
            m.rule,
            &m.breakdown,
            current_price,
            current_index,
            &self.config.signal,
        )
    }

    // ===========================================
    // MID-LEVEL: Lazy search
    // ===========================================

    /// Lazily yield validated, de-duplicated matches over the whole search space.
    ///
    /// No budget is applied; combine with `take` for early exit.
    pub fn matches<'a, T: OHLCV>(&'a self, bars: &'a [T]) -> WaveMatches<'a, T> {
        WaveMatches {
            engine: self,
            bars,
            space: self.search_space(bars.len()),
            pending: VecDeque::new(),
            seen: HashSet::new(),
            examined: 0,
        }
    }

    // ===========================================
    // HIGH-LEVEL: Full scan
    // ===========================================

    /// Search the series, stop at the pattern budget, and synthesize signals
    /// against the latest bar.
    pub fn scan<T: OHLCV>(&self, bars: &[T]) -> Result<ScanReport> {
        if self.config.validate_data {
            self.validate_bars(bars)?;
        }
        let Some(last) = bars.last() else {
            return Ok(ScanReport::default());
        };
        let current_index = bars.len() - 1;
        let current_price = last.close();

        let mut search = self.matches(bars);
        log::debug!(
            "scanning {} bars: {} candidates, {} rules",
            bars.len(),
            search.space.len(),
            self.rules.len() + self.custom.len()
        );

        let budget = self.config.max_patterns;
        let mut matches = Vec::new();
        while matches.len() < budget {
            match search.next() {
                Some(m) => matches.push(m),
                None => break,
            }
        }
        let budget_exhausted = matches.len() >= budget;
        if budget_exhausted {
            log::debug!(
                "pattern budget of {} reached after {} candidates",
                budget,
                search.examined()
            );
        }

        let mut signals: Vec<Signal> = matches
            .iter()
            .filter_map(|m| self.signal_for(m, current_price, current_index))
            .filter(|s| s.passes(self.config.min_confidence, self.config.min_risk_reward))
            .collect();
        rank_signals(&mut signals);

        log::debug!(
            "scan complete: {} patterns, {} signals",
            matches.len(),
            signals.len()
        );

        Ok(ScanReport {
            candidates_examined: search.examined(),
            budget_exhausted,
            current_index,
            current_price,
            matches,
            signals,
        })
    }

    // ===========================================
    // Internal helpers
    // ===========================================

    fn validated_rules<'s>(&'s self, pattern: &'s WavePattern) -> impl Iterator<Item = RuleId> + 's {
        self.rules
            .iter()
            .filter(move |r| r.validate(pattern))
            .map(BuiltinRule::id)
            .chain(
                self.custom
                    .iter()
                    .filter(move |r| r.validate(pattern))
                    .map(|r| r.id()),
            )
    }

    fn make_match(&self, pattern: WavePattern, rule: RuleId) -> WaveMatch {
        let breakdown = score_breakdown(&pattern, &self.config.score);
        WaveMatch {
            pattern,
            rule,
            confidence: breakdown.total(),
            breakdown,
        }
    }

    fn validate_bars<T: OHLCV>(&self, bars: &[T]) -> Result<()> {
        for (i, bar) in bars.iter().enumerate() {
            bar.validate().map_err(|e| match e {
                WaveError::InvalidOHLCV { reason, .. } => WaveError::InvalidOHLCV { index: i, reason },
                other => other,
            })?;
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        self.config.validate()?;
        if self.rules.is_empty() && self.custom.is_empty() {
            return Err(WaveError::InvalidConfig("no rules registered".to_string()));
        }
        for r in &self.rules {
            r.validate_config()?;
        }
        for r in &self.custom {
            r.validate_config()?;
        }
        Ok(())
    }
}

// ============================================================
// MATCH ITERATOR
// ============================================================

/// Iterator over validated matches, in search order
pub struct WaveMatches<'a, T: OHLCV> {
    engine: &'a WaveEngine,
    bars: &'a [T],
    space: SearchSpace,
    pending: VecDeque<WaveMatch>,
    seen: HashSet<(Direction, [usize; 6], RuleId)>,
    examined: usize,
}

impl<'a, T: OHLCV> WaveMatches<'a, T> {
    /// Candidates consumed from the search space so far
    pub fn examined(&self) -> usize {
        self.examined
    }
}

impl<'a, T: OHLCV> Iterator for WaveMatches<'a, T> {
    type Item = WaveMatch;

    fn next(&mut self) -> Option<Self::Item> {
        let engine = self.engine;
        loop {
            if let Some(m) = self.pending.pop_front() {
                return Some(m);
            }
            let (start, options) = self.space.next()?;
            self.examined += 1;

            for &direction in &engine.config.trends {
                let Some(pattern) = assemble(self.bars, start, options, direction) else {
                    continue;
                };
                for rule in engine.validated_rules(&pattern) {
                    // Different skip tuples often land on the same pivots
                    if self.seen.insert((direction, pattern.pivot_indices(), rule)) {
                        log::trace!("{rule} at start {start} with {options}");
                        self.pending.push_back(engine.make_match(pattern, rule));
                    }
                }
            }
        }
    }
}

/// Outcome of a full scan
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct ScanReport {
    /// Validated patterns, in search order
    pub matches: Vec<WaveMatch>,
    /// Signals that passed the filters, best first
    pub signals: Vec<Signal>,
    pub candidates_examined: usize,
    /// True when the search stopped at `max_patterns`
    pub budget_exhausted: bool,
    pub current_index: usize,
    pub current_price: f64,
}

// ============================================================
// BUILDER
// ============================================================

/// Builder for creating WaveEngine instances
pub struct EngineBuilder {
    rules: Vec<BuiltinRule>,
    custom: Vec<Box<dyn DynWaveRule>>,
    config: ScanConfig,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EngineBuilder {
    pub fn new() -> Self {
        Self {
            rules: Vec::new(),
            custom: Vec::new(),
            config: ScanConfig::default(),
        }
    }

    /// Impulse and Leading Diagonal with default settings
    pub fn with_default_rules(mut self) -> Self {
        self.rules.extend([
            BuiltinRule::Impulse(ImpulseRule::with_defaults()),
            BuiltinRule::LeadingDiagonal(LeadingDiagonalRule::with_defaults()),
        ]);
        self
    }

    /// Default rules plus Truncated Impulse
    pub fn with_all_rules(self) -> Self {
        self.with_default_rules()
            .add(BuiltinRule::TruncatedImpulse(TruncatedImpulseRule::with_defaults()))
    }

    /// Add a builtin rule
    #[allow(clippy::should_implement_trait)]
    pub fn add(mut self, rule: BuiltinRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add with config validation
    pub fn add_checked(mut self, rule: BuiltinRule) -> Result<Self> {
        rule.validate_config()?;
        self.rules.push(rule);
        Ok(self)
    }

    /// Add a custom rule
    pub fn add_custom<R: DynWaveRule + 'static>(mut self, rule: R) -> Self {
        self.custom.push(Box::new(rule));
        self
    }

    /// Replace the whole scan configuration
    pub fn config(mut self, config: ScanConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_skip(mut self, max_skip: usize) -> Self {
        self.config.max_skip = max_skip;
        self
    }

    pub fn max_options(mut self, max_options: usize) -> Self {
        self.config.max_options = max_options;
        self
    }

    pub fn start_range(mut self, start: Ratio, end: Ratio) -> Self {
        self.config.start_fraction = start;
        self.config.end_fraction = end;
        self
    }

    pub fn start_step(mut self, step: usize) -> Self {
        self.config.start_step = step;
        self
    }

    /// Early-exit budget of validated patterns
    pub fn max_patterns(mut self, max_patterns: usize) -> Self {
        self.config.max_patterns = max_patterns;
        self
    }

    /// Pattern directions to search for
    pub fn trends(mut self, trends: impl IntoIterator<Item = Direction>) -> Self {
        self.config.trends = trends.into_iter().collect();
        self
    }

    /// Drop signals below this confidence
    pub fn min_confidence(mut self, confidence: f64) -> Self {
        self.config.min_confidence = Some(confidence);
        self
    }

    /// Drop signals below this risk/reward ratio
    pub fn min_risk_reward(mut self, ratio: f64) -> Self {
        self.config.min_risk_reward = Some(ratio);
        self
    }

    /// Enable/disable data validation
    pub fn validate_data(mut self, enable: bool) -> Self {
        self.config.validate_data = enable;
        self
    }

    /// Build the engine
    pub fn build(self) -> Result<WaveEngine> {
        let engine = WaveEngine {
            rules: self.rules,
            custom: self.custom,
            config: self.config,
        };
        engine.validate()?;
        Ok(engine)
    }
}

// ============================================================
// PARALLEL SCANNING
// ============================================================

use rayon::prelude::*;

/// Result of scanning a single instrument
#[derive(Debug)]
pub struct ScanResult {
    pub symbol: String,
    pub report: ScanReport,
}

/// Error from scanning a single instrument
#[derive(Debug)]
pub struct ScanError {
    pub symbol: String,
    pub error: WaveError,
}

/// Parallel scanning of multiple instruments
pub fn scan_parallel<'a, T, I>(
    engine: &WaveEngine,
    instruments: I,
) -> (Vec<ScanResult>, Vec<ScanError>)
where
    T: OHLCV + Sync + 'a,
    I: IntoParallelIterator<Item = (&'a str, &'a [T])>,
{
    let results: Vec<_> = instruments
        .into_par_iter()
        .map(|(symbol, bars)| {
            engine
                .scan(bars)
                .map(|report| ScanResult {
                    symbol: symbol.to_string(),
                    report,
                })
                .map_err(|error| ScanError {
                    symbol: symbol.to_string(),
                    error,
                })
        })
        .collect();

    let mut successes = Vec::new();
    let mut errors = Vec::new();

    for result in results {
        match result {
            Ok(r) => successes.push(r),
            Err(e) => errors.push(e),
        }
    }

    (successes, errors)
}

// ============================================================
// TESTS
// ============================================================
