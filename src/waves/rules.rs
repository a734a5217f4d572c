//! Structural rules for five-wave patterns
//!
//! Each rule is a fixed, ordered list of named predicates; a pattern satisfies the
//! rule when every predicate holds. Predicates are written for bullish geometry and
//! mirrored through the pattern's sign, so one rule covers both directions.
//!
//! Rules: IMPULSE, LEADING_DIAGONAL, TRUNCATED_IMPULSE

use std::collections::HashMap;

use super::{helpers::beyond, pattern::WavePattern};
use crate::{
    params::{get_ratio, ParamMeta, Parameterized},
    Ratio, Result,
};

impl_with_defaults!(ImpulseRule, LeadingDiagonalRule, TruncatedImpulseRule);

/// Unique identifier for a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct RuleId(pub &'static str);

impl RuleId {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

/// A single named structural check
pub struct RulePredicate<R: 'static> {
    pub name: &'static str,
    pub check: fn(&R, &WavePattern) -> bool,
}

/// Generic rule trait - for concrete types
pub trait WaveRule: Send + Sync + Sized + 'static {
    fn id(&self) -> RuleId;

    /// Ordered predicate list, evaluated front to back
    fn predicates(&self) -> &'static [RulePredicate<Self>];

    /// Name of the first predicate the pattern fails, if any
    fn first_failure(&self, pattern: &WavePattern) -> Option<&'static str> {
        self.predicates()
            .iter()
            .find(|p| !(p.check)(self, pattern))
            .map(|p| p.name)
    }

    fn validate(&self, pattern: &WavePattern) -> bool {
        self.first_failure(pattern).is_none()
    }

    fn validate_config(&self) -> Result<()> {
        Ok(())
    }
}

/// Object-safe rule trait - for custom rules
pub trait DynWaveRule: Send + Sync {
    fn id(&self) -> RuleId;
    fn validate(&self, pattern: &WavePattern) -> bool;
    fn first_failure(&self, pattern: &WavePattern) -> Option<&'static str>;
    fn validate_config(&self) -> Result<()>;
}

impl<R: WaveRule> DynWaveRule for R {
    fn id(&self) -> RuleId {
        WaveRule::id(self)
    }

    fn validate(&self, pattern: &WavePattern) -> bool {
        WaveRule::validate(self, pattern)
    }

    fn first_failure(&self, pattern: &WavePattern) -> Option<&'static str> {
        WaveRule::first_failure(self, pattern)
    }

    fn validate_config(&self) -> Result<()> {
        WaveRule::validate_config(self)
    }
}

// ============================================================
// SHARED PREDICATES
// ============================================================
// Pivots: p0 = wave1 start, pN = end of wave N.

/// Wave 2 does not retrace past the start of wave 1
fn wave2_within_wave1(pattern: &WavePattern) -> bool {
    let p = pattern.pivots();
    beyond(p[2], p[0], pattern.sign())
}

/// Wave 3 travels past the end of wave 1
fn wave3_beyond_wave1(pattern: &WavePattern) -> bool {
    let p = pattern.pivots();
    beyond(p[3], p[1], pattern.sign())
}

fn wave3_not_shortest(pattern: &WavePattern) -> bool {
    let [l1, _, l3, _, l5] = pattern.lengths();
    !(l3 < l1 && l3 < l5)
}

/// Wave 4 stays out of wave 1's price territory
fn wave4_no_overlap(pattern: &WavePattern) -> bool {
    let p = pattern.pivots();
    beyond(p[4], p[1], pattern.sign())
}

/// Wave 4 does not retrace all of wave 3
fn wave4_within_wave3(pattern: &WavePattern) -> bool {
    let p = pattern.pivots();
    beyond(p[4], p[2], pattern.sign())
}

fn wave5_beyond_wave3(pattern: &WavePattern) -> bool {
    let p = pattern.pivots();
    beyond(p[5], p[3], pattern.sign())
}

// ============================================================
// IMPULSE
// ============================================================

/// Classic motive wave: no wave 1/4 overlap, wave 3 never the shortest
#[derive(Debug, Clone, Default)]
pub struct ImpulseRule;

static IMPULSE_PREDICATES: &[RulePredicate<ImpulseRule>] = &[
    RulePredicate {
        name: "wave2_within_wave1",
        check: |_, p| wave2_within_wave1(p),
    },
    RulePredicate {
        name: "wave3_beyond_wave1",
        check: |_, p| wave3_beyond_wave1(p),
    },
    RulePredicate {
        name: "wave3_not_shortest",
        check: |_, p| wave3_not_shortest(p),
    },
    RulePredicate {
        name: "wave4_no_overlap",
        check: |_, p| wave4_no_overlap(p),
    },
    RulePredicate {
        name: "wave5_beyond_wave3",
        check: |_, p| wave5_beyond_wave3(p),
    },
];

impl WaveRule for ImpulseRule {
    fn id(&self) -> RuleId {
        RuleId("IMPULSE")
    }

    fn predicates(&self) -> &'static [RulePredicate<Self>] {
        IMPULSE_PREDICATES
    }
}

// ============================================================
// LEADING DIAGONAL
// ============================================================

/// Wedge-shaped motive wave: wave 4 may overlap wave 1, but the impulse legs
/// must contract (each of waves 3 and 5 no longer than the one before it).
#[derive(Debug, Clone)]
pub struct LeadingDiagonalRule {
    /// How much longer than the previous impulse leg a leg may be and still
    /// count as converging
    pub convergence_tolerance: Ratio,
}

impl Default for LeadingDiagonalRule {
    fn default() -> Self {
        Self {
            convergence_tolerance: Ratio::new_const(0.1),
        }
    }
}

impl LeadingDiagonalRule {
    fn converging(&self, pattern: &WavePattern) -> bool {
        let [l1, _, l3, _, l5] = pattern.lengths();
        let slack = 1.0 + self.convergence_tolerance.get();
        l3 <= l1 * slack && l5 <= l3 * slack
    }
}

static LEADING_DIAGONAL_PREDICATES: &[RulePredicate<LeadingDiagonalRule>] = &[
    RulePredicate {
        name: "wave2_within_wave1",
        check: |_, p| wave2_within_wave1(p),
    },
    RulePredicate {
        name: "wave3_beyond_wave1",
        check: |_, p| wave3_beyond_wave1(p),
    },
    RulePredicate {
        name: "wave3_not_shortest",
        check: |_, p| wave3_not_shortest(p),
    },
    RulePredicate {
        name: "wave4_within_wave3",
        check: |_, p| wave4_within_wave3(p),
    },
    RulePredicate {
        name: "wave5_beyond_wave3",
        check: |_, p| wave5_beyond_wave3(p),
    },
    RulePredicate {
        name: "converging_impulse_legs",
        check: LeadingDiagonalRule::converging,
    },
];

impl WaveRule for LeadingDiagonalRule {
    fn id(&self) -> RuleId {
        RuleId("LEADING_DIAGONAL")
    }

    fn predicates(&self) -> &'static [RulePredicate<Self>] {
        LEADING_DIAGONAL_PREDICATES
    }
}

// ============================================================
// TRUNCATED IMPULSE
// ============================================================

/// Impulse whose fifth wave fails to clear the end of wave 3.
///
/// Kept separate from [`ImpulseRule`] so callers opt in to truncation explicitly.
#[derive(Debug, Clone, Default)]
pub struct TruncatedImpulseRule;

static TRUNCATED_IMPULSE_PREDICATES: &[RulePredicate<TruncatedImpulseRule>] = &[
    RulePredicate {
        name: "wave2_within_wave1",
        check: |_, p| wave2_within_wave1(p),
    },
    RulePredicate {
        name: "wave3_beyond_wave1",
        check: |_, p| wave3_beyond_wave1(p),
    },
    RulePredicate {
        name: "wave3_not_shortest",
        check: |_, p| wave3_not_shortest(p),
    },
    RulePredicate {
        name: "wave4_no_overlap",
        check: |_, p| wave4_no_overlap(p),
    },
    RulePredicate {
        name: "wave5_truncated",
        check: |_, p| !wave5_beyond_wave3(p),
    },
];

impl WaveRule for TruncatedImpulseRule {
    fn id(&self) -> RuleId {
        RuleId("TRUNCATED_IMPULSE")
    }

    fn predicates(&self) -> &'static [RulePredicate<Self>] {
        TRUNCATED_IMPULSE_PREDICATES
    }
}

// ============================================================
// BUILTIN RULES - generated via macro
// ============================================================

macro_rules! define_builtin_rules {
    (
        $(
            $variant:ident($rule:ty)
        ),* $(,)?
    ) => {
        /// All builtin rules - enum dispatch
        #[derive(Debug, Clone)]
        pub enum BuiltinRule {
            $($variant($rule)),*
        }

        impl BuiltinRule {
            #[inline]
            pub fn id(&self) -> RuleId {
                match self {
                    $(Self::$variant(r) => WaveRule::id(r)),*
                }
            }

            #[inline]
            pub fn validate(&self, pattern: &WavePattern) -> bool {
                match self {
                    $(Self::$variant(r) => WaveRule::validate(r, pattern)),*
                }
            }

            pub fn first_failure(&self, pattern: &WavePattern) -> Option<&'static str> {
                match self {
                    $(Self::$variant(r) => WaveRule::first_failure(r, pattern)),*
                }
            }

            pub fn validate_config(&self) -> Result<()> {
                match self {
                    $(Self::$variant(r) => WaveRule::validate_config(r)),*
                }
            }
        }
    };
}

define_builtin_rules! {
    Impulse(ImpulseRule),
    LeadingDiagonal(LeadingDiagonalRule),
    TruncatedImpulse(TruncatedImpulseRule),
}

/// Check a pattern against a rule
#[inline]
pub fn validate(pattern: &WavePattern, rule: &BuiltinRule) -> bool {
    rule.validate(pattern)
}

// ============================================================
// PARAMETER METADATA
// ============================================================

const LEADING_DIAGONAL_PARAMS: &[ParamMeta] = &[ParamMeta::ratio(
    "convergence_tolerance",
    0.1,
    (0.0, 0.3, 0.05),
    "Allowed growth of an impulse leg over the previous one",
)];

impl Parameterized for LeadingDiagonalRule {
    fn param_meta() -> &'static [ParamMeta] {
        LEADING_DIAGONAL_PARAMS
    }

    fn with_params(params: &HashMap<&str, f64>) -> Result<Self> {
        Ok(Self {
            convergence_tolerance: get_ratio(params, "convergence_tolerance", 0.1)?,
        })
    }

    fn param_set_name() -> &'static str {
        "LEADING_DIAGONAL"
    }
}
