//! Elliott Wave detection pipeline
//!
//! Stages, leaf first:
//!
//! - **monowave**: single monotonic swing from a start bar under a skip tolerance
//! - **options**: lazy enumeration of per-wave skip configurations
//! - **pattern**: five chained, alternating swings
//! - **rules**: structural validation (Impulse, Leading Diagonal, Truncated Impulse)
//! - **score**: confidence in `[0, 1]`
//! - **signal**: trade signal for a pattern near completion

pub mod helpers;

/// Generate `with_defaults()` -> `Self::default()` for multiple rule types.
macro_rules! impl_with_defaults {
  ($($rule:ty),* $(,)?) => {
    $(impl $rule {
      pub fn with_defaults() -> Self { Self::default() }
    })*
  };
}

pub mod monowave;
pub mod options;
pub mod pattern;
pub mod rules;
pub mod score;
pub mod signal;

// Re-export the pipeline for convenience
pub use helpers::*;
pub use monowave::*;
pub use options::*;
pub use pattern::*;
pub use rules::*;
pub use score::*;
pub use signal::*;
