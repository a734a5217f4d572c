//! Monowave (pivot segment) detection
//!
//! A monowave is a single monotonic swing between two extrema. The finder walks
//! forward from a start bar, following the running extreme (highest high for an up
//! swing, lowest low for a down swing). Bars that fail to extend the extreme are
//! reversals; up to `skip` consecutive reversals are absorbed as noise, one more
//! terminates the swing at the last confirmed extreme.
//!
//! `skip = 0` ends the swing at the first reversal (short horizon), larger values
//! merge intervening corrections into one longer swing.

use super::helpers::beyond;
use crate::OHLCV;

/// Direction of a single swing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum WaveDirection {
    Up,
    Down,
}

impl WaveDirection {
    /// +1.0 for up swings, -1.0 for down swings
    #[inline]
    pub fn sign(self) -> f64 {
        match self {
            WaveDirection::Up => 1.0,
            WaveDirection::Down => -1.0,
        }
    }

    #[inline]
    pub fn opposite(self) -> Self {
        match self {
            WaveDirection::Up => WaveDirection::Down,
            WaveDirection::Down => WaveDirection::Up,
        }
    }

    /// Price a swing in this direction starts from (low for up, high for down)
    #[inline]
    fn origin_price<T: OHLCV>(self, bar: &T) -> f64 {
        match self {
            WaveDirection::Up => bar.low(),
            WaveDirection::Down => bar.high(),
        }
    }

    /// Price a swing in this direction extends with (high for up, low for down)
    #[inline]
    fn extreme_price<T: OHLCV>(self, bar: &T) -> f64 {
        match self {
            WaveDirection::Up => bar.high(),
            WaveDirection::Down => bar.low(),
        }
    }
}

/// A single monotonic price swing
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MonoWave {
    pub direction: WaveDirection,
    pub start_index: usize,
    pub start_price: f64,
    pub end_index: usize,
    pub end_price: f64,
    /// Skip tolerance the swing was found with
    pub skip: usize,
}

impl MonoWave {
    /// Absolute price distance covered by the swing
    #[inline]
    pub fn length(&self) -> f64 {
        (self.end_price - self.start_price).abs()
    }

    /// Number of bars between start and end
    #[inline]
    pub fn duration(&self) -> usize {
        self.end_index - self.start_index
    }

    #[inline]
    pub fn high(&self) -> f64 {
        self.start_price.max(self.end_price)
    }

    #[inline]
    pub fn low(&self) -> f64 {
        self.start_price.min(self.end_price)
    }
}

/// Find the monowave starting at `start_index` in `direction`, absorbing up to `skip`
/// consecutive reversal bars.
///
/// Returns `None` when the start is out of range, when no bar ever extends past the
/// starting price, or when the series ends on the extreme itself (no reversal has
/// confirmed it yet).
pub fn find_monowave<T: OHLCV>(
    bars: &[T],
    start_index: usize,
    direction: WaveDirection,
    skip: usize,
) -> Option<MonoWave> {
    if start_index >= bars.len().saturating_sub(1) {
        return None;
    }
    let sign = direction.sign();
    let start_price = direction.origin_price(&bars[start_index]);

    let mut extreme = start_price;
    let mut extreme_index = None;
    let mut reversals = 0usize;

    for (index, bar) in bars.iter().enumerate().skip(start_index + 1) {
        let price = direction.extreme_price(bar);
        if beyond(price, extreme, sign) {
            extreme = price;
            extreme_index = Some(index);
            reversals = 0;
        } else if extreme_index.is_some() {
            // Bars before the first extension do not count: the swing has not begun.
            reversals += 1;
            if reversals > skip {
                break;
            }
        }
    }

    let end_index = extreme_index?;
    if reversals == 0 {
        return None;
    }

    Some(MonoWave {
        direction,
        start_index,
        start_price,
        end_index,
        end_price: extreme,
        skip,
    })
}
