//! Five-wave pattern assembly
//!
//! Chains five alternating monowaves, each starting where the previous one ended.
//! Assembly is pure construction; rule checks happen in [`super::rules`].

use super::{
    helpers::WAVE_COUNT,
    monowave::{find_monowave, MonoWave},
    options::WaveOptions,
};
use crate::{Direction, OHLCV};

/// Five chained, alternating monowaves labelled wave1..wave5.
///
/// Holds indices into the series it was assembled from, never the bars themselves.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct WavePattern {
    pub direction: Direction,
    pub waves: [MonoWave; WAVE_COUNT],
    pub options: WaveOptions,
}

impl WavePattern {
    #[inline]
    pub fn wave1(&self) -> &MonoWave {
        &self.waves[0]
    }

    #[inline]
    pub fn wave2(&self) -> &MonoWave {
        &self.waves[1]
    }

    #[inline]
    pub fn wave3(&self) -> &MonoWave {
        &self.waves[2]
    }

    #[inline]
    pub fn wave4(&self) -> &MonoWave {
        &self.waves[3]
    }

    #[inline]
    pub fn wave5(&self) -> &MonoWave {
        &self.waves[4]
    }

    /// +1.0 for bullish patterns, -1.0 for bearish ones
    #[inline]
    pub fn sign(&self) -> f64 {
        self.direction.sign()
    }

    #[inline]
    pub fn start_index(&self) -> usize {
        self.wave1().start_index
    }

    #[inline]
    pub fn end_index(&self) -> usize {
        self.wave5().end_index
    }

    /// Bars from wave1 start to wave5 end
    #[inline]
    pub fn duration(&self) -> usize {
        self.end_index() - self.start_index()
    }

    /// Pivot prices: wave1 start followed by the end of each wave
    pub fn pivots(&self) -> [f64; WAVE_COUNT + 1] {
        let mut prices = [self.wave1().start_price; WAVE_COUNT + 1];
        for (slot, wave) in prices[1..].iter_mut().zip(&self.waves) {
            *slot = wave.end_price;
        }
        prices
    }

    /// Pivot bar indices, same layout as [`WavePattern::pivots`]
    pub fn pivot_indices(&self) -> [usize; WAVE_COUNT + 1] {
        let mut indices = [self.wave1().start_index; WAVE_COUNT + 1];
        for (slot, wave) in indices[1..].iter_mut().zip(&self.waves) {
            *slot = wave.end_index;
        }
        indices
    }

    /// Lengths of the five waves
    pub fn lengths(&self) -> [f64; WAVE_COUNT] {
        self.waves.map(|w| w.length())
    }
}

/// Assemble a five-wave pattern from `start_index`.
///
/// Bullish patterns start with an up swing from a low, bearish ones with a down swing
/// from a high. Wave `n` uses `options.skip(n)`. Returns `None` as soon as any swing
/// cannot be found.
pub fn assemble<T: OHLCV>(
    bars: &[T],
    start_index: usize,
    options: WaveOptions,
    direction: Direction,
) -> Option<WavePattern> {
    let mut wave_direction = direction.first_wave();
    let mut index = start_index;
    let mut waves = [None; WAVE_COUNT];

    for (n, slot) in waves.iter_mut().enumerate() {
        let wave = find_monowave(bars, index, wave_direction, options.skip(n))?;
        index = wave.end_index;
        wave_direction = wave_direction.opposite();
        *slot = Some(wave);
    }

    let [w1, w2, w3, w4, w5] = waves;
    Some(WavePattern {
        direction,
        waves: [w1?, w2?, w3?, w4?, w5?],
        options,
    })
}
