//! Wave configurations: one skip value per wave
//!
//! The generator enumerates every 5-tuple with components in `[0, max_skip]`, ordered
//! by ascending total skip and then lexicographically, so the simplest (shortest
//! horizon) wave counts are tried first. Enumeration is lazy; nothing beyond the
//! current tuple is materialised.

use std::fmt;

use super::helpers::WAVE_COUNT;

/// Skip value for each of the five waves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
pub struct WaveOptions(pub [usize; WAVE_COUNT]);

impl WaveOptions {
    #[inline]
    pub fn values(&self) -> [usize; WAVE_COUNT] {
        self.0
    }

    /// Sum of all skip values
    #[inline]
    pub fn total_skip(&self) -> usize {
        self.0.iter().sum()
    }

    /// Skip value of wave `n` (0-based)
    #[inline]
    pub fn skip(&self, n: usize) -> usize {
        self.0[n]
    }
}

impl fmt::Display for WaveOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

/// Restartable description of the configuration space `[0, max_skip]^5`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaveOptionsGenerator {
    max_skip: usize,
}

impl WaveOptionsGenerator {
    pub fn new(max_skip: usize) -> Self {
        Self { max_skip }
    }

    #[inline]
    pub fn max_skip(&self) -> usize {
        self.max_skip
    }

    /// Total number of configurations: `(max_skip + 1)^5`, saturating at `usize::MAX`
    pub fn len(&self) -> usize {
        self.max_skip
            .checked_add(1)
            .and_then(|n| n.checked_pow(WAVE_COUNT as u32))
            .unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// Fresh iterator starting at `[0, 0, 0, 0, 0]`
    pub fn iter(&self) -> WaveOptionsIter {
        WaveOptionsIter {
            max_skip: self.max_skip,
            current: Some([0; WAVE_COUNT]),
            remaining: self.len(),
        }
    }
}

impl IntoIterator for &WaveOptionsGenerator {
    type Item = WaveOptions;
    type IntoIter = WaveOptionsIter;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Lazy iterator over configurations in (total skip, lexicographic) order
#[derive(Debug, Clone)]
pub struct WaveOptionsIter {
    max_skip: usize,
    current: Option<[usize; WAVE_COUNT]>,
    remaining: usize,
}

impl WaveOptionsIter {
    /// Lexicographically smallest tuple with the given sum: fill from the right.
    fn smallest_with_sum(&self, mut sum: usize) -> [usize; WAVE_COUNT] {
        let mut values = [0; WAVE_COUNT];
        for slot in values.iter_mut().rev() {
            let take = sum.min(self.max_skip);
            *slot = take;
            sum -= take;
        }
        values
    }

    /// Next tuple with the same sum in lexicographic order, if any
    fn next_same_sum(&self, values: [usize; WAVE_COUNT]) -> Option<[usize; WAVE_COUNT]> {
        let mut suffix_sum = values[WAVE_COUNT - 1];
        for i in (0..WAVE_COUNT - 1).rev() {
            if values[i] < self.max_skip && suffix_sum > 0 {
                let mut next = values;
                next[i] += 1;
                let mut rest = suffix_sum - 1;
                for slot in next[i + 1..].iter_mut().rev() {
                    let take = rest.min(self.max_skip);
                    *slot = take;
                    rest -= take;
                }
                return Some(next);
            }
            suffix_sum += values[i];
        }
        None
    }

    fn successor(&self, values: [usize; WAVE_COUNT]) -> Option<[usize; WAVE_COUNT]> {
        if let Some(next) = self.next_same_sum(values) {
            return Some(next);
        }
        let sum: usize = values.iter().sum();
        (sum < self.max_skip.saturating_mul(WAVE_COUNT)).then(|| self.smallest_with_sum(sum + 1))
    }
}

impl Iterator for WaveOptionsIter {
    type Item = WaveOptions;

    fn next(&mut self) -> Option<Self::Item> {
        let values = self.current?;
        self.current = self.successor(values);
        self.remaining = self.remaining.saturating_sub(1);
        Some(WaveOptions(values))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for WaveOptionsIter {}

impl std::iter::FusedIterator for WaveOptionsIter {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_count_matches_cross_product() {
        for max_skip in 0..4 {
            let generator = WaveOptionsGenerator::new(max_skip);
            assert_eq!(generator.iter().count(), (max_skip + 1).pow(5));
            assert_eq!(generator.iter().len(), generator.len());
        }
    }

    #[test]
    fn test_ordering_by_sum_then_lexicographic() {
        let options: Vec<_> = WaveOptionsGenerator::new(1).iter().take(7).collect();
        assert_eq!(options[0], WaveOptions([0, 0, 0, 0, 0]));
        assert_eq!(options[1], WaveOptions([0, 0, 0, 0, 1]));
        assert_eq!(options[2], WaveOptions([0, 0, 0, 1, 0]));
        assert_eq!(options[5], WaveOptions([1, 0, 0, 0, 0]));
        assert_eq!(options[6], WaveOptions([0, 0, 0, 1, 1]));
    }

    #[test]
    fn test_respects_bounds_and_is_sorted() {
        let options: Vec<_> = WaveOptionsGenerator::new(3).iter().collect();
        assert!(options.iter().all(|o| o.values().iter().all(|&v| v <= 3)));
        assert!(options
            .windows(2)
            .all(|w| (w[0].total_skip(), w[0].0) < (w[1].total_skip(), w[1].0)));
        assert_eq!(options.last(), Some(&WaveOptions([3; 5])));
    }

    #[test]
    fn test_restartable() {
        let generator = WaveOptionsGenerator::new(2);
        let first: Vec<_> = generator.iter().take(20).collect();
        let second: Vec<_> = (&generator).into_iter().take(20).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_huge_max_skip_saturates() {
        let generator = WaveOptionsGenerator::new(usize::MAX);
        assert_eq!(generator.len(), usize::MAX);
        let options: Vec<_> = generator.iter().take(3).collect();
        assert_eq!(
            options,
            vec![
                WaveOptions([0, 0, 0, 0, 0]),
                WaveOptions([0, 0, 0, 0, 1]),
                WaveOptions([0, 0, 0, 1, 0]),
            ]
        );
    }

    #[test]
    fn test_zero_max_skip_yields_single_option() {
        let options: Vec<_> = WaveOptionsGenerator::new(0).iter().collect();
        assert_eq!(options, vec![WaveOptions([0; 5])]);
    }

    #[test]
    fn test_display() {
        assert_eq!(WaveOptions([1, 0, 2, 0, 0]).to_string(), "[1, 0, 2, 0, 0]");
    }
}
