//! Seeded randomness for local choices.
//!
//! Randomness on the table is always *local*: the initiating client picks a
//! die result or a deck permutation and ships the outcome, and the animation
//! jitter every replica plays is never synchronized at all. Seeding still
//! matters for reproducible tests.
//!
//! ```
//! use rust_tabletop::core::TableRng;
//!
//! let mut a = TableRng::new(7);
//! let mut b = TableRng::new(7);
//! assert_eq!(a.gen_index(6), b.gen_index(6));
//! assert_eq!(a.seed(), 7);
//! ```

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// ChaCha8 stream used for die results, deck orders, jitter and relay faults.
#[derive(Clone, Debug)]
pub struct TableRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl TableRng {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Scatter offset in `range`. Empty ranges yield `range.start`.
    pub fn gen_range(&mut self, range: std::ops::Range<i32>) -> i32 {
        if range.is_empty() {
            return range.start;
        }
        self.inner.gen_range(range)
    }

    /// Jitter in `low..=high`. Inverted bounds yield `low`.
    pub fn gen_inclusive(&mut self, low: i32, high: i32) -> i32 {
        if high < low {
            return low;
        }
        self.inner.gen_range(low..=high)
    }

    /// A face or slot below `len`, or `None` when there is nothing to pick.
    pub fn gen_index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.inner.gen_range(0..len))
    }

    /// True with `probability`, clamped to `[0, 1]`.
    pub fn gen_bool(&mut self, probability: f64) -> bool {
        self.inner.gen_bool(probability.clamp(0.0, 1.0))
    }

    /// Permute a deck in place.
    pub fn shuffle<T>(&mut self, deck: &mut [T]) {
        deck.shuffle(&mut self.inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_choices() {
        let mut a = TableRng::new(42);
        let mut b = TableRng::new(42);
        for _ in 0..50 {
            assert_eq!(a.gen_index(6), b.gen_index(6));
            assert_eq!(a.gen_inclusive(-3, 3), b.gen_inclusive(-3, 3));
        }
    }

    #[test]
    fn test_degenerate_ranges() {
        let mut rng = TableRng::new(1);
        assert_eq!(rng.gen_range(5..5), 5);
        assert_eq!(rng.gen_inclusive(3, 1), 3);
        assert_eq!(rng.gen_index(0), None);
        assert_eq!(rng.gen_index(1), Some(0));
    }

    #[test]
    fn test_jitter_stays_in_bounds() {
        let mut rng = TableRng::new(9);
        for _ in 0..200 {
            let v = rng.gen_inclusive(-4, 4);
            assert!((-4..=4).contains(&v));
        }
    }

    #[test]
    fn test_probability_extremes() {
        let mut rng = TableRng::new(3);
        assert!((0..20).all(|_| !rng.gen_bool(0.0)));
        assert!((0..20).all(|_| rng.gen_bool(2.0)));
    }

    #[test]
    fn test_shuffle_is_a_permutation() {
        let mut rng = TableRng::new(42);
        let mut deck: Vec<u32> = (1..=10).collect();
        let original = deck.clone();

        rng.shuffle(&mut deck);

        assert_ne!(deck, original);
        deck.sort_unstable();
        assert_eq!(deck, original);
    }
}
