//! Deterministic random number generation for card numbers and ball draws.
//!
//! A hall seeds one `DrawRng` and derives independent streams per purpose
//! with [`DrawRng::for_context`], so generating an extra card never changes
//! which ball is drawn next (and vice versa).
//!
//! ```
//! use bingo_hall::core::DrawRng;
//!
//! let root = DrawRng::new(42);
//! let mut cards = root.for_context("cards");
//! let mut again = DrawRng::new(42).for_context("cards");
//!
//! assert_eq!(cards.sample_distinct(1..=15, 5), again.sample_distinct(1..=15, 5));
//! ```

use std::hash::{Hash, Hasher};
use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Seeded RNG with per-context streams.
///
/// Uses ChaCha8: fast, and the same seed yields the same sequence on every
/// platform.
#[derive(Clone, Debug)]
pub struct DrawRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl DrawRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create an RNG seeded from the OS.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// The seed this stream was created from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Derive an independent stream for a specific context.
    ///
    /// The same context always produces the same stream from the same seed.
    #[must_use]
    pub fn for_context(&self, context: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;

        let mut hasher = DefaultHasher::new();
        self.seed.hash(&mut hasher);
        context.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Draw `amount` distinct values uniformly from `range`, without replacement.
    ///
    /// Returns fewer values only if the range is smaller than `amount`.
    pub fn sample_distinct(&mut self, range: RangeInclusive<u8>, amount: usize) -> Vec<u8> {
        let (start, end) = (*range.start(), *range.end());
        if end < start {
            return Vec::new();
        }
        let len = usize::from(end - start) + 1;
        rand::seq::index::sample(&mut self.inner, len, amount.min(len))
            .into_iter()
            // idx < len <= 256, and start + idx <= end
            .map(|idx| start + idx as u8)
            .collect()
    }

    /// Choose a random element from a slice.
    #[must_use]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        if slice.is_empty() {
            return None;
        }
        let idx = self.inner.gen_range(0..slice.len());
        slice.get(idx)
    }
}
