//! Seeded simulation RNG.
//!
//! All randomness in the core flows through [`GameRng`], a PCG32 stream
//! seeded from [`SimConfig::rng_seed`](crate::config::SimConfig::rng_seed).
//! The number of draws taken so far (the *cursor*) is part of the hashed
//! simulation state, so two runs only compare equal if they consumed the
//! same random numbers.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

/// Deterministic random number source with an observable draw cursor.
#[derive(Debug, Clone)]
pub struct GameRng {
    inner: Pcg32,
    seed: u64,
    cursor: u64,
}

impl GameRng {
    /// Create a new RNG from a seed.
    pub fn new(seed: u64) -> Self {
        Self {
            inner: Pcg32::seed_from_u64(seed),
            seed,
            cursor: 0,
        }
    }

    /// Uniform integer in `[low, high)`.
    ///
    /// # Panics
    ///
    /// Panics if `low >= high`.
    pub fn gen_range(&mut self, low: i32, high: i32) -> i32 {
        assert!(low < high, "empty range {low}..{high}");
        self.cursor += 1;
        self.inner.gen_range(low..high)
    }

    /// Number of values drawn since construction.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    /// The seed this RNG was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
