//! Injectable randomness for the simulator.
//!
//! Every random draw the simulator makes goes through [`RandomSource`], so a
//! session can be replayed from a seed and tests can script exact outcomes.

use rand::Rng;
use rand_pcg::Pcg64;

/// Stream selector shared by every seeded source.
const PCG_STREAM: u128 = 0x0a02_bdbf_7bb3_c0a7;

/// Source of the simulator's random draws.
pub trait RandomSource {
    /// Uniform integer in `[low, high]`. Returns `low` if `high < low`.
    fn int_inclusive(&mut self, low: i64, high: i64) -> i64;

    /// `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool;

    /// Uniform float in `[low, high)`. Returns `low` if the range is empty.
    fn uniform(&mut self, low: f64, high: f64) -> f64;

    /// Uniform index in `[0, len)`. Returns 0 if `len` is 0.
    fn index(&mut self, len: usize) -> usize;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn int_inclusive(&mut self, low: i64, high: i64) -> i64 {
        (**self).int_inclusive(low, high)
    }

    fn chance(&mut self, p: f64) -> bool {
        (**self).chance(p)
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        (**self).uniform(low, high)
    }

    fn index(&mut self, len: usize) -> usize {
        (**self).index(len)
    }
}

/// Deterministic PCG-backed random source.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: Pcg64,
}

impl SeededRandom {
    /// Create a new source with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg64::new(seed.into(), PCG_STREAM),
        }
    }
}

impl RandomSource for SeededRandom {
    fn int_inclusive(&mut self, low: i64, high: i64) -> i64 {
        if high <= low {
            return low;
        }
        self.rng.random_range(low..=high)
    }

    fn chance(&mut self, p: f64) -> bool {
        self.rng.random_bool(p.clamp(0.0, 1.0))
    }

    fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low || !low.is_finite() || !high.is_finite() {
            return low;
        }
        self.rng.random_range(low..high)
    }

    fn index(&mut self, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        self.rng.random_range(0..len)
    }
}
