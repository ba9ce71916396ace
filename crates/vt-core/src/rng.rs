//! Deterministic random source injected into each universe.
//!
//! # Determinism strategy
//!
//! There is no process-wide default generator.  Every universe is built with
//! its own `SimRng`, and behaviors reach it through their context
//! (`ctx.rng()`), so two universes seeded identically replay identically.
//! A reset re-seeds the generator from [`SimRng::seed`].

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Simulation-level RNG owned by a universe.
///
/// Used only in the single-threaded step loop.  Not `Clone`: copying a
/// generator silently forks the random stream.
pub struct SimRng {
    inner: SmallRng,
    seed:  u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng { inner: SmallRng::seed_from_u64(seed), seed }
    }

    /// The seed this generator was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.inner.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }
}

impl Default for SimRng {
    /// Seed 0.  Prefer an explicit seed in anything that is compared across runs.
    fn default() -> Self {
        SimRng::new(0)
    }
}

impl std::fmt::Debug for SimRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimRng").field("seed", &self.seed).finish_non_exhaustive()
    }
}
