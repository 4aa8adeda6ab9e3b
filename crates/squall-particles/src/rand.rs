//! Seedable PRNG wrapper used for spawn jitter and particle scatter

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub struct ParticleRng {
    inner: SmallRng,
}

impl ParticleRng {
    /// Deterministic stream, for tests and reproducible captures
    pub fn new(seed: u64) -> Self {
        Self {
            inner: SmallRng::seed_from_u64(seed),
        }
    }

    /// Seeded from the OS
    pub fn from_os() -> Self {
        Self {
            inner: SmallRng::from_os_rng(),
        }
    }

    /// Returns a float in [0, 1)
    pub fn next_f32(&mut self) -> f32 {
        self.inner.random::<f32>()
    }

    /// Returns a float in [min, max); `min` when the range is empty
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.inner.random_range(min..max)
    }

    /// Returns a float in [-0.5, 0.5)
    pub fn centered(&mut self) -> f32 {
        self.next_f32() - 0.5
    }

    /// Returns an index in [0, n); 0 when `n` is 0
    pub fn index(&mut self, n: usize) -> usize {
        if n == 0 {
            return 0;
        }
        self.inner.random_range(0..n)
    }
}

impl Default for ParticleRng {
    fn default() -> Self {
        Self::from_os()
    }
}
