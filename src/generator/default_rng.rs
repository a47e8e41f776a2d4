use std::time::{SystemTime, UNIX_EPOCH};

use rand_chacha::rand_core::{RngCore as _, SeedableRng as _};
use rand_chacha::ChaCha12Rng;

use super::{DefaultRng, RandSource};

impl RandSource for DefaultRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    /// Returns the seed in decimal.
    fn label(&self) -> String {
        self.seed.to_string()
    }
}

impl Default for DefaultRng {
    /// Creates an instance of the default random number generator seeded from the current Unix
    /// time in nanoseconds.
    fn default() -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos() as u64);
        Self::with_seed(seed)
    }
}

impl DefaultRng {
    /// Creates an instance of the default random number generator from a known seed, which
    /// reproduces the same initial entropy.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            inner: ChaCha12Rng::seed_from_u64(seed),
        }
    }

    /// Returns the seed this instance was created with.
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}
