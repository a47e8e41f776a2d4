//! Integration with `rand` (v0.9) crate.

#![cfg(feature = "rand09")]

use super::{PushIdGenerator, RandSource, RetentionError, StdSystemTime};
use rand_core09::RngCore;
use std::time::Duration;

/// An adapter that implements [`RandSource`] for [`RngCore`] types.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct Adapter<T>(/** The wrapped [`RngCore`] type. */ pub T);

impl<T: RngCore> RandSource for Adapter<T> {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }
}

impl<T: RngCore> PushIdGenerator<Adapter<T>> {
    /// Creates a generator object with a specified random number generator that implements
    /// [`RngCore`] from `rand` (v0.9) crate.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(feature = "rand09")]
    /// # {
    /// use pushid::PushIdGenerator;
    /// use rand09::{rngs::StdRng, SeedableRng as _};
    ///
    /// let g = PushIdGenerator::with_rand09(StdRng::seed_from_u64(42));
    /// println!("{}", g.generate());
    /// # }
    /// ```
    pub fn with_rand09(rng: T) -> Self {
        Self::with_rand_and_time_sources(Adapter(rng), StdSystemTime)
    }

    /// Creates a generator object with a specified random number generator that implements
    /// [`RngCore`] from `rand` (v0.9) crate and a retention window.
    ///
    /// # Errors
    ///
    /// Returns an error if `retention` is shorter than one millisecond.
    pub fn with_rand09_and_retention(rng: T, retention: Duration) -> Result<Self, RetentionError> {
        Self::try_with_retention(Adapter(rng), StdSystemTime, retention)
    }
}
