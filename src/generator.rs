//! Push-style ID generator and related items.

use crate::{PushId, DEFAULT_TIMESTAMP_DIGITS, ENTROPY_DIGITS, MAX_TIMESTAMP_DIGITS};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use std::{error, fmt};

#[cfg(feature = "default_rng")]
mod default_rng;

pub mod with_rand08;
pub mod with_rand09;

#[cfg(test)]
mod tests;

/// The maximum amount of clock rollback, in milliseconds, that the generator absorbs by reusing the
/// previous timestamp.
pub const ROLLBACK_ALLOWANCE: u64 = 10_000;

/// Represents a push-style ID generator.
///
/// The generator encodes the current Unix time in milliseconds into a sortable prefix and appends
/// a six-digit entropy segment. The entropy segment is randomly initialized once when the
/// generator is created and then works as a counter: it is incremented by one whenever an ID is
/// generated within the same timestamp as the previous one, so that IDs keep ascending within a
/// millisecond.
///
/// The state is guarded by an internal lock, so a generator can be shared between threads (e.g.,
/// through [`std::sync::Arc`] or a `static`) and the IDs it returns are strictly ascending in the
/// order the callers acquire the lock.
///
/// The entropy counter has `64^6` (about 6.8e10) values per timestamp. If more IDs than that are
/// generated within a single millisecond, the counter wraps around and the order is lost.
///
/// # Retention window
///
/// A generator constructed with a retention window encodes the timestamp modulo the window length.
/// This shortens IDs to the minimum number of digits needed to represent the window, at the cost
/// of the timestamp segment being reused once the window elapses.
///
/// # Examples
///
/// ```rust
/// # #[cfg(feature = "default_rng")]
/// # {
/// use pushid::PushIdGenerator;
/// use std::time::Duration;
///
/// let g = PushIdGenerator::new();
/// let x = g.generate();
/// let y = g.generate();
/// assert_eq!(x.len(), 14);
/// assert!(x < y);
///
/// let g = PushIdGenerator::with_retention(Duration::from_secs(3600))?;
/// assert_eq!(g.generate().len(), 10);
/// # }
/// # Ok::<(), pushid::RetentionError>(())
/// ```
#[derive(Debug)]
pub struct PushIdGenerator<R = DefaultRng, T = StdSystemTime> {
    rand_source: R,
    timestamp_digits: usize,
    retention_ms: Option<u64>,
    state: Mutex<State<T>>,
}

/// The mutable part of a generator, updated under the lock on every generation.
#[derive(Debug)]
struct State<T> {
    time_source: T,
    /// The raw clock reading of the last generation, used to detect clock rollbacks.
    ts_last_raw: u64,
    /// The (possibly wrapped) timestamp encoded in the last ID.
    bucket_last: Option<u64>,
    /// Entropy digits, least significant first.
    entropy: [u8; ENTROPY_DIGITS],
}

impl<R: RandSource, T: TimeSource> PushIdGenerator<R, T> {
    /// Creates a generator object with specified random number generator and system clock.
    ///
    /// The random number generator is consulted only here, to draw the initial entropy digits.
    pub fn with_rand_and_time_sources(rand_source: R, time_source: T) -> Self {
        Self::with_timestamp_digits(rand_source, time_source, DEFAULT_TIMESTAMP_DIGITS, None)
    }

    /// Creates a generator object that wraps the timestamp around every `retention`.
    ///
    /// # Errors
    ///
    /// Returns an error if `retention` is shorter than one millisecond.
    pub fn try_with_retention(
        rand_source: R,
        time_source: T,
        retention: Duration,
    ) -> Result<Self, RetentionError> {
        let retention_ms = u64::try_from(retention.as_millis()).unwrap_or(u64::MAX);
        if retention_ms == 0 {
            return Err(RetentionError { retention });
        }

        let timestamp_digits = digits_for_retention(retention_ms);
        Ok(Self::with_timestamp_digits(
            rand_source,
            time_source,
            timestamp_digits,
            Some(retention_ms),
        ))
    }

    fn with_timestamp_digits(
        mut rand_source: R,
        time_source: T,
        timestamp_digits: usize,
        retention_ms: Option<u64>,
    ) -> Self {
        let mut entropy = [0u8; ENTROPY_DIGITS];
        for e in entropy.iter_mut() {
            *e = rand_source.next_digit();
        }

        Self {
            rand_source,
            timestamp_digits,
            retention_ms,
            state: Mutex::new(State {
                time_source,
                ts_last_raw: 0,
                bucket_last: None,
                entropy,
            }),
        }
    }

    /// Generates a new push-style ID object from the current time.
    ///
    /// This method is thread-safe: concurrent callers are serialized by the internal lock and
    /// receive strictly ascending IDs in the order they acquire it.
    pub fn generate(&self) -> PushId {
        let (bucket, entropy) = {
            let mut state = self.lock_state();
            let unix_ts_ms = state.time_source.unix_ts_ms();
            self.advance(&mut state, unix_ts_ms)
        };
        PushId::from_fields(bucket, self.timestamp_digits, entropy)
    }

    /// Generates a new push-style ID object from the `unix_ts_ms` passed.
    ///
    /// A `unix_ts_ms` smaller than the one previously passed by up to [`ROLLBACK_ALLOWANCE`] is
    /// treated as the previous one. If the clock goes back further, the new `unix_ts_ms` is
    /// accepted as is, breaking the increasing order of IDs.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pushid::{PushIdGenerator, RandSource, StdSystemTime};
    ///
    /// struct Counting(u32);
    /// impl RandSource for Counting {
    ///     fn next_u32(&mut self) -> u32 {
    ///         self.0 += 1;
    ///         self.0 << 26
    ///     }
    /// }
    ///
    /// let g = PushIdGenerator::with_rand_and_time_sources(Counting(0), StdSystemTime);
    /// assert_eq!(g.generate_with_ts(1_700_000_000_000).as_str(), "-NjEtLV-543210");
    /// assert_eq!(g.generate_with_ts(1_700_000_000_000).as_str(), "-NjEtLV-543211");
    /// assert_eq!(g.generate_with_ts(1_700_000_000_001).as_str(), "-NjEtLV0543211");
    /// ```
    pub fn generate_with_ts(&self, unix_ts_ms: u64) -> PushId {
        let (bucket, entropy) = self.advance(&mut self.lock_state(), unix_ts_ms);
        PushId::from_fields(bucket, self.timestamp_digits, entropy)
    }

    /// Updates the state with a clock reading and returns the timestamp and entropy field values
    /// of the next ID.
    fn advance(&self, state: &mut State<T>, unix_ts_ms: u64) -> (u64, u64) {
        let mut ts = unix_ts_ms;
        if ts < state.ts_last_raw {
            if ts.saturating_add(ROLLBACK_ALLOWANCE) >= state.ts_last_raw {
                ts = state.ts_last_raw;
            } else {
                #[cfg(feature = "log")]
                log::warn!(
                    "pushid: clock went backwards by {} ms; increasing order of IDs is lost",
                    state.ts_last_raw - ts
                );
            }
        }

        let bucket = match self.retention_ms {
            Some(retention_ms) => ts % retention_ms,
            None => ts,
        };

        if state.bucket_last == Some(bucket) && !increment_entropy(&mut state.entropy) {
            #[cfg(feature = "log")]
            log::warn!("pushid: entropy counter overflowed within timestamp {}", bucket);
        }
        state.ts_last_raw = ts;
        state.bucket_last = Some(bucket);

        let entropy = state
            .entropy
            .iter()
            .rev()
            .fold(0u64, |acc, &digit| (acc << 6) | u64::from(digit));
        (bucket, entropy)
    }

    /// Locks the state, recovering it from a poisoned lock.
    fn lock_state(&self) -> MutexGuard<'_, State<T>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<R, T> PushIdGenerator<R, T> {
    /// Returns the number of digits in the timestamp segment of generated IDs.
    pub const fn timestamp_digits(&self) -> usize {
        self.timestamp_digits
    }

    /// Returns the length in bytes of generated IDs.
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.timestamp_digits + ENTROPY_DIGITS
    }

    /// Returns the retention window, if any, truncated to whole milliseconds.
    pub fn retention(&self) -> Option<Duration> {
        self.retention_ms.map(Duration::from_millis)
    }
}

impl<R: RandSource, T> PushIdGenerator<R, T> {
    /// Returns a label identifying the random number generator, for debugging and correlation.
    ///
    /// With [`DefaultRng`] this is the seed in decimal; other sources return an empty string
    /// unless they override [`RandSource::label`].
    pub fn debug_label(&self) -> String {
        self.rand_source.label()
    }
}

impl<R: RandSource, T: TimeSource> Iterator for &PushIdGenerator<R, T> {
    type Item = PushId;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

impl<R: RandSource, T: TimeSource> std::iter::FusedIterator for &PushIdGenerator<R, T> {}

/// Increments little-endian Base64 digits by one, returning `false` if the carry fell off the
/// most significant digit.
fn increment_entropy(entropy: &mut [u8; ENTROPY_DIGITS]) -> bool {
    for digit in entropy.iter_mut() {
        if *digit < 63 {
            *digit += 1;
            return true;
        }
        *digit = 0;
    }
    false
}

/// Returns the smallest number of Base64 digits `n` such that `64^n >= retention_ms`, i.e.,
/// `ceil(log2(retention_ms) / 6)`, clamped to at least one digit.
fn digits_for_retention(retention_ms: u64) -> usize {
    let bits = u64::BITS - (retention_ms - 1).leading_zeros();
    ((bits as usize + 5) / 6).clamp(1, MAX_TIMESTAMP_DIGITS)
}

/// An error constructing a generator with an unusable retention window.
#[derive(Clone, Debug)]
pub struct RetentionError {
    retention: Duration,
}

impl fmt::Display for RetentionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid retention window: {:?} (expected at least 1ms)",
            self.retention
        )
    }
}

impl error::Error for RetentionError {}

/// A trait that defines the minimum random number generator interface for [`PushIdGenerator`].
pub trait RandSource {
    /// Returns the next random number.
    fn next_u32(&mut self) -> u32;

    /// Returns the next random Base64 digit value, uniformly distributed in `0..64`.
    fn next_digit(&mut self) -> u8 {
        (self.next_u32() >> 26) as u8
    }

    /// Returns a label identifying the random number generator instance, such as its seed.
    fn label(&self) -> String {
        String::new()
    }
}

/// A trait that defines the minimum system clock interface for [`PushIdGenerator`].
pub trait TimeSource {
    /// Returns the current Unix timestamp in milliseconds.
    fn unix_ts_ms(&mut self) -> u64;
}

/// The default [`TimeSource`] that uses [`std::time::SystemTime`].
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct StdSystemTime;

impl TimeSource for StdSystemTime {
    fn unix_ts_ms(&mut self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}

/// The default random number generator used by [`PushIdGenerator`].
///
/// Currently, `DefaultRng` is ChaCha12 seeded once from the nanosecond-resolution system clock.
/// The seed is retained and exposed through [`DefaultRng::seed`] and [`RandSource::label`] so that
/// a generator can be identified in diagnostics. The entropy segment is a collision-avoidance
/// device, not a secret; use an OS-seeded source via the `rand09` adapter if that matters.
#[cfg(feature = "default_rng")]
#[cfg_attr(docsrs, doc(cfg(feature = "default_rng")))]
#[derive(Clone, Debug)]
pub struct DefaultRng {
    seed: u64,
    inner: rand_chacha::ChaCha12Rng,
}

#[cfg(not(feature = "default_rng"))]
#[derive(Debug)]
#[doc(hidden)]
pub enum DefaultRng {}

#[cfg(feature = "default_rng")]
#[cfg_attr(docsrs, doc(cfg(feature = "default_rng")))]
impl Default for PushIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "default_rng")]
#[cfg_attr(docsrs, doc(cfg(feature = "default_rng")))]
impl PushIdGenerator {
    /// Creates a generator object with the default random number generator and system clock.
    ///
    /// Generated IDs have the default eight-digit timestamp segment, enough to represent
    /// millisecond timestamps for several thousand years.
    pub fn new() -> Self {
        let rng = DefaultRng::default();
        #[cfg(feature = "log")]
        log::debug!("pushid: initialized generator with seed {}", rng.seed());
        Self::with_rand_and_time_sources(rng, StdSystemTime)
    }

    /// Creates a generator object with the default random number generator and system clock that
    /// wraps the timestamp around every `retention`.
    ///
    /// # Errors
    ///
    /// Returns an error if `retention` is shorter than one millisecond.
    pub fn with_retention(retention: Duration) -> Result<Self, RetentionError> {
        let rng = DefaultRng::default();
        #[cfg(feature = "log")]
        log::debug!(
            "pushid: initialized generator with seed {} and retention {:?}",
            rng.seed(),
            retention
        );
        Self::try_with_retention(rng, StdSystemTime, retention)
    }
}
