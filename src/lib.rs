//! # Push-style IDs: short, sortable, time-ordered unique identifiers
//!
//! A push-style ID is a short string that sorts in the order the IDs were generated. It is a
//! concatenation of:
//!
//! - a timestamp segment: the Unix time in milliseconds encoded in eight Base64 digits (or fewer,
//!   wrapped around a retention window); and
//! - an entropy segment: six Base64 digits that are randomly initialized when a generator is
//!   created and incremented by one for every ID generated within the same millisecond.
//!
//! The Base64 digits are `-0-9A-Z_a-z`, arranged in ASCII order so that plain byte-wise string
//! comparison orders IDs by their generation time.
//!
//! ```rust
//! # #[cfg(feature = "global_gen")]
//! # {
//! // generate a new identifier object
//! let x = pushid::new();
//! println!("{}", x); // e.g., "-NjEtLV-543210"
//! println!("{}", x.timestamp()); // as Unix milliseconds
//!
//! // generate a textual representation directly
//! println!("{}", pushid::new_string()); // e.g., "-NjEtLV-543211"
//! # }
//! ```
//!
//! See [`PushIdGenerator`] for shorter IDs that wrap around a retention window, custom random
//! number generators, and generators dedicated to a single component.
//!
//! # Crate features
//!
//! Default features:
//!
//! - `global_gen` (implies `default_rng`) enables the primary [`new()`] and [`new_string()`]
//!   functions and the process-wide global generator under the hood.
//!
//! Optional features:
//!
//! - `default_rng` enables [`DefaultRng`], a ChaCha12 generator seeded from the system clock, and
//!   the [`PushIdGenerator::new()`] constructor.
//! - `rand08` and `rand09` enable adapters for `rand` (v0.8 and v0.9) random number generators.
//! - `serde` enables serialization/deserialization of [`PushId`] via `serde`.
//! - `log` emits diagnostic records (generator initialization, clock rollback, entropy overflow)
//!   through the `log` facade.

#![cfg_attr(docsrs, feature(doc_cfg))]

/// The number of digits in the entropy segment of an ID.
pub const ENTROPY_DIGITS: usize = 6;

/// The number of digits in the timestamp segment of an ID generated without a retention window.
pub const DEFAULT_TIMESTAMP_DIGITS: usize = 8;

/// The maximum number of digits in the timestamp segment, enough to hold any `u64` value.
pub const MAX_TIMESTAMP_DIGITS: usize = 11;

mod id;
pub use id::{ParseError, PushId};

pub mod generator;
#[doc(inline)]
pub use generator::{
    DefaultRng, PushIdGenerator, RandSource, RetentionError, StdSystemTime, TimeSource,
    ROLLBACK_ALLOWANCE,
};

mod global_gen;
#[cfg(feature = "global_gen")]
pub use global_gen::{new, new_string};
