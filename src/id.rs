use crate::{ENTROPY_DIGITS, MAX_TIMESTAMP_DIGITS};
use std::{error, fmt, str};

/// Digit characters used in the push-style Base64 notation.
///
/// Unlike the standard Base64 alphabet, the digits are arranged in ASCII order so that byte-wise
/// comparison of encoded strings agrees with numeric comparison of the encoded values.
pub(crate) const DIGITS: &[u8; 64] =
    b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

/// An O(1) map from ASCII code points to Base64 digit values.
const DECODE_MAP: [u8; 256] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x00, 0xff, 0xff,
    0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0x0b, 0x0c, 0x0d, 0x0e, 0x0f, 0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19,
    0x1a, 0x1b, 0x1c, 0x1d, 0x1e, 0x1f, 0x20, 0x21, 0x22, 0x23, 0x24, 0xff, 0xff, 0xff, 0xff, 0x25,
    0xff, 0x26, 0x27, 0x28, 0x29, 0x2a, 0x2b, 0x2c, 0x2d, 0x2e, 0x2f, 0x30, 0x31, 0x32, 0x33, 0x34,
    0x35, 0x36, 0x37, 0x38, 0x39, 0x3a, 0x3b, 0x3c, 0x3d, 0x3e, 0x3f, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
];

/// Maximum length in bytes of a push-style ID.
const MAX_LEN: usize = MAX_TIMESTAMP_DIGITS + ENTROPY_DIGITS;

/// Upper bound (exclusive) of the entropy field value, i.e. `64^ENTROPY_DIGITS`.
pub(crate) const ENTROPY_RANGE: u64 = 1 << (6 * ENTROPY_DIGITS);

/// Represents a push-style ID and provides converters and comparison operators.
///
/// An ID consists of a leading timestamp segment of one to [`MAX_TIMESTAMP_DIGITS`] digits and a
/// trailing entropy segment of [`ENTROPY_DIGITS`] digits. The comparison operators agree with the
/// byte-wise comparison of the string representations.
///
/// # Examples
///
/// ```rust
/// use pushid::PushId;
///
/// let x = "-NjEtLV-543210".parse::<PushId>()?;
/// assert_eq!(x.to_string(), "-NjEtLV-543210");
/// assert_eq!(x.timestamp(), 1_700_000_000_000);
/// assert_eq!(x.timestamp_digits(), 8);
///
/// let y = PushId::from_fields(1_700_000_000_000, 8, x.entropy() + 1);
/// assert_eq!(y.as_str(), "-NjEtLV-543211");
/// assert!(x < y);
/// # Ok::<(), pushid::ParseError>(())
/// ```
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PushId {
    /// ASCII digits followed by zero padding; padding sorts before every digit.
    bytes: [u8; MAX_LEN],
    len: u8,
}

impl PushId {
    /// Creates an object from field values.
    ///
    /// Only the low `timestamp_digits` Base64 digits of `timestamp` are kept, which is how a
    /// wrapped timestamp of a generator with a retention window is produced.
    ///
    /// # Panics
    ///
    /// Panics if `timestamp_digits` is zero or greater than [`MAX_TIMESTAMP_DIGITS`], or if
    /// `entropy` is not less than `64^ENTROPY_DIGITS`.
    pub const fn from_fields(timestamp: u64, timestamp_digits: usize, entropy: u64) -> Self {
        if timestamp_digits == 0 || timestamp_digits > MAX_TIMESTAMP_DIGITS {
            panic!("invalid number of timestamp digits");
        }
        if entropy >= ENTROPY_RANGE {
            panic!("invalid entropy value");
        }

        let len = timestamp_digits + ENTROPY_DIGITS;
        let mut bytes = [0u8; MAX_LEN];

        let mut i = len;
        let mut n = entropy;
        while i > timestamp_digits {
            i -= 1;
            bytes[i] = DIGITS[(n & 63) as usize];
            n >>= 6;
        }

        let mut n = timestamp;
        while i > 0 {
            i -= 1;
            bytes[i] = DIGITS[(n & 63) as usize];
            n >>= 6;
        }

        Self {
            bytes,
            len: len as u8,
        }
    }

    /// Returns the string representation.
    pub fn as_str(&self) -> &str {
        // All bytes up to `len` are ASCII digits.
        str::from_utf8(&self.bytes[..self.len()]).unwrap_or_default()
    }

    /// Returns the length of the string representation in bytes.
    #[allow(clippy::len_without_is_empty)]
    pub const fn len(&self) -> usize {
        self.len as usize
    }

    /// Returns the number of digits in the timestamp segment.
    pub const fn timestamp_digits(&self) -> usize {
        self.len() - ENTROPY_DIGITS
    }

    /// Returns the timestamp segment value: Unix time in milliseconds, or the millisecond
    /// position within the retention window if the ID was generated with one.
    pub const fn timestamp(&self) -> u64 {
        let mut n = 0u64;
        let mut i = 0;
        while i < self.timestamp_digits() {
            n = (n << 6) | DECODE_MAP[self.bytes[i] as usize] as u64;
            i += 1;
        }
        n
    }

    /// Returns the entropy segment value, less than `64^ENTROPY_DIGITS`.
    pub const fn entropy(&self) -> u64 {
        let mut n = 0u64;
        let mut i = self.timestamp_digits();
        while i < self.len() {
            n = (n << 6) | DECODE_MAP[self.bytes[i] as usize] as u64;
            i += 1;
        }
        n
    }

    /// Creates an object from a string representation.
    ///
    /// The length of the timestamp segment is inferred from the string length, as the entropy
    /// segment always has [`ENTROPY_DIGITS`] digits.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pushid::PushId;
    ///
    /// let x = PushId::try_from_str("22J-zzzzzz")?;
    /// let y = "22J-zzzzzz".parse::<PushId>()?;
    /// assert_eq!(x, y);
    /// assert_eq!(x.timestamp(), 800_000);
    /// assert!("22J-zzzzz".parse::<PushId>().is_ok());
    /// assert!("22J-zzzz".parse::<PushId>().is_ok());
    /// assert!("22J-zzz".parse::<PushId>().is_ok());
    /// assert!("22J-zz".parse::<PushId>().is_err());
    /// # Ok::<(), pushid::ParseError>(())
    /// ```
    pub const fn try_from_str(str_value: &str) -> Result<Self, ParseError> {
        let src = str_value.as_bytes();
        if src.len() <= ENTROPY_DIGITS || src.len() > MAX_LEN {
            return Err(ParseError::invalid_length(src.len()));
        }

        let mut bytes = [0u8; MAX_LEN];
        let mut i = 0;
        while i < src.len() {
            if DECODE_MAP[src[i] as usize] == 0xff {
                return Err(ParseError::invalid_digit(str_value, i));
            }
            bytes[i] = src[i];
            i += 1;
        }

        // 64^11 exceeds the u64 range, so a full-width timestamp needs a small leading digit
        if src.len() == MAX_LEN && DECODE_MAP[src[0] as usize] >= 16 {
            return Err(ParseError::out_of_u64_range());
        }

        Ok(Self {
            bytes,
            len: src.len() as u8,
        })
    }
}

impl fmt::Debug for PushId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PushId").field(&self.as_str()).finish()
    }
}

impl fmt::Display for PushId {
    /// Returns the string representation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pushid::PushId;
    ///
    /// let x = "-NjEtLV-543210".parse::<PushId>()?;
    /// assert_eq!(format!("{}", x), "-NjEtLV-543210");
    /// assert_eq!(format!("{:16}", x), "-NjEtLV-543210  ");
    /// assert_eq!(format!("{:.>16}", x), "..-NjEtLV-543210");
    /// # Ok::<(), pushid::ParseError>(())
    /// ```
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_str(), f)
    }
}

impl AsRef<str> for PushId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl str::FromStr for PushId {
    type Err = ParseError;

    /// Creates an object from a string representation.
    fn from_str(str_value: &str) -> Result<Self, Self::Err> {
        Self::try_from_str(str_value)
    }
}

impl TryFrom<String> for PushId {
    type Error = ParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from_str(&value)
    }
}

impl TryFrom<&str> for PushId {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::try_from_str(value)
    }
}

impl From<PushId> for String {
    fn from(object: PushId) -> Self {
        object.as_str().to_owned()
    }
}

/// An error parsing an invalid string representation of push-style ID.
#[derive(Clone, Debug)]
pub struct ParseError {
    kind: ParseErrorKind,
}

#[derive(Clone, Eq, PartialEq, Debug)]
enum ParseErrorKind {
    InvalidLength {
        n_bytes: usize,
    },
    InvalidDigit {
        /// Holds the invalid character as a UTF-8 byte array to work in the const context.
        utf8_char: [u8; 4],
        position: usize,
    },
    OutOfU64Range,
}

impl ParseError {
    /// Creates an `InvalidLength` variant from the actual length.
    const fn invalid_length(n_bytes: usize) -> Self {
        Self {
            kind: ParseErrorKind::InvalidLength { n_bytes },
        }
    }

    /// Creates an `InvalidDigit` variant from the entire string and the position of invalid digit.
    const fn invalid_digit(src: &str, position: usize) -> Self {
        const fn is_char_boundary(utf8_bytes: &[u8], index: usize) -> bool {
            match index {
                0 => true,
                i if i < utf8_bytes.len() => (utf8_bytes[i] as i8) >= -64,
                _ => index == utf8_bytes.len(),
            }
        }

        let bs = src.as_bytes();
        assert!(is_char_boundary(bs, position));
        let mut utf8_char = [bs[position], 0, 0, 0];

        let mut i = 1;
        while !is_char_boundary(bs, position + i) {
            utf8_char[i] = bs[position + i];
            i += 1;
        }

        Self {
            kind: ParseErrorKind::InvalidDigit {
                utf8_char,
                position,
            },
        }
    }

    /// Creates an `OutOfU64Range` variant.
    const fn out_of_u64_range() -> Self {
        Self {
            kind: ParseErrorKind::OutOfU64Range,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not parse string as push-style ID: ")?;
        match self.kind {
            ParseErrorKind::InvalidLength { n_bytes } => write!(
                f,
                "invalid length: {} bytes (expected {} to {})",
                n_bytes,
                ENTROPY_DIGITS + 1,
                MAX_LEN
            ),
            ParseErrorKind::InvalidDigit {
                utf8_char,
                position,
            } => {
                match str::from_utf8(&utf8_char).ok().and_then(|s| s.chars().next()) {
                    Some(chr) => write!(f, "invalid digit '{}' at {}", chr.escape_debug(), position),
                    None => write!(f, "invalid digit at {}", position),
                }
            }
            ParseErrorKind::OutOfU64Range => write!(f, "timestamp out of 64-bit value range"),
        }
    }
}

impl error::Error for ParseError {}


#[cfg(feature = "serde")]
mod with_serde {
    use super::{fmt, str, PushId};
    use serde::{de, Deserializer, Serializer};

    impl serde::Serialize for PushId {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.serialize_str(self.as_str())
        }
    }

    impl<'de> serde::Deserialize<'de> for PushId {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_str(VisitorImpl)
        }
    }

    struct VisitorImpl;

    impl de::Visitor<'_> for VisitorImpl {
        type Value = PushId;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(formatter, "a push-style ID representation")
        }

        fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
            Self::Value::try_from_str(value).map_err(de::Error::custom)
        }

        fn visit_bytes<E: de::Error>(self, value: &[u8]) -> Result<Self::Value, E> {
            match str::from_utf8(value) {
                Ok(str_value) => self.visit_str(str_value),
                Err(err) => Err(de::Error::custom(err)),
            }
        }
    }

}
