//! Error types used throughout this library.
use std::error::Error;
use std::fmt;
use std::io;

/// Errors that can occur when creating a histogram.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum InvalidConfig {
    /// Lowest discernible value must be >= 1.
    LowIsZero,
    /// Lowest discernible value must be <= `u64::max_value() / 2` because the highest value is
    /// a `u64` and the lowest value must be no bigger than half the highest.
    LowExceedsHalfOfMax,
    /// Highest trackable value must be >= 2 * lowest discernible value for some internal
    /// calculations to work out. In practice, high is typically much higher than 2 * low.
    HighLessThanTwiceLow,
    /// Number of significant digits must be in the range `[1, 5]`.
    SignificantDigitsOutOfRange,
    /// Cannot represent `significant_digits` worth of values beyond the lowest discernible value.
    /// Decrease the significant digits, raise the lowest discernible value, or both.
    ///
    /// This could happen if low is very large (like 2^60) and significant_digits is 5, which
    /// requires 18 additional bits: the exponent of the largest power of two that is smaller than
    /// the lowest value and the bits needed to represent the requested significant digits must
    /// sum to 63 or less.
    UnrepresentableLayout,
}

impl fmt::Display for InvalidConfig {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InvalidConfig::LowIsZero => write!(f, "lowest discernible value must be >= 1"),
            InvalidConfig::LowExceedsHalfOfMax => {
                write!(f, "lowest discernible value must be <= u64::max_value() / 2")
            }
            InvalidConfig::HighLessThanTwiceLow => write!(
                f,
                "highest trackable value must be >= 2 * lowest discernible value"
            ),
            InvalidConfig::SignificantDigitsOutOfRange => {
                write!(f, "significant digits must be in the range [1, 5]")
            }
            InvalidConfig::UnrepresentableLayout => write!(
                f,
                "cannot represent this many significant digits beyond the lowest discernible value"
            ),
        }
    }
}

impl Error for InvalidConfig {}

/// Errors that can occur while recording a value.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum RecordError {
    /// The value to record exceeds the histogram's highest trackable value.
    ///
    /// Use `saturating_record`/`saturating_record_n` instead if clamping to the top bucket is
    /// preferable to an error.
    OutOfRange,
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RecordError::OutOfRange => write!(
                f,
                "value exceeds the histogram's highest trackable value"
            ),
        }
    }
}

impl Error for RecordError {}

/// Errors that can occur when merging another histogram into this one.
#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum MergeError {
    /// The other histogram was constructed with different derived parameters (lowest
    /// discernible value, highest trackable value, or significant digits), so its counters
    /// cannot be added to this histogram's directly.
    IncompatibleLayout,
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MergeError::IncompatibleLayout => write!(
                f,
                "the other histogram's layout is incompatible with this one's"
            ),
        }
    }
}

impl Error for MergeError {}

/// Errors that can occur while encoding a histogram to a byte stream.
#[derive(Debug)]
pub enum EncodeError {
    /// A count above `i64::max_value()` cannot be zig-zag encoded, and therefore cannot be
    /// serialized.
    CountNotSerializable,
    /// The underlying writer failed.
    Io(io::Error),
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> Self {
        EncodeError::Io(e)
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EncodeError::CountNotSerializable => {
                write!(f, "a count above i64::max_value() cannot be zig-zag encoded")
            }
            EncodeError::Io(e) => write!(f, "write failed: {}", e),
        }
    }
}

impl Error for EncodeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            EncodeError::Io(e) => Some(e),
            _ => None,
        }
    }
}
