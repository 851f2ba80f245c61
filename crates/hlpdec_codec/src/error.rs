//! Error types for the codec crate.

use hlpdec_storage::StorageError;
use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during encoding or decoding.
#[derive(Error, Debug)]
pub enum CodecError {
    /// The underlying virtual file failed (including short reads).
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    /// A value does not fit the requested compressed representation.
    #[error("value {value} out of range (max {max})")]
    ValueOutOfRange {
        /// The value that was rejected.
        value: i64,
        /// Largest magnitude the encoding can carry.
        max: i64,
    },

    /// A link-form buffer ended inside a value.
    #[error("unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEof {
        /// Bytes required by the value's width.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// A sink refused a byte while writing an encoded value.
    #[error("sink is full")]
    SinkFull,

    /// A decompression method code outside `0..=3`.
    #[error("invalid decompression method: {0}")]
    InvalidMethod(u8),
}

impl CodecError {
    /// Create a value out of range error.
    pub fn out_of_range(value: impl Into<i64>, max: impl Into<i64>) -> Self {
        Self::ValueOutOfRange {
            value: value.into(),
            max: max.into(),
        }
    }

    /// Returns true if the error is a short read from the source.
    #[must_use]
    pub fn is_short_read(&self) -> bool {
        matches!(self, Self::Storage(e) if e.is_short_read())
    }
}
