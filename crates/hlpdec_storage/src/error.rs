//! Error types for storage operations.

use std::io;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Fewer bytes were available than requested.
    ///
    /// Reads are all-or-nothing: a caller never observes partial data.
    #[error("short read: {requested} bytes requested at offset {offset}")]
    ShortRead {
        /// Position at which the read started.
        offset: u64,
        /// Number of bytes requested.
        requested: usize,
    },

    /// Attempted to seek outside a bounded memory window.
    #[error("seek out of range: offset {offset}, size {size}")]
    SeekOutOfRange {
        /// The requested absolute offset.
        offset: u64,
        /// The size of the window.
        size: u64,
    },

    /// The file was opened for writing only.
    #[error("file is not readable")]
    NotReadable,
}

impl StorageError {
    /// Creates a short read error.
    pub fn short_read(offset: u64, requested: usize) -> Self {
        Self::ShortRead { offset, requested }
    }

    /// Returns true if this error reports missing data rather than an I/O fault.
    #[must_use]
    pub fn is_short_read(&self) -> bool {
        matches!(self, Self::ShortRead { .. })
    }
}
