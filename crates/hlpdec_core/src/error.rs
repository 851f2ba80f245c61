//! Error types for hlpdec core.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur while reading a help container.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Storage backend error (including short reads).
    #[error("storage error: {0}")]
    Storage(#[from] hlpdec_storage::StorageError),

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] hlpdec_codec::CodecError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A header or structure magic did not match.
    #[error("invalid format: {message}")]
    InvalidFormat {
        /// Description of the format issue.
        message: String,
    },

    /// The directory B+tree points outside itself.
    #[error("corrupt directory: {message}")]
    CorruptDirectory {
        /// Description of the corruption.
        message: String,
    },

    /// A nul-terminated name ran past the configured limit.
    #[error("name exceeds {max} bytes")]
    NameTooLong {
        /// Configured limit.
        max: usize,
    },

    /// A stream is too large to buffer in memory.
    #[error("stream of {size} bytes is too large to buffer")]
    StreamTooLarge {
        /// Declared size of the stream.
        size: u64,
    },

    /// Extraction would replace an existing file.
    #[error("output file already exists: {}", path.display())]
    AlreadyExists {
        /// The path that exists.
        path: PathBuf,
    },
}

impl CoreError {
    /// Creates an invalid format error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Creates a corrupt directory error.
    pub fn corrupt_directory(message: impl Into<String>) -> Self {
        Self::CorruptDirectory {
            message: message.into(),
        }
    }

    /// Creates an already exists error.
    pub fn already_exists(path: impl Into<PathBuf>) -> Self {
        Self::AlreadyExists { path: path.into() }
    }

    /// Returns true if the error is a short read from the container.
    #[must_use]
    pub fn is_short_read(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_short_read(),
            Self::Codec(e) => e.is_short_read(),
            _ => false,
        }
    }
}
