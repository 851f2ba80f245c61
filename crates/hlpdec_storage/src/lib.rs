//! # hlpdec Storage
//!
//! Uniform byte-stream abstraction for hlpdec.
//!
//! Every decoder in hlpdec reads and writes through the [`VirtualFile`]
//! trait, so the same code runs over a help file on disk or over a buffer
//! produced by an earlier decoding step.
//!
//! ## Design Principles
//!
//! - Two backends, one contract: memory windows and disk files
//! - Reads are all-or-nothing ([`StorageError::ShortRead`] on exhaustion)
//! - Full memory sinks drop writes silently; callers check counts
//! - Instances are owned by one operation and released on drop
//!
//! ## Available Backends
//!
//! - [`MemoryFile`] - Borrowed, capacity-bounded memory window
//! - [`DiskFile`] - Buffered OS file, opened as source or sink
//!
//! ## Example
//!
//! ```rust
//! use hlpdec_storage::{MemoryFile, VirtualFile};
//!
//! let mut file = MemoryFile::reader(b"\x3f\x5f\x03\x00");
//! assert_eq!(file.read_u32_le().unwrap(), 0x0003_5f3f);
//! assert_eq!(file.get_byte().unwrap(), None);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::{copy_bytes, VirtualFile, COPY_BUFFER_SIZE};
pub use error::{StorageError, StorageResult};
pub use file::DiskFile;
pub use memory::MemoryFile;
