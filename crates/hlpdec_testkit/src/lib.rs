//! # hlpdec testkit
//!
//! Test utilities for the help container decoder.
//!
//! This crate provides:
//! - A container builder that writes multi-level directories
//! - Property-based test generators using proptest
//! - Hex helpers for byte-layout assertions
//! - Shared decompression and integer test vectors
//!
//! ## Usage
//!
//! ```rust,ignore
//! use hlpdec_testkit::prelude::*;
//!
//! #[test]
//! fn finds_system_stream() {
//!     let data = scenarios::minimal_help_file().build();
//!     let mut container = Container::open(MemoryFile::reader(&data)).unwrap();
//!     assert!(container.locate("|SYSTEM").unwrap().is_some());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod generators;
pub mod golden;
pub mod vectors;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::generators::*;
    pub use crate::golden::*;
    pub use crate::vectors::*;
    pub use hlpdec_core::Container;
    pub use hlpdec_storage::MemoryFile;
}

pub use fixtures::*;
pub use generators::*;
pub use golden::*;
pub use vectors::*;
