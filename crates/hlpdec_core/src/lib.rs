//! # hlpdec Core
//!
//! Reader for WinHelp (`.HLP`) containers.
//!
//! A container is a single file holding named internal streams (`|SYSTEM`,
//! `|TOPIC`, `|Phrases`, bitmaps, ...) behind a paged B+tree directory.
//! This crate provides:
//!
//! - The fixed headers of the format ([`ContainerHeader`],
//!   [`StreamHeader`], [`BTreeHeader`])
//! - Directory lookup and enumeration ([`Container`])
//! - A leaf cursor for any B+tree in the container ([`LeafCursor`])
//! - The `|SYSTEM` stream ([`SystemHeader`], [`SystemRecords`])
//! - Phrase index and topic block headers
//! - Stream extraction into memory or onto disk
//!
//! ## Design Principles
//!
//! - Nothing is cached between calls; every lookup re-reads the directory
//! - Malformed directories fail hard instead of reading garbage
//! - A missing stream is `Ok(None)`, never an error
//! - All I/O goes through [`hlpdec_storage::VirtualFile`]
//!
//! ## Example
//!
//! ```rust,ignore
//! use hlpdec_codec::Method;
//! use hlpdec_core::Container;
//! use hlpdec_storage::{DiskFile, MemoryFile};
//!
//! let mut container = Container::open(DiskFile::open("WINHELP.HLP".as_ref())?)?;
//! for entry in container.entries()? {
//!     println!("{:<24} {:#010x}", entry.name_lossy(), entry.offset);
//! }
//!
//! let mut buf = vec![0u8; 4096];
//! let mut sink = MemoryFile::writer(&mut buf);
//! container.decompress_stream("|Phrases", Method::Lz77, &mut sink)?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod btree;
mod config;
mod container;
mod error;
mod extract;
mod header;
mod records;
mod system;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use btree::{BTree, IndexPageHeader, LeafCursor, LeafPageHeader, NO_PAGE};
pub use config::Config;
pub use container::{Container, DirectoryEntry, StreamLocation};
pub use error::{CoreError, CoreResult};
pub use extract::extract_to_path;
pub use header::{BTreeHeader, ContainerHeader, StreamHeader, BTREE_MAGIC, CONTAINER_MAGIC};
pub use records::{PhrIndexHeader, TopicBlockHeader, PHRASE_INDEX_STREAM, TOPIC_STREAM};
pub use system::{
    record_type, SystemHeader, SystemInfo, SystemRecord, SystemRecords, TopicLayout,
    SYSTEM_MAGIC, SYSTEM_STREAM,
};
