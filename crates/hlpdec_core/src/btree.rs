//! Paged B+tree access.
//!
//! Every B+tree in a container (the directory and several internal
//! streams) shares one page layout:
//!
//! - Index pages: `unknown u16, entries i16, previous_page i16`, then
//!   entries of `key, child u16`. `previous_page` is the child left of the
//!   first key.
//! - Leaf pages: `unknown u16, entries i16, previous_page i16,
//!   next_page i16`, then entries. `next_page == -1` ends the leaf chain.
//!
//! Only the directory's key and value layout is known here; other trees
//! are walked with [`LeafCursor`] and their entries decoded by the caller.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::header::BTreeHeader;
use hlpdec_storage::VirtualFile;
use tracing::trace;

/// Page link marking the end of a chain.
pub const NO_PAGE: i16 = -1;

pub(crate) fn entry_count(raw: i16) -> CoreResult<u16> {
    u16::try_from(raw).map_err(|_| CoreError::corrupt_directory(format!("negative entry count {raw}")))
}

/// Header of an index (non-leaf) page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexPageHeader {
    /// Unused.
    pub unknown: u16,
    /// Number of entries on the page.
    pub entries: i16,
    /// Child page left of the first key.
    pub previous_page: i16,
}

impl IndexPageHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 6;

    /// Reads a header at the file's current position.
    ///
    /// # Errors
    ///
    /// Returns a short read error if the page is truncated.
    pub fn read<F: VirtualFile + ?Sized>(file: &mut F) -> CoreResult<Self> {
        Ok(Self {
            unknown: file.read_u16_le()?,
            entries: file.read_u16_le()? as i16,
            previous_page: file.read_u16_le()? as i16,
        })
    }

    /// Encodes the header to bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.unknown.to_le_bytes());
        buf[2..4].copy_from_slice(&self.entries.to_le_bytes());
        buf[4..6].copy_from_slice(&self.previous_page.to_le_bytes());
        buf
    }
}

/// Header of a leaf page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafPageHeader {
    /// Free bytes on the page.
    pub unknown: u16,
    /// Number of entries on the page.
    pub entries: i16,
    /// Previous leaf, or [`NO_PAGE`].
    pub previous_page: i16,
    /// Next leaf, or [`NO_PAGE`].
    pub next_page: i16,
}

impl LeafPageHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 8;

    /// Reads a header at the file's current position.
    ///
    /// # Errors
    ///
    /// Returns a short read error if the page is truncated.
    pub fn read<F: VirtualFile + ?Sized>(file: &mut F) -> CoreResult<Self> {
        Ok(Self {
            unknown: file.read_u16_le()?,
            entries: file.read_u16_le()? as i16,
            previous_page: file.read_u16_le()? as i16,
            next_page: file.read_u16_le()? as i16,
        })
    }

    /// Encodes the header to bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.unknown.to_le_bytes());
        buf[2..4].copy_from_slice(&self.entries.to_le_bytes());
        buf[4..6].copy_from_slice(&self.previous_page.to_le_bytes());
        buf[6..8].copy_from_slice(&self.next_page.to_le_bytes());
        buf
    }
}

/// Geometry of one B+tree: its header and where its pages start.
#[derive(Debug, Clone, Copy)]
pub struct BTree {
    header: BTreeHeader,
    pages_start: u64,
}

impl BTree {
    /// Reads a B+tree header at the file's current position and checks
    /// its geometry.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] for a bad magic and
    /// [`CoreError::CorruptDirectory`] for a zero page size, a level count
    /// outside `1..=max_levels` or a root page outside the tree.
    pub fn read<F: VirtualFile + ?Sized>(file: &mut F, config: &Config) -> CoreResult<Self> {
        let header = BTreeHeader::read(file)?;
        let pages_start = file.tell()?;

        if header.page_size == 0 {
            return Err(CoreError::corrupt_directory("zero page size"));
        }
        if header.levels < 1 || i32::from(header.levels) > i32::from(config.max_levels) {
            return Err(CoreError::corrupt_directory(format!(
                "{} levels (allowed 1..={})",
                header.levels, config.max_levels
            )));
        }

        let tree = Self {
            header,
            pages_start,
        };
        tree.page_offset(header.root_page)?;
        Ok(tree)
    }

    /// Returns the tree header.
    #[must_use]
    pub const fn header(&self) -> &BTreeHeader {
        &self.header
    }

    /// Returns the offset of page 0.
    #[must_use]
    pub const fn pages_start(&self) -> u64 {
        self.pages_start
    }

    /// Returns the absolute offset of `page`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CorruptDirectory`] if `page` is outside
    /// `0..total_pages`.
    pub fn page_offset(&self, page: i16) -> CoreResult<u64> {
        if page < 0 || page >= self.header.total_pages {
            return Err(CoreError::corrupt_directory(format!(
                "page {page} outside 0..{}",
                self.header.total_pages
            )));
        }
        Ok(self.pages_start + page as u64 * u64::from(self.header.page_size))
    }

    /// Seeks to the start of `page`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::CorruptDirectory`] for an out-of-range page.
    pub fn seek_page<F: VirtualFile + ?Sized>(&self, file: &mut F, page: i16) -> CoreResult<()> {
        let offset = self.page_offset(page)?;
        file.seek(offset)?;
        Ok(())
    }

    /// Descends from the root to a leaf, always taking the leftmost child.
    ///
    /// Leaves the file positioned at the leaf's first entry.
    ///
    /// # Errors
    ///
    /// Returns a short read or [`CoreError::CorruptDirectory`].
    pub fn first_leaf<F: VirtualFile + ?Sized>(&self, file: &mut F) -> CoreResult<LeafPageHeader> {
        self.seek_page(file, self.header.root_page)?;
        for level in 1..self.header.levels {
            let node = IndexPageHeader::read(file)?;
            trace!(level, child = node.previous_page, "descending leftmost");
            self.seek_page(file, node.previous_page)?;
        }
        LeafPageHeader::read(file)
    }

    /// Descends from the root to the leaf that may hold `key`, comparing
    /// against nul-terminated string keys.
    ///
    /// On each index page the child left of the first key is the starting
    /// candidate. Keys are scanned in order; the scan stops at the first key
    /// greater than `key`, and every key not greater than `key` replaces
    /// the candidate with its own child. Leaves the file positioned at the
    /// leaf's first entry.
    ///
    /// # Errors
    ///
    /// Returns a short read, [`CoreError::NameTooLong`] or
    /// [`CoreError::CorruptDirectory`].
    pub fn find_leaf<F: VirtualFile + ?Sized>(
        &self,
        file: &mut F,
        key: &[u8],
        config: &Config,
    ) -> CoreResult<LeafPageHeader> {
        self.seek_page(file, self.header.root_page)?;
        for level in 1..self.header.levels {
            let node = IndexPageHeader::read(file)?;
            let mut child = node.previous_page;
            for _ in 0..entry_count(node.entries)? {
                let separator = read_name(file, config)?;
                if key < separator.as_slice() {
                    break;
                }
                child = file.read_u16_le()? as i16;
            }
            trace!(level, child, "descending");
            self.seek_page(file, child)?;
        }
        LeafPageHeader::read(file)
    }
}

/// Reads a nul-terminated name no longer than the configured limit.
pub(crate) fn read_name<F: VirtualFile + ?Sized>(file: &mut F, config: &Config) -> CoreResult<Vec<u8>> {
    file.read_cstring(config.max_name_length)?
        .ok_or(CoreError::NameTooLong {
            max: config.max_name_length,
        })
}

/// Walks the leaf chain of any B+tree, one page at a time.
///
/// After [`first_page`](Self::first_page) or
/// [`next_page`](Self::next_page) return a nonzero count, the file is
/// positioned at the first entry of that page and the caller reads exactly
/// that many entries before asking for the next page.
///
/// # Example
///
/// ```rust,ignore
/// let mut cursor = LeafCursor::open(&mut file, &config)?;
/// let mut n = cursor.first_page(&mut file)?;
/// while n > 0 {
///     for _ in 0..n {
///         // decode one entry
///     }
///     n = cursor.next_page(&mut file)?;
/// }
/// ```
#[derive(Debug, Clone)]
pub struct LeafCursor {
    tree: BTree,
    next_page: i16,
    visited: i32,
}

impl LeafCursor {
    /// Reads the B+tree header at the file's current position.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] or [`CoreError::CorruptDirectory`].
    pub fn open<F: VirtualFile + ?Sized>(file: &mut F, config: &Config) -> CoreResult<Self> {
        Ok(Self::new(BTree::read(file, config)?))
    }

    /// Creates a cursor over an already read tree.
    #[must_use]
    pub const fn new(tree: BTree) -> Self {
        Self {
            tree,
            next_page: NO_PAGE,
            visited: 0,
        }
    }

    /// Returns the tree being walked.
    #[must_use]
    pub const fn tree(&self) -> &BTree {
        &self.tree
    }

    /// Returns the total entry count recorded in the tree header.
    #[must_use]
    pub const fn total_entries(&self) -> i32 {
        self.tree.header.total_entries
    }

    /// Positions at the first leaf and returns its entry count.
    ///
    /// Returns 0 without touching any page if the tree has no entries.
    ///
    /// # Errors
    ///
    /// Returns a short read or [`CoreError::CorruptDirectory`].
    pub fn first_page<F: VirtualFile + ?Sized>(&mut self, file: &mut F) -> CoreResult<u16> {
        self.next_page = NO_PAGE;
        self.visited = 0;
        if self.tree.header.total_entries == 0 {
            return Ok(0);
        }
        let leaf = self.tree.first_leaf(file)?;
        self.visited = 1;
        self.next_page = leaf.next_page;
        entry_count(leaf.entries)
    }

    /// Positions at the next leaf and returns its entry count, or 0 at the
    /// end of the chain.
    ///
    /// # Errors
    ///
    /// Returns a short read or [`CoreError::CorruptDirectory`], including
    /// for a chain that visits more leaves than the tree has pages.
    pub fn next_page<F: VirtualFile + ?Sized>(&mut self, file: &mut F) -> CoreResult<u16> {
        if self.next_page == NO_PAGE {
            return Ok(0);
        }
        self.visited += 1;
        if self.visited > i32::from(self.tree.header.total_pages) {
            return Err(CoreError::corrupt_directory("leaf chain loops"));
        }
        self.tree.seek_page(file, self.next_page)?;
        let leaf = LeafPageHeader::read(file)?;
        trace!(page = self.next_page, next = leaf.next_page, "next leaf");
        self.next_page = leaf.next_page;
        entry_count(leaf.entries)
    }
}
