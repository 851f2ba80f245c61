//! Fixed-layout headers of the container format.
//!
//! All fields are little-endian. Each header can be decoded from a byte
//! slice, read from a [`VirtualFile`] at its current position, or encoded
//! back to bytes.

use crate::error::{CoreError, CoreResult};
use hlpdec_storage::VirtualFile;

/// Magic number at offset 0 of every help container.
pub const CONTAINER_MAGIC: u32 = 0x0003_5F3F;

/// Magic number of every B+tree header.
pub const BTREE_MAGIC: u16 = 0x293B;

fn u16_at(data: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([data[at], data[at + 1]])
}

fn i16_at(data: &[u8], at: usize) -> i16 {
    i16::from_le_bytes([data[at], data[at + 1]])
}

fn u32_at(data: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn i32_at(data: &[u8], at: usize) -> i32 {
    i32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn check_len(data: &[u8], needed: usize, what: &str) -> CoreResult<()> {
    if data.len() < needed {
        return Err(CoreError::invalid_format(format!(
            "{what} needs {needed} bytes, got {}",
            data.len()
        )));
    }
    Ok(())
}

/// The 16-byte header at the start of a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContainerHeader {
    /// Always [`CONTAINER_MAGIC`].
    pub magic: u32,
    /// Offset of the directory's stream header.
    pub directory_start: u32,
    /// Offset of the first free block, or -1.
    pub free_chain_start: i32,
    /// Size of the whole container in bytes.
    pub file_size: u32,
}

impl ContainerHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 16;

    /// Creates a header for a container of `file_size` bytes.
    #[must_use]
    pub const fn new(directory_start: u32, file_size: u32) -> Self {
        Self {
            magic: CONTAINER_MAGIC,
            directory_start,
            free_chain_start: -1,
            file_size,
        }
    }

    /// Decodes a header, checking the magic.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] if the slice is too short or the
    /// magic does not match.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        check_len(data, Self::SIZE, "container header")?;
        let magic = u32_at(data, 0);
        if magic != CONTAINER_MAGIC {
            return Err(CoreError::invalid_format(format!(
                "not a help file: magic {magic:#010x}"
            )));
        }
        Ok(Self {
            magic,
            directory_start: u32_at(data, 4),
            free_chain_start: i32_at(data, 8),
            file_size: u32_at(data, 12),
        })
    }

    /// Reads and decodes a header at the file's current position.
    ///
    /// # Errors
    ///
    /// Returns a short read or [`CoreError::InvalidFormat`].
    pub fn read<F: VirtualFile + ?Sized>(file: &mut F) -> CoreResult<Self> {
        let mut buf = [0u8; Self::SIZE];
        file.read_exact(&mut buf)?;
        Self::decode(&buf)
    }

    /// Encodes the header to bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.magic.to_le_bytes());
        buf[4..8].copy_from_slice(&self.directory_start.to_le_bytes());
        buf[8..12].copy_from_slice(&self.free_chain_start.to_le_bytes());
        buf[12..16].copy_from_slice(&self.file_size.to_le_bytes());
        buf
    }
}

/// The 9-byte header in front of every internal stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamHeader {
    /// Bytes allocated for the stream, header included.
    pub reserved: u32,
    /// Bytes of stream data in use.
    pub used: u32,
    /// Stream flags.
    pub flags: u8,
}

impl StreamHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 9;

    /// Creates a header for `used` data bytes with no slack.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn new(used: u32) -> Self {
        Self {
            reserved: used + Self::SIZE as u32,
            used,
            flags: 0,
        }
    }

    /// Decodes a header, checking that `used <= reserved`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] if the slice is too short or the
    /// used size exceeds the reserved size.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        check_len(data, Self::SIZE, "stream header")?;
        let header = Self {
            reserved: u32_at(data, 0),
            used: u32_at(data, 4),
            flags: data[8],
        };
        if header.used > header.reserved {
            return Err(CoreError::invalid_format(format!(
                "stream uses {} of {} reserved bytes",
                header.used, header.reserved
            )));
        }
        Ok(header)
    }

    /// Reads and decodes a header at the file's current position.
    ///
    /// # Errors
    ///
    /// Returns a short read or [`CoreError::InvalidFormat`].
    pub fn read<F: VirtualFile + ?Sized>(file: &mut F) -> CoreResult<Self> {
        let mut buf = [0u8; Self::SIZE];
        file.read_exact(&mut buf)?;
        Self::decode(&buf)
    }

    /// Encodes the header to bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.reserved.to_le_bytes());
        buf[4..8].copy_from_slice(&self.used.to_le_bytes());
        buf[8] = self.flags;
        buf
    }
}

/// The 38-byte header of a B+tree.
///
/// Pages follow the header directly; page `n` starts
/// `n * page_size` bytes after its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeHeader {
    /// Always [`BTREE_MAGIC`].
    pub magic: u16,
    /// Tree flags.
    pub flags: u16,
    /// Size of every page in bytes.
    pub page_size: u16,
    /// Key/value layout descriptor, e.g. `z4` for the directory.
    pub structure: [u8; 16],
    /// Always zero.
    pub must_be_zero: i16,
    /// Number of page splits while the tree was built.
    pub page_splits: i16,
    /// Page number of the root.
    pub root_page: i16,
    /// Always -1.
    pub must_be_neg_one: i16,
    /// Number of pages.
    pub total_pages: i16,
    /// Number of levels, leaves included.
    pub levels: i16,
    /// Number of entries across all leaves.
    pub total_entries: i32,
}

impl BTreeHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 38;

    /// Decodes a header, checking the magic.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] if the slice is too short or the
    /// magic does not match.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        check_len(data, Self::SIZE, "B+tree header")?;
        let magic = u16_at(data, 0);
        if magic != BTREE_MAGIC {
            return Err(CoreError::invalid_format(format!(
                "bad B+tree magic {magic:#06x}"
            )));
        }
        let mut structure = [0u8; 16];
        structure.copy_from_slice(&data[6..22]);
        Ok(Self {
            magic,
            flags: u16_at(data, 2),
            page_size: u16_at(data, 4),
            structure,
            must_be_zero: i16_at(data, 22),
            page_splits: i16_at(data, 24),
            root_page: i16_at(data, 26),
            must_be_neg_one: i16_at(data, 28),
            total_pages: i16_at(data, 30),
            levels: i16_at(data, 32),
            total_entries: i32_at(data, 34),
        })
    }

    /// Reads and decodes a header at the file's current position.
    ///
    /// # Errors
    ///
    /// Returns a short read or [`CoreError::InvalidFormat`].
    pub fn read<F: VirtualFile + ?Sized>(file: &mut F) -> CoreResult<Self> {
        let mut buf = [0u8; Self::SIZE];
        file.read_exact(&mut buf)?;
        Self::decode(&buf)
    }

    /// Encodes the header to bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..2].copy_from_slice(&self.magic.to_le_bytes());
        buf[2..4].copy_from_slice(&self.flags.to_le_bytes());
        buf[4..6].copy_from_slice(&self.page_size.to_le_bytes());
        buf[6..22].copy_from_slice(&self.structure);
        buf[22..24].copy_from_slice(&self.must_be_zero.to_le_bytes());
        buf[24..26].copy_from_slice(&self.page_splits.to_le_bytes());
        buf[26..28].copy_from_slice(&self.root_page.to_le_bytes());
        buf[28..30].copy_from_slice(&self.must_be_neg_one.to_le_bytes());
        buf[30..32].copy_from_slice(&self.total_pages.to_le_bytes());
        buf[32..34].copy_from_slice(&self.levels.to_le_bytes());
        buf[34..38].copy_from_slice(&self.total_entries.to_le_bytes());
        buf
    }

    /// Returns the structure descriptor up to its first nul.
    #[must_use]
    pub fn structure_str(&self) -> &[u8] {
        let end = self.structure.iter().position(|&b| b == 0).unwrap_or(16);
        &self.structure[..end]
    }
}
