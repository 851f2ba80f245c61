//! Opening a container and finding its internal streams.

use crate::btree::{entry_count, read_name, BTree, LeafCursor};
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::header::{ContainerHeader, StreamHeader};
use hlpdec_codec::{decompress, Method};
use hlpdec_storage::{copy_bytes, VirtualFile};
use tracing::debug;

/// Where an internal stream lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamLocation {
    /// Offset of the stream's [`StreamHeader`].
    pub offset: u64,
    /// Bytes of data in use.
    pub length: u64,
    /// Bytes allocated, header included.
    pub reserved: u64,
    /// Stream flags.
    pub flags: u8,
}

impl StreamLocation {
    fn new(offset: u32, header: StreamHeader) -> Self {
        Self {
            offset: u64::from(offset),
            length: u64::from(header.used),
            reserved: u64::from(header.reserved),
            flags: header.flags,
        }
    }

    /// Offset of the first data byte, just past the stream header.
    #[must_use]
    pub const fn data_offset(&self) -> u64 {
        self.offset + StreamHeader::SIZE as u64
    }
}

/// One directory entry: a stream name and its header offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryEntry {
    /// Raw stream name, without the terminator.
    pub name: Vec<u8>,
    /// Offset of the stream's [`StreamHeader`].
    pub offset: u32,
}

impl DirectoryEntry {
    /// Returns the name as text, replacing invalid UTF-8.
    #[must_use]
    pub fn name_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

/// A help container opened over a [`VirtualFile`].
///
/// Nothing besides the container header is cached: every lookup walks the
/// directory again, so the container is cheap to hold and never stale.
///
/// # Example
///
/// ```rust,ignore
/// use hlpdec_core::Container;
/// use hlpdec_storage::DiskFile;
///
/// let mut container = Container::open(DiskFile::open("WINHELP.HLP".as_ref())?)?;
/// if let Some(system) = container.locate("|SYSTEM")? {
///     println!("|SYSTEM: {} bytes at {:#x}", system.length, system.offset);
/// }
/// ```
#[derive(Debug)]
pub struct Container<F> {
    file: F,
    header: ContainerHeader,
    config: Config,
}

impl<F: VirtualFile> Container<F> {
    /// Opens a container with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] if the header magic does not
    /// match, or a short read if the file is smaller than a header.
    pub fn open(file: F) -> CoreResult<Self> {
        Self::open_with_config(file, Config::default())
    }

    /// Opens a container with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] if the header magic does not
    /// match, or a short read if the file is smaller than a header.
    pub fn open_with_config(mut file: F, config: Config) -> CoreResult<Self> {
        file.seek(0)?;
        let header = ContainerHeader::read(&mut file)?;
        debug!(
            directory_start = header.directory_start,
            file_size = header.file_size,
            "opened container"
        );
        Ok(Self {
            file,
            header,
            config,
        })
    }

    /// Returns the container header.
    #[must_use]
    pub const fn header(&self) -> &ContainerHeader {
        &self.header
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the underlying file.
    pub fn file_mut(&mut self) -> &mut F {
        &mut self.file
    }

    /// Consumes the container, returning the underlying file.
    pub fn into_inner(self) -> F {
        self.file
    }

    /// Reads the directory's own stream header.
    ///
    /// # Errors
    ///
    /// Returns a short read or [`CoreError::InvalidFormat`].
    pub fn directory_header(&mut self) -> CoreResult<StreamHeader> {
        self.file.seek(u64::from(self.header.directory_start))?;
        StreamHeader::read(&mut self.file)
    }

    fn directory_tree(&mut self) -> CoreResult<BTree> {
        self.directory_header()?;
        BTree::read(&mut self.file, &self.config)
    }

    /// Finds the stream called `name`.
    ///
    /// Names compare byte-wise and case-sensitively. Returns `None` if the
    /// directory has no such entry.
    ///
    /// # Errors
    ///
    /// Returns a short read, [`CoreError::InvalidFormat`],
    /// [`CoreError::NameTooLong`] or [`CoreError::CorruptDirectory`].
    pub fn locate(&mut self, name: impl AsRef<[u8]>) -> CoreResult<Option<StreamLocation>> {
        let name = name.as_ref();
        let tree = self.directory_tree()?;
        let leaf = tree.find_leaf(&mut self.file, name, &self.config)?;

        for _ in 0..entry_count(leaf.entries)? {
            let entry = read_name(&mut self.file, &self.config)?;
            let offset = self.file.read_u32_le()?;
            if entry == name {
                self.file.seek(u64::from(offset))?;
                let header = StreamHeader::read(&mut self.file)?;
                let location = StreamLocation::new(offset, header);
                debug!(
                    name = %String::from_utf8_lossy(name),
                    offset = location.offset,
                    length = location.length,
                    "located stream"
                );
                return Ok(Some(location));
            }
        }

        debug!(name = %String::from_utf8_lossy(name), "stream not found");
        Ok(None)
    }

    /// Lists every directory entry in key order.
    ///
    /// # Errors
    ///
    /// Returns a short read, [`CoreError::InvalidFormat`],
    /// [`CoreError::NameTooLong`] or [`CoreError::CorruptDirectory`].
    pub fn entries(&mut self) -> CoreResult<Vec<DirectoryEntry>> {
        let tree = self.directory_tree()?;
        let mut cursor = LeafCursor::new(tree);
        let mut entries = Vec::new();

        let mut count = cursor.first_page(&mut self.file)?;
        while count > 0 {
            for _ in 0..count {
                let name = read_name(&mut self.file, &self.config)?;
                let offset = self.file.read_u32_le()?;
                entries.push(DirectoryEntry { name, offset });
            }
            count = cursor.next_page(&mut self.file)?;
        }

        Ok(entries)
    }

    /// Locates `name` and seeks to its first data byte.
    ///
    /// # Errors
    ///
    /// Same as [`locate`](Self::locate).
    pub fn open_stream(&mut self, name: impl AsRef<[u8]>) -> CoreResult<Option<StreamLocation>> {
        let Some(location) = self.locate(name)? else {
            return Ok(None);
        };
        self.file.seek(location.data_offset())?;
        Ok(Some(location))
    }

    /// Reads the used bytes of stream `name` into memory.
    ///
    /// # Errors
    ///
    /// Same as [`locate`](Self::locate), plus [`CoreError::StreamTooLarge`]
    /// if the length does not fit in memory.
    pub fn read_stream(&mut self, name: impl AsRef<[u8]>) -> CoreResult<Option<Vec<u8>>> {
        let Some(location) = self.open_stream(name)? else {
            return Ok(None);
        };
        let len = usize::try_from(location.length).map_err(|_| CoreError::StreamTooLarge {
            size: location.length,
        })?;
        Ok(Some(self.file.read_vec(len)?))
    }

    /// Copies stream `name` verbatim into `sink`, returning the number of
    /// bytes the sink accepted.
    ///
    /// # Errors
    ///
    /// Same as [`locate`](Self::locate).
    pub fn copy_stream<D>(&mut self, name: impl AsRef<[u8]>, sink: &mut D) -> CoreResult<Option<u64>>
    where
        D: VirtualFile + ?Sized,
    {
        let Some(location) = self.open_stream(name)? else {
            return Ok(None);
        };
        Ok(Some(copy_bytes(&mut self.file, location.length, sink)?))
    }

    /// Expands stream `name` with `method` into `sink`, returning the
    /// number of bytes the sink accepted.
    ///
    /// # Errors
    ///
    /// Same as [`locate`](Self::locate).
    pub fn decompress_stream<D>(
        &mut self,
        name: impl AsRef<[u8]>,
        method: Method,
        sink: &mut D,
    ) -> CoreResult<Option<u64>>
    where
        D: VirtualFile + ?Sized,
    {
        let Some(location) = self.open_stream(name)? else {
            return Ok(None);
        };
        Ok(Some(decompress(method, &mut self.file, location.length, sink)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::btree::{IndexPageHeader, LeafPageHeader, NO_PAGE};
    use crate::header::{BTreeHeader, BTREE_MAGIC};
    use hlpdec_storage::MemoryFile;

    const PAGE: usize = 64;
    const DIRECTORY: usize = 16;

    fn page(mut bytes: Vec<u8>) -> Vec<u8> {
        bytes.resize(PAGE, 0);
        bytes
    }

    /// A container with a two-level directory: `|SYSTEM` at 0x100 and
    /// `|TOPIC` at 0x400, split by the separator `|TOPIC`.
    fn fixture() -> Vec<u8> {
        let mut data = vec![0u8; 0x500];
        data[..16].copy_from_slice(&ContainerHeader::new(DIRECTORY as u32, 0x500).encode());

        let mut dir = StreamHeader::new((BTreeHeader::SIZE + 3 * PAGE) as u32).encode().to_vec();
        let mut structure = [0u8; 16];
        structure[..2].copy_from_slice(b"z4");
        dir.extend_from_slice(
            &BTreeHeader {
                magic: BTREE_MAGIC,
                flags: 0x0402,
                page_size: PAGE as u16,
                structure,
                must_be_zero: 0,
                page_splits: 1,
                root_page: 2,
                must_be_neg_one: -1,
                total_pages: 3,
                levels: 2,
                total_entries: 2,
            }
            .encode(),
        );

        // page 0: leaf with |SYSTEM
        let mut leaf = LeafPageHeader {
            unknown: 0,
            entries: 1,
            previous_page: NO_PAGE,
            next_page: 1,
        }
        .encode()
        .to_vec();
        leaf.extend_from_slice(b"|SYSTEM\0");
        leaf.extend_from_slice(&0x100u32.to_le_bytes());
        dir.extend(page(leaf));

        // page 1: leaf with |TOPIC
        let mut leaf = LeafPageHeader {
            unknown: 0,
            entries: 1,
            previous_page: 0,
            next_page: NO_PAGE,
        }
        .encode()
        .to_vec();
        leaf.extend_from_slice(b"|TOPIC\0");
        leaf.extend_from_slice(&0x400u32.to_le_bytes());
        dir.extend(page(leaf));

        // page 2: root index
        let mut root = IndexPageHeader {
            unknown: 0,
            entries: 1,
            previous_page: 0,
        }
        .encode()
        .to_vec();
        root.extend_from_slice(b"|TOPIC\0");
        root.extend_from_slice(&1u16.to_le_bytes());
        dir.extend(page(root));

        data[DIRECTORY..DIRECTORY + dir.len()].copy_from_slice(&dir);

        let system = StreamHeader::new(4).encode();
        data[0x100..0x109].copy_from_slice(&system);
        data[0x109..0x10D].copy_from_slice(b"sys!");

        let topic = StreamHeader {
            reserved: 0x40,
            used: 6,
            flags: 0,
        }
        .encode();
        data[0x400..0x409].copy_from_slice(&topic);
        data[0x409..0x40F].copy_from_slice(&[0x03, b'z', 0x82, b'o', b'k', 0xEE]);
        data
    }

    #[test]
    fn locate_in_two_level_directory() {
        let data = fixture();
        let mut container = Container::open(MemoryFile::reader(&data)).unwrap();

        let topic = container.locate("|TOPIC").unwrap().unwrap();
        assert_eq!(topic.offset, 0x400);
        assert_eq!(topic.length, 6);
        assert_eq!(topic.reserved, 0x40);
        assert_eq!(topic.data_offset(), 0x409);

        let system = container.locate("|SYSTEM").unwrap().unwrap();
        assert_eq!(system.offset, 0x100);
        assert_eq!(system.length, 4);

        assert!(container.locate("|MISSING").unwrap().is_none());
        assert!(container.locate("|topic").unwrap().is_none());
    }

    #[test]
    fn entries_in_key_order() {
        let data = fixture();
        let mut container = Container::open(MemoryFile::reader(&data)).unwrap();
        let entries = container.entries().unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name_lossy().into_owned()).collect();
        assert_eq!(names, ["|SYSTEM", "|TOPIC"]);
        assert_eq!(entries[1].offset, 0x400);
    }

    #[test]
    fn directory_header_is_readable() {
        let data = fixture();
        let mut container = Container::open(MemoryFile::reader(&data)).unwrap();
        let header = container.directory_header().unwrap();
        assert_eq!(header.used as usize, BTreeHeader::SIZE + 3 * PAGE);
    }

    #[test]
    fn read_and_decompress_streams() {
        let data = fixture();
        let mut container = Container::open(MemoryFile::reader(&data)).unwrap();

        assert_eq!(container.read_stream("|SYSTEM").unwrap().unwrap(), b"sys!");
        assert!(container.read_stream("|NOPE").unwrap().is_none());

        let mut out = [0u8; 16];
        let mut sink = MemoryFile::writer(&mut out);
        let produced = container
            .decompress_stream("|TOPIC", Method::RunLength, &mut sink)
            .unwrap()
            .unwrap();
        assert_eq!(produced, 5);
        assert_eq!(sink.written(), b"zzzok");
    }

    #[test]
    fn copy_stream_into_bounded_sink() {
        let data = fixture();
        let mut container = Container::open(MemoryFile::reader(&data)).unwrap();
        let mut out = [0u8; 2];
        let mut sink = MemoryFile::writer(&mut out);
        let copied = container.copy_stream("|SYSTEM", &mut sink).unwrap();
        assert_eq!(copied, Some(2));
        assert_eq!(&out, b"sy");
    }

    #[test]
    fn open_rejects_zero_header() {
        let data = [0u8; 16];
        let result = Container::open(MemoryFile::reader(&data));
        assert!(matches!(result, Err(CoreError::InvalidFormat { .. })));
    }

    #[test]
    fn open_short_file_is_short_read() {
        let data = [0x3F, 0x5F];
        let err = Container::open(MemoryFile::reader(&data)).unwrap_err();
        assert!(err.is_short_read());
    }

    #[test]
    fn container_over_borrowed_file() {
        let data = fixture();
        let mut file = MemoryFile::reader(&data);
        {
            let mut container = Container::open(&mut file).unwrap();
            assert!(container.locate("|SYSTEM").unwrap().is_some());
        }
        assert_eq!(file.len(), data.len());
    }
}
