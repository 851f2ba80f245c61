//! Test fixtures and container builders.
//!
//! [`ContainerBuilder`] writes a complete help container into memory: a
//! header, one body per stream, and a directory B+tree with as many index
//! levels as the page size forces.

use hlpdec_core::{
    BTreeHeader, ContainerHeader, IndexPageHeader, LeafPageHeader, StreamHeader, SystemHeader,
    BTREE_MAGIC, NO_PAGE, SYSTEM_MAGIC,
};
use std::collections::BTreeMap;
use std::io::Write;
use tempfile::NamedTempFile;

/// Default directory page size used by real help files.
pub const DEFAULT_PAGE_SIZE: u16 = 1024;

/// Builds help containers for tests.
///
/// Streams are sorted by name; adding a name twice keeps the last body.
///
/// # Example
///
/// ```rust,ignore
/// let data = ContainerBuilder::new()
///     .page_size(64)
///     .stream("|SYSTEM", system_stream(21, 0, &[]))
///     .stream("|TOPIC", b"hello".to_vec())
///     .build();
/// let mut container = Container::open(MemoryFile::reader(&data))?;
/// ```
#[derive(Debug, Clone)]
pub struct ContainerBuilder {
    page_size: u16,
    slack: u32,
    streams: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// One built page with the first key it covers.
struct Page {
    first_key: Vec<u8>,
    bytes: Vec<u8>,
}

impl ContainerBuilder {
    /// Creates an empty builder with [`DEFAULT_PAGE_SIZE`] pages.
    #[must_use]
    pub fn new() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            slack: 0,
            streams: BTreeMap::new(),
        }
    }

    /// Sets the directory page size.
    #[must_use]
    pub fn page_size(mut self, page_size: u16) -> Self {
        self.page_size = page_size;
        self
    }

    /// Reserves `slack` unused bytes after every stream body.
    #[must_use]
    pub fn slack(mut self, slack: u32) -> Self {
        self.slack = slack;
        self
    }

    /// Adds a stream.
    #[must_use]
    pub fn stream(mut self, name: impl AsRef<[u8]>, data: impl Into<Vec<u8>>) -> Self {
        self.streams.insert(name.as_ref().to_vec(), data.into());
        self
    }

    /// Returns the number of streams added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.streams.len()
    }

    /// Checks if no stream was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.streams.is_empty()
    }

    /// Writes the container.
    ///
    /// # Panics
    ///
    /// Panics if a single directory entry does not fit on a page, or if
    /// index pages cannot hold two keys.
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let mut data = vec![0u8; ContainerHeader::SIZE];
        let mut entries = Vec::with_capacity(self.streams.len());

        for (name, body) in &self.streams {
            let offset = data.len() as u32;
            let mut header = StreamHeader::new(body.len() as u32);
            header.reserved += self.slack;
            data.extend_from_slice(&header.encode());
            data.extend_from_slice(body);
            data.resize(data.len() + self.slack as usize, 0);
            entries.push((name.clone(), offset));
        }

        let directory_start = data.len() as u32;
        let (tree, pages) = self.directory(&entries);
        let used = (BTreeHeader::SIZE + pages.len() * usize::from(self.page_size)) as u32;
        data.extend_from_slice(&StreamHeader::new(used).encode());
        data.extend_from_slice(&tree.encode());
        for page in pages {
            data.extend_from_slice(&page);
        }

        let header = ContainerHeader::new(directory_start, data.len() as u32);
        data[..ContainerHeader::SIZE].copy_from_slice(&header.encode());
        data
    }

    /// Writes the container to a temporary file.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be written.
    #[must_use]
    pub fn write_temp(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(&self.build()).expect("Failed to write container");
        file.flush().expect("Failed to flush container");
        file
    }

    fn directory(&self, entries: &[(Vec<u8>, u32)]) -> (BTreeHeader, Vec<Vec<u8>>) {
        let page_size = usize::from(self.page_size);
        let mut pages: Vec<Vec<u8>> = Vec::new();

        let leaves = pack(entries, page_size - LeafPageHeader::SIZE, |(name, _)| name.len() + 5);
        let leaf_count = leaves.len().max(1);
        let mut level: Vec<Page> = Vec::with_capacity(leaf_count);
        for i in 0..leaf_count {
            let chunk = leaves.get(i).map_or(&[][..], Vec::as_slice);
            let mut bytes = LeafPageHeader {
                unknown: 0,
                entries: chunk.len() as i16,
                previous_page: if i == 0 { NO_PAGE } else { i as i16 - 1 },
                next_page: if i + 1 == leaf_count { NO_PAGE } else { i as i16 + 1 },
            }
            .encode()
            .to_vec();
            for (name, offset) in chunk {
                bytes.extend_from_slice(name);
                bytes.push(0);
                bytes.extend_from_slice(&offset.to_le_bytes());
            }
            let first_key = chunk.first().map(|(name, _)| name.clone()).unwrap_or_default();
            level.push(Page { first_key, bytes });
        }

        let mut numbers: Vec<i16> = Vec::new();
        let mut levels = 1i16;
        loop {
            numbers.clear();
            for page in &level {
                numbers.push(pages.len() as i16);
                let mut bytes = page.bytes.clone();
                bytes.resize(page_size, 0);
                pages.push(bytes);
            }
            if level.len() == 1 {
                break;
            }

            let children: Vec<(Vec<u8>, i16)> = level
                .iter()
                .zip(&numbers)
                .map(|(page, &number)| (page.first_key.clone(), number))
                .collect();
            let groups = pack(&children, page_size - IndexPageHeader::SIZE, |(key, _)| key.len() + 3);
            assert!(groups.len() < level.len(), "index keys too long for the page size");
            level = groups
                .iter()
                .map(|group| {
                    let mut bytes = IndexPageHeader {
                        unknown: 0,
                        entries: (group.len() - 1) as i16,
                        previous_page: group[0].1,
                    }
                    .encode()
                    .to_vec();
                    for (key, child) in &group[1..] {
                        bytes.extend_from_slice(key);
                        bytes.push(0);
                        bytes.extend_from_slice(&(*child as u16).to_le_bytes());
                    }
                    Page {
                        first_key: group[0].0.clone(),
                        bytes,
                    }
                })
                .collect();
            levels += 1;
        }

        let mut structure = [0u8; 16];
        structure[..2].copy_from_slice(b"z4");
        let tree = BTreeHeader {
            magic: BTREE_MAGIC,
            flags: 0x0002,
            page_size: self.page_size,
            structure,
            must_be_zero: 0,
            page_splits: 0,
            root_page: numbers[0],
            must_be_neg_one: -1,
            total_pages: pages.len() as i16,
            levels,
            total_entries: entries.len() as i32,
        };
        (tree, pages)
    }
}

/// Splits `items` into runs whose sizes fit `capacity`, at least one per run.
fn pack<T: Clone>(items: &[T], capacity: usize, size: impl Fn(&T) -> usize) -> Vec<Vec<T>> {
    let mut groups: Vec<Vec<T>> = Vec::new();
    let mut current: Vec<T> = Vec::new();
    let mut used = 0;
    for item in items {
        let cost = size(item);
        assert!(cost <= capacity, "directory entry larger than a page");
        if !current.is_empty() && used + cost > capacity {
            groups.push(std::mem::take(&mut current));
            used = 0;
        }
        used += cost;
        current.push(item.clone());
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

/// Builds a `|SYSTEM` stream body with the given version and records.
#[must_use]
pub fn system_stream(minor: u16, flags: u16, records: &[(u16, &[u8])]) -> Vec<u8> {
    let header = SystemHeader {
        magic: SYSTEM_MAGIC,
        minor,
        major: 1,
        gen_date: 0x3A1B_2C3D,
        flags,
    };
    let mut data = header.encode().to_vec();
    for (record_type, body) in records {
        data.extend_from_slice(&record_type.to_le_bytes());
        data.extend_from_slice(&(body.len() as u16).to_le_bytes());
        data.extend_from_slice(body);
    }
    data
}

/// Returns `count` sorted stream names, `|S000000` upward.
#[must_use]
pub fn numbered_names(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("|S{i:06}")).collect()
}

/// Test scenario helpers.
pub mod scenarios {
    use super::*;

    /// The two-stream container most tests start from: `|SYSTEM` with a
    /// title record and an uncompressed `|TOPIC`.
    #[must_use]
    pub fn minimal_help_file() -> ContainerBuilder {
        ContainerBuilder::new()
            .stream("|SYSTEM", system_stream(21, 0, &[(1, b"Sample Help\0")]))
            .stream("|TOPIC", b"topic text".to_vec())
    }

    /// A container with `count` numbered streams on small pages, so the
    /// directory needs several index levels.
    #[must_use]
    pub fn deep_directory(count: usize) -> ContainerBuilder {
        numbered_names(count)
            .into_iter()
            .enumerate()
            .fold(ContainerBuilder::new().page_size(64), |builder, (i, name)| {
                builder.stream(name, (i as u32).to_le_bytes().to_vec())
            })
    }
}
