//! The `|SYSTEM` stream: file version, compression flags and typed records.

use crate::container::Container;
use crate::error::{CoreError, CoreResult};
use hlpdec_codec::Method;
use hlpdec_storage::VirtualFile;
use tracing::warn;

/// Name of the system stream.
pub const SYSTEM_STREAM: &str = "|SYSTEM";

/// Magic number of the system header.
pub const SYSTEM_MAGIC: u16 = 0x036C;

/// Topic block header plus text, uncompressed in old files.
const SMALL_BLOCK: u32 = 2048;
const LARGE_BLOCK: u32 = 4096;

/// The 12-byte header at the start of `|SYSTEM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemHeader {
    /// Always [`SYSTEM_MAGIC`].
    pub magic: u16,
    /// Format minor version (15 for 3.0, 21 for 3.1, 27/33 for later).
    pub minor: u16,
    /// Format major version, always 1.
    pub major: u16,
    /// Generation time as Unix seconds, or 0.
    pub gen_date: u32,
    /// Compression flags.
    pub flags: u16,
}

/// How `|TOPIC` is cut into blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicLayout {
    /// Bytes per block in the container, block header included.
    pub block_size: u32,
    /// Whether each block's text is LZ77 compressed.
    pub compressed: bool,
}

impl TopicLayout {
    /// Returns the method for topic block text.
    #[must_use]
    pub const fn method(&self) -> Method {
        if self.compressed {
            Method::Lz77
        } else {
            Method::Copy
        }
    }
}

impl SystemHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 12;

    /// Decodes a header, checking the magic.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] if the slice is too short or the
    /// magic does not match.
    pub fn decode(data: &[u8]) -> CoreResult<Self> {
        if data.len() < Self::SIZE {
            return Err(CoreError::invalid_format("truncated system header"));
        }
        let word = |at: usize| u16::from_le_bytes([data[at], data[at + 1]]);
        let magic = word(0);
        if magic != SYSTEM_MAGIC {
            return Err(CoreError::invalid_format(format!(
                "bad system magic {magic:#06x}"
            )));
        }
        Ok(Self {
            magic,
            minor: word(2),
            major: word(4),
            gen_date: u32::from_le_bytes([data[6], data[7], data[8], data[9]]),
            flags: word(10),
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
        buf[2..4].copy_from_slice(&self.minor.to_le_bytes());
        buf[4..6].copy_from_slice(&self.major.to_le_bytes());
        buf[6..10].copy_from_slice(&self.gen_date.to_le_bytes());
        buf[10..12].copy_from_slice(&self.flags.to_le_bytes());
        buf
    }

    /// Returns true if typed records follow the header.
    #[must_use]
    pub const fn has_records(&self) -> bool {
        self.major == 1 && self.minor >= 16
    }

    /// Returns true if a bare title string follows the header instead of
    /// records (3.0 files).
    #[must_use]
    pub const fn has_legacy_title(&self) -> bool {
        self.minor < 16
    }

    /// Derives the `|TOPIC` block layout from version and flags.
    #[must_use]
    pub const fn topic_layout(&self) -> TopicLayout {
        if self.minor <= 16 {
            TopicLayout {
                block_size: SMALL_BLOCK,
                compressed: false,
            }
        } else if self.flags == 8 {
            TopicLayout {
                block_size: SMALL_BLOCK,
                compressed: true,
            }
        } else if self.flags == 4 {
            TopicLayout {
                block_size: LARGE_BLOCK,
                compressed: true,
            }
        } else {
            TopicLayout {
                block_size: LARGE_BLOCK,
                compressed: false,
            }
        }
    }
}

/// Known record types.
pub mod record_type {
    /// Help title.
    pub const TITLE: u16 = 1;
    /// Copyright notice.
    pub const COPYRIGHT: u16 = 2;
    /// Topic offset of the contents topic.
    pub const CONTENTS: u16 = 3;
    /// Startup macro.
    pub const CONFIG: u16 = 4;
    /// Window icon.
    pub const ICON: u16 = 5;
    /// Secondary window definition.
    pub const WINDOW: u16 = 6;
    /// Citation appended to copied text.
    pub const CITATION: u16 = 8;
    /// Locale identifier.
    pub const LCID: u16 = 9;
    /// Contents (.CNT) file name.
    pub const CNT: u16 = 10;
    /// Character set.
    pub const CHARSET: u16 = 11;
}

/// One typed `|SYSTEM` record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemRecord {
    /// Record type, see [`record_type`].
    pub record_type: u16,
    /// Raw record data.
    pub data: Vec<u8>,
}

impl SystemRecord {
    /// Returns the text of a string record, up to its first nul.
    ///
    /// Returns `None` for record types that do not hold text.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        match self.record_type {
            record_type::TITLE
            | record_type::COPYRIGHT
            | record_type::CONFIG
            | record_type::CITATION
            | record_type::CNT => {
                let end = self.data.iter().position(|&b| b == 0).unwrap_or(self.data.len());
                Some(String::from_utf8_lossy(&self.data[..end]).into_owned())
            }
            _ => None,
        }
    }

    /// Returns the topic offset of a contents record.
    #[must_use]
    pub fn contents_offset(&self) -> Option<u32> {
        if self.record_type != record_type::CONTENTS || self.data.len() < 4 {
            return None;
        }
        Some(u32::from_le_bytes([
            self.data[0],
            self.data[1],
            self.data[2],
            self.data[3],
        ]))
    }
}

/// Iterator over the records that follow a [`SystemHeader`].
///
/// Each record is `record_type u16, data_size u16, data`. Iteration ends
/// when fewer than four bytes of the stream remain or a record claims more
/// data than remains.
#[derive(Debug)]
pub struct SystemRecords<'a, F: ?Sized> {
    file: &'a mut F,
    remaining: u64,
}

impl<'a, F: VirtualFile + ?Sized> SystemRecords<'a, F> {
    /// Creates an iterator over the records of a `|SYSTEM` stream of
    /// `stream_len` bytes, with `file` positioned just after the header.
    ///
    /// Yields nothing if the header announces no records.
    pub fn new(file: &'a mut F, header: &SystemHeader, stream_len: u64) -> Self {
        let remaining = if header.has_records() {
            stream_len.saturating_sub(SystemHeader::SIZE as u64)
        } else {
            0
        };
        Self { file, remaining }
    }

    fn next_record(&mut self) -> CoreResult<Option<SystemRecord>> {
        if self.remaining < 4 {
            if self.remaining > 0 {
                warn!(remaining = self.remaining, "trailing bytes after system records");
                self.remaining = 0;
            }
            return Ok(None);
        }
        let record_type = self.file.read_u16_le()?;
        let size = self.file.read_u16_le()?;
        self.remaining -= 4;
        if self.remaining < u64::from(size) {
            warn!(
                record_type,
                size,
                remaining = self.remaining,
                "system record overruns stream"
            );
            self.remaining = 0;
            return Ok(None);
        }
        let data = self.file.read_vec(usize::from(size))?;
        self.remaining -= u64::from(size);
        Ok(Some(SystemRecord { record_type, data }))
    }
}

impl<F: VirtualFile + ?Sized> Iterator for SystemRecords<'_, F> {
    type Item = CoreResult<SystemRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }
}

/// The decoded `|SYSTEM` stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    /// The header.
    pub header: SystemHeader,
    /// Title of a 3.0 file, which has no records.
    pub legacy_title: Option<String>,
    /// Typed records in stored order.
    pub records: Vec<SystemRecord>,
}

impl SystemInfo {
    /// Returns the first record of `record_type`.
    #[must_use]
    pub fn record(&self, record_type: u16) -> Option<&SystemRecord> {
        self.records.iter().find(|r| r.record_type == record_type)
    }

    /// Returns the help title from either file generation.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        self.legacy_title
            .clone()
            .or_else(|| self.record(record_type::TITLE).and_then(SystemRecord::text))
    }
}

impl<F: VirtualFile> Container<F> {
    /// Reads and decodes `|SYSTEM`, or `None` if the container has none.
    ///
    /// # Errors
    ///
    /// Returns a short read or [`CoreError::InvalidFormat`] for a bad
    /// system magic, plus the errors of [`Container::locate`].
    pub fn system(&mut self) -> CoreResult<Option<SystemInfo>> {
        let Some(location) = self.open_stream(SYSTEM_STREAM)? else {
            return Ok(None);
        };
        let max_name = self.config().max_name_length;
        let file = self.file_mut();
        let header = SystemHeader::read(file)?;

        let legacy_title = if header.has_legacy_title() {
            file.read_cstring(max_name)?
                .map(|title| String::from_utf8_lossy(&title).into_owned())
        } else {
            None
        };

        let records = SystemRecords::new(file, &header, location.length).collect::<CoreResult<Vec<_>>>()?;
        Ok(Some(SystemInfo {
            header,
            legacy_title,
            records,
        }))
    }
}
