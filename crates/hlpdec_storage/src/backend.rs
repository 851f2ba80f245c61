//! Virtual file trait definition.

use crate::error::{StorageError, StorageResult};

/// Size of the scratch buffer used by [`copy_bytes`].
pub const COPY_BUFFER_SIZE: usize = 512;

/// A positioned byte stream over either a memory window or a real file.
///
/// Every decoding algorithm (copying, decompression, B+tree walks) is
/// written once against this trait. Nested decoding reuses the same code
/// by wrapping a decoded buffer in a [`super::MemoryFile`].
///
/// # Invariants
///
/// - `get_byte` returns `Ok(None)` at end of data; it never fails on
///   exhaustion
/// - `put_byte` returns `false` only when a bounded memory window is full
/// - `read_exact` either fills the whole buffer or fails with
///   [`StorageError::ShortRead`]
/// - `tell` and `seek` use absolute positions
///
/// # Implementors
///
/// - [`super::MemoryFile`] - Borrowed, capacity-bounded memory window
/// - [`super::DiskFile`] - Buffered OS file
pub trait VirtualFile {
    /// Reads the next byte, or `None` at end of data.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn get_byte(&mut self) -> StorageResult<Option<u8>>;

    /// Writes one byte.
    ///
    /// Returns `false` if the byte was dropped because a memory window is
    /// full. Disk files always accept the byte and report write failures
    /// from [`VirtualFile::flush`].
    fn put_byte(&mut self, byte: u8) -> bool;

    /// Fills `buf` completely.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ShortRead`] if fewer bytes are available.
    fn read_exact(&mut self, buf: &mut [u8]) -> StorageResult<()>;

    /// Returns the current absolute position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position cannot be determined.
    fn tell(&mut self) -> StorageResult<u64>;

    /// Moves to an absolute position.
    ///
    /// # Errors
    ///
    /// Returns an error if the position is outside a memory window or the
    /// OS seek fails.
    fn seek(&mut self, offset: u64) -> StorageResult<()>;

    /// Pushes buffered writes out and reports any deferred write failure.
    ///
    /// # Errors
    ///
    /// Returns the first write error seen since the last flush.
    fn flush(&mut self) -> StorageResult<()> {
        Ok(())
    }

    /// Reads one byte, treating end of data as a short read.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ShortRead`] at end of data.
    fn read_byte(&mut self) -> StorageResult<u8> {
        match self.get_byte()? {
            Some(byte) => Ok(byte),
            None => Err(StorageError::short_read(self.tell()?, 1)),
        }
    }

    /// Reads `len` bytes into a new vector.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ShortRead`] if fewer bytes are available.
    fn read_vec(&mut self, len: usize) -> StorageResult<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Reads a little-endian 16-bit word.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ShortRead`] if fewer than 2 bytes remain.
    fn read_u16_le(&mut self) -> StorageResult<u16> {
        let mut buf = [0u8; 2];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads a little-endian 32-bit word.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::ShortRead`] if fewer than 4 bytes remain.
    fn read_u32_le(&mut self) -> StorageResult<u32> {
        let mut buf = [0u8; 4];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads a nul-terminated string of at most `max_len` bytes.
    ///
    /// End of data also terminates the string. The terminator is consumed
    /// but not returned. Returns `None` if the string does not terminate
    /// within `max_len` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read_cstring(&mut self, max_len: usize) -> StorageResult<Option<Vec<u8>>> {
        let mut out = Vec::new();
        while let Some(byte) = self.get_byte()? {
            if byte == 0 {
                break;
            }
            if out.len() >= max_len {
                return Ok(None);
            }
            out.push(byte);
        }
        Ok(Some(out))
    }
}

impl<F: VirtualFile + ?Sized> VirtualFile for &mut F {
    fn get_byte(&mut self) -> StorageResult<Option<u8>> {
        (**self).get_byte()
    }

    fn put_byte(&mut self, byte: u8) -> bool {
        (**self).put_byte(byte)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        (**self).read_exact(buf)
    }

    fn tell(&mut self) -> StorageResult<u64> {
        (**self).tell()
    }

    fn seek(&mut self, offset: u64) -> StorageResult<()> {
        (**self).seek(offset)
    }

    fn flush(&mut self) -> StorageResult<()> {
        (**self).flush()
    }
}

/// Copies `len` bytes verbatim from `source` to `sink`.
///
/// Uses a call-owned scratch buffer of [`COPY_BUFFER_SIZE`] bytes. Bytes a
/// full memory sink refuses are dropped; the source is still consumed.
/// Returns the number of bytes the sink accepted.
///
/// # Errors
///
/// Returns [`StorageError::ShortRead`] if the source holds fewer than `len`
/// bytes.
pub fn copy_bytes<S, D>(source: &mut S, len: u64, sink: &mut D) -> StorageResult<u64>
where
    S: VirtualFile + ?Sized,
    D: VirtualFile + ?Sized,
{
    let mut buffer = [0u8; COPY_BUFFER_SIZE];
    let mut copied = 0u64;
    let mut accepted = 0u64;

    while copied < len {
        let chunk = (len - copied).min(COPY_BUFFER_SIZE as u64) as usize;
        source.read_exact(&mut buffer[..chunk])?;
        for &byte in &buffer[..chunk] {
            if sink.put_byte(byte) {
                accepted += 1;
            }
        }
        copied += chunk as u64;
    }

    Ok(accepted)
}
