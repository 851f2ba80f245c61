//! Memory-window virtual file.

use crate::backend::VirtualFile;
use crate::error::{StorageError, StorageResult};

#[derive(Debug)]
enum Window<'a> {
    Shared(&'a [u8]),
    Exclusive(&'a mut [u8]),
}

impl Window<'_> {
    fn bytes(&self) -> &[u8] {
        match self {
            Self::Shared(data) => data,
            Self::Exclusive(data) => data,
        }
    }
}

/// A virtual file over a borrowed, fixed-size memory window.
///
/// The window is `[0, len)` of the borrowed slice. The cursor never moves
/// past the end: reads stop with end of data and writes are dropped once
/// the window is full. Pass a sub-slice to bound the window explicitly.
///
/// # Example
///
/// ```rust
/// use hlpdec_storage::{MemoryFile, VirtualFile};
///
/// let mut out = [0u8; 2];
/// let mut sink = MemoryFile::writer(&mut out);
/// assert!(sink.put_byte(b'h'));
/// assert!(sink.put_byte(b'i'));
/// assert!(!sink.put_byte(b'!'));
/// assert_eq!(&out, b"hi");
/// ```
#[derive(Debug)]
pub struct MemoryFile<'a> {
    window: Window<'a>,
    pos: usize,
}

impl<'a> MemoryFile<'a> {
    /// Creates a read-only memory file. Writes are always refused.
    #[must_use]
    pub fn reader(data: &'a [u8]) -> Self {
        Self {
            window: Window::Shared(data),
            pos: 0,
        }
    }

    /// Creates a writable memory file whose capacity is the slice length.
    #[must_use]
    pub fn writer(data: &'a mut [u8]) -> Self {
        Self {
            window: Window::Exclusive(data),
            pos: 0,
        }
    }

    /// Returns the size of the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.window.bytes().len()
    }

    /// Returns true if the window is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current cursor position.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of bytes between the cursor and the end.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.len() - self.pos
    }

    /// Returns the bytes before the cursor.
    ///
    /// For a writer this is everything written so far.
    #[must_use]
    pub fn written(&self) -> &[u8] {
        &self.window.bytes()[..self.pos]
    }
}

impl VirtualFile for MemoryFile<'_> {
    fn get_byte(&mut self) -> StorageResult<Option<u8>> {
        let byte = self.window.bytes().get(self.pos).copied();
        if byte.is_some() {
            self.pos += 1;
        }
        Ok(byte)
    }

    fn put_byte(&mut self, byte: u8) -> bool {
        match &mut self.window {
            Window::Exclusive(data) if self.pos < data.len() => {
                data[self.pos] = byte;
                self.pos += 1;
                true
            }
            _ => false,
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        if buf.len() > self.remaining() {
            return Err(StorageError::short_read(self.pos as u64, buf.len()));
        }
        let end = self.pos + buf.len();
        buf.copy_from_slice(&self.window.bytes()[self.pos..end]);
        self.pos = end;
        Ok(())
    }

    fn tell(&mut self) -> StorageResult<u64> {
        Ok(self.pos as u64)
    }

    fn seek(&mut self, offset: u64) -> StorageResult<()> {
        let size = self.len() as u64;
        if offset > size {
            return Err(StorageError::SeekOutOfRange { offset, size });
        }
        self.pos = offset as usize;
        Ok(())
    }
}
