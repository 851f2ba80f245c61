//! Disk-backed virtual file.

use crate::backend::VirtualFile;
use crate::error::{StorageError, StorageResult};
use std::fs::{File, OpenOptions};
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum Access {
    Read(BufReader<File>),
    Write(BufWriter<File>),
}

/// A virtual file over an open OS file handle.
///
/// A disk file is opened either as a source (buffered reads) or as a sink
/// (buffered writes). Write failures are deferred: `put_byte` always
/// accepts the byte and the first error is reported by `flush`.
///
/// # Example
///
/// ```no_run
/// use hlpdec_storage::{DiskFile, VirtualFile};
/// use std::path::Path;
///
/// let mut file = DiskFile::open(Path::new("WINHELP.HLP")).unwrap();
/// let magic = file.read_u32_le().unwrap();
/// ```
#[derive(Debug)]
pub struct DiskFile {
    path: Option<PathBuf>,
    access: Access,
    deferred: Option<io::Error>,
}

impl DiskFile {
    /// Opens an existing file for reading.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn open(path: &Path) -> StorageResult<Self> {
        let file = File::open(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            ..Self::from_reader(file)
        })
    }

    /// Creates (or truncates) a file for writing.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created.
    pub fn create(path: &Path) -> StorageResult<Self> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            ..Self::from_writer(file)
        })
    }

    /// Creates a file for writing, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created or file cannot be created.
    pub fn create_with_dirs(path: &Path) -> StorageResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::create(path)
    }

    /// Wraps an already open handle as a source.
    #[must_use]
    pub fn from_reader(file: File) -> Self {
        Self {
            path: None,
            access: Access::Read(BufReader::new(file)),
            deferred: None,
        }
    }

    /// Wraps an already open handle as a sink.
    #[must_use]
    pub fn from_writer(file: File) -> Self {
        Self {
            path: None,
            access: Access::Write(BufWriter::new(file)),
            deferred: None,
        }
    }

    /// Returns the path the file was opened from, if known.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Returns the size of the underlying file in bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the metadata cannot be read.
    pub fn size(&mut self) -> StorageResult<u64> {
        let len = match &mut self.access {
            Access::Read(reader) => reader.get_ref().metadata()?.len(),
            Access::Write(writer) => {
                writer.flush()?;
                writer.get_ref().metadata()?.len()
            }
        };
        Ok(len)
    }
}

impl VirtualFile for DiskFile {
    fn get_byte(&mut self) -> StorageResult<Option<u8>> {
        let Access::Read(reader) = &mut self.access else {
            return Err(StorageError::NotReadable);
        };
        let mut byte = [0u8; 1];
        loop {
            match reader.read(&mut byte) {
                Ok(0) => return Ok(None),
                Ok(_) => return Ok(Some(byte[0])),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn put_byte(&mut self, byte: u8) -> bool {
        match &mut self.access {
            Access::Write(writer) => {
                if self.deferred.is_none() {
                    if let Err(e) = writer.write_all(&[byte]) {
                        self.deferred = Some(e);
                    }
                }
                true
            }
            Access::Read(_) => false,
        }
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> StorageResult<()> {
        let Access::Read(reader) = &mut self.access else {
            return Err(StorageError::NotReadable);
        };
        let offset = reader.stream_position()?;
        match reader.read_exact(buf) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                Err(StorageError::short_read(offset, buf.len()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn tell(&mut self) -> StorageResult<u64> {
        let pos = match &mut self.access {
            Access::Read(reader) => reader.stream_position()?,
            Access::Write(writer) => writer.stream_position()?,
        };
        Ok(pos)
    }

    fn seek(&mut self, offset: u64) -> StorageResult<()> {
        match &mut self.access {
            Access::Read(reader) => reader.seek(SeekFrom::Start(offset))?,
            Access::Write(writer) => writer.seek(SeekFrom::Start(offset))?,
        };
        Ok(())
    }

    fn flush(&mut self) -> StorageResult<()> {
        if let Some(e) = self.deferred.take() {
            return Err(e.into());
        }
        if let Access::Write(writer) = &mut self.access {
            writer.flush()?;
        }
        Ok(())
    }
}
