//! Bit-level reader for packed index tables.

use crate::error::CodecResult;
use hlpdec_storage::VirtualFile;

/// Reads single bits, least significant first, out of little-endian
/// 32-bit words.
///
/// A fresh word is fetched every 32 bits. The partially consumed word
/// belongs to the reader, so two readers over different files never
/// interfere.
#[derive(Debug)]
pub struct BitReader<F> {
    file: F,
    word: u32,
    mask: u32,
}

impl<F: VirtualFile> BitReader<F> {
    /// Creates a reader positioned at the file's current offset.
    pub fn new(file: F) -> Self {
        Self {
            file,
            word: 0,
            mask: 0,
        }
    }

    /// Reads the next bit.
    ///
    /// # Errors
    ///
    /// Returns a short read error if a new word is needed and the file ends.
    pub fn read_bit(&mut self) -> CodecResult<bool> {
        self.mask <<= 1;
        if self.mask == 0 {
            self.word = self.file.read_u32_le()?;
            self.mask = 1;
        }
        Ok(self.word & self.mask != 0)
    }

    /// Reads `count` bits (at most 32) into an integer, first bit lowest.
    ///
    /// # Errors
    ///
    /// Returns a short read error if the file ends.
    pub fn read_bits(&mut self, count: u32) -> CodecResult<u32> {
        let mut value = 0;
        for bit in 0..count.min(32) {
            if self.read_bit()? {
                value |= 1 << bit;
            }
        }
        Ok(value)
    }

    /// Counts set bits up to and including the first clear bit.
    ///
    /// # Errors
    ///
    /// Returns a short read error if the file ends.
    pub fn read_unary(&mut self) -> CodecResult<u32> {
        let mut count = 0;
        while self.read_bit()? {
            count += 1;
        }
        Ok(count)
    }

    /// Drops the partially consumed word; the next read fetches a new one.
    pub fn reset(&mut self) {
        self.word = 0;
        self.mask = 0;
    }

    /// Returns the underlying file.
    pub fn into_inner(self) -> F {
        self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlpdec_storage::MemoryFile;

    #[test]
    fn bits_come_lsb_first() {
        let data = 0b1011_0001u32.to_le_bytes();
        let mut reader = BitReader::new(MemoryFile::reader(&data));
        let bits: Vec<bool> = (0..8).map(|_| reader.read_bit().unwrap()).collect();
        assert_eq!(bits, [true, false, false, false, true, true, false, true]);
    }

    #[test]
    fn new_word_every_32_bits() {
        let mut data = u32::MAX.to_le_bytes().to_vec();
        data.extend_from_slice(&1u32.to_le_bytes());
        let mut reader = BitReader::new(MemoryFile::reader(&data));
        assert_eq!(reader.read_bits(32).unwrap(), u32::MAX);
        assert!(reader.read_bit().unwrap());
        assert!(!reader.read_bit().unwrap());
        assert_eq!(reader.into_inner().tell().unwrap(), 8);
    }

    #[test]
    fn unary_then_fixed_bits() {
        // 1 1 0 | 1 0 1
        let data = 0b10_1011u32.to_le_bytes();
        let mut reader = BitReader::new(MemoryFile::reader(&data));
        assert_eq!(reader.read_unary().unwrap(), 2);
        assert_eq!(reader.read_bits(3).unwrap(), 0b101);
    }

    #[test]
    fn reset_discards_partial_word() {
        let mut data = 1u32.to_le_bytes().to_vec();
        data.extend_from_slice(&2u32.to_le_bytes());
        let mut reader = BitReader::new(MemoryFile::reader(&data));
        assert!(reader.read_bit().unwrap());
        reader.reset();
        assert!(!reader.read_bit().unwrap());
        assert!(reader.read_bit().unwrap());
    }

    #[test]
    fn exhausted_file_is_short_read() {
        let mut reader = BitReader::new(MemoryFile::reader(&[0xFF, 0xFF]));
        assert!(reader.read_bit().unwrap_err().is_short_read());
    }

    #[test]
    fn reader_over_borrowed_file() {
        let data = 3u32.to_le_bytes();
        let mut file = MemoryFile::reader(&data);
        {
            let mut reader = BitReader::new(&mut file);
            assert_eq!(reader.read_bits(2).unwrap(), 3);
        }
        assert_eq!(file.tell().unwrap(), 4);
    }
}
