//! Headers of the phrase index and topic streams.

use crate::error::{CoreError, CoreResult};
use hlpdec_codec::BitReader;
use hlpdec_storage::VirtualFile;

/// Name of the phrase index stream.
pub const PHRASE_INDEX_STREAM: &str = "|PhrIndex";

/// Name of the topic stream.
pub const TOPIC_STREAM: &str = "|TOPIC";

/// Header of `|PhrIndex`.
///
/// The seventh field packs `bits` into its low 4 bits and an unknown value
/// into the high 12 bits of one little-endian word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhrIndexHeader {
    /// Usually `0x4A01`.
    pub always_4a01: i32,
    /// Number of phrases.
    pub entries: i32,
    /// Size of the compressed index.
    pub compressed_size: i32,
    /// Size of `|PhrImage` after decompression.
    pub phr_image_size: i32,
    /// Stored size of `|PhrImage`.
    pub phr_image_compressed_size: i32,
    /// Always zero.
    pub always_0: i32,
    /// Width of the fixed part of each packed phrase length.
    pub bits: u8,
    /// High 12 bits of the packed word.
    pub unknown: u16,
    /// Usually `0x4A00`.
    pub always_4a00: u16,
}

impl PhrIndexHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 28;

    /// Reads a header at the file's current position.
    ///
    /// # Errors
    ///
    /// Returns a short read error if the stream is truncated.
    pub fn read<F: VirtualFile + ?Sized>(file: &mut F) -> CoreResult<Self> {
        let mut fields = [0i32; 6];
        for field in &mut fields {
            *field = file.read_u32_le()? as i32;
        }
        let packed = file.read_u16_le()?;
        Ok(Self {
            always_4a01: fields[0],
            entries: fields[1],
            compressed_size: fields[2],
            phr_image_size: fields[3],
            phr_image_compressed_size: fields[4],
            always_0: fields[5],
            bits: (packed & 0x000F) as u8,
            unknown: packed >> 4,
            always_4a00: file.read_u16_le()?,
        })
    }

    /// Encodes the header to bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        let fields = [
            self.always_4a01,
            self.entries,
            self.compressed_size,
            self.phr_image_size,
            self.phr_image_compressed_size,
            self.always_0,
        ];
        for (i, field) in fields.iter().enumerate() {
            buf[i * 4..i * 4 + 4].copy_from_slice(&field.to_le_bytes());
        }
        let packed = (self.unknown << 4) | u16::from(self.bits & 0x0F);
        buf[24..26].copy_from_slice(&packed.to_le_bytes());
        buf[26..28].copy_from_slice(&self.always_4a00.to_le_bytes());
        buf
    }

    /// Decodes the packed phrase lengths that follow the header.
    ///
    /// Each length is `1 + run * 2^bits + low`, where `run` is a unary
    /// count of set bits and `low` is the next `bits` bits (at least one
    /// bit is always read).
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidFormat`] for a negative entry count or
    /// a short read if the bit stream ends early.
    pub fn phrase_lengths<F: VirtualFile>(&self, reader: &mut BitReader<F>) -> CoreResult<Vec<u32>> {
        let entries = u32::try_from(self.entries)
            .map_err(|_| CoreError::invalid_format(format!("{} phrases", self.entries)))?;
        let width = u32::from(self.bits.max(1));
        let step = 1u32 << (self.bits & 0x0F);
        let mut lengths = Vec::new();
        for _ in 0..entries {
            let run = reader.read_unary()?;
            let low = reader.read_bits(width)?;
            lengths.push(run.saturating_mul(step).saturating_add(low).saturating_add(1));
        }
        Ok(lengths)
    }
}

/// Header at the start of every `|TOPIC` block.
///
/// All three fields are topic positions: block number times the
/// decompressed block size plus an offset into the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicBlockHeader {
    /// Last topic link in the previous block.
    pub last_topic_link: u32,
    /// First topic link in this block.
    pub first_topic_link: u32,
    /// Topic link of the last topic header.
    pub last_topic_header: u32,
}

impl TopicBlockHeader {
    /// Encoded size in bytes.
    pub const SIZE: usize = 12;

    /// Reads a header at the file's current position.
    ///
    /// # Errors
    ///
    /// Returns a short read error if the block is truncated.
    pub fn read<F: VirtualFile + ?Sized>(file: &mut F) -> CoreResult<Self> {
        Ok(Self {
            last_topic_link: file.read_u32_le()?,
            first_topic_link: file.read_u32_le()?,
            last_topic_header: file.read_u32_le()?,
        })
    }

    /// Encodes the header to bytes.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::SIZE] {
        let mut buf = [0u8; Self::SIZE];
        buf[0..4].copy_from_slice(&self.last_topic_link.to_le_bytes());
        buf[4..8].copy_from_slice(&self.first_topic_link.to_le_bytes());
        buf[8..12].copy_from_slice(&self.last_topic_header.to_le_bytes());
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hlpdec_storage::MemoryFile;

    fn phr_header(bits: u8, entries: i32) -> PhrIndexHeader {
        PhrIndexHeader {
            always_4a01: 0x4A01,
            entries,
            compressed_size: 100,
            phr_image_size: 2000,
            phr_image_compressed_size: 900,
            always_0: 0,
            bits,
            unknown: 0xABC,
            always_4a00: 0x4A00,
        }
    }

    #[test]
    fn phr_index_bitfield_split() {
        let header = phr_header(4, 3);
        let bytes = header.encode();
        assert_eq!(u16::from_le_bytes([bytes[24], bytes[25]]), 0xABC4);

        let mut file = MemoryFile::reader(&bytes);
        let decoded = PhrIndexHeader::read(&mut file).unwrap();
        assert_eq!(decoded.bits, 4);
        assert_eq!(decoded.unknown, 0xABC);
        assert_eq!(decoded, header);
    }

    #[test]
    fn phrase_lengths_from_bits() {
        // bits = 2, step 4
        // phrase 1: unary 0, low 0b11 -> 1 + 0 + 3 = 4   bits: 0 1 1
        // phrase 2: unary 2, low 0b01 -> 1 + 8 + 1 = 10  bits: 1 1 0 1 0
        let word: u32 = 0b0101_1110;
        let header = phr_header(2, 2);
        let data = word.to_le_bytes();
        let mut reader = BitReader::new(MemoryFile::reader(&data));
        assert_eq!(header.phrase_lengths(&mut reader).unwrap(), [4, 10]);
    }

    #[test]
    fn phrase_lengths_zero_bits_reads_one() {
        // bits = 0: step 1, one low bit. unary 1, low 1 -> 1 + 1 + 1 = 3
        let word: u32 = 0b101;
        let header = phr_header(0, 1);
        let data = word.to_le_bytes();
        let mut reader = BitReader::new(MemoryFile::reader(&data));
        assert_eq!(header.phrase_lengths(&mut reader).unwrap(), [3]);
    }

    #[test]
    fn negative_phrase_count() {
        let header = phr_header(2, -1);
        let data = [0u8; 4];
        let mut reader = BitReader::new(MemoryFile::reader(&data));
        assert!(matches!(
            header.phrase_lengths(&mut reader),
            Err(CoreError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn topic_block_header_layout() {
        let header = TopicBlockHeader {
            last_topic_link: 0xFFFF_FFFF,
            first_topic_link: 0x0C,
            last_topic_header: 0x0C,
        };
        let bytes = header.encode();
        assert_eq!(&bytes[4..8], &[0x0C, 0, 0, 0]);
        let mut file = MemoryFile::reader(&bytes);
        assert_eq!(TopicBlockHeader::read(&mut file).unwrap(), header);
    }
}
