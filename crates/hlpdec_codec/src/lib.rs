//! # hlpdec Codec
//!
//! Compressed integers and stream decompression for WinHelp containers.
//!
//! This crate holds the byte-level codecs every higher layer builds on:
//!
//! - Stream-form compressed words and dwords, read from a [`VirtualFile`]
//! - Link-form compressed integers with signed bias, read from a
//!   [`bytes::Buf`]
//! - Run-length, LZ77 and combined stream decompression
//! - A bit reader for packed index tables
//!
//! ## Design Principles
//!
//! - Decoding is bounded by source bytes consumed, never by output size
//! - Decoder state lives in one call; nothing is shared between calls
//! - A full sink drops output but never stops consumption
//! - Every encoder has a matching decoder in this crate
//!
//! ## Example
//!
//! ```rust
//! use hlpdec_codec::{compress, decompress_to_vec, Method};
//! use hlpdec_storage::MemoryFile;
//!
//! let packed = compress(Method::Combined, b"aaaaaaaaaabcabcabc");
//! let mut source = MemoryFile::reader(&packed);
//! let out = decompress_to_vec(Method::Combined, &mut source, packed.len() as u64, 64).unwrap();
//! assert_eq!(out, b"aaaaaaaaaabcabcabc");
//! ```
//!
//! [`VirtualFile`]: hlpdec_storage::VirtualFile

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod bits;
mod compressed;
mod decoder;
mod encoder;
mod error;
mod link;
mod method;

pub use bits::BitReader;
pub use compressed::{
    compressed_u16_len, compressed_u32_len, read_compressed_u16, read_compressed_u32,
    write_compressed_u16, write_compressed_u32, MAX_COMPRESSED_U16, MAX_COMPRESSED_U32,
};
pub use decoder::{
    decompress, decompress_to_vec, BackReference, RunLengthState, HISTORY_SIZE, MAX_MATCH,
    MIN_MATCH,
};
pub use encoder::{compress, compress_lz77, compress_run_length};
pub use error::{CodecError, CodecResult};
pub use link::{put_int, put_long, put_word, scan_int, scan_long, scan_word};
pub use method::Method;

#[cfg(test)]
mod tests {
    use super::*;
    use hlpdec_storage::{MemoryFile, VirtualFile};

    #[test]
    fn decompress_into_trait_object_sink() {
        let packed = compress(Method::Lz77, b"xyzxyzxyz");
        let mut source = MemoryFile::reader(&packed);
        let mut out = [0u8; 16];
        let mut sink = MemoryFile::writer(&mut out);
        let sink_dyn: &mut dyn VirtualFile = &mut sink;
        let produced = decompress(Method::Lz77, &mut source, packed.len() as u64, sink_dyn).unwrap();
        assert_eq!(produced, 9);
        assert_eq!(&out[..9], b"xyzxyzxyz");
    }

    #[test]
    fn bounded_prefix_of_long_stream() {
        let data: Vec<u8> = (0..1000u32).map(|i| (i % 7) as u8).collect();
        let packed = compress(Method::Combined, &data);
        let mut source = MemoryFile::reader(&packed);
        let out = decompress_to_vec(Method::Combined, &mut source, packed.len() as u64, 100).unwrap();
        assert_eq!(out, &data[..100]);
        assert_eq!(source.tell().unwrap(), packed.len() as u64);
    }

    #[test]
    fn method_codes_drive_decompression() {
        let data = b"mmmmmmmmmm and more mmmmmmmmmm";
        for bits in 0..4u8 {
            let method = Method::from_bits(bits).unwrap();
            let packed = compress(method, data);
            let mut source = MemoryFile::reader(&packed);
            let out = decompress_to_vec(method, &mut source, packed.len() as u64, 64).unwrap();
            assert_eq!(out, data, "method {bits}");
        }
    }
}
