//! Run-length and LZ77 stream decompression.
//!
//! Decoding is driven by the number of *source* bytes to consume, not by
//! the expected output size. All state (the run-length control counter and
//! the LZ77 history window) lives on the stack of a single call.

use crate::error::CodecResult;
use crate::method::Method;
use hlpdec_storage::{MemoryFile, VirtualFile};

/// Size of the LZ77 history window.
pub const HISTORY_SIZE: usize = 4096;

const HISTORY_MASK: usize = HISTORY_SIZE - 1;

/// Shortest back-reference.
pub const MIN_MATCH: usize = 3;

/// Longest back-reference.
pub const MAX_MATCH: usize = MIN_MATCH + 0x0F;

/// A packed LZ77 back-reference.
///
/// The on-disk word holds `distance` in the low 12 bits and
/// `length - 3` in the high 4 bits. `distance` counts bytes back minus one,
/// so a distance of 0 repeats the most recent byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackReference {
    /// Bytes back from the write position, minus one (`0..=4095`).
    pub distance: u16,
    /// Number of bytes to copy (`3..=18`).
    pub length: u8,
}

impl BackReference {
    /// Unpacks a back-reference word.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_word(word: u16) -> Self {
        Self {
            distance: word & 0x0FFF,
            length: ((word >> 12) & 0x0F) as u8 + MIN_MATCH as u8,
        }
    }

    /// Packs this back-reference into its on-disk word.
    ///
    /// `length` must lie in `MIN_MATCH..=MAX_MATCH`.
    #[must_use]
    pub const fn to_word(self) -> u16 {
        debug_assert!(
            self.length as usize >= MIN_MATCH && self.length as usize <= MAX_MATCH,
            "back-reference length out of range"
        );
        ((self.length as u16 - MIN_MATCH as u16) << 12) | (self.distance & 0x0FFF)
    }
}

/// State of the run-length stage.
///
/// The control byte means: `0` (or `0x80`) read a new control byte next;
/// `1..=0x7F` repeat the next byte that many times; `0x81..=0xFF` copy the
/// next `control & 0x7F` bytes literally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunLengthState {
    control: u8,
}

impl RunLengthState {
    /// Creates a state that expects a control byte.
    #[must_use]
    pub const fn new() -> Self {
        Self { control: 0 }
    }

    /// Returns true if the next input byte is a control byte.
    #[must_use]
    pub const fn expects_control(&self) -> bool {
        self.control & 0x7F == 0
    }

    /// Feeds one byte, returning the number of bytes the sink accepted.
    pub fn expand<D: VirtualFile + ?Sized>(&mut self, byte: u8, sink: &mut D) -> u64 {
        if self.expects_control() {
            self.control = byte;
            return 0;
        }
        if self.control & 0x80 != 0 {
            self.control -= 1;
            return u64::from(sink.put_byte(byte));
        }
        let repeat = self.control;
        self.control = 0;
        (0..repeat).map(|_| u64::from(sink.put_byte(byte))).sum()
    }
}

/// Where decoded bytes go: straight to the sink or through run-length
/// expansion. Chosen once per call.
enum Emitter {
    Direct,
    RunLength(RunLengthState),
}

impl Emitter {
    fn for_method(method: Method) -> Self {
        if method.has_run_length() {
            Self::RunLength(RunLengthState::new())
        } else {
            Self::Direct
        }
    }

    #[inline]
    fn emit<D: VirtualFile + ?Sized>(&mut self, sink: &mut D, byte: u8) -> u64 {
        match self {
            Self::Direct => u64::from(sink.put_byte(byte)),
            Self::RunLength(state) => state.expand(byte, sink),
        }
    }
}

struct History {
    window: [u8; HISTORY_SIZE],
    pos: usize,
}

impl History {
    fn new() -> Self {
        Self {
            window: [0; HISTORY_SIZE],
            pos: 0,
        }
    }

    #[inline]
    fn push(&mut self, byte: u8) {
        self.window[self.pos & HISTORY_MASK] = byte;
        self.pos = self.pos.wrapping_add(1);
    }
}

/// Expands `length` source bytes into `sink` using `method`.
///
/// Decoding stops once exactly `length` bytes have been consumed from
/// `source`, however much output that produced. A full memory sink drops
/// further output silently while the source keeps being consumed, so a
/// bounded prefix of a long stream can be extracted. Returns the number of
/// bytes the sink accepted.
///
/// Back-references reaching before the start of the stream read zeros.
///
/// # Errors
///
/// Returns a short read error if `source` ends before `length` bytes.
pub fn decompress<S, D>(method: Method, source: &mut S, length: u64, sink: &mut D) -> CodecResult<u64>
where
    S: VirtualFile + ?Sized,
    D: VirtualFile + ?Sized,
{
    let mut emitter = Emitter::for_method(method);
    let mut produced = 0u64;
    let mut remaining = length;

    if !method.has_lz77() {
        while remaining > 0 {
            remaining -= 1;
            let byte = source.read_byte()?;
            produced += emitter.emit(sink, byte);
        }
        return Ok(produced);
    }

    let mut history = History::new();
    let mut flags = 0u8;
    let mut mask = 0u8;

    while remaining > 0 {
        remaining -= 1;
        if mask == 0 {
            flags = source.read_byte()?;
            mask = 1;
            continue;
        }
        if flags & mask != 0 {
            if remaining == 0 {
                break;
            }
            remaining -= 1;
            let reference = BackReference::from_word(source.read_u16_le()?);
            let mut from = history
                .pos
                .wrapping_sub(usize::from(reference.distance))
                .wrapping_sub(1);
            for _ in 0..reference.length {
                let byte = history.window[from & HISTORY_MASK];
                from = from.wrapping_add(1);
                history.push(byte);
                produced += emitter.emit(sink, byte);
            }
        } else {
            let byte = source.read_byte()?;
            history.push(byte);
            produced += emitter.emit(sink, byte);
        }
        mask <<= 1;
    }

    Ok(produced)
}

/// Expands `length` source bytes into a new buffer of at most `capacity`
/// bytes.
///
/// Output beyond `capacity` is dropped; the full `length` is still consumed.
///
/// # Errors
///
/// Returns a short read error if `source` ends before `length` bytes.
pub fn decompress_to_vec<S>(method: Method, source: &mut S, length: u64, capacity: usize) -> CodecResult<Vec<u8>>
where
    S: VirtualFile + ?Sized,
{
    let mut out = vec![0u8; capacity];
    let produced = {
        let mut sink = MemoryFile::writer(&mut out);
        decompress(method, source, length, &mut sink)?
    };
    out.truncate(produced as usize);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(method: Method, input: &[u8], capacity: usize) -> (Vec<u8>, u64) {
        let mut source = MemoryFile::reader(input);
        let out = decompress_to_vec(method, &mut source, input.len() as u64, capacity).unwrap();
        let consumed = source.tell().unwrap();
        (out, consumed)
    }

    #[test]
    fn copy_verbatim() {
        let (out, consumed) = run(Method::Copy, b"plain bytes", 64);
        assert_eq!(out, b"plain bytes");
        assert_eq!(consumed, 11);
    }

    #[test]
    fn back_reference_fields() {
        let reference = BackReference::from_word(0xF123);
        assert_eq!(reference.distance, 0x123);
        assert_eq!(reference.length, 18);
        assert_eq!(reference.to_word(), 0xF123);
        assert_eq!(BackReference::from_word(0x0000).length, 3);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "back-reference length out of range")]
    fn back_reference_too_short_to_pack() {
        let _ = BackReference { distance: 0, length: 2 }.to_word();
    }

    #[test]
    fn run_length_repeat_and_literal() {
        // repeat 'x' four times, then two literal bytes
        let input = [0x04, b'x', 0x82, b'a', b'b'];
        let (out, _) = run(Method::RunLength, &input, 64);
        assert_eq!(out, b"xxxxab");
    }

    #[test]
    fn run_length_empty_controls_are_skipped() {
        let input = [0x00, 0x80, 0x02, b'z'];
        let (out, _) = run(Method::RunLength, &input, 64);
        assert_eq!(out, b"zz");
    }

    #[test]
    fn run_length_state_is_per_call() {
        // A call ending inside a literal group does not leak into the next.
        let first = [0x83, b'a'];
        let (out, _) = run(Method::RunLength, &first, 8);
        assert_eq!(out, b"a");
        let second = [0x02, b'b'];
        let (out, _) = run(Method::RunLength, &second, 8);
        assert_eq!(out, b"bb");
    }

    #[test]
    fn lz77_literals_only() {
        let input = [0x00, b'a', b'b', b'c'];
        let (out, consumed) = run(Method::Lz77, &input, 64);
        assert_eq!(out, b"abc");
        assert_eq!(consumed, 4);
    }

    #[test]
    fn lz77_self_overlapping_reference() {
        // Three literals, then distance 0 length 3: repeats the last byte.
        let input = [0b0000_1000, b'A', b'B', b'C', 0x00, 0x00];
        let (out, _) = run(Method::Lz77, &input, 64);
        assert_eq!(out, b"ABCCCC");
    }

    #[test]
    fn lz77_reference_to_older_bytes() {
        // distance 2 (three back), length 4: "abc" + "abca"
        let word = BackReference {
            distance: 2,
            length: 4,
        }
        .to_word()
        .to_le_bytes();
        let input = [0b0000_1000, b'a', b'b', b'c', word[0], word[1]];
        let (out, _) = run(Method::Lz77, &input, 64);
        assert_eq!(out, b"abcabca");
    }

    #[test]
    fn lz77_new_flag_byte_every_eight_tokens() {
        let mut input = vec![0x00];
        input.extend_from_slice(b"12345678");
        input.push(0x00);
        input.push(b'9');
        let (out, consumed) = run(Method::Lz77, &input, 64);
        assert_eq!(out, b"123456789");
        assert_eq!(consumed, input.len() as u64);
    }

    #[test]
    fn lz77_reference_cut_by_budget_is_skipped() {
        // The flag announces a reference but only one byte of budget is left.
        let input = [0b0000_0001, 0x00, 0x00];
        let mut source = MemoryFile::reader(&input);
        let mut out = [0u8; 8];
        let mut sink = MemoryFile::writer(&mut out);
        let produced = decompress(Method::Lz77, &mut source, 2, &mut sink).unwrap();
        assert_eq!(produced, 0);
        assert_eq!(source.tell().unwrap(), 1);
    }

    #[test]
    fn combined_feeds_lz77_output_through_run_length() {
        // LZ77 literals 0x05 'q' form a run-length group.
        let input = [0x00, 0x05, b'q'];
        let (out, _) = run(Method::Combined, &input, 64);
        assert_eq!(out, b"qqqqq");
    }

    #[test]
    fn combined_reference_copies_whole_run_length_group() {
        // Literals 0x02 'x', then distance 1 length 4 repeats the pair twice.
        let input = [0x04, 0x02, b'x', 0x01, 0x10];
        let (out, _) = run(Method::Combined, &input, 64);
        assert_eq!(out, b"xxxxxx");
    }

    #[test]
    fn full_sink_keeps_consuming_source() {
        let input = [0x7F, b'r', 0x81, b'!'];
        let mut source = MemoryFile::reader(&input);
        let mut out = [0u8; 4];
        let mut sink = MemoryFile::writer(&mut out);
        let produced = decompress(Method::RunLength, &mut source, 4, &mut sink).unwrap();
        assert_eq!(produced, 4);
        assert_eq!(&out, b"rrrr");
        assert_eq!(source.tell().unwrap(), 4);
    }

    #[test]
    fn short_source_is_an_error() {
        let input = [0x00, b'a'];
        let mut source = MemoryFile::reader(&input);
        let mut out = [0u8; 8];
        let mut sink = MemoryFile::writer(&mut out);
        let err = decompress(Method::Lz77, &mut source, 5, &mut sink).unwrap_err();
        assert!(err.is_short_read());
    }

    #[test]
    fn stops_at_length_not_at_source_end() {
        let input = b"abcdef";
        let mut source = MemoryFile::reader(input);
        let mut out = [0u8; 8];
        let mut sink = MemoryFile::writer(&mut out);
        let produced = decompress(Method::Copy, &mut source, 3, &mut sink).unwrap();
        assert_eq!(produced, 3);
        assert_eq!(source.tell().unwrap(), 3);
    }
}
