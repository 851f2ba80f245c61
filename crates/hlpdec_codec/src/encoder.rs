//! Run-length and LZ77 compressors.
//!
//! These produce streams that [`crate::decompress`] expands back to the
//! original bytes. They exist for building test containers; the output is
//! valid but not byte-identical to what the original help compiler wrote.

use crate::decoder::{BackReference, HISTORY_SIZE, MAX_MATCH, MIN_MATCH};
use crate::method::Method;

/// Longest run or literal group a single control byte can describe.
const MAX_GROUP: usize = 0x7F;

/// Shortest run worth a repeat group.
const MIN_RUN: usize = 3;

const HASH_BUCKETS: usize = 4096;
const HASH_SLOTS: usize = 2;
const EMPTY: usize = usize::MAX;

/// Compresses `data` with `method`.
#[must_use]
pub fn compress(method: Method, data: &[u8]) -> Vec<u8> {
    match method {
        Method::Copy => data.to_vec(),
        Method::RunLength => compress_run_length(data),
        Method::Lz77 => compress_lz77(data),
        Method::Combined => compress_lz77(&compress_run_length(data)),
    }
}

/// Run-length encodes `data`.
///
/// Runs of three or more equal bytes become a repeat group
/// (`count`, `byte`); everything else is packed into literal groups
/// (`0x80 | count`, then `count` bytes).
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compress_run_length(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / MAX_GROUP + 1);
    let mut literal_start = 0;
    let mut i = 0;

    while i < data.len() {
        let mut run = 1;
        while run < MAX_GROUP && i + run < data.len() && data[i + run] == data[i] {
            run += 1;
        }

        if run >= MIN_RUN {
            push_literals(&mut out, &data[literal_start..i]);
            out.push(run as u8);
            out.push(data[i]);
            i += run;
            literal_start = i;
        } else {
            i += 1;
        }
    }

    push_literals(&mut out, &data[literal_start..]);
    out
}

#[allow(clippy::cast_possible_truncation)]
fn push_literals(out: &mut Vec<u8>, literals: &[u8]) {
    for group in literals.chunks(MAX_GROUP) {
        out.push(0x80 | group.len() as u8);
        out.extend_from_slice(group);
    }
}

#[inline]
fn hash3(data: &[u8], pos: usize) -> usize {
    ((usize::from(data[pos]) << 4) ^ usize::from(data[pos + 1]) ^ (usize::from(data[pos + 2]) << 8))
        % HASH_BUCKETS
}

/// LZ77 encodes `data`.
///
/// Tokens are grouped by eight behind a flag byte whose bits (LSB first)
/// mark back-references. Matches are found through a small hash table
/// keyed on the next three bytes, keeping the two most recent positions
/// per bucket.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn compress_lz77(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / 8 + 1);
    let mut table = vec![EMPTY; HASH_BUCKETS * HASH_SLOTS];
    let mut flag_pos = 0;
    let mut flag_bit = 0u8;
    let mut i = 0;

    while i < data.len() {
        if flag_bit == 0 {
            flag_pos = out.len();
            out.push(0);
        }

        let mut best_length = 0;
        let mut best_from = 0;

        if i + MIN_MATCH <= data.len() {
            let bucket = hash3(data, i) * HASH_SLOTS;
            let max_length = MAX_MATCH.min(data.len() - i);
            for slot in 0..HASH_SLOTS {
                let candidate = table[bucket + slot];
                if candidate == EMPTY || i - candidate > HISTORY_SIZE {
                    continue;
                }
                let mut len = 0;
                while len < max_length && data[candidate + len] == data[i + len] {
                    len += 1;
                }
                if len >= MIN_MATCH && len > best_length {
                    best_length = len;
                    best_from = candidate;
                }
            }
            table[bucket + 1] = table[bucket];
            table[bucket] = i;
        }

        if best_length >= MIN_MATCH {
            out[flag_pos] |= 1 << flag_bit;
            let reference = BackReference {
                distance: (i - best_from - 1) as u16,
                length: best_length as u8,
            };
            out.extend_from_slice(&reference.to_word().to_le_bytes());
            i += best_length;
        } else {
            out.push(data[i]);
            i += 1;
        }

        flag_bit = (flag_bit + 1) % 8;
    }

    out
}
