//! Byte-level test vectors for the decompressors and integer codecs.
//!
//! Vectors serialize to JSON so other decoders can be checked against the
//! same bytes.

use serde::{Deserialize, Serialize};

/// A test vector that can be shared across implementations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestVector {
    /// Unique identifier for this vector.
    pub id: String,
    /// Human-readable description.
    pub description: String,
    /// Input data (hex-encoded).
    pub input_hex: String,
    /// Expected output data (hex-encoded).
    pub expected_hex: String,
    /// Expected error message (if this should fail).
    pub expected_error: Option<String>,
}

fn vector(id: &str, description: &str, input_hex: &str, expected_hex: &str) -> TestVector {
    TestVector {
        id: id.into(),
        description: description.into(),
        input_hex: input_hex.into(),
        expected_hex: expected_hex.into(),
        expected_error: None,
    }
}

fn failing(id: &str, description: &str, input_hex: &str, error: &str) -> TestVector {
    TestVector {
        id: id.into(),
        description: description.into(),
        input_hex: input_hex.into(),
        expected_hex: String::new(),
        expected_error: Some(error.into()),
    }
}

/// Run-length stream vectors.
pub fn run_length_vectors() -> Vec<TestVector> {
    vec![
        vector("rle_repeat", "repeat one byte four times", "0478", "78787878"),
        vector("rle_literal", "two literal bytes", "826162", "6162"),
        vector(
            "rle_mixed",
            "repeat, literal group, repeat",
            "02418342434403 5a",
            "4141424344 5a5a5a",
        ),
        vector("rle_empty_controls", "0x00 and 0x80 read a new control", "0080027a", "7a7a"),
        vector("rle_dangling_control", "a trailing control byte emits nothing", "0161 05", "61"),
    ]
}

/// LZ77 stream vectors.
pub fn lz77_vectors() -> Vec<TestVector> {
    vec![
        vector("lz77_literals", "flag byte of zeros, three literals", "00616263", "616263"),
        vector(
            "lz77_self_overlap",
            "distance 0 length 3 repeats the last byte",
            "08414243 0000",
            "414243434343",
        ),
        vector(
            "lz77_older_bytes",
            "distance 2 length 4 copies from three back",
            "08616263 0210",
            "61626361626361",
        ),
        vector(
            "lz77_second_flag_byte",
            "a new flag byte after eight tokens",
            "00 3132333435363738 00 39",
            "313233343536373839",
        ),
        vector(
            "lz77_before_start",
            "a reference before the first byte reads zeros",
            "01 0500",
            "000000",
        ),
    ]
}

/// Combined (LZ77 then run-length) stream vectors.
pub fn combined_vectors() -> Vec<TestVector> {
    vec![
        vector(
            "combined_literals",
            "LZ77 literals carrying run-length controls",
            "00 0478 826162",
            "787878786162",
        ),
        vector(
            "combined_reference",
            "an LZ77 reference repeating a whole run-length group",
            "04 0278 0110",
            "787878 787878",
        ),
    ]
}

/// Link-form signed 16-bit integer vectors; expected values are
/// little-endian.
pub fn link_int_vectors() -> Vec<TestVector> {
    vec![
        vector("int_min_short", "one byte 0x00 is -64", "00", "c0ff"),
        vector("int_max_short", "one byte 0xfe is 63", "fe", "3f00"),
        vector("int_zero_long", "two bytes 0x8001 is 0", "0180", "0000"),
        vector("int_min_long", "two bytes 0x0001 is -0x4000", "0100", "00c0"),
        failing("int_truncated", "long form cut after one byte", "01", "unexpected end"),
    ]
}

/// Link-form signed 32-bit integer vectors; expected values are
/// little-endian.
pub fn link_long_vectors() -> Vec<TestVector> {
    vec![
        vector("long_zero_short", "two bytes 0x8000 is 0", "0080", "00000000"),
        vector("long_zero_long", "four bytes 0x80000001 is 0", "01000080", "00000000"),
        vector("long_min_long", "four bytes 0x00000001 is -0x40000000", "01000000", "000000c0"),
        failing("long_truncated", "long form cut after three bytes", "010000", "unexpected end"),
    ]
}

/// Generate all test vectors as JSON.
pub fn all_vectors_json() -> String {
    let vectors = AllTestVectors {
        run_length: run_length_vectors(),
        lz77: lz77_vectors(),
        combined: combined_vectors(),
        link_int: link_int_vectors(),
        link_long: link_long_vectors(),
    };

    serde_json::to_string_pretty(&vectors).expect("Failed to serialize vectors")
}

#[derive(Debug, Serialize, Deserialize)]
struct AllTestVectors {
    run_length: Vec<TestVector>,
    lz77: Vec<TestVector>,
    combined: Vec<TestVector>,
    link_int: Vec<TestVector>,
    link_long: Vec<TestVector>,
}
