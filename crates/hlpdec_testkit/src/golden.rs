//! Hex helpers for comparing byte layouts.
//!
//! Failing comparisons print both sides as hex so the differing byte is
//! easy to spot.

/// Encodes bytes as hexadecimal string.
pub fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decodes hexadecimal string to bytes, ignoring whitespace.
pub fn hex_decode(hex: &str) -> Vec<u8> {
    let hex = hex.replace([' ', '\n', '\r'], "");
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("Invalid hex"))
        .collect()
}

/// Asserts that `actual` matches the hex string `expected`.
///
/// # Panics
///
/// Panics with both values in hex and the first differing offset.
pub fn assert_hex_eq(actual: &[u8], expected: &str) {
    let expected = hex_decode(expected);
    if actual == expected.as_slice() {
        return;
    }
    let offset = actual
        .iter()
        .zip(&expected)
        .position(|(a, e)| a != e)
        .unwrap_or_else(|| actual.len().min(expected.len()));
    panic!(
        "bytes differ at offset {offset:#x}\n  actual:   {}\n  expected: {}",
        hex_encode(actual),
        hex_encode(&expected)
    );
}
