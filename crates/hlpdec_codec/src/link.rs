//! Link-form compressed integers.
//!
//! Embedded topic-link records pack their numeric fields with the same
//! low-bit width selector as the stream form, but the signed variants
//! subtract a bias so that small negative numbers stay short:
//!
//! | Reader | Short form | Long form |
//! |--------|------------|-----------|
//! | [`scan_word`] | 1 byte, `raw >> 1` | 2 bytes, `raw >> 1` |
//! | [`scan_int`] | 1 byte, `(raw >> 1) - 0x40` | 2 bytes, `(raw >> 1) - 0x4000` |
//! | [`scan_long`] | 2 bytes, `(raw >> 1) - 0x4000` | 4 bytes, `(raw >> 1) - 0x4000_0000` |
//!
//! Readers work on any [`bytes::Buf`] and advance it by exactly the
//! consumed width.

use crate::error::{CodecError, CodecResult};
use bytes::{Buf, BufMut};

const BIAS_8: i16 = 0x40;
const BIAS_16: i32 = 0x4000;
const BIAS_32: i64 = 0x4000_0000;

fn peek_long_form<B: Buf>(buf: &B, short: usize) -> CodecResult<bool> {
    if !buf.has_remaining() {
        return Err(CodecError::UnexpectedEof {
            needed: short,
            available: 0,
        });
    }
    Ok(buf.chunk()[0] & 1 != 0)
}

fn ensure<B: Buf>(buf: &B, needed: usize) -> CodecResult<()> {
    if buf.remaining() < needed {
        return Err(CodecError::UnexpectedEof {
            needed,
            available: buf.remaining(),
        });
    }
    Ok(())
}

/// Scans an unsigned compressed word (1 or 2 bytes).
///
/// # Errors
///
/// Returns [`CodecError::UnexpectedEof`] if the buffer ends inside the value.
pub fn scan_word<B: Buf>(buf: &mut B) -> CodecResult<u16> {
    if peek_long_form(buf, 1)? {
        ensure(buf, 2)?;
        Ok(buf.get_u16_le() >> 1)
    } else {
        Ok(u16::from(buf.get_u8() >> 1))
    }
}

/// Scans a signed compressed short (1 or 2 bytes).
///
/// # Errors
///
/// Returns [`CodecError::UnexpectedEof`] if the buffer ends inside the value.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn scan_int<B: Buf>(buf: &mut B) -> CodecResult<i16> {
    if peek_long_form(buf, 1)? {
        ensure(buf, 2)?;
        Ok(((buf.get_u16_le() >> 1) as i16) - BIAS_16 as i16)
    } else {
        Ok(i16::from(buf.get_u8() >> 1) - BIAS_8)
    }
}

/// Scans a signed compressed long (2 or 4 bytes).
///
/// # Errors
///
/// Returns [`CodecError::UnexpectedEof`] if the buffer ends inside the value.
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
pub fn scan_long<B: Buf>(buf: &mut B) -> CodecResult<i32> {
    if peek_long_form(buf, 2)? {
        ensure(buf, 4)?;
        Ok(((buf.get_u32_le() >> 1) as i32) - BIAS_32 as i32)
    } else {
        ensure(buf, 2)?;
        Ok(i32::from(buf.get_u16_le() >> 1) - BIAS_16)
    }
}

/// Appends the shortest encoding of an unsigned word.
///
/// # Errors
///
/// Returns [`CodecError::ValueOutOfRange`] above `0x7FFF`.
#[allow(clippy::cast_possible_truncation)]
pub fn put_word<B: BufMut>(buf: &mut B, value: u16) -> CodecResult<()> {
    if value <= 0x7F {
        buf.put_u8((value << 1) as u8);
    } else if value <= 0x7FFF {
        buf.put_u16_le((value << 1) | 1);
    } else {
        return Err(CodecError::out_of_range(value, 0x7FFF));
    }
    Ok(())
}

/// Appends the shortest encoding of a signed short.
///
/// # Errors
///
/// Returns [`CodecError::ValueOutOfRange`] outside `-0x4000..=0x3FFF`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn put_int<B: BufMut>(buf: &mut B, value: i16) -> CodecResult<()> {
    if (-0x40..=0x3F).contains(&value) {
        buf.put_u8(((value + BIAS_8) as u8) << 1);
    } else if (-0x4000..=0x3FFF).contains(&value) {
        buf.put_u16_le((((i32::from(value) + BIAS_16) as u16) << 1) | 1);
    } else {
        return Err(CodecError::out_of_range(value, 0x3FFF));
    }
    Ok(())
}

/// Appends the shortest encoding of a signed long.
///
/// # Errors
///
/// Returns [`CodecError::ValueOutOfRange`] outside `-0x4000_0000..=0x3FFF_FFFF`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn put_long<B: BufMut>(buf: &mut B, value: i32) -> CodecResult<()> {
    if (-0x4000..=0x3FFF).contains(&value) {
        buf.put_u16_le(((value + BIAS_16) as u16) << 1);
    } else if (-0x4000_0000..=0x3FFF_FFFF).contains(&value) {
        buf.put_u32_le((((i64::from(value) + BIAS_32) as u32) << 1) | 1);
    } else {
        return Err(CodecError::out_of_range(value, 0x3FFF_FFFF));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn int_short_form_literals() {
        let mut buf: &[u8] = &[0x00];
        assert_eq!(scan_int(&mut buf).unwrap(), -64);
        let mut buf: &[u8] = &[0xFE];
        assert_eq!(scan_int(&mut buf).unwrap(), 63);
        assert!(buf.is_empty());
    }

    #[test]
    fn int_long_form_literals() {
        let mut buf: &[u8] = &[0x01, 0x80];
        assert_eq!(scan_int(&mut buf).unwrap(), 0);
        let mut buf: &[u8] = &[0x01, 0x00];
        assert_eq!(scan_int(&mut buf).unwrap(), -0x4000);
    }

    #[test]
    fn long_literals() {
        let mut buf: &[u8] = &[0x00, 0x80];
        assert_eq!(scan_long(&mut buf).unwrap(), 0);
        let mut buf: &[u8] = &[0x01, 0x00, 0x00, 0x80];
        assert_eq!(scan_long(&mut buf).unwrap(), 0);
        let mut buf: &[u8] = &[0x01, 0x00, 0x00, 0x00];
        assert_eq!(scan_long(&mut buf).unwrap(), -0x4000_0000);
    }

    #[test]
    fn word_literals() {
        let mut buf: &[u8] = &[0xFE, 0x01, 0x01];
        assert_eq!(scan_word(&mut buf).unwrap(), 127);
        assert_eq!(scan_word(&mut buf).unwrap(), 128);
        assert!(buf.is_empty());
    }

    #[test]
    fn consecutive_fields_advance_cursor() {
        let mut buf: &[u8] = &[0x82, 0x03, 0x80, 0x00, 0x80, 0xAA];
        assert_eq!(scan_int(&mut buf).unwrap(), 1);
        assert_eq!(scan_int(&mut buf).unwrap(), 1);
        assert_eq!(scan_long(&mut buf).unwrap(), 0);
        assert_eq!(buf, &[0xAA]);
    }

    #[test]
    fn truncated_values_fail() {
        let mut buf: &[u8] = &[];
        assert!(matches!(
            scan_word(&mut buf),
            Err(CodecError::UnexpectedEof { .. })
        ));
        let mut buf: &[u8] = &[0x01];
        assert!(matches!(
            scan_int(&mut buf),
            Err(CodecError::UnexpectedEof {
                needed: 2,
                available: 1
            })
        ));
        let mut buf: &[u8] = &[0x01, 0x00, 0x00];
        assert!(matches!(
            scan_long(&mut buf),
            Err(CodecError::UnexpectedEof {
                needed: 4,
                available: 3
            })
        ));
    }

    #[test]
    fn put_rejects_out_of_range() {
        let mut out: Vec<u8> = Vec::new();
        assert!(put_word(&mut out, 0x8000).is_err());
        assert!(put_int(&mut out, 0x4000).is_err());
        assert!(put_int(&mut out, -0x4001).is_err());
        assert!(put_long(&mut out, 0x4000_0000).is_err());
        assert!(put_long(&mut out, i32::MIN).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn put_picks_shortest_form() {
        let mut out: Vec<u8> = Vec::new();
        put_int(&mut out, 63).unwrap();
        put_int(&mut out, 64).unwrap();
        put_long(&mut out, -16384).unwrap();
        put_long(&mut out, 16384).unwrap();
        assert_eq!(out.len(), 1 + 2 + 2 + 4);
    }

    proptest! {
        #[test]
        fn word_roundtrip(value in 0u16..=0x7FFF) {
            let mut out: Vec<u8> = Vec::new();
            put_word(&mut out, value).unwrap();
            let mut buf = out.as_slice();
            prop_assert_eq!(scan_word(&mut buf).unwrap(), value);
            prop_assert!(buf.is_empty());
        }

        #[test]
        fn int_roundtrip(value in -0x4000i16..=0x3FFF) {
            let mut out: Vec<u8> = Vec::new();
            put_int(&mut out, value).unwrap();
            prop_assert_eq!(out.len(), if (-64..=63).contains(&value) { 1 } else { 2 });
            let mut buf = out.as_slice();
            prop_assert_eq!(scan_int(&mut buf).unwrap(), value);
        }

        #[test]
        fn long_roundtrip(value in -0x4000_0000i32..=0x3FFF_FFFF) {
            let mut out: Vec<u8> = Vec::new();
            put_long(&mut out, value).unwrap();
            let mut buf = out.as_slice();
            prop_assert_eq!(scan_long(&mut buf).unwrap(), value);
            prop_assert!(buf.is_empty());
        }
    }
}
