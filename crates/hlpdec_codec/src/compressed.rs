//! Stream-form compressed integers.
//!
//! The low bit of the first unit says whether a second unit follows:
//!
//! | Type | Short form | Long form |
//! |------|------------|-----------|
//! | word | 1 byte, `v << 1` (`v <= 127`) | 2 bytes LE, `(v << 1) \| 1` (`v <= 0x7FFF`) |
//! | dword | 2 bytes LE, `v << 1` (`v <= 0x7FFF`) | 4 bytes LE, `(v << 1) \| 1` (`v <= 0x7FFF_FFFF`) |
//!
//! Writers always pick the short form when the value fits.

use crate::error::{CodecError, CodecResult};
use hlpdec_storage::VirtualFile;

/// Largest value a compressed word can carry.
pub const MAX_COMPRESSED_U16: u16 = 0x7FFF;

/// Largest value a compressed dword can carry.
pub const MAX_COMPRESSED_U32: u32 = 0x7FFF_FFFF;

/// Reads a compressed word.
///
/// # Errors
///
/// Returns a short read error if the file ends inside the value.
pub fn read_compressed_u16<F: VirtualFile + ?Sized>(file: &mut F) -> CodecResult<u16> {
    let low = file.read_byte()?;
    if low & 1 != 0 {
        let high = file.read_byte()?;
        Ok(u16::from_le_bytes([low, high]) >> 1)
    } else {
        Ok(u16::from(low >> 1))
    }
}

/// Reads a compressed dword.
///
/// # Errors
///
/// Returns a short read error if the file ends inside the value.
pub fn read_compressed_u32<F: VirtualFile + ?Sized>(file: &mut F) -> CodecResult<u32> {
    let low = file.read_u16_le()?;
    if low & 1 != 0 {
        let high = file.read_u16_le()?;
        Ok(((u32::from(high) << 16) | u32::from(low)) >> 1)
    } else {
        Ok(u32::from(low >> 1))
    }
}

/// Number of bytes [`write_compressed_u16`] emits for `value`.
#[must_use]
pub const fn compressed_u16_len(value: u16) -> usize {
    if value > 127 {
        2
    } else {
        1
    }
}

/// Number of bytes [`write_compressed_u32`] emits for `value`.
#[must_use]
pub const fn compressed_u32_len(value: u32) -> usize {
    if value > MAX_COMPRESSED_U16 as u32 {
        4
    } else {
        2
    }
}

/// Writes a compressed word, returning the number of bytes written.
///
/// # Errors
///
/// Returns [`CodecError::ValueOutOfRange`] above [`MAX_COMPRESSED_U16`] and
/// [`CodecError::SinkFull`] if the sink refuses a byte.
#[allow(clippy::cast_possible_truncation)]
pub fn write_compressed_u16<F: VirtualFile + ?Sized>(file: &mut F, value: u16) -> CodecResult<usize> {
    if value > MAX_COMPRESSED_U16 {
        return Err(CodecError::out_of_range(value, MAX_COMPRESSED_U16));
    }
    if value > 127 {
        put_all(file, &((value << 1) | 1).to_le_bytes())?;
        Ok(2)
    } else {
        put_all(file, &[(value << 1) as u8])?;
        Ok(1)
    }
}

/// Writes a compressed dword, returning the number of bytes written.
///
/// # Errors
///
/// Returns [`CodecError::ValueOutOfRange`] above [`MAX_COMPRESSED_U32`] and
/// [`CodecError::SinkFull`] if the sink refuses a byte.
#[allow(clippy::cast_possible_truncation)]
pub fn write_compressed_u32<F: VirtualFile + ?Sized>(file: &mut F, value: u32) -> CodecResult<usize> {
    if value > MAX_COMPRESSED_U32 {
        return Err(CodecError::out_of_range(value, MAX_COMPRESSED_U32));
    }
    if value > u32::from(MAX_COMPRESSED_U16) {
        let low = ((value << 1) | 1) as u16;
        let high = (value >> 15) as u16;
        put_all(file, &low.to_le_bytes())?;
        put_all(file, &high.to_le_bytes())?;
        Ok(4)
    } else {
        put_all(file, &((value << 1) as u16).to_le_bytes())?;
        Ok(2)
    }
}

fn put_all<F: VirtualFile + ?Sized>(file: &mut F, bytes: &[u8]) -> CodecResult<()> {
    for &byte in bytes {
        if !file.put_byte(byte) {
            return Err(CodecError::SinkFull);
        }
    }
    Ok(())
}
