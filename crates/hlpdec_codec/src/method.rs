//! Decompression method codes.

use crate::error::{CodecError, CodecResult};

/// How a stream is stored, as a 2-bit code.
///
/// Bit 0 enables the run-length stage, bit 1 the LZ77 stage. With both
/// bits set LZ77 runs first and its output feeds the run-length stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Method {
    /// Stored verbatim.
    #[default]
    Copy,
    /// Run-length expansion only.
    RunLength,
    /// LZ77 expansion only.
    Lz77,
    /// LZ77 expansion followed by run-length expansion.
    Combined,
}

impl Method {
    const RUN_LENGTH_BIT: u8 = 0x01;
    const LZ77_BIT: u8 = 0x02;

    /// Parses a 2-bit method code.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidMethod`] for codes above 3.
    pub fn from_bits(bits: u8) -> CodecResult<Self> {
        match bits {
            0 => Ok(Self::Copy),
            1 => Ok(Self::RunLength),
            2 => Ok(Self::Lz77),
            3 => Ok(Self::Combined),
            other => Err(CodecError::InvalidMethod(other)),
        }
    }

    /// Returns the 2-bit method code.
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self {
            Self::Copy => 0,
            Self::RunLength => Self::RUN_LENGTH_BIT,
            Self::Lz77 => Self::LZ77_BIT,
            Self::Combined => Self::RUN_LENGTH_BIT | Self::LZ77_BIT,
        }
    }

    /// Checks if the run-length stage is active.
    #[must_use]
    pub const fn has_run_length(self) -> bool {
        self.bits() & Self::RUN_LENGTH_BIT != 0
    }

    /// Checks if the LZ77 stage is active.
    #[must_use]
    pub const fn has_lz77(self) -> bool {
        self.bits() & Self::LZ77_BIT != 0
    }
}

impl TryFrom<u8> for Method {
    type Error = CodecError;

    fn try_from(bits: u8) -> CodecResult<Self> {
        Self::from_bits(bits)
    }
}
