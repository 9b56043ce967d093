//! Level 4 (legacy) matrix type word
//!
//! Level 4 files have no container header. Each matrix starts with a
//! packed decimal type word `MOPT`:
//!
//! - `M`: machine format (0 little-endian IEEE, 1 big-endian IEEE, 2-4 VAX/Cray)
//! - `O`: always 0
//! - `P`: precision (0 double, 1 single, 2 int32, 3 int16, 4 uint16, 5 uint8)
//! - `T`: matrix type (0 numeric, 1 text, 2 sparse)

use super::order::ByteOrder;
use super::tag::DataType;
use crate::{MatError, Result};

/// Size of the fixed level 4 matrix header (five 32-bit words)
pub const LEGACY_HEADER_SIZE: usize = 20;

/// Matrix type digit of the level 4 type word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegacyKind {
    Numeric = 0,
    Text = 1,
    Sparse = 2,
}

/// Decoded level 4 type word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyType {
    pub byte_order: ByteOrder,
    pub precision: DataType,
    pub kind: LegacyKind,
}

impl LegacyType {
    /// Decode a type word already read in some byte order
    pub const fn from_value(value: u32) -> Result<Self> {
        if value > 9999 {
            return Err(MatError::UnsupportedLegacyFormat(value));
        }
        let m = value / 1000;
        let o = (value / 100) % 10;
        let p = (value / 10) % 10;
        let t = value % 10;

        let byte_order = match m {
            0 => ByteOrder::Little,
            1 => ByteOrder::Big,
            _ => return Err(MatError::UnsupportedLegacyFormat(value)),
        };
        if o != 0 {
            return Err(MatError::UnsupportedLegacyFormat(value));
        }
        let precision = match p {
            0 => DataType::Double,
            1 => DataType::Single,
            2 => DataType::Int32,
            3 => DataType::Int16,
            4 => DataType::UInt16,
            5 => DataType::UInt8,
            _ => return Err(MatError::UnsupportedLegacyFormat(value)),
        };
        let kind = match t {
            0 => LegacyKind::Numeric,
            1 => LegacyKind::Text,
            2 => LegacyKind::Sparse,
            _ => return Err(MatError::UnsupportedLegacyFormat(value)),
        };
        Ok(Self {
            byte_order,
            precision,
            kind,
        })
    }

    /// Detect the byte order from the first four bytes of a matrix
    ///
    /// The word is tried little-endian first; a big-endian writer always
    /// sets `M = 1`, which only decodes sensibly when read big-endian.
    pub fn detect(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < 4 {
            return Err(MatError::InsufficientBuffer);
        }
        let little = ByteOrder::Little.read_u32(&bytes[..4]);
        if let Ok(t) = Self::from_value(little) {
            if t.byte_order == ByteOrder::Little {
                return Ok(t);
            }
        }
        let big = ByteOrder::Big.read_u32(&bytes[..4]);
        match Self::from_value(big) {
            Ok(t) if t.byte_order == ByteOrder::Big => Ok(t),
            Ok(_) => Err(MatError::UnsupportedLegacyFormat(big)),
            Err(e) => Err(e),
        }
    }

    /// Encode back into the packed decimal word
    pub const fn to_value(&self) -> u32 {
        let m = match self.byte_order {
            ByteOrder::Little => 0,
            ByteOrder::Big => 1,
        };
        let p = match self.precision {
            DataType::Single => 1,
            DataType::Int32 => 2,
            DataType::Int16 => 3,
            DataType::UInt16 => 4,
            DataType::UInt8 => 5,
            _ => 0,
        };
        m * 1000 + p * 10 + self.kind as u32
    }
}

/// Whether a buffer looks like a level 4 file
///
/// Level 5 files start with printable text, so a zero in the first four
/// bytes can only come from a level 4 type word.
pub fn is_legacy(bytes: &[u8]) -> bool {
    bytes.len() >= 4 && bytes[..4].contains(&0)
}
