//! Data element tags
//!
//! Every element starts with a tag. The long form is two 32-bit words
//! (type, byte count). The compact form packs a byte count of at most four
//! into the upper half of the first word and stores the payload in the
//! following four bytes.

use super::constants::{ALIGNMENT_BOUNDARY, COMPACT_PAYLOAD_SIZE, TAG_SIZE};
use super::order::ByteOrder;
use crate::validation::calculate_padding;
use crate::{MatError, Result};

/// Data types that can appear in a tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u32)]
pub enum DataType {
    Int8 = 1,
    UInt8 = 2,
    Int16 = 3,
    UInt16 = 4,
    Int32 = 5,
    UInt32 = 6,
    Single = 7,
    Double = 9,
    Int64 = 12,
    UInt64 = 13,
    Matrix = 14,
    Compressed = 15,
    Utf8 = 16,
    Utf16 = 17,
    Utf32 = 18,
}

impl DataType {
    /// Convert from the on-disk code
    pub const fn from_u32(value: u32) -> Option<Self> {
        match value {
            1 => Some(DataType::Int8),
            2 => Some(DataType::UInt8),
            3 => Some(DataType::Int16),
            4 => Some(DataType::UInt16),
            5 => Some(DataType::Int32),
            6 => Some(DataType::UInt32),
            7 => Some(DataType::Single),
            9 => Some(DataType::Double),
            12 => Some(DataType::Int64),
            13 => Some(DataType::UInt64),
            14 => Some(DataType::Matrix),
            15 => Some(DataType::Compressed),
            16 => Some(DataType::Utf8),
            17 => Some(DataType::Utf16),
            18 => Some(DataType::Utf32),
            _ => None,
        }
    }

    /// Convert to the on-disk code
    pub const fn to_u32(self) -> u32 {
        self as u32
    }

    /// Size in bytes of one scalar of this type
    ///
    /// Container types (`Matrix`, `Compressed`) have no scalar width and
    /// report 1 so byte counts double as element counts.
    pub const fn size_bytes(self) -> usize {
        match self {
            DataType::Int8 | DataType::UInt8 | DataType::Utf8 => 1,
            DataType::Int16 | DataType::UInt16 | DataType::Utf16 => 2,
            DataType::Int32 | DataType::UInt32 | DataType::Single | DataType::Utf32 => 4,
            DataType::Double | DataType::Int64 | DataType::UInt64 => 8,
            DataType::Matrix | DataType::Compressed => 1,
        }
    }

    /// Lenient width lookup for raw codes, 1 for anything unrecognised
    pub const fn size_or_one(code: u32) -> usize {
        match Self::from_u32(code) {
            Some(t) => t.size_bytes(),
            None => 1,
        }
    }

    /// Whether values of this type are numeric scalars
    pub const fn is_numeric(self) -> bool {
        !matches!(
            self,
            DataType::Matrix | DataType::Compressed | DataType::Utf8 | DataType::Utf16 | DataType::Utf32
        )
    }
}

impl core::fmt::Display for DataType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            DataType::Int8 => "miINT8",
            DataType::UInt8 => "miUINT8",
            DataType::Int16 => "miINT16",
            DataType::UInt16 => "miUINT16",
            DataType::Int32 => "miINT32",
            DataType::UInt32 => "miUINT32",
            DataType::Single => "miSINGLE",
            DataType::Double => "miDOUBLE",
            DataType::Int64 => "miINT64",
            DataType::UInt64 => "miUINT64",
            DataType::Matrix => "miMATRIX",
            DataType::Compressed => "miCOMPRESSED",
            DataType::Utf8 => "miUTF8",
            DataType::Utf16 => "miUTF16",
            DataType::Utf32 => "miUTF32",
        };
        write!(f, "{name}")
    }
}

/// A decoded tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tag {
    /// Raw type code as stored in the file
    pub type_code: u32,
    /// Payload length in bytes, excluding padding
    pub size: u32,
    /// Whether the payload was packed next to the tag
    pub compact: bool,
}

impl Tag {
    /// New long-form tag
    pub const fn new(data_type: DataType, size: u32) -> Self {
        Self {
            type_code: data_type as u32,
            size,
            compact: false,
        }
    }

    /// New compact tag
    pub const fn compact(data_type: DataType, size: u32) -> Result<Self> {
        if size as usize > COMPACT_PAYLOAD_SIZE {
            return Err(MatError::InvalidCompactTag);
        }
        Ok(Self {
            type_code: data_type as u32,
            size,
            compact: true,
        })
    }

    /// Parse a tag from the start of `bytes`
    ///
    /// Returns the tag and the number of header bytes consumed (4 for the
    /// compact form, 8 for the long form). The compact payload itself is
    /// not consumed.
    pub fn parse(bytes: &[u8], order: ByteOrder) -> Result<(Self, usize)> {
        if bytes.len() < 4 {
            return Err(MatError::InsufficientBuffer);
        }
        let word = order.read_u32(&bytes[0..4]);
        if word >> 16 != 0 {
            let size = word >> 16;
            if size as usize > COMPACT_PAYLOAD_SIZE {
                return Err(MatError::InvalidCompactTag);
            }
            if bytes.len() < TAG_SIZE {
                return Err(MatError::InsufficientBuffer);
            }
            return Ok((
                Self {
                    type_code: word & 0xFFFF,
                    size,
                    compact: true,
                },
                4,
            ));
        }
        if bytes.len() < TAG_SIZE {
            return Err(MatError::InsufficientBuffer);
        }
        let size = order.read_u32(&bytes[4..8]);
        Ok((
            Self {
                type_code: word,
                size,
                compact: false,
            },
            TAG_SIZE,
        ))
    }

    /// Strictly resolve the data type
    pub const fn data_type(&self) -> Result<DataType> {
        match DataType::from_u32(self.type_code) {
            Some(t) => Ok(t),
            None => Err(MatError::UnknownDataType(self.type_code)),
        }
    }

    /// Number of scalars in the payload, using the lenient width lookup
    pub const fn element_count(&self) -> usize {
        self.size as usize / DataType::size_or_one(self.type_code)
    }

    /// Padding bytes that follow the payload
    pub const fn padding(&self) -> usize {
        if self.compact {
            COMPACT_PAYLOAD_SIZE - self.size as usize
        } else {
            padding_for(self.size as usize)
        }
    }

    /// Bytes occupied by tag header, payload and padding together
    pub const fn total_size(&self) -> usize {
        if self.compact {
            TAG_SIZE
        } else {
            TAG_SIZE + self.size as usize + padding_for(self.size as usize)
        }
    }

    /// Encode the tag header
    ///
    /// The compact form fills only the first four bytes; the caller writes
    /// the packed payload into the remaining four.
    pub fn encode(&self, order: ByteOrder) -> [u8; TAG_SIZE] {
        let mut bytes = [0u8; TAG_SIZE];
        if self.compact {
            order.write_u32(&mut bytes[0..4], (self.size << 16) | (self.type_code & 0xFFFF));
        } else {
            order.write_u32(&mut bytes[0..4], self.type_code);
            order.write_u32(&mut bytes[4..8], self.size);
        }
        bytes
    }
}

/// Padding that brings `size` up to the element alignment
pub const fn padding_for(size: usize) -> usize {
    calculate_padding(size, ALIGNMENT_BOUNDARY)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_long_form() {
        let bytes = [9, 0, 0, 0, 16, 0, 0, 0];
        let (tag, consumed) = Tag::parse(&bytes, ByteOrder::Little).unwrap();
        assert_eq!(consumed, 8);
        assert_eq!(tag.data_type(), Ok(DataType::Double));
        assert_eq!(tag.size, 16);
        assert!(!tag.compact);
        assert_eq!(tag.element_count(), 2);
    }

    #[test]
    fn test_parse_compact_form() {
        // miINT8 with 2 bytes: "m1"
        let bytes = [1, 0, 2, 0, b'm', b'1', 0, 0];
        let (tag, consumed) = Tag::parse(&bytes, ByteOrder::Little).unwrap();
        assert_eq!(consumed, 4);
        assert!(tag.compact);
        assert_eq!(tag.size, 2);
        assert_eq!(tag.data_type(), Ok(DataType::Int8));
        assert_eq!(tag.padding(), 2);
        assert_eq!(tag.total_size(), 8);
    }

    #[test]
    fn test_parse_big_endian() {
        let bytes = [0, 0, 0, 14, 0, 0, 0, 48];
        let (tag, _) = Tag::parse(&bytes, ByteOrder::Big).unwrap();
        assert_eq!(tag.data_type(), Ok(DataType::Matrix));
        assert_eq!(tag.size, 48);
    }

    #[test]
    fn test_unknown_type_is_rejected_strictly() {
        let tag = Tag {
            type_code: 8,
            size: 3,
            compact: false,
        };
        assert_eq!(tag.data_type(), Err(MatError::UnknownDataType(8)));
        assert_eq!(tag.element_count(), 3);
    }

    #[test]
    fn test_padding_invariant() {
        for size in 0..64usize {
            let p = padding_for(size);
            assert!(p < ALIGNMENT_BOUNDARY);
            assert_eq!((size + p) % ALIGNMENT_BOUNDARY, 0);
        }
    }

    #[test]
    fn test_encode_round_trip() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let tag = Tag::new(DataType::UInt32, 8);
            let (parsed, _) = Tag::parse(&tag.encode(order), order).unwrap();
            assert_eq!(parsed, tag);

            let small = Tag::compact(DataType::Int8, 3).unwrap();
            let (parsed, consumed) = Tag::parse(&small.encode(order), order).unwrap();
            assert_eq!(consumed, 4);
            assert_eq!(parsed, small);
        }
        assert_eq!(
            Tag::compact(DataType::Int8, 5),
            Err(MatError::InvalidCompactTag)
        );
    }
}
