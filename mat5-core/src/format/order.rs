//! Byte order handling
//!
//! The container header selects the byte order for everything that follows.
//! All multi-byte reads and writes go through [`ByteOrder`] so callers never
//! branch on endianness themselves.

use byteorder::{BigEndian, ByteOrder as _, LittleEndian};

/// Byte order of a container's payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ByteOrder {
    /// Little-endian payload, indicator `IM`
    #[default]
    Little,
    /// Big-endian payload, indicator `MI`
    Big,
}

macro_rules! order_rw {
    ($read:ident, $write:ident, $t:ty) => {
        #[inline]
        pub fn $read(self, bytes: &[u8]) -> $t {
            match self {
                ByteOrder::Little => LittleEndian::$read(bytes),
                ByteOrder::Big => BigEndian::$read(bytes),
            }
        }

        #[inline]
        pub fn $write(self, bytes: &mut [u8], value: $t) {
            match self {
                ByteOrder::Little => LittleEndian::$write(bytes, value),
                ByteOrder::Big => BigEndian::$write(bytes, value),
            }
        }
    };
}

impl ByteOrder {
    /// Indicator bytes as they appear at header offset 126
    pub const fn indicator(self) -> [u8; 2] {
        match self {
            ByteOrder::Little => *b"IM",
            ByteOrder::Big => *b"MI",
        }
    }

    /// Resolve the header indicator
    pub const fn from_indicator(bytes: [u8; 2]) -> Option<Self> {
        match bytes {
            [b'I', b'M'] => Some(ByteOrder::Little),
            [b'M', b'I'] => Some(ByteOrder::Big),
            _ => None,
        }
    }

    /// Byte order of the running machine
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    order_rw!(read_u16, write_u16, u16);
    order_rw!(read_i16, write_i16, i16);
    order_rw!(read_u32, write_u32, u32);
    order_rw!(read_i32, write_i32, i32);
    order_rw!(read_u64, write_u64, u64);
    order_rw!(read_i64, write_i64, i64);
    order_rw!(read_f32, write_f32, f32);
    order_rw!(read_f64, write_f64, f64);
}

impl core::fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ByteOrder::Little => write!(f, "little-endian"),
            ByteOrder::Big => write!(f, "big-endian"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indicator_round_trip() {
        assert_eq!(ByteOrder::from_indicator(*b"IM"), Some(ByteOrder::Little));
        assert_eq!(ByteOrder::from_indicator(*b"MI"), Some(ByteOrder::Big));
        assert_eq!(ByteOrder::from_indicator(*b"XX"), None);
        assert_eq!(ByteOrder::Big.indicator(), *b"MI");
    }

    #[test]
    fn test_read_write() {
        let mut buf = [0u8; 4];
        ByteOrder::Big.write_u32(&mut buf, 0x0102_0304);
        assert_eq!(buf, [1, 2, 3, 4]);
        assert_eq!(ByteOrder::Little.read_u32(&buf), 0x0403_0201);
    }
}
