//! Typed storage element constraints
//!
//! This module defines the trait that maps MAT-file numeric classes to host
//! numeric types, together with the scalar decoding used for bulk transfer
//! between differently typed data elements.

use crate::format::{ArrayClass, ByteOrder, DataType};
use crate::{MatError, Result};

/// A scalar as read from a data element, before conversion
///
/// MATLAB frequently stores a class with a narrower data type (an integer
/// valued `double` array written as `miUINT8`, for example), so reads go
/// through this intermediate form.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Float(f64),
    Int(i64),
    UInt(u64),
}

impl Scalar {
    /// Lossy conversion to f64
    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::Float(v) => v,
            Scalar::Int(v) => v as f64,
            Scalar::UInt(v) => v as f64,
        }
    }

    /// Whether the scalar is nonzero
    pub fn is_nonzero(self) -> bool {
        match self {
            Scalar::Float(v) => v != 0.0,
            Scalar::Int(v) => v != 0,
            Scalar::UInt(v) => v != 0,
        }
    }
}

/// Decode one scalar of `data_type` from the start of `bytes`
pub fn read_scalar(data_type: DataType, order: ByteOrder, bytes: &[u8]) -> Result<Scalar> {
    if bytes.len() < data_type.size_bytes() {
        return Err(MatError::InsufficientBuffer);
    }
    let s = match data_type {
        DataType::Int8 => Scalar::Int(bytes[0] as i8 as i64),
        DataType::UInt8 | DataType::Utf8 => Scalar::UInt(bytes[0] as u64),
        DataType::Int16 => Scalar::Int(order.read_i16(bytes) as i64),
        DataType::UInt16 | DataType::Utf16 => Scalar::UInt(order.read_u16(bytes) as u64),
        DataType::Int32 => Scalar::Int(order.read_i32(bytes) as i64),
        DataType::UInt32 | DataType::Utf32 => Scalar::UInt(order.read_u32(bytes) as u64),
        DataType::Int64 => Scalar::Int(order.read_i64(bytes)),
        DataType::UInt64 => Scalar::UInt(order.read_u64(bytes)),
        DataType::Single => Scalar::Float(order.read_f32(bytes) as f64),
        DataType::Double => Scalar::Float(order.read_f64(bytes)),
        DataType::Matrix | DataType::Compressed => {
            return Err(MatError::UnknownDataType(data_type as u32))
        }
    };
    Ok(s)
}

/// Trait for host types that can back a numeric array
///
/// Implementors are plain-old-data numbers; their storage width always
/// equals `size_of::<Self>()`.
pub trait MatElement:
    bytemuck::Pod + PartialEq + Default + core::fmt::Debug + Send + Sync + 'static
{
    /// Natural data type written for this element
    const DATA_TYPE: DataType;

    /// Array class this element backs
    const CLASS: ArrayClass;

    /// Size in bytes of one element
    fn size_bytes() -> usize {
        core::mem::size_of::<Self>()
    }

    /// Decode from `bytes` in the given order
    fn read(order: ByteOrder, bytes: &[u8]) -> Self;

    /// Encode into `out` in the given order
    fn write(self, order: ByteOrder, out: &mut [u8]);

    /// Convert from a scalar of any source type
    fn from_scalar(value: Scalar) -> Self;

    /// Convert to the widest matching scalar form
    fn to_scalar(self) -> Scalar;

    /// Convert from f64 for generic construction
    fn from_f64(value: f64) -> Self {
        Self::from_scalar(Scalar::Float(value))
    }

    /// Convert to f64 for generic operations
    fn to_f64(self) -> f64 {
        self.to_scalar().to_f64()
    }
}

macro_rules! int_element {
    ($t:ty, $dt:ident, $class:ident, $variant:ident, $wide:ty, $read:ident, $write:ident) => {
        impl MatElement for $t {
            const DATA_TYPE: DataType = DataType::$dt;
            const CLASS: ArrayClass = ArrayClass::$class;

            #[inline]
            fn read(order: ByteOrder, bytes: &[u8]) -> Self {
                order.$read(bytes) as $t
            }

            #[inline]
            fn write(self, order: ByteOrder, out: &mut [u8]) {
                order.$write(out, self as _)
            }

            fn from_scalar(value: Scalar) -> Self {
                match value {
                    Scalar::Float(v) => v as $t,
                    Scalar::Int(v) => v as $t,
                    Scalar::UInt(v) => v as $t,
                }
            }

            fn to_scalar(self) -> Scalar {
                Scalar::$variant(self as $wide)
            }
        }
    };
}

// Single-byte types bypass the byte order entirely.
impl MatElement for u8 {
    const DATA_TYPE: DataType = DataType::UInt8;
    const CLASS: ArrayClass = ArrayClass::UInt8;

    #[inline]
    fn read(_order: ByteOrder, bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline]
    fn write(self, _order: ByteOrder, out: &mut [u8]) {
        out[0] = self;
    }

    fn from_scalar(value: Scalar) -> Self {
        match value {
            Scalar::Float(v) => v as u8,
            Scalar::Int(v) => v as u8,
            Scalar::UInt(v) => v as u8,
        }
    }

    fn to_scalar(self) -> Scalar {
        Scalar::UInt(self as u64)
    }
}

impl MatElement for i8 {
    const DATA_TYPE: DataType = DataType::Int8;
    const CLASS: ArrayClass = ArrayClass::Int8;

    #[inline]
    fn read(_order: ByteOrder, bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    #[inline]
    fn write(self, _order: ByteOrder, out: &mut [u8]) {
        out[0] = self as u8;
    }

    fn from_scalar(value: Scalar) -> Self {
        match value {
            Scalar::Float(v) => v as i8,
            Scalar::Int(v) => v as i8,
            Scalar::UInt(v) => v as i8,
        }
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Int(self as i64)
    }
}

int_element!(i16, Int16, Int16, Int, i64, read_i16, write_i16);
int_element!(u16, UInt16, UInt16, UInt, u64, read_u16, write_u16);
int_element!(i32, Int32, Int32, Int, i64, read_i32, write_i32);
int_element!(u32, UInt32, UInt32, UInt, u64, read_u32, write_u32);
int_element!(i64, Int64, Int64, Int, i64, read_i64, write_i64);
int_element!(u64, UInt64, UInt64, UInt, u64, read_u64, write_u64);

impl MatElement for f32 {
    const DATA_TYPE: DataType = DataType::Single;
    const CLASS: ArrayClass = ArrayClass::Single;

    #[inline]
    fn read(order: ByteOrder, bytes: &[u8]) -> Self {
        order.read_f32(bytes)
    }

    #[inline]
    fn write(self, order: ByteOrder, out: &mut [u8]) {
        order.write_f32(out, self)
    }

    fn from_scalar(value: Scalar) -> Self {
        match value {
            Scalar::Float(v) => v as f32,
            Scalar::Int(v) => v as f32,
            Scalar::UInt(v) => v as f32,
        }
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Float(self as f64)
    }
}

impl MatElement for f64 {
    const DATA_TYPE: DataType = DataType::Double;
    const CLASS: ArrayClass = ArrayClass::Double;

    #[inline]
    fn read(order: ByteOrder, bytes: &[u8]) -> Self {
        order.read_f64(bytes)
    }

    #[inline]
    fn write(self, order: ByteOrder, out: &mut [u8]) {
        order.write_f64(out, self)
    }

    fn from_scalar(value: Scalar) -> Self {
        match value {
            Scalar::Float(v) => v,
            Scalar::Int(v) => v as f64,
            Scalar::UInt(v) => v as f64,
        }
    }

    fn to_scalar(self) -> Scalar {
        Scalar::Float(self)
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn to_f64(self) -> f64 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<T: MatElement>(value: T) {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let mut buf = [0u8; 8];
            value.write(order, &mut buf);
            assert_eq!(T::read(order, &buf), value);
        }
    }

    #[test]
    fn test_element_round_trip() {
        round_trip(-3i8);
        round_trip(255u8);
        round_trip(-30000i16);
        round_trip(60000u16);
        round_trip(i32::MIN);
        round_trip(u32::MAX);
        round_trip(i64::MIN);
        round_trip(u64::MAX);
        round_trip(1.5f32);
        round_trip(-2.25f64);
    }

    #[test]
    fn test_sizes_match_data_type() {
        assert_eq!(<u8 as MatElement>::size_bytes(), DataType::UInt8.size_bytes());
        assert_eq!(<i16 as MatElement>::size_bytes(), DataType::Int16.size_bytes());
        assert_eq!(<f32 as MatElement>::size_bytes(), DataType::Single.size_bytes());
        assert_eq!(<u64 as MatElement>::size_bytes(), DataType::UInt64.size_bytes());
    }

    #[test]
    fn test_narrowed_source_conversion() {
        let bytes = [200u8];
        let s = read_scalar(DataType::UInt8, ByteOrder::Little, &bytes).unwrap();
        assert_eq!(f64::from_scalar(s), 200.0);
        let bytes = (-5i16).to_be_bytes();
        let s = read_scalar(DataType::Int16, ByteOrder::Big, &bytes).unwrap();
        assert_eq!(f64::from_scalar(s), -5.0);
        assert_eq!(i32::from_scalar(s), -5);
    }

    #[test]
    fn test_single_byte_fast_path_matches_generic() {
        for b in [0u8, 1, 127, 128, 255] {
            let generic = read_scalar(DataType::Int8, ByteOrder::Big, &[b]).unwrap();
            assert_eq!(i8::read(ByteOrder::Big, &[b]), i8::from_scalar(generic));
            let generic = read_scalar(DataType::UInt8, ByteOrder::Big, &[b]).unwrap();
            assert_eq!(u8::read(ByteOrder::Big, &[b]), u8::from_scalar(generic));
        }
    }

    #[test]
    fn test_read_scalar_rejects_short_input() {
        assert_eq!(
            read_scalar(DataType::Double, ByteOrder::Little, &[0; 4]),
            Err(MatError::InsufficientBuffer)
        );
    }
}
