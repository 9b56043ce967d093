//! Error types for MAT-file format operations

/// Broad classes of failure
///
/// Callers use the category to tell malformed input apart from misuse of the
/// API and from resource exhaustion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The bytes do not form a valid MAT-file
    Format,
    /// The caller passed an argument the format cannot represent
    Argument,
    /// A requested size cannot be satisfied
    Capacity,
}

/// Errors that can occur while interpreting MAT-file structures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatError {
    /// Descriptive text does not carry the level 5 signature
    InvalidHeader,
    /// Endianness indicator is neither `IM` nor `MI`
    InvalidByteOrder([u8; 2]),
    /// Unknown data type code in a tag
    UnknownDataType(u32),
    /// Unknown array class code in the flags subelement
    UnknownClass(u8),
    /// Array class exists in the format but is not supported
    UnsupportedClass(u8),
    /// Level 4 `MOPT` value outside the supported sub-formats
    UnsupportedLegacyFormat(u32),
    /// Compact tag declared more than four payload bytes
    InvalidCompactTag,
    /// Input ended before a complete structure was read
    InsufficientBuffer,
    /// Size arithmetic overflowed
    ArraySizeOverflow,
    /// Byte length not a multiple of the element width
    ArrayAlignment,
    /// Variable name does not follow the naming rule
    InvalidName,
    /// Index out of bounds
    IndexOutOfBounds,
}

impl MatError {
    /// Category of this error
    pub const fn category(&self) -> ErrorCategory {
        match self {
            MatError::InvalidName | MatError::IndexOutOfBounds => ErrorCategory::Argument,
            MatError::ArraySizeOverflow => ErrorCategory::Capacity,
            _ => ErrorCategory::Format,
        }
    }
}

impl core::fmt::Display for MatError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            MatError::InvalidHeader => write!(f, "Not a valid MAT-file (level 5 signature missing)"),
            MatError::InvalidByteOrder(b) => {
                write!(f, "Invalid endianness indicator: 0x{:02X}{:02X}", b[0], b[1])
            }
            MatError::UnknownDataType(t) => write!(f, "Unknown data type code: {t}"),
            MatError::UnknownClass(c) => write!(f, "Unknown array class: {c}"),
            MatError::UnsupportedClass(c) => write!(f, "Unsupported array class: {c}"),
            MatError::UnsupportedLegacyFormat(t) => {
                write!(f, "Unsupported level 4 matrix type: {t:04}")
            }
            MatError::InvalidCompactTag => write!(f, "Compact tag declares more than 4 bytes"),
            MatError::InsufficientBuffer => write!(f, "Unexpected end of buffer"),
            MatError::ArraySizeOverflow => write!(f, "Array size calculation overflowed"),
            MatError::ArrayAlignment => write!(f, "Byte length not aligned to element size"),
            MatError::InvalidName => write!(f, "Invalid variable name"),
            MatError::IndexOutOfBounds => write!(f, "Index out of bounds"),
        }
    }
}

/// Result type for core MAT-file operations
pub type Result<T> = core::result::Result<T, MatError>;
