//! Array classes and the array flags subelement

use super::constants::flags;

/// Array class codes stored in the low byte of the flags word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ArrayClass {
    Cell = 1,
    Struct = 2,
    Object = 3,
    Char = 4,
    Sparse = 5,
    Double = 6,
    Single = 7,
    Int8 = 8,
    UInt8 = 9,
    Int16 = 10,
    UInt16 = 11,
    Int32 = 12,
    UInt32 = 13,
    Int64 = 14,
    UInt64 = 15,
    Function = 16,
    Opaque = 17,
}

impl ArrayClass {
    /// Convert from the on-disk code
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ArrayClass::Cell),
            2 => Some(ArrayClass::Struct),
            3 => Some(ArrayClass::Object),
            4 => Some(ArrayClass::Char),
            5 => Some(ArrayClass::Sparse),
            6 => Some(ArrayClass::Double),
            7 => Some(ArrayClass::Single),
            8 => Some(ArrayClass::Int8),
            9 => Some(ArrayClass::UInt8),
            10 => Some(ArrayClass::Int16),
            11 => Some(ArrayClass::UInt16),
            12 => Some(ArrayClass::Int32),
            13 => Some(ArrayClass::UInt32),
            14 => Some(ArrayClass::Int64),
            15 => Some(ArrayClass::UInt64),
            16 => Some(ArrayClass::Function),
            17 => Some(ArrayClass::Opaque),
            _ => None,
        }
    }

    /// Convert to the on-disk code
    pub const fn to_u8(self) -> u8 {
        self as u8
    }

    /// Whether this class stores plain numeric planes
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            ArrayClass::Double
                | ArrayClass::Single
                | ArrayClass::Int8
                | ArrayClass::UInt8
                | ArrayClass::Int16
                | ArrayClass::UInt16
                | ArrayClass::Int32
                | ArrayClass::UInt32
                | ArrayClass::Int64
                | ArrayClass::UInt64
        )
    }

    /// MATLAB-facing class name
    pub const fn name(self) -> &'static str {
        match self {
            ArrayClass::Cell => "cell",
            ArrayClass::Struct => "struct",
            ArrayClass::Object => "object",
            ArrayClass::Char => "char",
            ArrayClass::Sparse => "sparse",
            ArrayClass::Double => "double",
            ArrayClass::Single => "single",
            ArrayClass::Int8 => "int8",
            ArrayClass::UInt8 => "uint8",
            ArrayClass::Int16 => "int16",
            ArrayClass::UInt16 => "uint16",
            ArrayClass::Int32 => "int32",
            ArrayClass::UInt32 => "uint32",
            ArrayClass::Int64 => "int64",
            ArrayClass::UInt64 => "uint64",
            ArrayClass::Function => "function_handle",
            ArrayClass::Opaque => "opaque",
        }
    }
}

impl core::fmt::Display for ArrayClass {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Decoded array flags subelement (two `miUINT32` words)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArrayFlags {
    /// Raw class byte
    pub class_code: u8,
    pub complex: bool,
    pub global: bool,
    pub logical: bool,
    /// Maximum nonzero count, meaningful for sparse arrays only
    pub nzmax: u32,
}

impl ArrayFlags {
    /// Flags for a class with no attribute bits set
    pub const fn new(class: ArrayClass) -> Self {
        Self {
            class_code: class as u8,
            complex: false,
            global: false,
            logical: false,
            nzmax: 0,
        }
    }

    /// Decode from the two flag words
    pub const fn from_words(first: u32, nzmax: u32) -> Self {
        Self {
            class_code: (first & flags::CLASS_MASK) as u8,
            complex: first & flags::COMPLEX != 0,
            global: first & flags::GLOBAL != 0,
            logical: first & flags::LOGICAL != 0,
            nzmax,
        }
    }

    /// Encode the first flag word
    ///
    /// Each attribute contributes its own bit; the class occupies the low byte.
    pub const fn first_word(&self) -> u32 {
        let mut word = self.class_code as u32 & flags::CLASS_MASK;
        if self.complex {
            word |= flags::COMPLEX;
        }
        if self.global {
            word |= flags::GLOBAL;
        }
        if self.logical {
            word |= flags::LOGICAL;
        }
        word
    }

    /// Resolve the class, rejecting unknown codes
    pub const fn class(&self) -> Option<ArrayClass> {
        ArrayClass::from_u8(self.class_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_bits_are_independent() {
        let mut f = ArrayFlags::new(ArrayClass::Double);
        f.complex = true;
        assert_eq!(f.first_word(), 0x0806);
        f.complex = false;
        f.logical = true;
        assert_eq!(f.first_word(), 0x0206);
        f.global = true;
        assert_eq!(f.first_word(), 0x0606);

        let decoded = ArrayFlags::from_words(0x0E09, 7);
        assert_eq!(decoded.class(), Some(ArrayClass::UInt8));
        assert!(decoded.complex && decoded.global && decoded.logical);
        assert_eq!(decoded.nzmax, 7);
    }

    #[test]
    fn test_class_codes() {
        for code in 1..=17u8 {
            let class = ArrayClass::from_u8(code).unwrap();
            assert_eq!(class.to_u8(), code);
        }
        assert_eq!(ArrayClass::from_u8(0), None);
        assert_eq!(ArrayClass::from_u8(18), None);
    }
}
