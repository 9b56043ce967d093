//! In-memory array model
//!
//! [`Array`] is a closed sum type over every array kind a MAT-file can
//! hold. Numeric classes share one generic [`NumericArray`]; the variant
//! tag carries the element type.

mod cell;
mod char;
mod logical;
mod numeric;
mod opaque;
mod sparse;
mod structure;

pub use self::char::CharArray;
pub use cell::CellArray;
pub use logical::LogicalArray;
pub use numeric::NumericArray;
pub use opaque::OpaqueArray;
pub use sparse::{SparseArray, SparseIndex};
pub use structure::{ObjectArray, StructArray};

use crate::error::{Error, Result};
use mat5_core::format::constants::DEFAULT_NAME;
use mat5_core::ArrayClass;

/// Attributes shared by every array kind
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayMeta {
    name: String,
    dims: Vec<usize>,
    global: bool,
    child: bool,
}

impl ArrayMeta {
    /// New metadata; an empty name becomes the `@` placeholder
    pub fn new(name: impl Into<String>, dims: &[usize]) -> Self {
        let name = name.into();
        Self {
            name: if name.is_empty() {
                DEFAULT_NAME.to_string()
            } else {
                name
            },
            dims: normalize_dims(dims),
            global: false,
            child: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.name = if name.is_empty() {
            DEFAULT_NAME.to_string()
        } else {
            name
        };
    }

    /// Shape, always at least two dimensions
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }

    /// First dimension
    pub fn rows(&self) -> usize {
        self.dims[0]
    }

    /// Product of every dimension after the first
    pub fn cols(&self) -> usize {
        self.dims[1..].iter().product()
    }

    pub fn element_count(&self) -> usize {
        self.dims.iter().product()
    }

    pub fn is_global(&self) -> bool {
        self.global
    }

    pub fn set_global(&mut self, global: bool) {
        self.global = global;
    }

    /// Whether the array is nested in a cell, structure or opaque wrapper
    pub fn is_child(&self) -> bool {
        self.child
    }

    pub fn set_child(&mut self, child: bool) {
        self.child = child;
    }

    /// Column-major flat index of `(row, col)`
    pub(crate) fn flat_index(&self, row: usize, col: usize) -> Result<usize> {
        mat5_core::validation::validate_coordinate(row, col, self.rows(), self.cols()).map_err(
            |_| {
                Error::argument(format!(
                    "index ({row}, {col}) out of range for {}x{} array '{}'",
                    self.rows(),
                    self.cols(),
                    self.name
                ))
            },
        )
    }

    pub(crate) fn check_flat(&self, index: usize) -> Result<()> {
        if index >= self.element_count() {
            return Err(Error::argument(format!(
                "index {index} out of range for array '{}' with {} elements",
                self.name,
                self.element_count()
            )));
        }
        Ok(())
    }
}

/// Promote shapes to at least two dimensions
///
/// `[]` becomes `[0, 0]` and `[n]` becomes the column `[n, 1]`.
pub fn normalize_dims(dims: &[usize]) -> Vec<usize> {
    match dims.len() {
        0 => vec![0, 0],
        1 => vec![dims[0], 1],
        _ => dims.to_vec(),
    }
}

/// Any array a MAT-file can hold
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Double(NumericArray<f64>),
    Single(NumericArray<f32>),
    Int8(NumericArray<i8>),
    UInt8(NumericArray<u8>),
    Int16(NumericArray<i16>),
    UInt16(NumericArray<u16>),
    Int32(NumericArray<i32>),
    UInt32(NumericArray<u32>),
    Int64(NumericArray<i64>),
    UInt64(NumericArray<u64>),
    Logical(LogicalArray),
    Char(CharArray),
    Sparse(SparseArray),
    Cell(CellArray),
    Struct(StructArray),
    Object(ObjectArray),
    Opaque(OpaqueArray),
}

/// Apply an expression to whichever variant is present
macro_rules! each_variant {
    ($value:expr, $a:ident => $body:expr) => {
        match $value {
            Array::Double($a) => $body,
            Array::Single($a) => $body,
            Array::Int8($a) => $body,
            Array::UInt8($a) => $body,
            Array::Int16($a) => $body,
            Array::UInt16($a) => $body,
            Array::Int32($a) => $body,
            Array::UInt32($a) => $body,
            Array::Int64($a) => $body,
            Array::UInt64($a) => $body,
            Array::Logical($a) => $body,
            Array::Char($a) => $body,
            Array::Sparse($a) => $body,
            Array::Cell($a) => $body,
            Array::Struct($a) => $body,
            Array::Object($a) => $body,
            Array::Opaque($a) => $body,
        }
    };
}

/// Apply an expression to numeric variants, `$other` otherwise
macro_rules! numeric_variant {
    ($value:expr, $a:ident => $body:expr, _ => $other:expr) => {
        match $value {
            Array::Double($a) => $body,
            Array::Single($a) => $body,
            Array::Int8($a) => $body,
            Array::UInt8($a) => $body,
            Array::Int16($a) => $body,
            Array::UInt16($a) => $body,
            Array::Int32($a) => $body,
            Array::UInt32($a) => $body,
            Array::Int64($a) => $body,
            Array::UInt64($a) => $body,
            _ => $other,
        }
    };
}

pub(crate) use numeric_variant;

macro_rules! variant_accessors {
    ($($as_ref:ident, $as_mut:ident, $variant:ident, $t:ty;)*) => {
        $(
            pub fn $as_ref(&self) -> Option<&$t> {
                match self {
                    Array::$variant(a) => Some(a),
                    _ => None,
                }
            }

            pub fn $as_mut(&mut self) -> Option<&mut $t> {
                match self {
                    Array::$variant(a) => Some(a),
                    _ => None,
                }
            }
        )*
    };
}

impl Array {
    /// The empty `0x0` double placeholder
    pub fn empty() -> Self {
        Array::Double(NumericArray::new(DEFAULT_NAME, &[0, 0]))
    }

    /// Real double matrix from column-major values
    pub fn double(name: &str, dims: &[usize], values: Vec<f64>) -> Result<Self> {
        Ok(Array::Double(NumericArray::from_vec(name, dims, values)?))
    }

    /// 1x1 double
    pub fn scalar(name: &str, value: f64) -> Self {
        Array::Double(NumericArray::scalar(name, value))
    }

    /// 1xN char row
    pub fn string(name: &str, value: &str) -> Self {
        Array::Char(CharArray::new(name, value))
    }

    pub fn meta(&self) -> &ArrayMeta {
        each_variant!(self, a => a.meta())
    }

    pub fn meta_mut(&mut self) -> &mut ArrayMeta {
        each_variant!(self, a => a.meta_mut())
    }

    pub fn name(&self) -> &str {
        self.meta().name()
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.meta_mut().set_name(name);
    }

    pub fn dims(&self) -> &[usize] {
        self.meta().dims()
    }

    pub fn rows(&self) -> usize {
        self.meta().rows()
    }

    pub fn cols(&self) -> usize {
        self.meta().cols()
    }

    pub fn element_count(&self) -> usize {
        self.meta().element_count()
    }

    /// Whether the array has no elements
    pub fn is_empty(&self) -> bool {
        self.element_count() == 0
    }

    pub fn is_global(&self) -> bool {
        self.meta().is_global()
    }

    pub fn set_global(&mut self, global: bool) {
        self.meta_mut().set_global(global);
    }

    pub fn is_child(&self) -> bool {
        self.meta().is_child()
    }

    /// Mark the array as nested, exempting it from name validation
    pub fn mark_child(&mut self) {
        self.meta_mut().set_child(true);
    }

    /// Class tag written for this array
    pub fn class(&self) -> ArrayClass {
        match self {
            Array::Double(_) => ArrayClass::Double,
            Array::Single(_) => ArrayClass::Single,
            Array::Int8(_) => ArrayClass::Int8,
            Array::UInt8(_) => ArrayClass::UInt8,
            Array::Int16(_) => ArrayClass::Int16,
            Array::UInt16(_) => ArrayClass::UInt16,
            Array::Int32(_) => ArrayClass::Int32,
            Array::UInt32(_) => ArrayClass::UInt32,
            Array::Int64(_) => ArrayClass::Int64,
            Array::UInt64(_) => ArrayClass::UInt64,
            // logical arrays are stored as uint8 with the logical bit
            Array::Logical(_) => ArrayClass::UInt8,
            Array::Char(_) => ArrayClass::Char,
            Array::Sparse(_) => ArrayClass::Sparse,
            Array::Cell(_) => ArrayClass::Cell,
            Array::Struct(_) => ArrayClass::Struct,
            Array::Object(_) => ArrayClass::Object,
            Array::Opaque(_) => ArrayClass::Opaque,
        }
    }

    /// Whether an imaginary part is present
    pub fn is_complex(&self) -> bool {
        match self {
            Array::Sparse(s) => s.is_complex(),
            other => numeric_variant!(other, a => a.is_complex(), _ => false),
        }
    }

    /// Whether the array holds logical values
    pub fn is_logical(&self) -> bool {
        match self {
            Array::Logical(_) => true,
            Array::Sparse(s) => s.is_logical(),
            _ => false,
        }
    }

    /// Real value at `(row, col)` as f64
    ///
    /// Works for numeric, logical, char and sparse arrays.
    pub fn get_f64(&self, row: usize, col: usize) -> Result<f64> {
        match self {
            Array::Logical(a) => Ok(if a.get(row, col)? { 1.0 } else { 0.0 }),
            Array::Char(a) => Ok(a.get(row, col)? as f64),
            Array::Sparse(a) => a.get(row, col),
            other => numeric_variant!(other, a => a.get_f64(row, col), _ => Err(Error::argument(format!(
                "array '{}' of class {} has no numeric elements",
                other.name(),
                other.class()
            )))),
        }
    }

    /// Real value at a column-major flat index as f64
    ///
    /// Sparse arrays are addressed by `(row, column)` only and reject this.
    pub fn get_flat_f64(&self, index: usize) -> Result<f64> {
        match self {
            Array::Logical(a) => Ok(if a.get_flat(index)? { 1.0 } else { 0.0 }),
            Array::Char(a) => Ok(a.get_flat(index)? as f64),
            Array::Sparse(a) => a.get_flat(index),
            other => numeric_variant!(other, a => a.get_flat(index).map(|v| mat5_core::MatElement::to_f64(v)), _ => Err(Error::argument(format!(
                "array '{}' of class {} has no numeric elements",
                other.name(),
                other.class()
            )))),
        }
    }

    variant_accessors! {
        as_double, as_double_mut, Double, NumericArray<f64>;
        as_single, as_single_mut, Single, NumericArray<f32>;
        as_int8, as_int8_mut, Int8, NumericArray<i8>;
        as_uint8, as_uint8_mut, UInt8, NumericArray<u8>;
        as_int16, as_int16_mut, Int16, NumericArray<i16>;
        as_uint16, as_uint16_mut, UInt16, NumericArray<u16>;
        as_int32, as_int32_mut, Int32, NumericArray<i32>;
        as_uint32, as_uint32_mut, UInt32, NumericArray<u32>;
        as_int64, as_int64_mut, Int64, NumericArray<i64>;
        as_uint64, as_uint64_mut, UInt64, NumericArray<u64>;
        as_logical, as_logical_mut, Logical, LogicalArray;
        as_char, as_char_mut, Char, CharArray;
        as_sparse, as_sparse_mut, Sparse, SparseArray;
        as_cell, as_cell_mut, Cell, CellArray;
        as_struct, as_struct_mut, Struct, StructArray;
        as_object, as_object_mut, Object, ObjectArray;
        as_opaque, as_opaque_mut, Opaque, OpaqueArray;
    }
}

macro_rules! from_variant {
    ($($t:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$t> for Array {
                fn from(a: $t) -> Self {
                    Array::$variant(a)
                }
            }
        )*
    };
}

from_variant! {
    NumericArray<f64> => Double,
    NumericArray<f32> => Single,
    NumericArray<i8> => Int8,
    NumericArray<u8> => UInt8,
    NumericArray<i16> => Int16,
    NumericArray<u16> => UInt16,
    NumericArray<i32> => Int32,
    NumericArray<u32> => UInt32,
    NumericArray<i64> => Int64,
    NumericArray<u64> => UInt64,
    LogicalArray => Logical,
    CharArray => Char,
    SparseArray => Sparse,
    CellArray => Cell,
    StructArray => Struct,
    ObjectArray => Object,
    OpaqueArray => Opaque,
}
