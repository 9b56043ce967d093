//! Recursive decoder for `miMATRIX` elements
//!
//! A matrix element is read as flags, dimensions and name, then a
//! class-specific body. Composite classes (cell, struct, object, opaque)
//! recurse into child `miMATRIX` elements, each decoded through its own
//! cursor over exactly the bytes its tag declared.

use crate::array::{
    Array, ArrayMeta, CellArray, CharArray, LogicalArray, NumericArray, ObjectArray, OpaqueArray,
    SparseArray, StructArray,
};
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::filter::NameFilter;
use crate::storage::{scalars_f64, transfer_in};
use hashbrown::{HashMap, HashSet};
use log::trace;
use mat5_core::{
    element_count, read_scalar, ArrayClass, ArrayFlags, ByteOrder, DataType, MatElement, MatError,
    Scalar, Tag,
};

/// Nesting deeper than this is rejected
pub const MAX_DEPTH: usize = 256;

/// Decoder for matrix elements
pub struct ElementDecoder<'f> {
    filter: &'f dyn NameFilter,
}

impl<'f> ElementDecoder<'f> {
    pub fn new(filter: &'f dyn NameFilter) -> Self {
        Self { filter }
    }

    /// Decode the payload of one `miMATRIX` element
    ///
    /// Returns `None` for a root array whose name the filter rejects; the
    /// caller's cursor has already moved past the whole element.
    pub fn decode(&self, payload: &[u8], order: ByteOrder, is_root: bool) -> Result<Option<Array>> {
        self.decode_at(payload, order, if is_root { 0 } else { 1 })
    }

    fn decode_at(&self, payload: &[u8], order: ByteOrder, depth: usize) -> Result<Option<Array>> {
        if depth > MAX_DEPTH {
            return Err(Error::format(format!("arrays nested deeper than {MAX_DEPTH} levels")));
        }
        // a zero-length element stands for the empty array
        if payload.is_empty() {
            return Ok(Some(Array::empty()));
        }

        let mut cursor = ByteCursor::new(payload, order);
        let flags = read_flags(&mut cursor)?;
        let class = flags
            .class()
            .ok_or(MatError::UnknownClass(flags.class_code))?;
        if class == ArrayClass::Function {
            return Err(MatError::UnsupportedClass(class.to_u8()).into());
        }

        // opaque arrays keep their own name where the dimensions would be
        // and the class type where the name would be
        let (name, dims, class_type) = if class == ArrayClass::Opaque {
            let (_, name) = cursor.read_element()?;
            let (_, class_type) = cursor.read_element()?;
            (read_text(name), vec![1, 1], Some(read_text(class_type)))
        } else {
            let (tag, dims) = cursor.read_element()?;
            let dims = read_usizes(tag, dims, order, "dimension")?;
            check_shape(&dims)?;
            let (_, name) = cursor.read_element()?;
            (read_text(name), dims, None)
        };

        if depth == 0 && !self.filter.matches(&name) {
            trace!("skipping array '{name}' ({} bytes)", payload.len());
            return Ok(None);
        }

        let mut meta = ArrayMeta::new(name, &dims);
        meta.set_global(flags.global);
        meta.set_child(depth > 0);
        trace!("decoding {class} array '{}' {:?}", meta.name(), meta.dims());

        let array = match class {
            c if c.is_numeric() && flags.logical && !flags.complex => {
                Array::Logical(read_logical(&mut cursor, meta)?)
            }
            ArrayClass::Double => Array::Double(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::Single => Array::Single(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::Int8 => Array::Int8(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::UInt8 => Array::UInt8(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::Int16 => Array::Int16(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::UInt16 => Array::UInt16(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::Int32 => Array::Int32(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::UInt32 => Array::UInt32(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::Int64 => Array::Int64(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::UInt64 => Array::UInt64(read_numeric(&mut cursor, meta, flags.complex)?),
            ArrayClass::Char => Array::Char(read_char(&mut cursor, meta)?),
            ArrayClass::Sparse => Array::Sparse(read_sparse(&mut cursor, meta, &flags)?),
            ArrayClass::Cell => Array::Cell(self.read_cell(&mut cursor, meta, depth)?),
            ArrayClass::Struct => Array::Struct(self.read_struct(&mut cursor, meta, depth)?),
            ArrayClass::Object => {
                let (_, class_name) = cursor.read_element()?;
                let fields = self.read_struct(&mut cursor, meta, depth)?;
                Array::Object(ObjectArray::from_struct(&read_text(class_name), fields))
            }
            ArrayClass::Opaque => {
                let (_, class_name) = cursor.read_element()?;
                let content = self.read_child(&mut cursor, depth)?;
                let mut opaque = OpaqueArray::new(
                    meta.name(),
                    class_type.as_deref().unwrap_or_default(),
                    &read_text(class_name),
                    content,
                );
                *opaque.meta_mut() = meta;
                Array::Opaque(opaque)
            }
            ArrayClass::Function => return Err(MatError::UnsupportedClass(class.to_u8()).into()),
        };

        if !cursor.is_at_end() {
            return Err(Error::format(format!(
                "{class} array '{}' consumed {} of {} declared bytes",
                array.name(),
                cursor.position(),
                payload.len()
            )));
        }
        Ok(Some(array))
    }

    /// Decode one nested `miMATRIX` element
    fn read_child(&self, cursor: &mut ByteCursor<'_>, depth: usize) -> Result<Array> {
        let (tag, payload) = cursor.read_element()?;
        if tag.type_code != DataType::Matrix.to_u32() {
            return Err(Error::format(format!(
                "expected a nested miMATRIX element, found type {}",
                tag.type_code
            )));
        }
        let mut child = self
            .decode_at(payload, cursor.order(), depth + 1)?
            .unwrap_or_else(Array::empty);
        child.mark_child();
        Ok(child)
    }

    fn read_cell(&self, cursor: &mut ByteCursor<'_>, meta: ArrayMeta, depth: usize) -> Result<CellArray> {
        let count = meta.element_count();
        let mut cells = try_vec(count, cursor.remaining() / 8)?;
        for _ in 0..count {
            cells.push(self.read_child(cursor, depth)?);
        }
        Ok(CellArray::from_parts(meta, cells))
    }

    fn read_struct(
        &self,
        cursor: &mut ByteCursor<'_>,
        meta: ArrayMeta,
        depth: usize,
    ) -> Result<StructArray> {
        let order = cursor.order();
        let (tag, slot) = cursor.read_element()?;
        let slot = read_usizes(tag, slot, order, "field name length")?
            .first()
            .copied()
            .ok_or_else(|| Error::format("missing field name length"))?;

        let (_, block) = cursor.read_element()?;
        let field_names: Vec<String> = if slot == 0 {
            Vec::new()
        } else {
            if block.len() % slot != 0 {
                return Err(Error::format(format!(
                    "field name block of {} bytes is not a multiple of {slot}",
                    block.len()
                )));
            }
            block.chunks(slot).map(read_text).collect()
        };
        let mut seen = HashSet::with_capacity(field_names.len());
        if let Some(dup) = field_names.iter().find(|f| !seen.insert(f.as_str())) {
            return Err(Error::format(format!(
                "structure '{}' repeats field name '{dup}'",
                meta.name()
            )));
        }
        drop(seen);

        let count = meta.element_count();
        // elements without fields take no bytes, so the whole count is reserved
        let bound = if field_names.is_empty() {
            count
        } else {
            cursor.remaining() / 8
        };
        let mut elements = try_vec(count, bound)?;
        for _ in 0..count {
            let mut element = HashMap::with_capacity(field_names.len());
            for field in &field_names {
                let value = self.read_child(cursor, depth)?;
                element.insert(field.clone(), value);
            }
            elements.push(element);
        }
        Ok(StructArray::from_parts(meta, field_names, elements))
    }
}

/// Room for up to `count` children, at most `bound` of them up front
///
/// Every child needs at least its 8-byte tag, so callers bound the
/// reservation by the bytes left in the payload.
fn try_vec<T>(count: usize, bound: usize) -> Result<Vec<T>> {
    let count = count.min(bound);
    let mut v = Vec::new();
    v.try_reserve(count)
        .map_err(|_| Error::capacity(format!("cannot allocate {count} child arrays")))?;
    Ok(v)
}

fn read_flags(cursor: &mut ByteCursor<'_>) -> Result<ArrayFlags> {
    let order = cursor.order();
    let (tag, payload) = cursor.read_element()?;
    if tag.data_type()? != DataType::UInt32 || payload.len() != 8 {
        return Err(Error::format(format!(
            "array flags must be 8 bytes of miUINT32, found {} bytes of type {}",
            payload.len(),
            tag.type_code
        )));
    }
    Ok(ArrayFlags::from_words(
        order.read_u32(&payload[..4]),
        order.read_u32(&payload[4..]),
    ))
}

/// Text up to the first NUL, invalid UTF-8 replaced
fn read_text(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).into_owned()
}

/// Reject shapes whose element count or column count overflows
fn check_shape(dims: &[usize]) -> Result<()> {
    let cols = dims.get(1..).unwrap_or_default();
    element_count(dims)
        .and_then(|_| element_count(cols))
        .map_err(|_| Error::format(format!("dimensions {dims:?} overflow the element count")))?;
    Ok(())
}

/// Non-negative integers of any numeric data type
fn read_usizes(tag: Tag, payload: &[u8], order: ByteOrder, what: &str) -> Result<Vec<usize>> {
    let data_type = tag.data_type()?;
    if !data_type.is_numeric() {
        return Err(Error::format(format!("{what} stored as {data_type}")));
    }
    payload
        .chunks_exact(data_type.size_bytes())
        .map(|b| match read_scalar(data_type, order, b)? {
            Scalar::Int(v) if v >= 0 => Ok(v as usize),
            Scalar::UInt(v) => Ok(v as usize),
            Scalar::Float(v) if v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
            other => Err(Error::format(format!("invalid {what} {other:?}"))),
        })
        .collect()
}

fn read_numeric<T: MatElement>(
    cursor: &mut ByteCursor<'_>,
    meta: ArrayMeta,
    complex: bool,
) -> Result<NumericArray<T>> {
    let order = cursor.order();
    let count = meta.element_count();
    let (tag, data) = cursor.read_element()?;
    let real = transfer_in::<T>(tag.data_type()?, order, data, count)?;
    let imag = if complex {
        let (tag, data) = cursor.read_element()?;
        Some(transfer_in::<T>(tag.data_type()?, order, data, count)?)
    } else {
        None
    };
    Ok(NumericArray::from_planes(meta, real, imag))
}

fn read_logical(cursor: &mut ByteCursor<'_>, meta: ArrayMeta) -> Result<LogicalArray> {
    let order = cursor.order();
    let (tag, data) = cursor.read_element()?;
    let data_type = tag.data_type()?;
    if !data_type.is_numeric() || data.len() != meta.element_count() * data_type.size_bytes() {
        return Err(Error::format(format!(
            "logical array '{}' holds {} bytes of {data_type}, expected {} values",
            meta.name(),
            data.len(),
            meta.element_count()
        )));
    }
    let values = data
        .chunks_exact(data_type.size_bytes())
        .map(|b| Ok(read_scalar(data_type, order, b)?.is_nonzero()))
        .collect::<Result<Vec<bool>>>()?;
    Ok(LogicalArray::from_parts(meta, values))
}

fn read_char(cursor: &mut ByteCursor<'_>, meta: ArrayMeta) -> Result<CharArray> {
    let order = cursor.order();
    let (tag, data) = cursor.read_element()?;
    let units: Vec<u16> = match tag.data_type()? {
        DataType::Utf8 => String::from_utf8_lossy(data).encode_utf16().collect(),
        DataType::UInt8 | DataType::Int8 => data.iter().map(|&b| u16::from(b)).collect(),
        DataType::UInt16 | DataType::Int16 | DataType::Utf16 => {
            data.chunks_exact(2).map(|b| order.read_u16(b)).collect()
        }
        DataType::UInt32 | DataType::Int32 | DataType::Utf32 => {
            let mut units = Vec::with_capacity(data.len() / 4);
            let mut buf = [0u16; 2];
            for b in data.chunks_exact(4) {
                let c = char::from_u32(order.read_u32(b)).unwrap_or(char::REPLACEMENT_CHARACTER);
                units.extend_from_slice(c.encode_utf16(&mut buf));
            }
            units
        }
        other => {
            return Err(Error::format(format!(
                "char array '{}' stored as {other}",
                meta.name()
            )))
        }
    };
    if units.len() != meta.element_count() {
        return Err(Error::format(format!(
            "char array '{}' holds {} characters, expected {}",
            meta.name(),
            units.len(),
            meta.element_count()
        )));
    }
    Ok(CharArray::from_parts(meta, units))
}

fn read_sparse(cursor: &mut ByteCursor<'_>, meta: ArrayMeta, flags: &ArrayFlags) -> Result<SparseArray> {
    let order = cursor.order();
    let (tag, data) = cursor.read_element()?;
    let ir = read_usizes(tag, data, order, "row index")?;
    let (tag, data) = cursor.read_element()?;
    let jc = read_usizes(tag, data, order, "column pointer")?;
    let nnz = jc.last().copied().unwrap_or(0);

    let pr = if flags.logical && cursor.is_at_end() {
        // logical sparse arrays may leave the values implicit
        vec![1.0; nnz]
    } else {
        let (tag, data) = cursor.read_element()?;
        scalars_f64(tag.data_type()?, order, data)?
    };
    let pi = if flags.complex {
        let (tag, data) = cursor.read_element()?;
        Some(scalars_f64(tag.data_type()?, order, data)?)
    } else {
        None
    };

    let mut sparse = SparseArray::from_csc(meta, flags.nzmax as usize, &ir, &jc, &pr, pi.as_deref())?;
    sparse.set_logical(flags.logical);
    Ok(sparse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::ArrayFilter;
    use mat5_core::ErrorCategory;

    /// Append a long-form element with padding
    fn element(out: &mut Vec<u8>, data_type: DataType, payload: &[u8]) {
        out.extend_from_slice(&Tag::new(data_type, payload.len() as u32).encode(ByteOrder::Little));
        out.extend_from_slice(payload);
        out.resize(out.len() + mat5_core::padding_for(payload.len()), 0);
    }

    fn header(out: &mut Vec<u8>, flags: u32, dims: &[i32], name: &str) {
        let mut f = flags.to_le_bytes().to_vec();
        f.extend_from_slice(&0u32.to_le_bytes());
        element(out, DataType::UInt32, &f);
        let d: Vec<u8> = dims.iter().flat_map(|d| d.to_le_bytes()).collect();
        element(out, DataType::Int32, &d);
        element(out, DataType::Int8, name.as_bytes());
    }

    fn decode(payload: &[u8]) -> Result<Option<Array>> {
        let filter = ArrayFilter::all();
        ElementDecoder::new(&filter).decode(payload, ByteOrder::Little, true)
    }

    #[test]
    fn test_double_stored_as_uint8() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Double as u32, &[1, 3], "x");
        element(&mut body, DataType::UInt8, &[1, 2, 250]);
        let array = decode(&body).unwrap().unwrap();
        let x = array.as_double().unwrap();
        assert_eq!(x.real_values(), vec![1.0, 2.0, 250.0]);
        assert_eq!(x.name(), "x");
    }

    #[test]
    fn test_logical_selected_from_flags() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::UInt8 as u32 | 0x0200, &[2, 1], "b");
        element(&mut body, DataType::UInt8, &[0, 1]);
        let array = decode(&body).unwrap().unwrap();
        assert_eq!(array.as_logical().unwrap().values(), &[false, true]);
    }

    #[test]
    fn test_trailing_bytes_are_rejected() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Double as u32, &[1, 1], "x");
        element(&mut body, DataType::Double, &1.0f64.to_le_bytes());
        element(&mut body, DataType::Double, &2.0f64.to_le_bytes());
        assert!(decode(&body).unwrap_err().is_format());
    }

    #[test]
    fn test_count_mismatch_is_rejected() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Double as u32, &[2, 2], "x");
        element(&mut body, DataType::Double, &1.0f64.to_le_bytes());
        assert!(decode(&body).unwrap_err().is_format());
    }

    #[test]
    fn test_unknown_and_function_classes() {
        let mut body = Vec::new();
        header(&mut body, 40, &[1, 1], "x");
        assert!(decode(&body).unwrap_err().is_format());
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Function as u32, &[1, 1], "f");
        assert!(decode(&body).unwrap_err().is_format());
    }

    #[test]
    fn test_filtered_root_returns_none() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Double as u32, &[1, 1], "skip");
        element(&mut body, DataType::Double, &1.0f64.to_le_bytes());
        let filter = ArrayFilter::only(["keep"]);
        let decoded = ElementDecoder::new(&filter)
            .decode(&body, ByteOrder::Little, true)
            .unwrap();
        assert!(decoded.is_none());
    }

    #[test]
    fn test_cell_with_zero_length_child() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Cell as u32, &[1, 1], "c");
        element(&mut body, DataType::Matrix, &[]);
        let array = decode(&body).unwrap().unwrap();
        let child = array.as_cell().unwrap().get(0).unwrap();
        assert!(child.is_empty());
        assert!(child.is_child());
    }

    #[test]
    fn test_utf8_char_data() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Char as u32, &[1, 2], "s");
        element(&mut body, DataType::Utf8, "hé".as_bytes());
        let array = decode(&body).unwrap().unwrap();
        assert_eq!(array.as_char().unwrap().as_string(), "hé");
    }

    #[test]
    fn test_overflowing_dims_are_rejected() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Cell as u32, &[65536; 4], "c");
        assert!(decode(&body).unwrap_err().is_format());

        // a zero dimension hides the overflow from the total count
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Cell as u32, &[0, 65536, 65536, 65536, 65536], "z");
        assert!(decode(&body).unwrap_err().is_format());
    }

    #[test]
    fn test_large_cell_without_children_fails_cleanly() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Cell as u32, &[1 << 30, 4], "c");
        assert!(decode(&body).unwrap_err().is_format());
    }

    #[test]
    fn test_fieldless_struct_of_huge_size_is_a_capacity_error() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Struct as u32, &[i32::MAX, i32::MAX], "s");
        element(&mut body, DataType::Int32, &1i32.to_le_bytes());
        element(&mut body, DataType::Int8, &[]);
        assert_eq!(decode(&body).unwrap_err().category(), ErrorCategory::Capacity);
    }

    #[test]
    fn test_duplicate_field_names_are_rejected() {
        let mut body = Vec::new();
        header(&mut body, ArrayClass::Struct as u32, &[1, 1], "s");
        element(&mut body, DataType::Int32, &2i32.to_le_bytes());
        element(&mut body, DataType::Int8, b"a\0a\0");
        element(&mut body, DataType::Matrix, &[]);
        element(&mut body, DataType::Matrix, &[]);
        assert!(decode(&body).unwrap_err().is_format());
    }
}
