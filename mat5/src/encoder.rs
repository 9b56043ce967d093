//! Serializer for `miMATRIX` elements
//!
//! Mirrors [`crate::decoder`]: flags, dimensions and name, then the class
//! body, with composite arrays writing their children as nested matrix
//! elements.

use crate::array::{numeric_variant, Array, ArrayMeta, NumericArray, StructArray};
use crate::error::{Error, Result};
use crate::storage::transfer_out;
use log::trace;
use mat5_core::format::constants::DEFAULT_NAME;
use mat5_core::{validate_variable_name, ArrayFlags, ByteOrder, DataType, MatElement, Tag};

/// Writer for matrix elements in one byte order
#[derive(Debug, Clone, Copy)]
pub struct ElementEncoder {
    order: ByteOrder,
    compact: bool,
}

impl Default for ElementEncoder {
    fn default() -> Self {
        Self::new(ByteOrder::Little)
    }
}

impl ElementEncoder {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            order,
            compact: false,
        }
    }

    /// Pack payloads of one to four bytes next to their tag
    pub fn with_compact_tags(mut self, compact: bool) -> Self {
        self.compact = compact;
        self
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    /// Serialize an array as a complete `miMATRIX` element
    ///
    /// Names of non-child arrays are validated before anything is written.
    pub fn encode(&self, array: &Array) -> Result<Vec<u8>> {
        if !array.is_child() {
            validate_variable_name(array.name()).map_err(|_| {
                Error::argument(format!("'{}' is not a valid variable name", array.name()))
            })?;
        }
        let mut out = Vec::new();
        self.write_matrix(&mut out, array)?;
        trace!("encoded array '{}' into {} bytes", array.name(), out.len());
        Ok(out)
    }

    fn write_matrix(&self, out: &mut Vec<u8>, array: &Array) -> Result<()> {
        let start = out.len();
        out.extend_from_slice(&[0u8; 8]);
        self.write_body(out, array)?;
        let size = to_u32(out.len() - start - 8)?;
        out[start..start + 8].copy_from_slice(&Tag::new(DataType::Matrix, size).encode(self.order));
        Ok(())
    }

    fn write_body(&self, out: &mut Vec<u8>, array: &Array) -> Result<()> {
        let mut flags = ArrayFlags::new(array.class());
        flags.global = array.is_global();
        flags.complex = array.is_complex();
        flags.logical = array.is_logical();

        match array {
            Array::Opaque(o) => {
                self.write_flags(out, &flags)?;
                // the dimensions slot carries the name, the name slot the class type
                self.write_element(out, DataType::Int8, written_name(o.meta()).as_bytes())?;
                self.write_element(out, DataType::Int8, o.class_type().as_bytes())?;
                self.write_element(out, DataType::Int8, o.class_name().as_bytes())?;
                self.write_matrix(out, o.content())
            }
            Array::Sparse(s) => {
                flags.nzmax = to_u32(s.nzmax())?;
                self.write_header(out, &flags, s.meta())?;
                let ir = s.row_indices();
                let jc = s.column_pointers();
                self.write_i32s(out, &ir)?;
                self.write_i32s(out, &jc)?;
                if s.is_logical() {
                    let values: Vec<u8> = s.real_values().iter().map(|&v| u8::from(v != 0.0)).collect();
                    self.write_element(out, DataType::UInt8, &values)?;
                } else {
                    self.write_f64s(out, &s.real_values())?;
                }
                if let Some(imag) = s.imag_values() {
                    self.write_f64s(out, &imag)?;
                }
                Ok(())
            }
            Array::Logical(l) => {
                self.write_header(out, &flags, l.meta())?;
                let values: Vec<u8> = l.values().iter().map(|&v| u8::from(v)).collect();
                self.write_element(out, DataType::UInt8, &values)
            }
            Array::Char(c) => {
                self.write_header(out, &flags, c.meta())?;
                let mut data = vec![0u8; c.units().len() * 2];
                for (u, b) in c.units().iter().zip(data.chunks_exact_mut(2)) {
                    self.order.write_u16(b, *u);
                }
                self.write_element(out, DataType::UInt16, &data)
            }
            Array::Cell(c) => {
                self.write_header(out, &flags, c.meta())?;
                for child in c.iter() {
                    self.write_matrix(out, child)?;
                }
                Ok(())
            }
            Array::Struct(s) => {
                self.write_header(out, &flags, s.meta())?;
                self.write_fields(out, s)
            }
            Array::Object(o) => {
                self.write_header(out, &flags, o.meta())?;
                self.write_element(out, DataType::Int8, o.class_name().as_bytes())?;
                self.write_fields(out, o.fields())
            }
            other => numeric_variant!(other, a => {
                self.write_header(out, &flags, a.meta())?;
                self.write_numeric(out, a)
            }, _ => Err(Error::argument(format!("cannot serialize array '{}'", other.name())))),
        }
    }

    fn write_flags(&self, out: &mut Vec<u8>, flags: &ArrayFlags) -> Result<()> {
        let mut words = [0u8; 8];
        self.order.write_u32(&mut words[..4], flags.first_word());
        self.order.write_u32(&mut words[4..], flags.nzmax);
        self.write_element(out, DataType::UInt32, &words)
    }

    /// Flags, dimensions and name
    fn write_header(&self, out: &mut Vec<u8>, flags: &ArrayFlags, meta: &ArrayMeta) -> Result<()> {
        self.write_flags(out, flags)?;
        let mut dims = vec![0u8; meta.dims().len() * 4];
        for (d, b) in meta.dims().iter().zip(dims.chunks_exact_mut(4)) {
            let d = i32::try_from(*d).map_err(|_| {
                Error::argument(format!("dimension {d} of '{}' exceeds the format limit", meta.name()))
            })?;
            self.order.write_i32(b, d);
        }
        self.write_element(out, DataType::Int32, &dims)?;
        self.write_element(out, DataType::Int8, written_name(meta).as_bytes())
    }

    fn write_numeric<T: MatElement>(&self, out: &mut Vec<u8>, array: &NumericArray<T>) -> Result<()> {
        self.write_element(out, T::DATA_TYPE, &transfer_out::<T>(array.real_bytes(), self.order))?;
        if let Some(imag) = array.imag_bytes() {
            self.write_element(out, T::DATA_TYPE, &transfer_out::<T>(imag, self.order))?;
        }
        Ok(())
    }

    fn write_fields(&self, out: &mut Vec<u8>, s: &StructArray) -> Result<()> {
        // slot width includes the terminating NUL
        let slot = s.max_field_length() + 1;
        let mut len = [0u8; 4];
        self.order.write_i32(&mut len, slot as i32);
        self.write_element(out, DataType::Int32, &len)?;

        let mut block = vec![0u8; slot * s.field_names().len()];
        for (name, dst) in s.field_names().iter().zip(block.chunks_exact_mut(slot)) {
            dst[..name.len()].copy_from_slice(name.as_bytes());
        }
        self.write_element(out, DataType::Int8, &block)?;

        for index in 0..s.len() {
            for field in s.field_names() {
                match s.field_at(field, index) {
                    Some(value) => self.write_matrix(out, value)?,
                    None => self.write_matrix(out, &Array::empty())?,
                }
            }
        }
        Ok(())
    }

    fn write_i32s(&self, out: &mut Vec<u8>, values: &[usize]) -> Result<()> {
        let mut data = vec![0u8; values.len() * 4];
        for (v, b) in values.iter().zip(data.chunks_exact_mut(4)) {
            let v = i32::try_from(*v)
                .map_err(|_| Error::argument(format!("sparse index {v} exceeds the format limit")))?;
            self.order.write_i32(b, v);
        }
        self.write_element(out, DataType::Int32, &data)
    }

    fn write_f64s(&self, out: &mut Vec<u8>, values: &[f64]) -> Result<()> {
        let mut data = vec![0u8; values.len() * 8];
        for (v, b) in values.iter().zip(data.chunks_exact_mut(8)) {
            self.order.write_f64(b, *v);
        }
        self.write_element(out, DataType::Double, &data)
    }

    /// Tag, payload and padding
    pub fn write_element(&self, out: &mut Vec<u8>, data_type: DataType, payload: &[u8]) -> Result<()> {
        if self.compact && (1..=4).contains(&payload.len()) {
            let mut bytes = Tag::compact(data_type, payload.len() as u32)?.encode(self.order);
            bytes[4..4 + payload.len()].copy_from_slice(payload);
            out.extend_from_slice(&bytes);
            return Ok(());
        }
        let tag = Tag::new(data_type, to_u32(payload.len())?);
        out.extend_from_slice(&tag.encode(self.order));
        out.extend_from_slice(payload);
        out.resize(out.len() + tag.padding(), 0);
        Ok(())
    }
}

/// Name bytes as stored; the placeholder is written as an empty name
fn written_name(meta: &ArrayMeta) -> &str {
    if meta.name() == DEFAULT_NAME {
        ""
    } else {
        meta.name()
    }
}

fn to_u32(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::capacity(format!("element of {len} bytes exceeds 4 GiB")))
}
