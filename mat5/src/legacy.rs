//! Level 4 containers
//!
//! Level 4 files have no header. Each matrix starts with five 4-byte
//! integers (`type`, `mrows`, `ncols`, `imagf`, `namlen`), then the
//! NUL-terminated name, then the real and optional imaginary planes in
//! column-major order. The `type` word packs byte order, precision and
//! matrix kind as decimal digits, see [`LegacyType`].
//!
//! Only two-dimensional double, char and sparse matrices exist in this
//! format.

use crate::array::{numeric_variant, Array, CharArray, NumericArray, SparseArray};
use crate::cursor::ByteCursor;
use crate::error::{Error, Result};
use crate::storage::scalars_f64;
use log::{debug, trace};
use mat5_core::format::legacy::LEGACY_HEADER_SIZE;
use mat5_core::{element_count, validate_variable_name, ByteOrder, DataType, LegacyKind, LegacyType, MatElement};

/// Decode every matrix of a level 4 container
pub fn read_all(buffer: &[u8]) -> Result<Vec<Array>> {
    let mut arrays = Vec::new();
    let mut offset = 0;
    while offset < buffer.len() {
        let (array, used) = read_matrix(&buffer[offset..])?;
        trace!("level 4 matrix '{}' at offset {offset}", array.name());
        arrays.push(array);
        offset += used;
    }
    debug!("decoded {} level 4 matrices", arrays.len());
    Ok(arrays)
}

fn read_dimension(cursor: &mut ByteCursor<'_>, what: &str) -> Result<usize> {
    let value = cursor.read_i32()?;
    usize::try_from(value).map_err(|_| Error::format(format!("negative level 4 {what}: {value}")))
}

/// Decode one matrix, returning it with the number of bytes it used
fn read_matrix(bytes: &[u8]) -> Result<(Array, usize)> {
    let ty = LegacyType::detect(bytes)?;
    let order = ty.byte_order;
    let mut cursor = ByteCursor::new(bytes, order);
    cursor.skip(4)?;
    let rows = read_dimension(&mut cursor, "row count")?;
    let cols = read_dimension(&mut cursor, "column count")?;
    let imagf = cursor.read_i32()?;
    let namlen = read_dimension(&mut cursor, "name length")?;

    let name = cursor.read_bytes(namlen)?;
    let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());
    let name = String::from_utf8_lossy(&name[..end]).into_owned();

    let plane = rows
        .checked_mul(cols)
        .and_then(|n| n.checked_mul(ty.precision.size_bytes()))
        .ok_or_else(|| Error::capacity(format!("level 4 matrix '{name}' is too large")))?;
    let real = scalars_f64(ty.precision, order, cursor.read_bytes(plane)?)?;
    let imag = if imagf != 0 {
        Some(scalars_f64(ty.precision, order, cursor.read_bytes(plane)?)?)
    } else {
        None
    };

    let array = match ty.kind {
        LegacyKind::Numeric => {
            let mut a = NumericArray::from_vec(&name, &[rows, cols], real)?;
            if let Some(imag) = imag {
                a = a.with_imag(imag)?;
            }
            Array::Double(a)
        }
        LegacyKind::Text => {
            let units = real.iter().map(|&v| v as u16).collect();
            Array::Char(CharArray::from_units(&name, &[rows, cols], units)?)
        }
        LegacyKind::Sparse => Array::Sparse(read_sparse(&name, rows, cols, &real)?),
    };
    Ok((array, cursor.position()))
}

/// Rebuild a sparse matrix from its `[row, col, re(, im)]` triplet form
///
/// Indices are 1-based; the last row holds the dimensions.
fn read_sparse(name: &str, rows: usize, cols: usize, values: &[f64]) -> Result<SparseArray> {
    if rows == 0 || !(cols == 3 || cols == 4) {
        return Err(Error::format(format!(
            "level 4 sparse matrix '{name}' has shape {rows}x{cols}"
        )));
    }
    let column = |c: usize| &values[c * rows..(c + 1) * rows];
    let (ri, ci, re) = (column(0), column(1), column(2));
    let im = (cols == 4).then(|| column(3));

    let last = rows - 1;
    let (m, n) = match (triplet_index(ri[last], 0), triplet_index(ci[last], 0)) {
        (Some(m), Some(n)) if element_count(&[m, n]).is_ok() => (m, n),
        _ => {
            return Err(Error::format(format!(
                "level 4 sparse matrix '{name}' has dimensions ({}, {})",
                ri[last], ci[last]
            )))
        }
    };
    let mut sparse = if im.is_some() {
        SparseArray::new_complex(name, m, n)
    } else {
        SparseArray::new(name, m, n)
    };
    for k in 0..last {
        let (r, c) = match (triplet_index(ri[k], 1), triplet_index(ci[k], 1)) {
            (Some(r), Some(c)) => (r - 1, c - 1),
            _ => {
                return Err(Error::format(format!(
                    "level 4 sparse matrix '{name}' has index ({}, {})",
                    ri[k], ci[k]
                )))
            }
        };
        sparse
            .set(r, c, re[k])
            .map_err(|_| Error::format(format!("level 4 sparse entry ({r}, {c}) outside {m}x{n}")))?;
        if let Some(im) = im {
            sparse.set_imag(r, c, im[k])?;
        }
    }
    Ok(sparse)
}

/// A whole number of at least `min` that fits in `usize`
fn triplet_index(value: f64, min: usize) -> Option<usize> {
    // 2^53 bounds the integers a double holds exactly
    if !(value >= min as f64) || value.fract() != 0.0 || value > 9_007_199_254_740_992.0 {
        return None;
    }
    usize::try_from(value as u64).ok()
}

/// Encode arrays as a level 4 container
///
/// Numeric and logical arrays are stored as doubles. Arrays that the
/// format cannot hold are rejected before any output is produced.
pub fn write_all<'a, I>(arrays: I, order: ByteOrder) -> Result<Vec<u8>>
where
    I: IntoIterator<Item = &'a Array>,
{
    let mut out = Vec::new();
    for array in arrays {
        write_matrix(&mut out, array, order)?;
    }
    Ok(out)
}

/// Encode one matrix
pub fn write_matrix(out: &mut Vec<u8>, array: &Array, order: ByteOrder) -> Result<()> {
    validate_variable_name(array.name())
        .map_err(|_| Error::argument(format!("'{}' is not a valid variable name", array.name())))?;
    if array.dims().len() != 2 {
        return Err(Error::argument(format!(
            "level 4 files hold 2-D matrices only, '{}' has shape {:?}",
            array.name(),
            array.dims()
        )));
    }

    let (kind, rows, cols, real, imag): (LegacyKind, usize, usize, Vec<f64>, Option<Vec<f64>>) = match array {
        Array::Char(c) => {
            let units = c.units().iter().map(|&u| f64::from(u)).collect();
            (LegacyKind::Text, array.rows(), array.cols(), units, None)
        }
        Array::Logical(l) => {
            let values = l.values().iter().map(|&v| f64::from(u8::from(v))).collect();
            (LegacyKind::Numeric, array.rows(), array.cols(), values, None)
        }
        Array::Sparse(s) => {
            let (rows, values, imag) = sparse_triplets(s);
            (LegacyKind::Sparse, rows, if imag { 4 } else { 3 }, values, None)
        }
        other => {
            let planes = numeric_variant!(other, a => Some((
                a.real_values().into_iter().map(MatElement::to_f64).collect::<Vec<f64>>(),
                a.imag_values().map(|v| v.into_iter().map(MatElement::to_f64).collect::<Vec<f64>>()),
            )), _ => None);
            let (real, imag) = planes.ok_or_else(|| {
                Error::argument(format!(
                    "{} array '{}' cannot be stored in a level 4 file",
                    other.class(),
                    other.name()
                ))
            })?;
            (LegacyKind::Numeric, array.rows(), array.cols(), real, imag)
        }
    };

    let ty = LegacyType {
        byte_order: order,
        precision: DataType::Double,
        kind,
    };
    let to_i32 = |v: usize| {
        i32::try_from(v).map_err(|_| Error::argument(format!("{v} exceeds the level 4 size limit")))
    };
    let mut word = [0u8; 4];
    let header = [
        ty.to_value() as i32,
        to_i32(rows)?,
        to_i32(cols)?,
        i32::from(imag.is_some()),
        to_i32(array.name().len() + 1)?,
    ];
    out.reserve(LEGACY_HEADER_SIZE + array.name().len() + 1 + real.len() * 16);
    for value in header {
        order.write_i32(&mut word, value);
        out.extend_from_slice(&word);
    }
    out.extend_from_slice(array.name().as_bytes());
    out.push(0);

    let mut value = [0u8; 8];
    for plane in std::iter::once(&real).chain(imag.as_ref()) {
        for &v in plane {
            order.write_f64(&mut value, v);
            out.extend_from_slice(&value);
        }
    }
    Ok(())
}

/// Column-major `[row, col, re(, im)]` matrix with the dimension row last
///
/// Returns the row count, the values and whether an imaginary column exists.
fn sparse_triplets(s: &SparseArray) -> (usize, Vec<f64>, bool) {
    let indices: Vec<_> = s.indices().collect();
    let rows = indices.len() + 1;
    let real = s.real_values();
    let imag = s.imag_values();
    let mut columns = vec![Vec::with_capacity(rows); if imag.is_some() { 4 } else { 3 }];
    for (k, idx) in indices.iter().enumerate() {
        columns[0].push((idx.row + 1) as f64);
        columns[1].push((idx.col + 1) as f64);
        columns[2].push(real[k]);
        if let Some(imag) = &imag {
            columns[3].push(imag[k]);
        }
    }
    columns[0].push(s.meta().rows() as f64);
    columns[1].push(s.meta().cols() as f64);
    for c in columns.iter_mut().skip(2) {
        c.push(0.0);
    }
    let complex = imag.is_some();
    (rows, columns.concat(), complex)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_round_trip() {
        let a = Array::double("x", &[2, 3], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]).unwrap();
        let bytes = write_all([&a], ByteOrder::Little).unwrap();
        assert_eq!(&bytes[..4], &[0, 0, 0, 0]);
        assert_eq!(bytes.len(), 20 + 2 + 6 * 8);
        let back = read_all(&bytes).unwrap();
        assert_eq!(back, vec![a]);
    }

    #[test]
    fn test_big_endian_complex() {
        let a = NumericArray::<f64>::from_column("z", &[1.0, 2.0])
            .with_imag(vec![-1.0, 0.5])
            .unwrap();
        let a = Array::from(a);
        let bytes = write_all([&a], ByteOrder::Big).unwrap();
        // MOPT 1000 stored big-endian
        assert_eq!(&bytes[..4], &[0, 0, 0x03, 0xE8]);
        assert_eq!(read_all(&bytes).unwrap(), vec![a]);
    }

    #[test]
    fn test_text_and_sparse() {
        let text = Array::string("s", "hello");
        let mut sparse = SparseArray::new("sp", 4, 5);
        sparse.set(3, 4, 2.5).unwrap();
        sparse.set(0, 1, -1.0).unwrap();
        let sparse = Array::from(sparse);
        let bytes = write_all([&text, &sparse], ByteOrder::Little).unwrap();
        let back = read_all(&bytes).unwrap();
        assert_eq!(back[0], text);
        assert_eq!(back[1], sparse);
    }

    #[test]
    fn test_unsupported_arrays_are_rejected() {
        let cell = Array::from(crate::array::CellArray::new("c", &[1, 1]));
        assert!(write_all([&cell], ByteOrder::Little).unwrap_err().is_argument());
        let cube = Array::double("cube", &[1, 1, 2], vec![0.0, 1.0]).unwrap();
        assert!(write_all([&cube], ByteOrder::Little).unwrap_err().is_argument());
    }

    #[test]
    fn test_vax_format_is_rejected() {
        let mut bytes = vec![0u8; 24];
        // M = 2 (VAX D-float)
        bytes[..4].copy_from_slice(&2000u32.to_le_bytes());
        assert!(read_all(&bytes).unwrap_err().is_format());
    }

    /// Level 4 sparse matrix of type 0002 with the given triplet columns
    fn sparse_file(ri: &[f64], ci: &[f64], re: &[f64]) -> Vec<u8> {
        let mut bytes = Vec::new();
        for word in [2i32, ri.len() as i32, 3, 0, 3] {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes.extend_from_slice(b"sp\0");
        for v in ri.iter().chain(ci).chain(re) {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_sparse_triplets_are_validated() {
        let good = sparse_file(&[2.0, 2.0], &[3.0, 3.0], &[5.0, 0.0]);
        let back = read_all(&good).unwrap();
        assert_eq!(back[0].as_sparse().unwrap().get(1, 2).unwrap(), 5.0);

        for bad in [
            sparse_file(&[f64::NAN, 2.0], &[1.0, 3.0], &[5.0, 0.0]),
            sparse_file(&[1.5, 2.0], &[1.0, 3.0], &[5.0, 0.0]),
            sparse_file(&[0.0, 2.0], &[1.0, 3.0], &[5.0, 0.0]),
            sparse_file(&[1.0, -2.0], &[1.0, 3.0], &[5.0, 0.0]),
            sparse_file(&[1.0, f64::NAN], &[1.0, 3.0], &[5.0, 0.0]),
            sparse_file(&[1.0, 1e300], &[1.0, 1e300], &[5.0, 0.0]),
        ] {
            assert!(read_all(&bad).unwrap_err().is_format());
        }
    }
}
