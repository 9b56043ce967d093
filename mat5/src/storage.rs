//! Typed storage planes
//!
//! Numeric values are held in little-endian byte planes whose element
//! width matches the array's class. This module moves whole data elements
//! in and out of those planes, converting between the stored data type and
//! the class type where MATLAB narrowed the storage.

use crate::error::{Error, Result};
use mat5_core::validation::{checked_byte_size, validate_array_bounds};
use mat5_core::{read_scalar, ByteOrder, DataType, MatElement};

/// Zeroed plane of `len` bytes
///
/// Allocation failure is reported instead of aborting.
pub(crate) fn alloc_plane(len: usize) -> Result<Vec<u8>> {
    let mut plane = Vec::new();
    plane
        .try_reserve_exact(len)
        .map_err(|_| Error::capacity(format!("cannot allocate a {len} byte array")))?;
    plane.resize(len, 0);
    Ok(plane)
}

/// Byte length of `count` elements of `T`
pub(crate) fn plane_len<T: MatElement>(count: usize) -> Result<usize> {
    checked_byte_size(count, T::size_bytes()).map_err(|_| {
        Error::capacity(format!(
            "{count} elements of {} bytes overflow the address space",
            T::size_bytes()
        ))
    })
}

/// Plane holding `values`
pub(crate) fn plane_from_values<T: MatElement>(values: &[T]) -> Vec<u8> {
    if ByteOrder::native() == ByteOrder::Little {
        return bytemuck::cast_slice::<T, u8>(values).to_vec();
    }
    let width = T::size_bytes();
    let mut plane = vec![0u8; values.len() * width];
    for (v, out) in values.iter().zip(plane.chunks_exact_mut(width)) {
        v.write(ByteOrder::Little, out);
    }
    plane
}

/// Values held in a plane
pub(crate) fn values_from_plane<T: MatElement>(plane: &[u8]) -> Vec<T> {
    if ByteOrder::native() == ByteOrder::Little {
        return bytemuck::pod_collect_to_vec::<u8, T>(plane);
    }
    plane
        .chunks_exact(T::size_bytes())
        .map(|b| T::read(ByteOrder::Little, b))
        .collect()
}

/// Read element `index` of a plane
#[inline]
pub(crate) fn plane_get<T: MatElement>(plane: &[u8], index: usize) -> T {
    let width = T::size_bytes();
    T::read(ByteOrder::Little, &plane[index * width..(index + 1) * width])
}

/// Write element `index` of a plane
#[inline]
pub(crate) fn plane_set<T: MatElement>(plane: &mut [u8], index: usize, value: T) {
    let width = T::size_bytes();
    value.write(ByteOrder::Little, &mut plane[index * width..(index + 1) * width]);
}

/// Fill a new plane of `count` elements from a data element payload
///
/// `source` holds values of `source_type` in file byte order. The payload
/// must contain exactly `count` values.
pub fn transfer_in<T: MatElement>(
    source_type: DataType,
    order: ByteOrder,
    source: &[u8],
    count: usize,
) -> Result<Vec<u8>> {
    if !source_type.is_numeric() {
        return Err(Error::format(format!(
            "data element of type {source_type} cannot hold numeric values"
        )));
    }
    let width = source_type.size_bytes();
    let declared = validate_array_bounds(source.len(), width)?;
    if declared != count {
        return Err(Error::format(format!(
            "data element holds {} bytes of {source_type}, expected {count} values",
            source.len()
        )));
    }

    // same type in little-endian (or single-byte) form: copy as is
    if source_type == T::DATA_TYPE && (order == ByteOrder::Little || width == 1) {
        let mut plane = alloc_plane(source.len())?;
        plane.copy_from_slice(source);
        return Ok(plane);
    }

    let mut plane = alloc_plane(plane_len::<T>(count)?)?;
    let out_width = T::size_bytes();
    if source_type == T::DATA_TYPE {
        for (src, out) in source
            .chunks_exact(width)
            .zip(plane.chunks_exact_mut(out_width))
        {
            T::read(order, src).write(ByteOrder::Little, out);
        }
    } else {
        for (src, out) in source
            .chunks_exact(width)
            .zip(plane.chunks_exact_mut(out_width))
        {
            let scalar = read_scalar(source_type, order, src)?;
            T::from_scalar(scalar).write(ByteOrder::Little, out);
        }
    }
    Ok(plane)
}

/// Encode a plane into `order` for writing
pub fn transfer_out<T: MatElement>(plane: &[u8], order: ByteOrder) -> Vec<u8> {
    let width = T::size_bytes();
    if order == ByteOrder::Little || width == 1 {
        return plane.to_vec();
    }
    let mut out = vec![0u8; plane.len()];
    for (src, dst) in plane.chunks_exact(width).zip(out.chunks_exact_mut(width)) {
        T::read(ByteOrder::Little, src).write(order, dst);
    }
    out
}

/// Decode every value of a data element as f64
pub(crate) fn scalars_f64(source_type: DataType, order: ByteOrder, source: &[u8]) -> Result<Vec<f64>> {
    if !source_type.is_numeric() {
        return Err(Error::format(format!(
            "data element of type {source_type} cannot hold numeric values"
        )));
    }
    let width = source_type.size_bytes();
    validate_array_bounds(source.len(), width)?;
    source
        .chunks_exact(width)
        .map(|b| Ok(read_scalar(source_type, order, b)?.to_f64()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_type_little_endian_copies() {
        let source: Vec<u8> = [1.5f64, -2.0]
            .iter()
            .flat_map(|v| v.to_le_bytes())
            .collect();
        let plane = transfer_in::<f64>(DataType::Double, ByteOrder::Little, &source, 2).unwrap();
        assert_eq!(values_from_plane::<f64>(&plane), vec![1.5, -2.0]);
    }

    #[test]
    fn test_big_endian_source_is_swapped() {
        let source: Vec<u8> = [7i32, -9].iter().flat_map(|v| v.to_be_bytes()).collect();
        let plane = transfer_in::<i32>(DataType::Int32, ByteOrder::Big, &source, 2).unwrap();
        assert_eq!(values_from_plane::<i32>(&plane), vec![7, -9]);
        assert_eq!(transfer_out::<i32>(&plane, ByteOrder::Big), source);
    }

    #[test]
    fn test_narrowed_source_is_widened() {
        let source = [0u8, 1, 255];
        let plane = transfer_in::<f64>(DataType::UInt8, ByteOrder::Little, &source, 3).unwrap();
        assert_eq!(values_from_plane::<f64>(&plane), vec![0.0, 1.0, 255.0]);
    }

    #[test]
    fn test_count_mismatch_is_a_format_error() {
        let source = [0u8; 16];
        let err = transfer_in::<f64>(DataType::Double, ByteOrder::Little, &source, 3).unwrap_err();
        assert!(err.is_format());
        let err = transfer_in::<f64>(DataType::Matrix, ByteOrder::Little, &source, 16).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_plane_get_set() {
        let mut plane = plane_from_values(&[0u16; 4]);
        plane_set(&mut plane, 2, 513u16);
        assert_eq!(plane_get::<u16>(&plane, 2), 513);
        assert_eq!(&plane[4..6], &[1, 2]);
    }
}
