//! Array size and bounds validation
//!
//! Pure arithmetic on element counts and byte lengths with overflow
//! protection. No I/O.

use crate::MatError;

/// Validate that `byte_len` holds a whole number of `element_size` elements
///
/// Returns the element count.
pub const fn validate_array_bounds(byte_len: usize, element_size: usize) -> Result<usize, MatError> {
    if element_size == 0 || byte_len % element_size != 0 {
        return Err(MatError::ArrayAlignment);
    }

    let count = byte_len / element_size;

    // Conservative overflow protection for downstream offset arithmetic
    if count > isize::MAX as usize / 8 {
        return Err(MatError::ArraySizeOverflow);
    }

    Ok(count)
}

/// Byte size of `count` elements of `element_size` bytes
pub const fn checked_byte_size(count: usize, element_size: usize) -> Result<usize, MatError> {
    match count.checked_mul(element_size) {
        Some(n) if n <= isize::MAX as usize => Ok(n),
        _ => Err(MatError::ArraySizeOverflow),
    }
}

/// Total element count of a shape
pub fn element_count(dims: &[usize]) -> Result<usize, MatError> {
    dims.iter()
        .try_fold(1usize, |acc, &d| acc.checked_mul(d))
        .ok_or(MatError::ArraySizeOverflow)
}

/// Validate a `(row, col)` coordinate against a 2-D extent
pub const fn validate_coordinate(
    row: usize,
    col: usize,
    nrows: usize,
    ncols: usize,
) -> Result<usize, MatError> {
    if row >= nrows || col >= ncols {
        return Err(MatError::IndexOutOfBounds);
    }
    // column-major flat index
    Ok(row + col * nrows)
}
