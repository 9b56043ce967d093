//! Alignment and padding arithmetic
//!
//! Every long-form element payload is padded to the 8-byte boundary.

/// Align an offset to a power-of-two boundary
pub const fn align_to_boundary(offset: usize, boundary: usize) -> usize {
    (offset + boundary - 1) & !(boundary - 1)
}

/// Calculate padding needed to reach alignment boundary
pub const fn calculate_padding(offset: usize, boundary: usize) -> usize {
    align_to_boundary(offset, boundary) - offset
}
