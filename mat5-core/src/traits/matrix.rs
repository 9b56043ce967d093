//! Coordinate access trait for sparse matrices

use super::element::MatElement;

/// Core sparse matrix trait for format-agnostic access
///
/// Sparse matrices are addressed by `(row, column)` only.
pub trait SparseMatrix {
    /// The element type stored in this matrix
    type Element: MatElement;

    /// Get the stored value at the specified position
    ///
    /// Returns `None` if the element is not stored or the position is out
    /// of bounds.
    fn get_element(&self, row: usize, col: usize) -> Option<Self::Element>;

    /// Get matrix dimensions as (rows, cols)
    fn dimensions(&self) -> (usize, usize);

    /// Get number of stored elements
    fn nnz(&self) -> usize;
}
