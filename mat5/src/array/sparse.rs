//! Sparse matrices in coordinate form
//!
//! Values live in ordered maps keyed by [`SparseIndex`], whose ordering is
//! column-major. The compressed-column views written to files
//! ([`SparseArray::row_indices`], [`SparseArray::column_pointers`] and the
//! packed values) are derived from the maps on demand.

use super::ArrayMeta;
use crate::error::{Error, Result};
use mat5_core::SparseMatrix;
use std::collections::BTreeMap;

/// Coordinate of a stored value; orders by column, then row
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SparseIndex {
    pub col: usize,
    pub row: usize,
}

impl SparseIndex {
    pub fn new(row: usize, col: usize) -> Self {
        Self { col, row }
    }
}

/// Two-dimensional sparse matrix of doubles (or logicals)
///
/// Every coordinate with an imaginary value also has a real entry, which
/// may be zero.
#[derive(Debug, Clone)]
pub struct SparseArray {
    meta: ArrayMeta,
    nzmax: usize,
    logical: bool,
    real: BTreeMap<SparseIndex, f64>,
    imag: Option<BTreeMap<SparseIndex, f64>>,
}

impl SparseArray {
    /// Empty real sparse matrix
    pub fn new(name: &str, rows: usize, cols: usize) -> Self {
        Self {
            meta: ArrayMeta::new(name, &[rows, cols]),
            nzmax: 0,
            logical: false,
            real: BTreeMap::new(),
            imag: None,
        }
    }

    /// Empty complex sparse matrix
    pub fn new_complex(name: &str, rows: usize, cols: usize) -> Self {
        Self {
            imag: Some(BTreeMap::new()),
            ..Self::new(name, rows, cols)
        }
    }

    /// Empty logical sparse matrix
    pub fn new_logical(name: &str, rows: usize, cols: usize) -> Self {
        Self {
            logical: true,
            ..Self::new(name, rows, cols)
        }
    }

    /// Reserve a declared nonzero capacity
    pub fn with_nzmax(mut self, nzmax: usize) -> Self {
        self.nzmax = nzmax;
        self
    }

    /// Rebuild from compressed-column storage
    ///
    /// `jc` must have `cols + 1` nondecreasing entries; the values of
    /// column `c` are `pr[jc[c]..jc[c + 1]]` at rows `ir[jc[c]..jc[c + 1]]`.
    pub fn from_csc(
        meta: ArrayMeta,
        nzmax: usize,
        ir: &[usize],
        jc: &[usize],
        pr: &[f64],
        pi: Option<&[f64]>,
    ) -> Result<Self> {
        if meta.dims().len() != 2 {
            return Err(Error::format(format!(
                "sparse array '{}' has {} dimensions",
                meta.name(),
                meta.dims().len()
            )));
        }
        let (rows, cols) = (meta.rows(), meta.cols());
        if cols.checked_add(1) != Some(jc.len()) {
            return Err(Error::format(format!(
                "sparse array '{}' has {} column pointers for {cols} columns",
                meta.name(),
                jc.len()
            )));
        }
        let nnz = jc[cols];
        if ir.len() < nnz || pr.len() < nnz || pi.is_some_and(|pi| pi.len() < nnz) {
            return Err(Error::format(format!(
                "sparse array '{}' declares {nnz} nonzeros but stores fewer",
                meta.name()
            )));
        }

        let mut real = BTreeMap::new();
        let mut imag = pi.map(|_| BTreeMap::new());
        for col in 0..cols {
            let (start, end) = (jc[col], jc[col + 1]);
            if start > end || end > nnz {
                return Err(Error::format(format!(
                    "sparse array '{}' has decreasing column pointers at column {col}",
                    meta.name()
                )));
            }
            for k in start..end {
                let row = ir[k];
                if row >= rows {
                    return Err(Error::format(format!(
                        "sparse array '{}' stores row {row} of {rows}",
                        meta.name()
                    )));
                }
                let key = SparseIndex::new(row, col);
                real.insert(key, pr[k]);
                if let (Some(map), Some(pi)) = (imag.as_mut(), pi) {
                    map.insert(key, pi[k]);
                }
            }
        }

        Ok(Self {
            meta,
            nzmax: nzmax.max(nnz),
            logical: false,
            real,
            imag,
        })
    }

    pub(crate) fn set_logical(&mut self, logical: bool) {
        self.logical = logical;
    }

    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ArrayMeta {
        &mut self.meta
    }

    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }

    pub fn is_logical(&self) -> bool {
        self.logical
    }

    /// Declared capacity, never below the stored count
    pub fn nzmax(&self) -> usize {
        self.nzmax.max(self.real.len())
    }

    fn key(&self, row: usize, col: usize) -> Result<SparseIndex> {
        self.meta.flat_index(row, col)?;
        Ok(SparseIndex::new(row, col))
    }

    /// Real value at `(row, col)`; zero when not stored
    pub fn get(&self, row: usize, col: usize) -> Result<f64> {
        let key = self.key(row, col)?;
        Ok(self.real.get(&key).copied().unwrap_or(0.0))
    }

    /// Imaginary value at `(row, col)`; zero when not stored
    pub fn get_imag(&self, row: usize, col: usize) -> Result<f64> {
        let key = self.key(row, col)?;
        Ok(self
            .imag
            .as_ref()
            .and_then(|m| m.get(&key).copied())
            .unwrap_or(0.0))
    }

    /// Store a real value
    pub fn set(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        let key = self.key(row, col)?;
        let value = if self.logical && value != 0.0 { 1.0 } else { value };
        self.real.insert(key, value);
        Ok(())
    }

    /// Store an imaginary value, making the matrix complex
    pub fn set_imag(&mut self, row: usize, col: usize, value: f64) -> Result<()> {
        if self.logical {
            return Err(Error::argument(format!(
                "logical sparse array '{}' cannot be complex",
                self.meta.name()
            )));
        }
        let key = self.key(row, col)?;
        self.real.entry(key).or_insert(0.0);
        self.imag.get_or_insert_with(BTreeMap::new).insert(key, value);
        Ok(())
    }

    /// Flat indexing is not defined for sparse arrays
    pub fn get_flat(&self, index: usize) -> Result<f64> {
        Err(Error::argument(format!(
            "sparse array '{}' cannot be addressed by flat index {index}",
            self.meta.name()
        )))
    }

    /// Flat indexing is not defined for sparse arrays
    pub fn set_flat(&mut self, index: usize, _value: f64) -> Result<()> {
        self.get_flat(index).map(|_| ())
    }

    /// Stored coordinates in column-major order
    pub fn indices(&self) -> impl Iterator<Item = SparseIndex> + '_ {
        self.real.keys().copied()
    }

    /// Row of every stored value
    pub fn row_indices(&self) -> Vec<usize> {
        self.real.keys().map(|k| k.row).collect()
    }

    /// Cumulative nonzero count before each column, plus the total
    pub fn column_pointers(&self) -> Vec<usize> {
        let cols = self.meta.cols();
        let mut jc = vec![0usize; cols + 1];
        for key in self.real.keys() {
            jc[key.col + 1] += 1;
        }
        for c in 0..cols {
            jc[c + 1] += jc[c];
        }
        jc
    }

    /// Real values in coordinate order
    pub fn real_values(&self) -> Vec<f64> {
        self.real.values().copied().collect()
    }

    /// Imaginary values in coordinate order, zero where unset
    pub fn imag_values(&self) -> Option<Vec<f64>> {
        self.imag.as_ref().map(|imag| {
            self.real
                .keys()
                .map(|k| imag.get(k).copied().unwrap_or(0.0))
                .collect()
        })
    }
}

impl PartialEq for SparseArray {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
            && self.nzmax() == other.nzmax()
            && self.logical == other.logical
            && self.real == other.real
            && self.imag_values() == other.imag_values()
    }
}

impl SparseMatrix for SparseArray {
    type Element = f64;

    fn get_element(&self, row: usize, col: usize) -> Option<f64> {
        self.real.get(&SparseIndex::new(row, col)).copied()
    }

    fn dimensions(&self) -> (usize, usize) {
        (self.meta.rows(), self.meta.cols())
    }

    fn nnz(&self) -> usize {
        self.real.len()
    }
}
