//! Cell arrays

use super::{Array, ArrayMeta};
use crate::error::Result;

/// Array of arbitrary child arrays in column-major order
#[derive(Debug, Clone, PartialEq)]
pub struct CellArray {
    meta: ArrayMeta,
    cells: Vec<Array>,
}

impl CellArray {
    /// Cell array with every slot holding the empty placeholder
    pub fn new(name: &str, dims: &[usize]) -> Self {
        let meta = ArrayMeta::new(name, dims);
        let cells = (0..meta.element_count())
            .map(|_| {
                let mut a = Array::empty();
                a.mark_child();
                a
            })
            .collect();
        Self { meta, cells }
    }

    pub(crate) fn from_parts(meta: ArrayMeta, cells: Vec<Array>) -> Self {
        Self { meta, cells }
    }

    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ArrayMeta {
        &mut self.meta
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Child at a column-major index
    pub fn get(&self, index: usize) -> Result<&Array> {
        self.meta.check_flat(index)?;
        Ok(&self.cells[index])
    }

    pub fn get_mut(&mut self, index: usize) -> Result<&mut Array> {
        self.meta.check_flat(index)?;
        Ok(&mut self.cells[index])
    }

    /// Child at `(row, col)`
    pub fn get_at(&self, row: usize, col: usize) -> Result<&Array> {
        let index = self.meta.flat_index(row, col)?;
        Ok(&self.cells[index])
    }

    /// Replace the child at a column-major index
    pub fn set(&mut self, index: usize, mut value: Array) -> Result<()> {
        self.meta.check_flat(index)?;
        value.mark_child();
        self.cells[index] = value;
        Ok(())
    }

    pub fn set_at(&mut self, row: usize, col: usize, value: Array) -> Result<()> {
        let index = self.meta.flat_index(row, col)?;
        self.set(index, value)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Array> {
        self.cells.iter()
    }
}
