//! Logical (boolean) arrays

use super::{ArrayMeta, NumericArray};
use crate::error::{Error, Result};
use mat5_core::MatElement;

/// Dense boolean array, stored in files as uint8 with the logical flag
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalArray {
    meta: ArrayMeta,
    values: Vec<bool>,
}

impl LogicalArray {
    /// All-false array
    pub fn new(name: &str, dims: &[usize]) -> Self {
        let meta = ArrayMeta::new(name, dims);
        let values = vec![false; meta.element_count()];
        Self { meta, values }
    }

    /// Array from column-major values
    pub fn from_vec(name: &str, dims: &[usize], values: Vec<bool>) -> Result<Self> {
        let meta = ArrayMeta::new(name, dims);
        if values.len() != meta.element_count() {
            return Err(Error::argument(format!(
                "{} values do not fill shape {:?}",
                values.len(),
                meta.dims()
            )));
        }
        Ok(Self { meta, values })
    }

    /// Truth-test every element of a numeric array
    pub fn from_numeric<T: MatElement>(source: &NumericArray<T>) -> Self {
        let values = source
            .real_values()
            .into_iter()
            .map(|v| v.to_scalar().is_nonzero())
            .collect();
        Self {
            meta: source.meta().clone(),
            values,
        }
    }

    pub(crate) fn from_parts(meta: ArrayMeta, values: Vec<bool>) -> Self {
        Self { meta, values }
    }

    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ArrayMeta {
        &mut self.meta
    }

    pub fn get(&self, row: usize, col: usize) -> Result<bool> {
        Ok(self.values[self.meta.flat_index(row, col)?])
    }

    pub fn set(&mut self, row: usize, col: usize, value: bool) -> Result<()> {
        let index = self.meta.flat_index(row, col)?;
        self.values[index] = value;
        Ok(())
    }

    pub fn get_flat(&self, index: usize) -> Result<bool> {
        self.meta.check_flat(index)?;
        Ok(self.values[index])
    }

    /// Column-major values
    pub fn values(&self) -> &[bool] {
        &self.values
    }

    /// Number of true elements
    pub fn count_true(&self) -> usize {
        self.values.iter().filter(|&&v| v).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_numeric_truth_tests() {
        let source = NumericArray::<f64>::from_vec("m", &[2, 2], vec![0.0, -1.0, 0.5, 0.0]).unwrap();
        let logical = LogicalArray::from_numeric(&source);
        assert_eq!(logical.values(), &[false, true, true, false]);
        assert_eq!(logical.meta().name(), "m");
        assert_eq!(logical.count_true(), 2);
    }

    #[test]
    fn test_get_set() {
        let mut l = LogicalArray::new("l", &[2, 3]);
        l.set(1, 2, true).unwrap();
        assert!(l.get(1, 2).unwrap());
        assert!(l.get_flat(5).unwrap());
        assert!(l.get(2, 0).is_err());
    }
}
