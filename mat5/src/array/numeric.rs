//! Dense numeric arrays

use super::ArrayMeta;
use crate::error::{Error, Result};
use crate::storage::{alloc_plane, plane_from_values, plane_get, plane_len, plane_set, values_from_plane};
use mat5_core::MatElement;
use std::fmt;
use std::marker::PhantomData;

/// Dense array of one numeric class, optionally complex
///
/// Values are kept in column-major order. The imaginary plane, when
/// present, has the same length as the real plane.
#[derive(Clone, PartialEq)]
pub struct NumericArray<T: MatElement> {
    meta: ArrayMeta,
    real: Vec<u8>,
    imag: Option<Vec<u8>>,
    _element: PhantomData<T>,
}

impl<T: MatElement> NumericArray<T> {
    /// Zero-filled real array
    ///
    /// # Panics
    ///
    /// Panics if the shape does not fit in memory; use [`Self::zeros`] to
    /// get an error instead.
    pub fn new(name: &str, dims: &[usize]) -> Self {
        match Self::zeros(name, dims, false) {
            Ok(a) => a,
            Err(e) => panic!("{e}"),
        }
    }

    /// Zero-filled array, complex when `complex` is set
    pub fn zeros(name: &str, dims: &[usize], complex: bool) -> Result<Self> {
        let meta = ArrayMeta::new(name, dims);
        let count = mat5_core::element_count(meta.dims())
            .map_err(|_| Error::capacity(format!("shape {dims:?} overflows the element count")))?;
        let len = plane_len::<T>(count)?;
        let real = alloc_plane(len)?;
        let imag = if complex { Some(alloc_plane(len)?) } else { None };
        Ok(Self {
            meta,
            real,
            imag,
            _element: PhantomData,
        })
    }

    /// Real array from column-major values
    pub fn from_vec(name: &str, dims: &[usize], values: Vec<T>) -> Result<Self> {
        let meta = ArrayMeta::new(name, dims);
        if values.len() != meta.element_count() {
            return Err(Error::argument(format!(
                "{} values do not fill shape {:?}",
                values.len(),
                meta.dims()
            )));
        }
        Ok(Self {
            meta,
            real: plane_from_values(&values),
            imag: None,
            _element: PhantomData,
        })
    }

    /// 1x1 array
    pub fn scalar(name: &str, value: T) -> Self {
        Self {
            meta: ArrayMeta::new(name, &[1, 1]),
            real: plane_from_values(&[value]),
            imag: None,
            _element: PhantomData,
        }
    }

    /// Column vector
    pub fn from_column(name: &str, values: &[T]) -> Self {
        Self {
            meta: ArrayMeta::new(name, &[values.len(), 1]),
            real: plane_from_values(values),
            imag: None,
            _element: PhantomData,
        }
    }

    /// Matrix from row-major rows, which must all have the same length
    pub fn from_rows(name: &str, rows: &[Vec<T>]) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
            return Err(Error::argument(format!(
                "row {bad} has {} values, expected {ncols}",
                rows[bad].len()
            )));
        }
        let mut values = Vec::with_capacity(nrows * ncols);
        for col in 0..ncols {
            values.extend(rows.iter().map(|r| r[col]));
        }
        Self::from_vec(name, &[nrows, ncols], values)
    }

    /// Attach an imaginary part, making the array complex
    pub fn with_imag(mut self, values: Vec<T>) -> Result<Self> {
        if values.len() != self.meta.element_count() {
            return Err(Error::argument(format!(
                "{} imaginary values do not match {} real values",
                values.len(),
                self.meta.element_count()
            )));
        }
        self.imag = Some(plane_from_values(&values));
        Ok(self)
    }

    /// Assemble from planes already in storage layout
    pub(crate) fn from_planes(meta: ArrayMeta, real: Vec<u8>, imag: Option<Vec<u8>>) -> Self {
        Self {
            meta,
            real,
            imag,
            _element: PhantomData,
        }
    }

    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ArrayMeta {
        &mut self.meta
    }

    pub fn name(&self) -> &str {
        self.meta.name()
    }

    pub fn dims(&self) -> &[usize] {
        self.meta.dims()
    }

    pub fn is_complex(&self) -> bool {
        self.imag.is_some()
    }

    pub fn len(&self) -> usize {
        self.meta.element_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Real value at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        let index = self.meta.flat_index(row, col)?;
        Ok(plane_get(&self.real, index))
    }

    /// Set the real value at `(row, col)`
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let index = self.meta.flat_index(row, col)?;
        plane_set(&mut self.real, index, value);
        Ok(())
    }

    /// Real value at a column-major index
    pub fn get_flat(&self, index: usize) -> Result<T> {
        self.meta.check_flat(index)?;
        Ok(plane_get(&self.real, index))
    }

    pub fn set_flat(&mut self, index: usize, value: T) -> Result<()> {
        self.meta.check_flat(index)?;
        plane_set(&mut self.real, index, value);
        Ok(())
    }

    /// Imaginary value at `(row, col)`, zero for a real array
    pub fn get_imag(&self, row: usize, col: usize) -> Result<T> {
        let index = self.meta.flat_index(row, col)?;
        Ok(self
            .imag
            .as_deref()
            .map_or_else(T::default, |plane| plane_get(plane, index)))
    }

    /// Set an imaginary value, making the array complex if needed
    pub fn set_imag(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        let index = self.meta.flat_index(row, col)?;
        if self.imag.is_none() {
            self.imag = Some(alloc_plane(self.real.len())?);
        }
        if let Some(plane) = self.imag.as_mut() {
            plane_set(plane, index, value);
        }
        Ok(())
    }

    /// Real value at `(row, col)` as f64
    pub fn get_f64(&self, row: usize, col: usize) -> Result<f64> {
        self.get(row, col).map(T::to_f64)
    }

    /// Column-major real values
    pub fn real_values(&self) -> Vec<T> {
        values_from_plane(&self.real)
    }

    /// Column-major imaginary values
    pub fn imag_values(&self) -> Option<Vec<T>> {
        self.imag.as_deref().map(values_from_plane)
    }

    /// Real values as row-major rows of a 2-D view
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        let (rows, cols) = (self.meta.rows(), self.meta.cols());
        (0..rows)
            .map(|r| (0..cols).map(|c| plane_get(&self.real, r + c * rows)).collect())
            .collect()
    }

    /// Real plane in little-endian storage layout
    pub fn real_bytes(&self) -> &[u8] {
        &self.real
    }

    pub fn imag_bytes(&self) -> Option<&[u8]> {
        self.imag.as_deref()
    }
}

impl<T: MatElement> fmt::Debug for NumericArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NumericArray")
            .field("class", &T::CLASS)
            .field("name", &self.meta.name())
            .field("dims", &self.meta.dims())
            .field("complex", &self.is_complex())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_is_column_major() {
        let m = NumericArray::<f64>::from_rows("m", &[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
            .unwrap();
        assert_eq!(m.dims(), &[3, 2]);
        assert_eq!(m.real_values(), vec![1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
        assert_eq!(m.get(2, 1).unwrap(), 6.0);
        assert_eq!(m.to_rows()[1], vec![3.0, 4.0]);
    }

    #[test]
    fn test_ragged_rows_are_rejected() {
        let err = NumericArray::<i32>::from_rows("m", &[vec![1, 2], vec![3]]).unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn test_out_of_range_index() {
        let mut m = NumericArray::<u8>::new("m", &[2, 2]);
        assert!(m.get(2, 0).unwrap_err().is_argument());
        assert!(m.set(0, 2, 1).unwrap_err().is_argument());
        assert!(m.get_flat(4).unwrap_err().is_argument());
    }

    #[test]
    fn test_imaginary_part() {
        let mut m = NumericArray::<f32>::new("z", &[1, 3]);
        assert!(!m.is_complex());
        assert_eq!(m.get_imag(0, 1).unwrap(), 0.0);
        m.set_imag(0, 1, -1.5).unwrap();
        assert!(m.is_complex());
        assert_eq!(m.imag_values().unwrap(), vec![0.0, -1.5, 0.0]);
    }

    #[test]
    fn test_with_imag_length_check() {
        let m = NumericArray::<f64>::from_column("c", &[1.0, 2.0]);
        assert!(m.clone().with_imag(vec![1.0]).is_err());
        let z = m.with_imag(vec![3.0, 4.0]).unwrap();
        assert_eq!(z.get_imag(1, 0).unwrap(), 4.0);
    }
}
