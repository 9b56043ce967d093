//! Character arrays

use super::ArrayMeta;
use crate::error::{Error, Result};

/// Text held as UTF-16 code units in column-major order
///
/// A multi-row array stores one string per row, padded with spaces.
#[derive(Debug, Clone, PartialEq)]
pub struct CharArray {
    meta: ArrayMeta,
    units: Vec<u16>,
}

impl CharArray {
    /// 1xN row holding `text`
    pub fn new(name: &str, text: &str) -> Self {
        let units: Vec<u16> = text.encode_utf16().collect();
        Self {
            meta: ArrayMeta::new(name, &[1, units.len()]),
            units,
        }
    }

    /// One row per string, shorter rows padded with spaces
    pub fn from_rows(name: &str, rows: &[&str]) -> Self {
        let encoded: Vec<Vec<u16>> = rows.iter().map(|r| r.encode_utf16().collect()).collect();
        let nrows = encoded.len();
        let ncols = encoded.iter().map(Vec::len).max().unwrap_or(0);
        let mut units = vec![u16::from(b' '); nrows * ncols];
        for (r, row) in encoded.iter().enumerate() {
            for (c, &u) in row.iter().enumerate() {
                units[r + c * nrows] = u;
            }
        }
        Self {
            meta: ArrayMeta::new(name, &[nrows, ncols]),
            units,
        }
    }

    /// Array from column-major code units
    pub fn from_units(name: &str, dims: &[usize], units: Vec<u16>) -> Result<Self> {
        let meta = ArrayMeta::new(name, dims);
        if units.len() != meta.element_count() {
            return Err(Error::argument(format!(
                "{} characters do not fill shape {:?}",
                units.len(),
                meta.dims()
            )));
        }
        Ok(Self { meta, units })
    }

    pub(crate) fn from_parts(meta: ArrayMeta, units: Vec<u16>) -> Self {
        Self { meta, units }
    }

    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ArrayMeta {
        &mut self.meta
    }

    /// Code unit at `(row, col)`
    pub fn get(&self, row: usize, col: usize) -> Result<u16> {
        Ok(self.units[self.meta.flat_index(row, col)?])
    }

    pub fn set(&mut self, row: usize, col: usize, unit: u16) -> Result<()> {
        let index = self.meta.flat_index(row, col)?;
        self.units[index] = unit;
        Ok(())
    }

    pub fn get_flat(&self, index: usize) -> Result<u16> {
        self.meta.check_flat(index)?;
        Ok(self.units[index])
    }

    /// Column-major code units
    pub fn units(&self) -> &[u16] {
        &self.units
    }

    /// Text of one row, unpaired surrogates replaced
    pub fn row_string(&self, row: usize) -> Result<String> {
        let (rows, cols) = (self.meta.rows(), self.meta.cols());
        if row >= rows {
            return Err(Error::argument(format!(
                "row {row} out of range for {rows} row char array '{}'",
                self.meta.name()
            )));
        }
        let units: Vec<u16> = (0..cols).map(|c| self.units[row + c * rows]).collect();
        Ok(String::from_utf16_lossy(&units))
    }

    /// Every row's text
    pub fn rows(&self) -> Vec<String> {
        (0..self.meta.rows())
            .filter_map(|r| self.row_string(r).ok())
            .collect()
    }

    /// Text of a single-row array, or all rows joined by newlines
    pub fn as_string(&self) -> String {
        self.rows().join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_row() {
        let c = CharArray::new("s", "héllo");
        assert_eq!(c.meta().dims(), &[1, 5]);
        assert_eq!(c.as_string(), "héllo");
        assert_eq!(c.get(0, 1).unwrap(), 'é' as u16);
    }

    #[test]
    fn test_rows_are_padded() {
        let c = CharArray::from_rows("names", &["ab", "cdef"]);
        assert_eq!(c.meta().dims(), &[2, 4]);
        assert_eq!(c.row_string(0).unwrap(), "ab  ");
        assert_eq!(c.row_string(1).unwrap(), "cdef");
        // column-major: a c b d
        assert_eq!(&c.units()[..4], &[97, 99, 98, 100]);
        assert!(c.row_string(2).is_err());
    }

    #[test]
    fn test_surrogate_pairs_count_as_two_units() {
        let c = CharArray::new("e", "a\u{1F600}");
        assert_eq!(c.meta().element_count(), 3);
        assert_eq!(c.as_string(), "a\u{1F600}");
    }
}
