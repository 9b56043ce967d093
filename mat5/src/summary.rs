//! Lightweight descriptions of arrays, for listing file contents

use crate::array::Array;
use crate::container::ArrayMap;
use mat5_core::ArrayClass;
use std::fmt;

/// What a listing shows about one array
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ArrayInfo {
    pub name: String,
    pub class: ArrayClass,
    pub dims: Vec<usize>,
    pub complex: bool,
    pub logical: bool,
    pub global: bool,
    /// Class name of objects and opaque values
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub class_name: Option<String>,
    /// Non-zero count of sparse arrays
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub nnz: Option<usize>,
}

impl From<&Array> for ArrayInfo {
    fn from(array: &Array) -> Self {
        let class_name = match array {
            Array::Object(o) => Some(o.class_name().to_string()),
            Array::Opaque(o) => Some(o.class_name().to_string()),
            _ => None,
        };
        let nnz = match array {
            Array::Sparse(s) => Some(s.indices().count()),
            _ => None,
        };
        Self {
            name: array.name().to_string(),
            class: array.class(),
            dims: array.dims().to_vec(),
            complex: array.is_complex(),
            logical: array.is_logical(),
            global: array.is_global(),
            class_name,
            nnz,
        }
    }
}

impl fmt::Display for ArrayInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dims.iter().map(usize::to_string).collect();
        write!(f, "{:<24} {:>12} {}", self.name, dims.join("x"), self.class)?;
        if self.logical {
            f.write_str(" logical")?;
        }
        if self.complex {
            f.write_str(" complex")?;
        }
        if self.global {
            f.write_str(" global")?;
        }
        if let Some(class_name) = &self.class_name {
            write!(f, " ({class_name})")?;
        }
        if let Some(nnz) = self.nnz {
            write!(f, " nnz={nnz}")?;
        }
        Ok(())
    }
}

/// Describe every array of a decoded file, in file order
pub fn summarize(arrays: &ArrayMap) -> Vec<ArrayInfo> {
    arrays.iter().map(ArrayInfo::from).collect()
}

/// JSON listing of a decoded file
#[cfg(feature = "serde")]
pub fn to_json(arrays: &ArrayMap) -> crate::Result<String> {
    let listing = summarize(arrays);
    let json = serde_json::to_string_pretty(&listing).map_err(std::io::Error::from)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::{ObjectArray, SparseArray};

    fn sample() -> ArrayMap {
        let mut sparse = SparseArray::new("sp", 3, 3);
        sparse.set(1, 2, 4.0).unwrap();
        let mut global = Array::scalar("g", 1.0);
        global.set_global(true);
        [
            Array::double("m", &[3, 2], vec![0.0; 6]).unwrap(),
            Array::from(sparse),
            Array::from(ObjectArray::new("obj", "Point", &[1, 1])),
            global,
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_summary_fields() {
        let info = summarize(&sample());
        assert_eq!(info.len(), 4);
        assert_eq!(info[0].dims, vec![3, 2]);
        assert_eq!(info[0].class, ArrayClass::Double);
        assert_eq!(info[1].nnz, Some(1));
        assert_eq!(info[2].class_name.as_deref(), Some("Point"));
        assert!(info[3].global);
    }

    #[test]
    fn test_display_line() {
        let info = summarize(&sample());
        let line = info[1].to_string();
        assert!(line.starts_with("sp"));
        assert!(line.contains("3x3"));
        assert!(line.ends_with("nnz=1"));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_listing() {
        let json = to_json(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "m");
        assert_eq!(value[0]["dims"], serde_json::json!([3, 2]));
        assert!(value[0].get("nnz").is_none());
        assert_eq!(value[1]["nnz"], 1);
    }
}
