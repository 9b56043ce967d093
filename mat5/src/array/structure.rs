//! Structure and object arrays

use super::{Array, ArrayMeta};
use crate::error::{Error, Result};
use hashbrown::HashMap;
use mat5_core::format::constants::MAX_NAME_LENGTH;

/// Array of records sharing one ordered set of field names
///
/// Every element holds a value for every field; fields added after
/// construction are filled with the empty placeholder in the other
/// elements. A current-element index lets single structs be used without
/// passing indices around.
#[derive(Debug, Clone)]
pub struct StructArray {
    meta: ArrayMeta,
    field_names: Vec<String>,
    elements: Vec<HashMap<String, Array>>,
    current: usize,
}

impl StructArray {
    /// Structure array with no fields
    pub fn new(name: &str, dims: &[usize]) -> Self {
        let meta = ArrayMeta::new(name, dims);
        let elements = (0..meta.element_count()).map(|_| HashMap::new()).collect();
        Self {
            meta,
            field_names: Vec::new(),
            elements,
            current: 0,
        }
    }

    /// 1x1 structure
    pub fn scalar(name: &str) -> Self {
        Self::new(name, &[1, 1])
    }

    pub(crate) fn from_parts(
        meta: ArrayMeta,
        field_names: Vec<String>,
        elements: Vec<HashMap<String, Array>>,
    ) -> Self {
        Self {
            meta,
            field_names,
            elements,
            current: 0,
        }
    }

    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ArrayMeta {
        &mut self.meta
    }

    /// Field names in insertion order
    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Index used by [`Self::field`] and [`Self::set_field`]
    pub fn current(&self) -> usize {
        self.current
    }

    pub fn set_current(&mut self, index: usize) -> Result<()> {
        self.meta.check_flat(index)?;
        self.current = index;
        Ok(())
    }

    /// Declare a field, filling every element with an empty placeholder
    pub fn add_field(&mut self, field: &str) -> Result<()> {
        if self.field_names.iter().any(|f| f == field) {
            return Ok(());
        }
        if field.is_empty() || field.len() > MAX_NAME_LENGTH {
            return Err(Error::argument(format!(
                "field name '{field}' must have 1 to {MAX_NAME_LENGTH} characters"
            )));
        }
        self.field_names.push(field.to_string());
        for element in &mut self.elements {
            let mut empty = Array::empty();
            empty.mark_child();
            element.insert(field.to_string(), empty);
        }
        Ok(())
    }

    /// Field value of the current element
    pub fn field(&self, field: &str) -> Option<&Array> {
        self.field_at(field, self.current)
    }

    /// Field value of element `index`
    pub fn field_at(&self, field: &str, index: usize) -> Option<&Array> {
        self.elements.get(index)?.get(field)
    }

    pub fn field_at_mut(&mut self, field: &str, index: usize) -> Option<&mut Array> {
        self.elements.get_mut(index)?.get_mut(field)
    }

    /// Set a field of the current element
    pub fn set_field(&mut self, field: &str, value: Array) -> Result<()> {
        self.set_field_at(field, value, self.current)
    }

    /// Set a field of element `index`, declaring the field if new
    pub fn set_field_at(&mut self, field: &str, mut value: Array, index: usize) -> Result<()> {
        self.meta.check_flat(index)?;
        self.add_field(field)?;
        value.mark_child();
        value.set_name(field);
        self.elements[index].insert(field.to_string(), value);
        Ok(())
    }

    /// Builder form of [`Self::set_field`]
    pub fn with_field(mut self, field: &str, value: Array) -> Result<Self> {
        self.set_field(field, value)?;
        Ok(self)
    }

    /// Longest field name in bytes
    pub fn max_field_length(&self) -> usize {
        self.field_names.iter().map(String::len).max().unwrap_or(0)
    }
}

impl PartialEq for StructArray {
    fn eq(&self, other: &Self) -> bool {
        // the current-element cursor is not part of the value
        self.meta == other.meta
            && self.field_names == other.field_names
            && self.elements == other.elements
    }
}

/// Structure array tagged with a class name
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectArray {
    class_name: String,
    fields: StructArray,
}

impl ObjectArray {
    pub fn new(name: &str, class_name: &str, dims: &[usize]) -> Self {
        Self {
            class_name: class_name.to_string(),
            fields: StructArray::new(name, dims),
        }
    }

    pub fn from_struct(class_name: &str, fields: StructArray) -> Self {
        Self {
            class_name: class_name.to_string(),
            fields,
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn fields(&self) -> &StructArray {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut StructArray {
        &mut self.fields
    }

    pub fn meta(&self) -> &ArrayMeta {
        self.fields.meta()
    }

    pub fn meta_mut(&mut self) -> &mut ArrayMeta {
        self.fields.meta_mut()
    }
}
