//! Opaque wrappers around foreign objects

use super::{Array, ArrayMeta};

/// A class instance MATLAB stores without a documented layout
///
/// `class_type` names the object system (`MCOS`, `java`, ...), and the
/// wrapped array holds its serialized content.
#[derive(Debug, Clone, PartialEq)]
pub struct OpaqueArray {
    meta: ArrayMeta,
    class_type: String,
    class_name: String,
    content: Box<Array>,
}

impl OpaqueArray {
    pub fn new(name: &str, class_type: &str, class_name: &str, content: Array) -> Self {
        let mut content = content;
        content.mark_child();
        Self {
            meta: ArrayMeta::new(name, &[1, 1]),
            class_type: class_type.to_string(),
            class_name: class_name.to_string(),
            content: Box::new(content),
        }
    }

    pub fn meta(&self) -> &ArrayMeta {
        &self.meta
    }

    pub fn meta_mut(&mut self) -> &mut ArrayMeta {
        &mut self.meta
    }

    pub fn class_type(&self) -> &str {
        &self.class_type
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// Wrapped array
    pub fn content(&self) -> &Array {
        &self.content
    }

    pub fn content_mut(&mut self) -> &mut Array {
        &mut self.content
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::NumericArray;

    #[test]
    fn test_content_is_child() {
        let bytes = NumericArray::<u8>::from_column("", &[1, 2, 3]);
        let o = OpaqueArray::new("obj", "java", "java.io.File", bytes.into());
        assert!(o.content().is_child());
        assert_eq!(o.class_type(), "java");
        assert_eq!(o.class_name(), "java.io.File");
        assert_eq!(o.meta().dims(), &[1, 1]);
    }
}
