//! Storage backend trait
//!
//! The codec only needs a random-access view of the container bytes. How
//! those bytes were obtained (memory mapping, heap read, network) is a
//! concern of the backend, not of the format.

/// Trait for backends that hold MAT-file bytes
pub trait StorageBackend {
    /// Get a slice of the underlying data
    fn as_slice(&self) -> &[u8];

    /// Get the size of the data in bytes
    ///
    /// Default implementation uses the slice length.
    fn size(&self) -> usize {
        self.as_slice().len()
    }
}

impl StorageBackend for [u8] {
    fn as_slice(&self) -> &[u8] {
        self
    }
}

#[cfg(feature = "alloc")]
impl StorageBackend for alloc::vec::Vec<u8> {
    fn as_slice(&self) -> &[u8] {
        self
    }
}
