//! Buffer providers for MAT-files on disk
//!
//! The codec only needs a byte slice. Providers decide how that slice is
//! obtained: a read-only memory map of the whole file, or a heap copy.

mod file_io;

pub use file_io::{read_files_parallel, MatFile};

use crate::error::Result;
use log::debug;
use mat5_core::StorageBackend;
#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};
#[cfg(feature = "mmap")]
use std::fs::File;
use std::path::Path;

/// Bytes of a whole file
pub enum MatBuffer {
    #[cfg(feature = "mmap")]
    Mapped(Mmap),
    Heap(Vec<u8>),
}

impl MatBuffer {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            #[cfg(feature = "mmap")]
            MatBuffer::Mapped(m) => &m[..],
            MatBuffer::Heap(v) => v.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StorageBackend for MatBuffer {
    fn as_slice(&self) -> &[u8] {
        MatBuffer::as_slice(self)
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl std::fmt::Debug for MatBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self {
            #[cfg(feature = "mmap")]
            MatBuffer::Mapped(_) => "Mapped",
            MatBuffer::Heap(_) => "Heap",
        };
        f.debug_struct("MatBuffer")
            .field("kind", &kind)
            .field("len", &self.len())
            .finish()
    }
}

/// Source of file buffers
pub trait BufferProvider: Send + Sync {
    /// Obtain the contents of `path`
    fn acquire(&self, path: &Path) -> Result<MatBuffer>;

    /// Give a buffer back; the default simply drops it
    fn release(&self, buffer: MatBuffer) {
        drop(buffer);
    }
}

/// Read-only memory maps
#[cfg(feature = "mmap")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MmapProvider;

#[cfg(feature = "mmap")]
impl BufferProvider for MmapProvider {
    fn acquire(&self, path: &Path) -> Result<MatBuffer> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            // zero-length files cannot be mapped on every platform
            return Ok(MatBuffer::Heap(Vec::new()));
        }
        // SAFETY: the map is read-only and owned by the returned buffer.
        // Concurrent modification of the file by another process is outside
        // what this crate can guard against.
        let mmap = unsafe { MmapOptions::new().map(&file)? };
        debug!("mapped {} ({} bytes)", path.display(), mmap.len());
        Ok(MatBuffer::Mapped(mmap))
    }
}

/// Whole-file reads into memory
#[derive(Debug, Clone, Copy, Default)]
pub struct HeapProvider;

impl BufferProvider for HeapProvider {
    fn acquire(&self, path: &Path) -> Result<MatBuffer> {
        let bytes = std::fs::read(path)?;
        debug!("read {} ({} bytes)", path.display(), bytes.len());
        Ok(MatBuffer::Heap(bytes))
    }
}

/// Provider used when none is given
pub fn default_provider() -> Box<dyn BufferProvider> {
    #[cfg(feature = "mmap")]
    {
        Box::new(MmapProvider)
    }
    #[cfg(not(feature = "mmap"))]
    {
        Box::new(HeapProvider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("mat5-{}-{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_heap_provider() {
        let path = temp_file("heap.bin", b"abc");
        let buffer = HeapProvider.acquire(&path).unwrap();
        assert_eq!(buffer.as_slice(), b"abc");
        assert_eq!(StorageBackend::size(&buffer), 3);
        HeapProvider.release(buffer);
        std::fs::remove_file(path).unwrap();
    }

    #[cfg(feature = "mmap")]
    #[test]
    fn test_mmap_provider() {
        let path = temp_file("mmap.bin", b"mapped bytes");
        let buffer = MmapProvider.acquire(&path).unwrap();
        assert_eq!(buffer.as_slice(), b"mapped bytes");
        drop(buffer);
        let empty = temp_file("empty.bin", b"");
        assert!(MmapProvider.acquire(&empty).unwrap().is_empty());
        std::fs::remove_file(path).unwrap();
        std::fs::remove_file(empty).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = HeapProvider
            .acquire(Path::new("/nonexistent/mat5/file.mat"))
            .unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
