//! MAT5 - MAT-file reader and writer
//!
//! Reads and writes MATLAB MAT-files: level 5 containers (optionally
//! compressed, either byte order) and legacy level 4 containers.
//!
//! ## Architecture
//!
//! - **mat5-core**: format definitions, tags, class codes and validation (no I/O)
//! - **mat5**: the array model, element codec, containers and file access
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mat5::{Array, MatFile, WriteOptions};
//!
//! fn example() -> mat5::Result<()> {
//!     let m = Array::double("m1", &[3, 2], vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0])?;
//!     MatFile::write("data.mat", [&m], &WriteOptions::default())?;
//!
//!     let arrays = MatFile::open("data.mat").read_all()?;
//!     if let Some(m1) = arrays.get("m1") {
//!         println!("m1(2,1) = {}", m1.get_f64(2, 1)?);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **mmap** (default): files are read through read-only memory maps
//! - **serde** (default): JSON listings of file contents

pub use mat5_core::{
    // Format definitions
    ArrayClass, ArrayFlags, ByteOrder, DataType, LegacyType, MatHeader, Tag,
    // Element trait
    MatElement, Scalar, SparseMatrix,
    // Core errors
    ErrorCategory, MatError,
    // Validation utilities
    is_valid_variable_name, validate_variable_name,
};

pub mod array;
pub mod compression;
pub mod container;
pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod filter;
pub mod incremental;
pub mod legacy;
pub mod mmap_backend;
pub mod storage;
pub mod summary;

pub use array::{
    Array, ArrayMeta, CellArray, CharArray, LogicalArray, NumericArray, ObjectArray, OpaqueArray,
    SparseArray, SparseIndex, StructArray,
};
pub use container::{
    parse_header, read_all, read_one, write_all, write_header, write_one, ArrayMap, ReadOptions,
    WriteOptions,
};
pub use error::{Error, Result};
pub use filter::{ArrayFilter, NameFilter};
pub use incremental::{IncrementalWriter, NameTracker, WrittenNames};
pub use mmap_backend::{read_files_parallel, BufferProvider, HeapProvider, MatBuffer, MatFile};
#[cfg(feature = "mmap")]
pub use mmap_backend::MmapProvider;
pub use summary::{summarize, ArrayInfo};
