//! Abstract interfaces shared by MAT-file implementations
//!
//! Traits are pure interfaces - the only implementations here are for the
//! primitive numeric types and plain byte containers.

pub mod backend;
pub mod element;
pub mod matrix;

pub use backend::StorageBackend;
pub use element::{read_scalar, MatElement, Scalar};
pub use matrix::SparseMatrix;
