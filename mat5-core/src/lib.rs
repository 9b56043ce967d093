#![no_std]

//! MAT5 Core - MAT-file Level 5 Format Definitions
//!
//! This crate provides the format definitions, typed-storage trait and
//! validation helpers for MAT-files. It performs no I/O and needs no
//! allocator unless the `alloc` feature is enabled.

#[cfg(feature = "alloc")]
extern crate alloc;

pub mod error;
pub mod format;
pub mod traits;
pub mod validation;

pub use error::*;
pub use format::*;
pub use traits::*;
pub use validation::{
    calculate_padding, element_count, is_valid_variable_name, validate_variable_name,
};
