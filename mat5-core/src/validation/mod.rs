//! Format validation utilities
//!
//! This module contains pure validation functions with no I/O dependencies.
//! All functions are arithmetic on data layout or checks on names.

pub mod bounds;
pub mod format;
pub mod names;

pub use bounds::{checked_byte_size, element_count, validate_array_bounds, validate_coordinate};
pub use format::{align_to_boundary, calculate_padding};
pub use names::{is_valid_variable_name, validate_variable_name};
