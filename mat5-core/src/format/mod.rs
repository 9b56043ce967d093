//! Binary format definitions for the MAT-file level 5 layout
//!
//! This module contains pure data structure definitions for the wire format.
//! No I/O operations - only layout, codes and arithmetic.

pub mod class;
pub mod constants;
pub mod header;
pub mod legacy;
pub mod order;
pub mod tag;

pub use class::{ArrayClass, ArrayFlags};
pub use header::MatHeader;
pub use legacy::{is_legacy, LegacyKind, LegacyType};
pub use order::ByteOrder;
pub use tag::{padding_for, DataType, Tag};
