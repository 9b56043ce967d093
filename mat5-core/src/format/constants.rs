//! Format constants for the MAT-file level 5 layout

/// Alignment boundary for all data elements
pub const ALIGNMENT_BOUNDARY: usize = 8;

/// Size of a long-form tag (type word + size word)
pub const TAG_SIZE: usize = 8;

/// Payload bytes available to a compact (small data element) tag
pub const COMPACT_PAYLOAD_SIZE: usize = 4;

/// Size of the fixed container header
pub const HEADER_SIZE: usize = 128;

/// Bytes reserved for the descriptive text
pub const DESCRIPTION_SIZE: usize = 116;

/// Bytes reserved for the subsystem data offset
pub const SUBSYS_OFFSET_SIZE: usize = 8;

/// Prefix every level 5 description must start with
pub const SIGNATURE: &[u8] = b"MATLAB 5.0 MAT-file";

/// Header version written by this crate
pub const VERSION: u16 = 0x0100;

/// Maximum length of a variable name
pub const MAX_NAME_LENGTH: usize = 63;

/// Field-name slot width used when writing structures
pub const FIELD_NAME_SLOT: usize = 64;

/// Placeholder name for arrays created without one
pub const DEFAULT_NAME: &str = "@";

/// Array flag bits (stored in the second byte of the first flags word)
pub mod flags {
    /// Array has an imaginary part
    pub const COMPLEX: u32 = 0x0800;
    /// Array is a global variable
    pub const GLOBAL: u32 = 0x0400;
    /// Array holds logical values
    pub const LOGICAL: u32 = 0x0200;
    /// Mask selecting the class byte
    pub const CLASS_MASK: u32 = 0x00FF;
}
