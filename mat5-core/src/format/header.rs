//! The 128-byte level 5 container header
//!
//! Layout:
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0      | 116  | descriptive text |
//! | 116    | 8    | subsystem data offset |
//! | 124    | 2    | version |
//! | 126    | 2    | endianness indicator |

use super::constants::{DESCRIPTION_SIZE, HEADER_SIZE, SIGNATURE, SUBSYS_OFFSET_SIZE, VERSION};
use super::order::ByteOrder;
use crate::{MatError, Result};

/// Container header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatHeader {
    /// Descriptive text, space padded
    pub description: [u8; DESCRIPTION_SIZE],
    /// Subsystem data offset (ignored)
    pub subsys_offset: [u8; SUBSYS_OFFSET_SIZE],
    /// Format version
    pub version: u16,
    /// Byte order of everything after the header
    pub byte_order: ByteOrder,
}

impl MatHeader {
    /// Size of the header in bytes
    pub const SIZE: usize = HEADER_SIZE;

    /// Header with the given description, truncated or space padded to 116 bytes
    ///
    /// A description that does not start with the level 5 signature gets
    /// `MATLAB 5.0 MAT-file, ` put in front of it.
    pub fn new(description: &str, byte_order: ByteOrder) -> Self {
        let mut text = [b' '; DESCRIPTION_SIZE];
        let src = description.as_bytes();
        let mut start = 0;
        if !Self::has_signature(src) {
            let prefix: &[u8] = if src.is_empty() { b"" } else { b", " };
            for part in [SIGNATURE, prefix] {
                text[start..start + part.len()].copy_from_slice(part);
                start += part.len();
            }
        }
        let len = src.len().min(DESCRIPTION_SIZE - start);
        text[start..start + len].copy_from_slice(&src[..len]);
        Self {
            description: text,
            subsys_offset: [0; SUBSYS_OFFSET_SIZE],
            version: VERSION,
            byte_order,
        }
    }

    /// Whether the description carries the level 5 signature
    pub fn has_signature(bytes: &[u8]) -> bool {
        bytes.len() >= SIGNATURE.len() && &bytes[..SIGNATURE.len()] == SIGNATURE
    }

    /// Parse and validate a header
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < Self::SIZE {
            return Err(MatError::InsufficientBuffer);
        }
        if !Self::has_signature(&bytes[..DESCRIPTION_SIZE]) {
            return Err(MatError::InvalidHeader);
        }

        let indicator = [bytes[126], bytes[127]];
        let byte_order =
            ByteOrder::from_indicator(indicator).ok_or(MatError::InvalidByteOrder(indicator))?;

        let mut description = [0u8; DESCRIPTION_SIZE];
        description.copy_from_slice(&bytes[..DESCRIPTION_SIZE]);
        let mut subsys_offset = [0u8; SUBSYS_OFFSET_SIZE];
        subsys_offset.copy_from_slice(&bytes[DESCRIPTION_SIZE..DESCRIPTION_SIZE + SUBSYS_OFFSET_SIZE]);

        Ok(Self {
            description,
            subsys_offset,
            version: byte_order.read_u16(&bytes[124..126]),
            byte_order,
        })
    }

    /// Encode into the fixed 128-byte block
    pub fn to_bytes_array(&self) -> [u8; HEADER_SIZE] {
        let mut bytes = [0u8; HEADER_SIZE];
        bytes[..DESCRIPTION_SIZE].copy_from_slice(&self.description);
        // subsystem offset is always written as zero
        self.byte_order.write_u16(&mut bytes[124..126], self.version);
        bytes[126..128].copy_from_slice(&self.byte_order.indicator());
        bytes
    }

    /// Description text with trailing padding removed
    pub fn description_str(&self) -> &str {
        let end = self
            .description
            .iter()
            .rposition(|&b| b != b' ' && b != 0)
            .map_or(0, |p| p + 1);
        let text = &self.description[..end];
        match core::str::from_utf8(text) {
            Ok(s) => s,
            Err(e) => {
                // keep the valid prefix of a mangled description
                core::str::from_utf8(&text[..e.valid_up_to()]).unwrap_or_default()
            }
        }
    }
}
