//! zlib compression of top-level elements

use crate::error::{Error, Result};
use miniz_oxide::inflate::TINFLStatus;

/// Compression level used for written elements
pub const DEFAULT_LEVEL: u8 = 6;

/// Decompress one `miCOMPRESSED` payload
///
/// `limit` caps the inflated size; exceeding it is a capacity error.
pub fn inflate(payload: &[u8], limit: usize) -> Result<Vec<u8>> {
    miniz_oxide::inflate::decompress_to_vec_zlib_with_limit(payload, limit).map_err(|e| {
        match e.status {
            TINFLStatus::HasMoreOutput => Error::capacity(format!(
                "compressed element inflates beyond {limit} bytes"
            )),
            status => Error::format(format!("corrupt compressed element: {status:?}")),
        }
    })
}

/// Compress a serialized element
pub fn deflate(raw: &[u8], level: u8) -> Vec<u8> {
    miniz_oxide::deflate::compress_to_vec_zlib(raw, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let raw: Vec<u8> = (0..4096u32).map(|i| (i % 17) as u8).collect();
        let packed = deflate(&raw, DEFAULT_LEVEL);
        assert!(packed.len() < raw.len());
        assert_eq!(inflate(&packed, usize::MAX).unwrap(), raw);
    }

    #[test]
    fn test_corrupt_stream_is_a_format_error() {
        let err = inflate(&[0x78, 0x9c, 0xff, 0xff, 0xff], usize::MAX).unwrap_err();
        assert!(err.is_format());
    }

    #[test]
    fn test_limit_is_a_capacity_error() {
        let packed = deflate(&[0u8; 1024], DEFAULT_LEVEL);
        let err = inflate(&packed, 100).unwrap_err();
        assert_eq!(err.category(), mat5_core::ErrorCategory::Capacity);
    }
}
