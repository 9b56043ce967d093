//! Variable name rules
//!
//! A top-level variable name starts with an ASCII letter and continues with
//! letters, digits or underscores, up to 63 characters.

use crate::format::constants::MAX_NAME_LENGTH;
use crate::MatError;

/// Validate a variable name
pub fn validate_variable_name(name: &str) -> Result<(), MatError> {
    let bytes = name.as_bytes();
    match bytes.first() {
        Some(b) if b.is_ascii_alphabetic() => {}
        _ => return Err(MatError::InvalidName),
    }
    if bytes.len() > MAX_NAME_LENGTH {
        return Err(MatError::InvalidName);
    }
    if !bytes[1..]
        .iter()
        .all(|b| b.is_ascii_alphanumeric() || *b == b'_')
    {
        return Err(MatError::InvalidName);
    }
    Ok(())
}

/// Whether a name is a valid variable name
pub fn is_valid_variable_name(name: &str) -> bool {
    validate_variable_name(name).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["m1", "x", "A_b_3", "snake_case_"] {
            assert_eq!(validate_variable_name(name), Ok(()));
        }
    }

    #[test]
    fn test_invalid_names() {
        for name in ["", "1bad", "_x", "a-b", "a b", "@", "é"] {
            assert_eq!(validate_variable_name(name), Err(MatError::InvalidName));
        }
        let long = [b'a'; 64];
        let long = core::str::from_utf8(&long).unwrap();
        assert!(!is_valid_variable_name(long));
        assert!(is_valid_variable_name(&long[..63]));
    }
}
