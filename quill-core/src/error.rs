//! Error types for Quill core operations

use thiserror::Error;

/// Identifier parse errors.
///
/// Record identifiers are 24-character lowercase hexadecimal strings.
/// A malformed identifier must be rejected before any lookup is attempted,
/// so this error is kept distinct from "not found".
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdFormatError {
    #[error("invalid identifier '{input}': expected 24 hexadecimal characters, got {len}")]
    WrongLength { input: String, len: usize },

    #[error("invalid identifier '{input}': contains non-hexadecimal characters")]
    NotHex { input: String },
}

/// Canonical field validation errors.
///
/// These fire before any shadow synthesis or persistence attempt.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required field missing: {field}")]
    RequiredFieldMissing { field: String },

    #[error("Field '{field}' exceeds maximum length of {max} (got {actual})")]
    LengthExceeded {
        field: String,
        max: usize,
        actual: usize,
    },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_format_error_display() {
        let err = IdFormatError::WrongLength {
            input: "abc".to_string(),
            len: 3,
        };
        let display = err.to_string();
        assert!(display.contains("abc"));
        assert!(display.contains("24"));
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::LengthExceeded {
            field: "title".to_string(),
            max: 200,
            actual: 250,
        };
        let display = err.to_string();
        assert!(display.contains("title"));
        assert!(display.contains("200"));
    }
}
