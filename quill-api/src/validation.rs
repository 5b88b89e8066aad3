//! Validation Traits
//!
//! Common validation patterns extracted from route handlers. Canonical
//! field validation runs before any shadow synthesis; a request that fails
//! here never reaches the schema validator or the store.

use crate::error::{ApiError, ApiResult};

/// Trait for validating non-empty strings.
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty after trimming.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Trait for validating string length limits (counted in characters).
pub trait ValidateMaxLen {
    fn validate_max_len(&self, field_name: &str, max: usize) -> ApiResult<()>;
}

impl ValidateMaxLen for str {
    fn validate_max_len(&self, field_name: &str, max: usize) -> ApiResult<()> {
        let len = self.chars().count();
        if len > max {
            return Err(ApiError::validation_failed(format!(
                "Field '{}' exceeds maximum length of {} (got {})",
                field_name, max, len
            )));
        }
        Ok(())
    }
}

impl ValidateMaxLen for String {
    fn validate_max_len(&self, field_name: &str, max: usize) -> ApiResult<()> {
        self.as_str().validate_max_len(field_name, max)
    }
}

/// Trait for checking if an update request has any fields set.
pub trait HasUpdates {
    /// Check if any update fields are set.
    fn has_any_updates(&self) -> bool;

    /// Validate that at least one update field is set.
    fn validate_has_updates(&self) -> ApiResult<()> {
        if !self.has_any_updates() {
            return Err(ApiError::invalid_input(
                "At least one field must be provided for update",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_validate_non_empty() {
        assert!("hello".validate_non_empty("title").is_ok());
        assert!("   ".validate_non_empty("title").is_err());
        assert!("".validate_non_empty("title").is_err());

        let missing: Option<String> = None;
        let err = missing.validate_non_empty("title").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
    }

    #[test]
    fn test_validate_max_len_counts_chars() {
        let ascii = "x".repeat(10);
        assert!(ascii.validate_max_len("title", 10).is_ok());
        assert!(ascii.validate_max_len("title", 9).is_err());

        // Multibyte characters count once each.
        let emoji = "\u{1F4D3}".repeat(5);
        assert!(emoji.validate_max_len("icon", 5).is_ok());
    }

    #[test]
    fn test_has_updates_default() {
        struct Empty;
        impl HasUpdates for Empty {
            fn has_any_updates(&self) -> bool {
                false
            }
        }
        let err = Empty.validate_has_updates().unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }
}
