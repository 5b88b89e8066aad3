//! Error Types for the Quill API
//!
//! This module defines error handling for the API layer, including:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.
//! Schema-validation failures additionally carry the validator's positioned
//! violations so clients can surface line and column.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use quill_core::{IdFormatError, ValidationError};
use quill_store::StoreError;
use quill_xml::{ValidationIssue, XmlError};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code and represents
/// a category of error that can occur during API operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Authentication Errors (401)
    // ========================================================================
    /// Request lacks valid authentication credentials
    Unauthorized,

    /// Authentication token is invalid or malformed
    InvalidToken,

    /// Authentication token has expired
    TokenExpired,

    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Canonical field validation failed
    ValidationFailed,

    /// The synthesized or submitted XML violated its schema
    SchemaValidationFailed,

    /// Request contains invalid input data
    InvalidInput,

    /// Required field is missing from request
    MissingField,

    /// Field format is incorrect (malformed identifiers land here)
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested note does not exist (or belongs to someone else)
    NoteNotFound,

    /// Requested notebook does not exist (or belongs to someone else)
    NotebookNotFound,

    /// Requested user does not exist
    UserNotFound,

    // ========================================================================
    // Conflict Errors (409)
    // ========================================================================
    /// An account with this email already exists
    EmailTaken,

    // ========================================================================
    // Server Errors (500)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// Storage operation failed
    StorageError,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::Unauthorized | ErrorCode::InvalidToken | ErrorCode::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }

            ErrorCode::ValidationFailed
            | ErrorCode::SchemaValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField
            | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            ErrorCode::NoteNotFound | ErrorCode::NotebookNotFound | ErrorCode::UserNotFound => {
                StatusCode::NOT_FOUND
            }

            ErrorCode::EmailTaken => StatusCode::CONFLICT,

            ErrorCode::InternalError | ErrorCode::StorageError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
///
/// Returned by all endpoints when an error occurs. `errors` is present
/// only for schema-validation failures and carries the validator's
/// violations verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Positioned schema violations, when applicable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationIssue>>,
}

impl ApiError {
    /// Create a new API error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            errors: None,
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors
    // ========================================================================

    /// Create an Unauthorized error.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Create an InvalidToken error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidToken, message)
    }

    /// Create a TokenExpired error.
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired, "Authentication token has expired")
    }

    /// Create a ValidationFailed error.
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    /// Create a SchemaValidationFailed error carrying the violations.
    pub fn schema_validation(
        message: impl Into<String>,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        Self {
            code: ErrorCode::SchemaValidationFailed,
            message: message.into(),
            errors: Some(issues),
        }
    }

    /// Create an InvalidInput error.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Create a MissingField error.
    pub fn missing_field(field: &str) -> Self {
        Self::new(
            ErrorCode::MissingField,
            format!("Required field '{}' is missing", field),
        )
    }

    /// Create an InvalidFormat error.
    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
    }

    /// Create a NoteNotFound error.
    pub fn note_not_found() -> Self {
        Self::new(ErrorCode::NoteNotFound, "Note not found")
    }

    /// Create a NotebookNotFound error.
    pub fn notebook_not_found() -> Self {
        Self::new(ErrorCode::NotebookNotFound, "Notebook not found")
    }

    /// Create a UserNotFound error.
    pub fn user_not_found() -> Self {
        Self::new(ErrorCode::UserNotFound, "User not found")
    }

    /// Create an EmailTaken error.
    pub fn email_taken(email: &str) -> Self {
        Self::new(
            ErrorCode::EmailTaken,
            format!("An account with email '{}' already exists", email),
        )
    }

    /// Create an InternalError.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS
// ============================================================================

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity: "note" } => ApiError::note_not_found(),
            StoreError::NotFound { entity: "notebook" } => ApiError::notebook_not_found(),
            StoreError::NotFound { entity: "user" } => ApiError::user_not_found(),
            StoreError::NotFound { entity } => {
                ApiError::new(ErrorCode::NoteNotFound, format!("{} not found", entity))
            }
            StoreError::DuplicateEmail { email } => ApiError::email_taken(&email),
            StoreError::LockPoisoned | StoreError::Backend(_) => {
                tracing::error!("Storage error: {:?}", err);
                ApiError::new(ErrorCode::StorageError, "Storage operation failed")
            }
        }
    }
}

/// Malformed identifiers are a usage error, rejected before any lookup.
impl From<IdFormatError> for ApiError {
    fn from(err: IdFormatError) -> Self {
        ApiError::new(ErrorCode::InvalidFormat, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation_failed(err.to_string())
    }
}

impl From<XmlError> for ApiError {
    fn from(err: XmlError) -> Self {
        match &err {
            XmlError::UnknownSchema { .. } | XmlError::Malformed { .. } => {
                ApiError::invalid_input(err.to_string())
            }
            _ => {
                tracing::error!("Schema registry error: {:?}", err);
                ApiError::internal_error("Schema registry unavailable")
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization error: {:?}", err);
        ApiError::invalid_input(format!("Invalid JSON: {}", err))
    }
}

// ============================================================================
// RESULT TYPE ALIAS
// ============================================================================

/// Result type alias for API operations.
pub type ApiResult<T> = Result<T, ApiError>;
