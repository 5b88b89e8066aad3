//! Custom path extractors for type-safe entity IDs.
//!
//! Provides `PathId<T>` extractor that works with EntityIdType newtypes.
//! A malformed identifier is rejected here with a 400 invalid-format
//! error, before any handler or store lookup runs.

use crate::error::{ApiError, ErrorCode};
use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use quill_core::EntityIdType;

/// Extractor for type-safe entity IDs from path parameters.
///
/// Unlike `Path<String>`, `PathId<T>` provides:
/// - Type-safe extraction into specific ID types (NoteId, NotebookId, ...)
/// - 24-hex format validation before any store call
/// - Error messages naming the entity type
///
/// # Example
///
/// ```rust,ignore
/// use quill_core::NoteId;
///
/// async fn get_note(PathId(note_id): PathId<NoteId>) -> ApiResult<impl IntoResponse> {
///     // note_id is NoteId, already format-validated
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PathId<T: EntityIdType>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for PathId<T>
where
    S: Send + Sync,
    T: EntityIdType,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw): Path<String> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|e| ApiError::new(
                    ErrorCode::InvalidFormat,
                    format!("Failed to extract {} id from path: {}", T::ENTITY_NAME, e),
                ))?;

        let id = T::parse(&raw).map_err(|_| {
            ApiError::new(
                ErrorCode::InvalidFormat,
                format!("Invalid {} ID format", T::ENTITY_NAME),
            )
        })?;
        Ok(PathId(id))
    }
}
