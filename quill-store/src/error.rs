//! Storage error types

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors from the persistence boundary.
///
/// Ownership scoping happens inside the store: a record that exists but
/// belongs to another user surfaces exactly like one that does not exist.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("an account with email '{email}' already exists")]
    DuplicateEmail { email: String },

    #[error("storage lock poisoned")]
    LockPoisoned,

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str) -> Self {
        Self::NotFound { entity }
    }
}
