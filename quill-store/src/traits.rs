//! Async storage trait for the Quill entities
//!
//! The API layer holds this trait behind an `Arc<dyn Store>`; the
//! in-memory backend is the dev/test implementation and a database-backed
//! one is a drop-in replacement.

use crate::error::StoreResult;
use ::async_trait::async_trait;
use quill_core::{Note, Notebook, NoteId, NotebookId, User, UserId};

/// Filters for listing a user's notes.
///
/// Archived notes are excluded unless explicitly requested. `search` is a
/// case-insensitive substring match over title and content.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteFilter {
    pub notebook: Option<NotebookId>,
    pub favorite_only: bool,
    pub include_archived: bool,
    pub search: Option<String>,
}

/// Async storage trait for all Quill CRUD operations.
///
/// Every notebook/note read and write is scoped by the acting owner;
/// a record owned by someone else behaves exactly like a missing one.
#[async_trait]
pub trait Store: Send + Sync {
    // ========================================================================
    // USER OPERATIONS
    // ========================================================================

    /// Insert a new user. Fails with `DuplicateEmail` if the email is taken.
    async fn user_insert(&self, user: &User) -> StoreResult<()>;

    /// Get a user by ID.
    async fn user_get(&self, id: UserId) -> StoreResult<Option<User>>;

    /// Get a user by email (case-insensitive).
    async fn user_get_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    // ========================================================================
    // NOTEBOOK OPERATIONS
    // ========================================================================

    /// Insert a new notebook.
    async fn notebook_insert(&self, notebook: &Notebook) -> StoreResult<()>;

    /// Get a notebook by ID, scoped by owner.
    async fn notebook_get(&self, id: NotebookId, owner: UserId) -> StoreResult<Option<Notebook>>;

    /// List a user's notebooks, newest-updated first.
    async fn notebook_list_by_owner(&self, owner: UserId) -> StoreResult<Vec<Notebook>>;

    /// Replace a notebook document.
    async fn notebook_update(&self, notebook: &Notebook) -> StoreResult<()>;

    /// Delete a notebook and all of its notes in one atomic operation.
    /// Returns the number of notes removed.
    async fn notebook_delete_cascade(&self, id: NotebookId, owner: UserId) -> StoreResult<u64>;

    /// Count the non-archived notes in a notebook.
    async fn note_count_by_notebook(&self, id: NotebookId) -> StoreResult<u64>;

    // ========================================================================
    // NOTE OPERATIONS
    // ========================================================================

    /// Insert a new note.
    async fn note_insert(&self, note: &Note) -> StoreResult<()>;

    /// Get a note by ID, scoped by owner.
    async fn note_get(&self, id: NoteId, owner: UserId) -> StoreResult<Option<Note>>;

    /// List a user's notes matching the filter, pinned first, then by
    /// `updated_at` descending.
    async fn note_list(&self, owner: UserId, filter: &NoteFilter) -> StoreResult<Vec<Note>>;

    /// Replace a note document. This is the single write that carries the
    /// canonical fields and the XML shadow together.
    async fn note_update(&self, note: &Note) -> StoreResult<()>;

    /// Delete a note, scoped by owner.
    async fn note_delete(&self, id: NoteId, owner: UserId) -> StoreResult<()>;
}
