//! Quill Core - Entity Types
//!
//! Pure data structures with no behavior. All other crates depend on this.
//! This crate contains ONLY data types - no business logic.

pub mod entities;
pub mod error;
pub mod identity;

pub use entities::{
    Note, Notebook, NotebookSummary, User, DEFAULT_NOTEBOOK_COLOR, DEFAULT_NOTEBOOK_ICON,
    NOTEBOOK_DESCRIPTION_MAX_LEN, NOTEBOOK_TITLE_MAX_LEN, NOTE_TITLE_MAX_LEN,
};
pub use error::{IdFormatError, ValidationError};
pub use identity::{EntityIdType, NoteId, NotebookId, ObjectId, Timestamp, UserId};
