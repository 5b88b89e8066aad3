//! Domain services
//!
//! Business logic that spans the store and the XML layer, kept out of
//! the route handlers so it can be tested without HTTP plumbing.

pub mod note_service;

pub use note_service::{CreateNoteInput, NoteService, UpdateNoteInput};
