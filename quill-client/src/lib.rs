//! Quill client state
//!
//! Everything the UI layer needs between the keyboard and the server:
//! an HTTP transport behind the [`NotesApi`] trait, a note cache with
//! optimistic favorite/pin toggles, and a debounced auto-saver.

pub mod api;
pub mod autosave;
pub mod store;

pub use api::{ClientError, HttpNotesApi, NotesApi, NoteView, SessionExpiredHook};
pub use autosave::{Autosave, DEBOUNCE};
pub use store::{NoteStore, ToggleKind, ToggleOutcome, ToggleState};
