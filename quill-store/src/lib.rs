//! Quill Store - Persistence Boundary
//!
//! The [`Store`] trait is the seam between the API layer and storage. The
//! in-memory backend here provides per-document atomicity and an atomic
//! notebook cascade delete; database-backed implementations plug in behind
//! the same trait.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use traits::{NoteFilter, Store};
