//! Client-side note cache with optimistic toggles
//!
//! Toggling favorite or pinned flips the flag locally first so the UI
//! responds instantly, then confirms with the server. The pre-toggle
//! note is snapshotted when the optimistic flip is applied; if the
//! server rejects the write, that exact snapshot is restored into every
//! local copy of the note (list cache and current note alike). When two
//! toggles race and both fail, each rollback restores its own snapshot
//! in completion order, so the last rollback wins.

use crate::api::{ClientError, NotesApi, NoteView};
use quill_core::NoteId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Lifecycle of one optimistic toggle.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleState {
    /// Optimistically applied, server not yet heard from. Carries the
    /// snapshot to restore on failure.
    Pending { prior: NoteView },
    /// Server accepted the write.
    Confirmed,
    /// Server rejected the write, the snapshot was restored.
    RolledBack,
}

/// Which flag a toggle targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleKind {
    Favorite,
    Pinned,
}

/// Outcome returned to the caller of a toggle.
#[derive(Debug)]
pub enum ToggleOutcome {
    Confirmed(NoteView),
    RolledBack(ClientError),
}

#[derive(Default)]
struct CacheState {
    notes: Vec<NoteView>,
    current: Option<NoteView>,
    toggles: HashMap<NoteId, ToggleState>,
}

/// Note cache shared by the UI.
pub struct NoteStore<A: NotesApi> {
    api: Arc<A>,
    // Never held across an await.
    state: Mutex<CacheState>,
}

impl<A: NotesApi> NoteStore<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: Mutex::new(CacheState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CacheState> {
        // A poisoned cache mutex means a panic mid-update; the cache is
        // refreshable from the server, so keep going with the data we have.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Replace the list cache from the server.
    pub async fn refresh(&self) -> Result<(), ClientError> {
        let notes = self.api.list_notes().await?;
        let mut state = self.lock();
        if let Some(current) = &mut state.current {
            if let Some(fresh) = notes.iter().find(|n| n.id == current.id) {
                *current = fresh.clone();
            }
        }
        state.notes = notes;
        Ok(())
    }

    /// Make a note the current (open) one.
    pub async fn open_note(&self, id: NoteId) -> Result<NoteView, ClientError> {
        let note = self.api.get_note(id).await?;
        let mut state = self.lock();
        state.current = Some(note.clone());
        write_note(&mut state, &note);
        Ok(note)
    }

    pub fn notes(&self) -> Vec<NoteView> {
        self.lock().notes.clone()
    }

    pub fn current_note(&self) -> Option<NoteView> {
        self.lock().current.clone()
    }

    pub fn toggle_state(&self, id: NoteId) -> Option<ToggleState> {
        self.lock().toggles.get(&id).cloned()
    }

    pub async fn toggle_favorite(&self, id: NoteId) -> ToggleOutcome {
        self.toggle(id, ToggleKind::Favorite).await
    }

    pub async fn toggle_pin(&self, id: NoteId) -> ToggleOutcome {
        self.toggle(id, ToggleKind::Pinned).await
    }

    async fn toggle(&self, id: NoteId, kind: ToggleKind) -> ToggleOutcome {
        // Phase 1: snapshot and flip locally. The list cache is the
        // primary source; a note open outside the current list (filtered
        // view, direct link) is found on `current`.
        let (prior, new_value) = {
            let mut state = self.lock();
            let cached = state
                .notes
                .iter()
                .find(|n| n.id == id)
                .or(state.current.as_ref().filter(|n| n.id == id))
                .cloned();
            let Some(note) = cached else {
                return ToggleOutcome::RolledBack(ClientError::Api {
                    code: "NOTE_NOT_FOUND".to_string(),
                    message: "Note is not in the local cache".to_string(),
                });
            };
            let mut flipped = note.clone();
            let new_value = match kind {
                ToggleKind::Favorite => {
                    flipped.is_favorite = !flipped.is_favorite;
                    flipped.is_favorite
                }
                ToggleKind::Pinned => {
                    flipped.is_pinned = !flipped.is_pinned;
                    flipped.is_pinned
                }
            };
            write_note(&mut state, &flipped);
            state
                .toggles
                .insert(id, ToggleState::Pending { prior: note.clone() });
            (note, new_value)
        };

        // Phase 2: confirm with the server.
        let result = match kind {
            ToggleKind::Favorite => self.api.set_favorite(id, new_value).await,
            ToggleKind::Pinned => self.api.set_pinned(id, new_value).await,
        };

        // Phase 3: settle.
        match result {
            Ok(server_note) => {
                let mut state = self.lock();
                write_note(&mut state, &server_note);
                state.toggles.insert(id, ToggleState::Confirmed);
                ToggleOutcome::Confirmed(server_note)
            }
            Err(err) => {
                tracing::warn!(note_id = %id, error = %err, "Toggle rejected, rolling back");
                let mut state = self.lock();
                write_note(&mut state, &prior);
                state.toggles.insert(id, ToggleState::RolledBack);
                ToggleOutcome::RolledBack(err)
            }
        }
    }
}

/// Write a note into every local copy that holds it.
fn write_note(state: &mut CacheState, note: &NoteView) {
    if let Some(slot) = state.notes.iter_mut().find(|n| n.id == note.id) {
        *slot = note.clone();
    }
    if let Some(current) = &mut state.current {
        if current.id == note.id {
            *current = note.clone();
        }
    }
}
