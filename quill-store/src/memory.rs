//! In-memory storage backend
//!
//! All state lives behind a single `RwLock`, which is what makes the
//! cascade delete atomic: the write guard is held across the note removals
//! and the notebook removal, so no reader can observe the intermediate
//! state.

use crate::error::{StoreError, StoreResult};
use crate::traits::{NoteFilter, Store};
use ::async_trait::async_trait;
use quill_core::{Note, Notebook, NoteId, NotebookId, User, UserId};
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct State {
    users: HashMap<UserId, User>,
    notebooks: HashMap<NotebookId, Notebook>,
    notes: HashMap<NoteId, Note>,
}

/// In-memory [`Store`] implementation, the dev and test backend.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| StoreError::LockPoisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| StoreError::LockPoisoned)
    }
}

fn matches_filter(note: &Note, filter: &NoteFilter) -> bool {
    if let Some(notebook) = filter.notebook {
        if note.notebook != notebook {
            return false;
        }
    }
    if filter.favorite_only && !note.is_favorite {
        return false;
    }
    if !filter.include_archived && note.is_archived {
        return false;
    }
    if let Some(search) = &filter.search {
        let needle = search.to_lowercase();
        if !note.title.to_lowercase().contains(&needle)
            && !note.content.to_lowercase().contains(&needle)
        {
            return false;
        }
    }
    true
}

#[async_trait]
impl Store for InMemoryStore {
    async fn user_insert(&self, user: &User) -> StoreResult<()> {
        let mut state = self.write()?;
        let taken = state
            .users
            .values()
            .any(|existing| existing.email.eq_ignore_ascii_case(&user.email));
        if taken {
            return Err(StoreError::DuplicateEmail {
                email: user.email.clone(),
            });
        }
        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn user_get(&self, id: UserId) -> StoreResult<Option<User>> {
        Ok(self.read()?.users.get(&id).cloned())
    }

    async fn user_get_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .read()?
            .users
            .values()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn notebook_insert(&self, notebook: &Notebook) -> StoreResult<()> {
        self.write()?
            .notebooks
            .insert(notebook.notebook_id, notebook.clone());
        Ok(())
    }

    async fn notebook_get(&self, id: NotebookId, owner: UserId) -> StoreResult<Option<Notebook>> {
        Ok(self
            .read()?
            .notebooks
            .get(&id)
            .filter(|nb| nb.owner == owner)
            .cloned())
    }

    async fn notebook_list_by_owner(&self, owner: UserId) -> StoreResult<Vec<Notebook>> {
        let state = self.read()?;
        let mut notebooks: Vec<Notebook> = state
            .notebooks
            .values()
            .filter(|nb| nb.owner == owner)
            .cloned()
            .collect();
        notebooks.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(notebooks)
    }

    async fn notebook_update(&self, notebook: &Notebook) -> StoreResult<()> {
        let mut state = self.write()?;
        match state.notebooks.get(&notebook.notebook_id) {
            Some(existing) if existing.owner == notebook.owner => {
                state
                    .notebooks
                    .insert(notebook.notebook_id, notebook.clone());
                Ok(())
            }
            _ => Err(StoreError::not_found("notebook")),
        }
    }

    async fn notebook_delete_cascade(&self, id: NotebookId, owner: UserId) -> StoreResult<u64> {
        // One write guard across both removals.
        let mut state = self.write()?;
        match state.notebooks.get(&id) {
            Some(nb) if nb.owner == owner => {}
            _ => return Err(StoreError::not_found("notebook")),
        }
        let before = state.notes.len();
        state.notes.retain(|_, note| note.notebook != id);
        let removed = (before - state.notes.len()) as u64;
        state.notebooks.remove(&id);
        Ok(removed)
    }

    async fn note_count_by_notebook(&self, id: NotebookId) -> StoreResult<u64> {
        Ok(self
            .read()?
            .notes
            .values()
            .filter(|note| note.notebook == id && !note.is_archived)
            .count() as u64)
    }

    async fn note_insert(&self, note: &Note) -> StoreResult<()> {
        self.write()?.notes.insert(note.note_id, note.clone());
        Ok(())
    }

    async fn note_get(&self, id: NoteId, owner: UserId) -> StoreResult<Option<Note>> {
        Ok(self
            .read()?
            .notes
            .get(&id)
            .filter(|note| note.owner == owner)
            .cloned())
    }

    async fn note_list(&self, owner: UserId, filter: &NoteFilter) -> StoreResult<Vec<Note>> {
        let state = self.read()?;
        let mut notes: Vec<Note> = state
            .notes
            .values()
            .filter(|note| note.owner == owner && matches_filter(note, filter))
            .cloned()
            .collect();
        notes.sort_by(|a, b| {
            b.is_pinned
                .cmp(&a.is_pinned)
                .then(b.updated_at.cmp(&a.updated_at))
        });
        Ok(notes)
    }

    async fn note_update(&self, note: &Note) -> StoreResult<()> {
        let mut state = self.write()?;
        match state.notes.get(&note.note_id) {
            Some(existing) if existing.owner == note.owner => {
                state.notes.insert(note.note_id, note.clone());
                Ok(())
            }
            _ => Err(StoreError::not_found("note")),
        }
    }

    async fn note_delete(&self, id: NoteId, owner: UserId) -> StoreResult<()> {
        let mut state = self.write()?;
        match state.notes.get(&id) {
            Some(existing) if existing.owner == owner => {
                state.notes.remove(&id);
                Ok(())
            }
            _ => Err(StoreError::not_found("note")),
        }
    }
}
