//! Debounced auto-save
//!
//! Every edit bumps a revision and re-arms a 2 second timer; the save
//! only fires for the revision it was armed with, so a burst of typing
//! produces a single request carrying the final text. Responses for
//! superseded revisions never mark newer edits as saved.

use crate::api::{ClientError, NotesApi};
use quill_core::NoteId;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Delay between the last edit and the save request.
pub const DEBOUNCE: Duration = Duration::from_secs(2);

#[derive(Default)]
struct AutosaveState {
    pending: Option<String>,
    revision: u64,
    saved_revision: u64,
    last_error: Option<ClientError>,
}

struct Inner<A> {
    api: Arc<A>,
    note_id: NoteId,
    debounce: Duration,
    state: Mutex<AutosaveState>,
}

/// Auto-saver for one open note.
pub struct Autosave<A: NotesApi + 'static> {
    inner: Arc<Inner<A>>,
}

impl<A: NotesApi + 'static> Clone for Autosave<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: NotesApi + 'static> Autosave<A> {
    pub fn new(api: Arc<A>, note_id: NoteId) -> Self {
        Self::with_debounce(api, note_id, DEBOUNCE)
    }

    pub fn with_debounce(api: Arc<A>, note_id: NoteId, debounce: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                api,
                note_id,
                debounce,
                state: Mutex::new(AutosaveState::default()),
            }),
        }
    }

    /// Record an edit and re-arm the debounce timer.
    ///
    /// Must be called from within a tokio runtime.
    pub fn note_changed(&self, content: String) {
        let revision = {
            let mut state = lock(&self.inner.state);
            state.revision += 1;
            state.pending = Some(content);
            state.revision
        };

        let inner = self.inner.clone();
        tokio::spawn(async move {
            tokio::time::sleep(inner.debounce).await;
            // Only the timer armed by the latest edit fires a save.
            if lock(&inner.state).revision != revision {
                return;
            }
            if let Err(err) = save_revision(&inner, revision).await {
                tracing::warn!(note_id = %inner.note_id, error = %err, "Auto-save failed");
            }
        });
    }

    /// Save any pending edit immediately, skipping the debounce.
    ///
    /// Returns `Ok(true)` when a save was performed, `Ok(false)` when
    /// there was nothing to save.
    pub async fn flush_now(&self) -> Result<bool, ClientError> {
        let revision = lock(&self.inner.state).revision;
        save_revision(&self.inner, revision).await.map(|saved| {
            saved.is_some()
        })
    }

    /// Whether there is an edit the server has not confirmed.
    pub fn is_dirty(&self) -> bool {
        let state = lock(&self.inner.state);
        state.revision > state.saved_revision
    }

    pub fn last_error(&self) -> Option<ClientError> {
        lock(&self.inner.state).last_error.clone()
    }
}

/// Save the content as of `revision`. Returns the revision saved, or
/// `None` when the revision was superseded or had nothing pending.
async fn save_revision<A: NotesApi>(
    inner: &Inner<A>,
    revision: u64,
) -> Result<Option<u64>, ClientError> {
    let content = {
        let state = lock(&inner.state);
        if state.revision != revision || state.saved_revision >= revision {
            return Ok(None);
        }
        match &state.pending {
            Some(content) => content.clone(),
            None => return Ok(None),
        }
    };

    match inner.api.save_content(inner.note_id, &content).await {
        Ok(_) => {
            let mut state = lock(&inner.state);
            if state.saved_revision < revision {
                state.saved_revision = revision;
            }
            // A newer edit may have arrived while the request was in
            // flight; its content stays pending for the next timer.
            if state.revision == revision {
                state.pending = None;
            }
            state.last_error = None;
            Ok(Some(revision))
        }
        Err(err) => {
            lock(&inner.state).last_error = Some(err.clone());
            Err(err)
        }
    }
}

fn lock(state: &Mutex<AutosaveState>) -> MutexGuard<'_, AutosaveState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
