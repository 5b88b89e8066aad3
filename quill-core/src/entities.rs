//! Core entity structures

use crate::identity::{NoteId, NotebookId, Timestamp, UserId};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Maximum length of a note title.
pub const NOTE_TITLE_MAX_LEN: usize = 200;

/// Maximum length of a notebook title.
pub const NOTEBOOK_TITLE_MAX_LEN: usize = 100;

/// Maximum length of a notebook description.
pub const NOTEBOOK_DESCRIPTION_MAX_LEN: usize = 500;

/// Default accent color assigned to new notebooks.
pub const DEFAULT_NOTEBOOK_COLOR: &str = "#6366f1";

/// Default icon assigned to new notebooks.
pub const DEFAULT_NOTEBOOK_ICON: &str = "\u{1F4D3}";

/// A registered account.
///
/// `password_hash` is an argon2id PHC string; the plaintext never leaves
/// the auth layer. Email uniqueness is enforced by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn new(name: impl Into<String>, email: impl Into<String>, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            user_id: crate::identity::EntityIdType::generate(),
            name: name.into(),
            email: email.into(),
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Notebook - a named container for notes, owned by exactly one user.
///
/// Deleting a notebook cascades to its notes; the store performs both
/// removals atomically so no note is ever observable with a dangling
/// notebook reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notebook {
    pub notebook_id: NotebookId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub color: String,
    pub icon: String,
    pub owner: UserId,
    pub is_archived: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Notebook {
    pub fn new(
        owner: UserId,
        title: impl Into<String>,
        description: Option<String>,
        color: Option<String>,
        icon: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            notebook_id: crate::identity::EntityIdType::generate(),
            title: title.into(),
            description: description.unwrap_or_default(),
            color: color.unwrap_or_else(|| DEFAULT_NOTEBOOK_COLOR.to_string()),
            icon: icon.unwrap_or_else(|| DEFAULT_NOTEBOOK_ICON.to_string()),
            owner,
            is_archived: false,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Display subset of a notebook, embedded in note responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotebookSummary {
    pub title: String,
    pub color: String,
    pub icon: String,
}

impl From<&Notebook> for NotebookSummary {
    fn from(nb: &Notebook) -> Self {
        Self {
            title: nb.title.clone(),
            color: nb.color.clone(),
            icon: nb.icon.clone(),
        }
    }
}

/// Note - the dual-representation record.
///
/// Canonical fields (`title`, `content`, `tags`, flags) are what users
/// edit; `content_xml` is the shadow document regenerated from them on
/// every content-affecting write. Both live on one record so a single
/// store operation writes - or fails to write - them together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub note_id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub content_xml: String,
    pub notebook: NotebookId,
    pub owner: UserId,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub is_favorite: bool,
    pub is_archived: bool,
    #[serde(default)]
    pub cover_image: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Note {
    /// Construct a new note. The caller supplies the already-validated
    /// shadow document; this constructor never synthesizes one.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner: UserId,
        notebook: NotebookId,
        title: impl Into<String>,
        content: impl Into<String>,
        content_xml: String,
        tags: Vec<String>,
        cover_image: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            note_id: crate::identity::EntityIdType::generate(),
            title: title.into(),
            content: content.into(),
            content_xml,
            notebook,
            owner,
            tags,
            is_pinned: false,
            is_favorite: false,
            is_archived: false,
            cover_image: cover_image.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::EntityIdType;

    #[test]
    fn test_notebook_defaults() {
        let owner = UserId::generate();
        let nb = Notebook::new(owner, "Work", None, None, None);
        assert_eq!(nb.color, DEFAULT_NOTEBOOK_COLOR);
        assert_eq!(nb.icon, DEFAULT_NOTEBOOK_ICON);
        assert_eq!(nb.description, "");
        assert!(!nb.is_archived);
        assert_eq!(nb.owner, owner);
    }

    #[test]
    fn test_note_initial_flags_are_false() {
        let owner = UserId::generate();
        let nb = NotebookId::generate();
        let note = Note::new(
            owner,
            nb,
            "Test",
            "<p>hi</p>",
            "<note/>".to_string(),
            vec![],
            None,
        );
        assert!(!note.is_pinned);
        assert!(!note.is_favorite);
        assert!(!note.is_archived);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_notebook_summary_projection() {
        let nb = Notebook::new(
            UserId::generate(),
            "Ideas",
            None,
            Some("#ff0000".to_string()),
            Some("I".to_string()),
        );
        let summary = NotebookSummary::from(&nb);
        assert_eq!(summary.title, "Ideas");
        assert_eq!(summary.color, "#ff0000");
        assert_eq!(summary.icon, "I");
    }

    #[test]
    fn test_note_serde_round_trip() -> Result<(), serde_json::Error> {
        let note = Note::new(
            UserId::generate(),
            NotebookId::generate(),
            "Test",
            "<p>hi</p>",
            "<note><title>Test</title></note>".to_string(),
            vec!["a".to_string(), "b".to_string()],
            None,
        );
        let json = serde_json::to_string(&note)?;
        let back: Note = serde_json::from_str(&json)?;
        assert_eq!(back, note);
        Ok(())
    }
}
