//! Note write path
//!
//! Every mutation of a note flows through the same pipeline:
//!
//! 1. Authorize: the target notebook (and note, for updates) must belong
//!    to the caller.
//! 2. Validate the canonical fields (required title, length caps).
//! 3. Synthesize the XML shadow representation from the canonical fields.
//! 4. Validate the shadow against the note schema. A failing shadow
//!    aborts the write with the positioned validation issues; nothing is
//!    persisted.
//! 5. Persist the note, canonical fields and shadow together.
//!
//! The shadow is never accepted from the client on the normal write path.
//! `import_xml` is the one inverse: client XML is schema-validated first,
//! then the canonical fields are extracted from it and the document
//! itself becomes the stored shadow.
//!
//! Updates that touch no content-affecting field (flag toggles, notebook
//! moves) leave the existing shadow untouched.

use crate::error::{ApiError, ApiResult};
use crate::validation::{HasUpdates, ValidateMaxLen, ValidateNonEmpty};
use chrono::Utc;
use quill_core::{Note, NoteId, Notebook, NotebookId, UserId, NOTE_TITLE_MAX_LEN};
use quill_store::Store;
use quill_xml::{
    extract_note_fields, synthesize_note_shadow, SchemaKind, SchemaRegistry, ShadowFields,
    WriteKind,
};
use std::sync::Arc;

/// Fields accepted when creating a note.
#[derive(Debug, Clone)]
pub struct CreateNoteInput {
    pub title: String,
    pub content: String,
    pub notebook: NotebookId,
    pub tags: Vec<String>,
    pub cover_image: Option<String>,
}

/// Partial update. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateNoteInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub notebook: Option<NotebookId>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
    pub is_favorite: Option<bool>,
    pub is_archived: Option<bool>,
    pub cover_image: Option<Option<String>>,
}

impl UpdateNoteInput {
    /// Whether the patch touches a field that appears in the shadow.
    fn affects_shadow(&self) -> bool {
        self.title.is_some() || self.content.is_some() || self.tags.is_some()
    }
}

impl HasUpdates for UpdateNoteInput {
    fn has_any_updates(&self) -> bool {
        self.title.is_some()
            || self.content.is_some()
            || self.notebook.is_some()
            || self.tags.is_some()
            || self.is_pinned.is_some()
            || self.is_favorite.is_some()
            || self.is_archived.is_some()
            || self.cover_image.is_some()
    }
}

/// Orchestrates note mutations against the store and schema registry.
#[derive(Clone)]
pub struct NoteService {
    store: Arc<dyn Store>,
    schemas: Arc<SchemaRegistry>,
}

impl NoteService {
    pub fn new(store: Arc<dyn Store>, schemas: Arc<SchemaRegistry>) -> Self {
        Self { store, schemas }
    }

    /// Create a note inside one of the caller's notebooks.
    pub async fn create_note(&self, owner: UserId, input: CreateNoteInput) -> ApiResult<Note> {
        self.authorize_notebook(input.notebook, owner).await?;

        input.title.validate_non_empty("title")?;
        input.title.validate_max_len("title", NOTE_TITLE_MAX_LEN)?;

        let mut note = Note::new(
            owner,
            input.notebook,
            input.title,
            input.content,
            String::new(),
            input.tags,
            input.cover_image,
        );
        note.content_xml = self.validated_shadow(&note, WriteKind::Create)?;

        self.store.note_insert(&note).await?;
        tracing::info!(note_id = %note.note_id, notebook = %note.notebook, "Note created");
        Ok(note)
    }

    /// Apply a partial update to one of the caller's notes.
    ///
    /// The shadow is re-synthesized from the merged fields with an
    /// `updatedAt` timestamp and re-validated before anything is stored.
    pub async fn update_note(
        &self,
        owner: UserId,
        note_id: NoteId,
        input: UpdateNoteInput,
    ) -> ApiResult<Note> {
        input.validate_has_updates()?;
        let resynthesize = input.affects_shadow();

        let mut note = self
            .store
            .note_get(note_id, owner)
            .await?
            .ok_or_else(ApiError::note_not_found)?;

        if let Some(notebook) = input.notebook {
            self.authorize_notebook(notebook, owner).await?;
            note.notebook = notebook;
        }
        if let Some(title) = input.title {
            title.validate_non_empty("title")?;
            title.validate_max_len("title", NOTE_TITLE_MAX_LEN)?;
            note.title = title;
        }
        if let Some(content) = input.content {
            note.content = content;
        }
        if let Some(tags) = input.tags {
            note.tags = tags;
        }
        if let Some(is_pinned) = input.is_pinned {
            note.is_pinned = is_pinned;
        }
        if let Some(is_favorite) = input.is_favorite {
            note.is_favorite = is_favorite;
        }
        if let Some(is_archived) = input.is_archived {
            note.is_archived = is_archived;
        }
        if let Some(cover_image) = input.cover_image {
            // Explicit null clears the image; stored unset form is "".
            note.cover_image = cover_image.unwrap_or_default();
        }

        note.updated_at = Utc::now();
        if resynthesize {
            note.content_xml = self.validated_shadow(&note, WriteKind::Update)?;
        }

        self.store.note_update(&note).await?;
        tracing::debug!(note_id = %note.note_id, "Note updated");
        Ok(note)
    }

    /// Create a note from a client-supplied XML document.
    ///
    /// The document is validated against the note schema before anything
    /// else happens; an invalid document is rejected with its positioned
    /// issues. The canonical fields are then extracted from it and the
    /// document itself becomes the stored shadow.
    pub async fn import_xml(&self, owner: UserId, xml: &str, notebook: NotebookId) -> ApiResult<Note> {
        let report = self.schemas.validate(xml, SchemaKind::Note);
        if !report.valid {
            return Err(ApiError::schema_validation(
                "XML failed schema validation",
                report.errors,
            ));
        }

        self.authorize_notebook(notebook, owner).await?;

        let extracted = extract_note_fields(xml)?;
        let mut note = Note::new(
            owner,
            notebook,
            extracted.title,
            extracted.content,
            String::new(),
            extracted.tags,
            None,
        );
        note.content_xml = xml.to_string();

        self.store.note_insert(&note).await?;
        tracing::info!(note_id = %note.note_id, "Note imported from XML");
        Ok(note)
    }

    /// Synthesize the shadow for a note and validate it against the note
    /// schema. Returns the shadow document, or the schema failure that
    /// aborts the write.
    fn validated_shadow(&self, note: &Note, kind: WriteKind) -> ApiResult<String> {
        let timestamp = match kind {
            WriteKind::Create => note.created_at,
            WriteKind::Update => note.updated_at,
        };
        let shadow = synthesize_note_shadow(&ShadowFields {
            title: note.title.clone(),
            content: note.content.clone(),
            tags: note.tags.clone(),
            timestamp,
            kind,
        });

        let report = self.schemas.validate(&shadow, SchemaKind::Note);
        if !report.valid {
            tracing::warn!(
                note_id = %note.note_id,
                issues = report.errors.len(),
                "Synthesized XML failed schema validation, write aborted"
            );
            return Err(ApiError::schema_validation(
                "Generated XML failed schema validation",
                report.errors,
            ));
        }
        Ok(shadow)
    }

    /// The notebook must exist and belong to the caller. A foreign
    /// notebook is indistinguishable from a missing one.
    async fn authorize_notebook(&self, notebook: NotebookId, owner: UserId) -> ApiResult<Notebook> {
        self.store
            .notebook_get(notebook, owner)
            .await?
            .ok_or_else(ApiError::notebook_not_found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use quill_core::EntityIdType;
    use quill_store::InMemoryStore;

    fn service() -> NoteService {
        NoteService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(SchemaRegistry::builtin().unwrap()),
        )
    }

    async fn seed_notebook(service: &NoteService, owner: UserId) -> NotebookId {
        let notebook = Notebook::new(owner, "Work".to_string(), None, None, None);
        service.store.notebook_insert(&notebook).await.unwrap();
        notebook.notebook_id
    }

    fn create_input(notebook: NotebookId) -> CreateNoteInput {
        CreateNoteInput {
            title: "Meeting notes".to_string(),
            content: "Agenda & actions".to_string(),
            notebook,
            tags: vec!["work".to_string()],
            cover_image: None,
        }
    }

    #[tokio::test]
    async fn test_create_synthesizes_valid_shadow() {
        let service = service();
        let owner = UserId::generate();
        let notebook = seed_notebook(&service, owner).await;

        let note = service.create_note(owner, create_input(notebook)).await.unwrap();
        assert!(note.content_xml.starts_with("<note>"));
        assert!(note.content_xml.contains("<createdAt>"));
        assert!(!note.content_xml.contains("<updatedAt>"));
        assert!(note.content_xml.contains("Agenda &amp; actions"));

        let report = service
            .schemas
            .validate(&note.content_xml, SchemaKind::Note);
        assert!(report.valid);

        let stored = service.store.note_get(note.note_id, owner).await.unwrap();
        assert_eq!(stored, Some(note));
    }

    #[tokio::test]
    async fn test_update_switches_shadow_to_updated_at() {
        let service = service();
        let owner = UserId::generate();
        let notebook = seed_notebook(&service, owner).await;
        let note = service.create_note(owner, create_input(notebook)).await.unwrap();

        let updated = service
            .update_note(
                owner,
                note.note_id,
                UpdateNoteInput {
                    content: Some("Revised".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.content_xml.contains("<updatedAt>"));
        assert!(!updated.content_xml.contains("<createdAt>"));
        assert!(updated.content_xml.contains("<content>Revised</content>"));
        assert_eq!(updated.created_at, note.created_at);
    }

    #[tokio::test]
    async fn test_title_only_update_keeps_prior_content_in_shadow() {
        let service = service();
        let owner = UserId::generate();
        let notebook = seed_notebook(&service, owner).await;
        let note = service.create_note(owner, create_input(notebook)).await.unwrap();

        let updated = service
            .update_note(
                owner,
                note.note_id,
                UpdateNoteInput {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.content_xml.contains("<title>Renamed</title>"));
        assert!(updated
            .content_xml
            .contains("<content>Agenda &amp; actions</content>"));
        assert!(updated.content_xml.contains("<updatedAt>"));
        assert_eq!(updated.content, "Agenda & actions");
    }

    #[tokio::test]
    async fn test_invalid_title_aborts_write_nothing_persisted() {
        let service = service();
        let owner = UserId::generate();
        let notebook = seed_notebook(&service, owner).await;

        let mut input = create_input(notebook);
        input.title = String::new();
        let err = service.create_note(owner, input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);

        let notes = service
            .store
            .note_list(owner, &quill_store::NoteFilter::default())
            .await
            .unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_overlong_title_rejected_before_store() {
        let service = service();
        let owner = UserId::generate();
        let notebook = seed_notebook(&service, owner).await;

        let mut input = create_input(notebook);
        input.title = "x".repeat(NOTE_TITLE_MAX_LEN + 1);
        let err = service.create_note(owner, input).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationFailed);
    }

    #[tokio::test]
    async fn test_create_in_foreign_notebook_is_not_found() {
        let service = service();
        let owner = UserId::generate();
        let other = UserId::generate();
        let notebook = seed_notebook(&service, other).await;

        let err = service
            .create_note(owner, create_input(notebook))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotebookNotFound);
    }

    #[tokio::test]
    async fn test_update_rejects_empty_patch() {
        let service = service();
        let owner = UserId::generate();
        let notebook = seed_notebook(&service, owner).await;
        let note = service.create_note(owner, create_input(notebook)).await.unwrap();

        let err = service
            .update_note(owner, note.note_id, UpdateNoteInput::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);
    }

    #[tokio::test]
    async fn test_import_xml_rejects_invalid_document() {
        let service = service();
        let owner = UserId::generate();
        let notebook = seed_notebook(&service, owner).await;

        // Missing required <title>.
        let xml = "<note><content>hi</content><createdAt>2026-01-01T00:00:00.000Z</createdAt><tags></tags></note>";
        let err = service.import_xml(owner, xml, notebook).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::SchemaValidationFailed);
        let issues = err.errors.unwrap();
        assert!(!issues.is_empty());
        assert!(issues[0].line >= 1);

        let notes = service
            .store
            .note_list(owner, &quill_store::NoteFilter::default())
            .await
            .unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn test_import_xml_restores_canonical_fields() {
        let service = service();
        let owner = UserId::generate();
        let notebook = seed_notebook(&service, owner).await;

        let xml = "<note><title>Imported</title><content>Body</content>\
                   <createdAt>2026-01-01T00:00:00.000Z</createdAt>\
                   <tags><tag>a</tag><tag>b</tag></tags></note>";
        let note = service.import_xml(owner, xml, notebook).await.unwrap();
        assert_eq!(note.title, "Imported");
        assert_eq!(note.content, "Body");
        assert_eq!(note.tags, vec!["a", "b"]);
        // The supplied document is the stored shadow.
        assert_eq!(note.content_xml, xml);
    }

    #[tokio::test]
    async fn test_flag_only_update_leaves_shadow_untouched() {
        let service = service();
        let owner = UserId::generate();
        let notebook = seed_notebook(&service, owner).await;
        let note = service.create_note(owner, create_input(notebook)).await.unwrap();

        let updated = service
            .update_note(
                owner,
                note.note_id,
                UpdateNoteInput {
                    is_favorite: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(updated.is_favorite);
        assert_eq!(updated.content_xml, note.content_xml);
        assert!(updated.content_xml.contains("<createdAt>"));
    }
}
