//! Note routes
//!
//! All mutations delegate to [`NoteService`], which owns the
//! synthesize-and-validate write path. Handlers here only parse the
//! request, check nothing themselves, and shape the response.

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extractors::PathId;
use crate::services::{CreateNoteInput, NoteService, UpdateNoteInput};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use quill_core::{
    EntityIdType, Note, NoteId, Notebook, NotebookId, NotebookSummary, Timestamp, UserId,
};
use quill_store::NoteFilter;
use quill_xml::SchemaKind;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub notebook: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub notebook: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_pinned: Option<bool>,
    pub is_favorite: Option<bool>,
    pub is_archived: Option<bool>,
    // Distinguishes an absent field (leave alone) from an explicit null
    // (clear the cover image).
    #[serde(default, deserialize_with = "double_option")]
    pub cover_image: Option<Option<String>>,
}

#[derive(Debug, Deserialize)]
pub struct ImportXmlRequest {
    pub xml: String,
    pub notebook: String,
}

#[derive(Debug, Deserialize)]
pub struct ListNotesQuery {
    pub notebook: Option<String>,
    pub favorite: Option<bool>,
    pub archived: Option<bool>,
    pub search: Option<String>,
}

/// Notebook as embedded in a note response.
#[derive(Debug, Clone, Serialize)]
pub struct NotebookRef {
    pub id: NotebookId,
    pub title: String,
    pub color: String,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub notebook: NotebookRef,
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub is_favorite: bool,
    pub is_archived: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NoteResponse {
    fn new(note: Note, notebook_ref: NotebookRef) -> Self {
        Self {
            id: note.note_id,
            title: note.title,
            content: note.content,
            notebook: notebook_ref,
            tags: note.tags,
            is_pinned: note.is_pinned,
            is_favorite: note.is_favorite,
            is_archived: note.is_archived,
            // Stored as an empty string when unset; absent on the wire.
            cover_image: if note.cover_image.is_empty() {
                None
            } else {
                Some(note.cover_image)
            },
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

fn notebook_ref(id: NotebookId, summary: &NotebookSummary) -> NotebookRef {
    NotebookRef {
        id,
        title: summary.title.clone(),
        color: summary.color.clone(),
        icon: summary.icon.clone(),
    }
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notes).post(create_note))
        .route("/import-xml", post(import_xml))
        .route("/:id", get(get_note).put(update_note).delete(delete_note))
        .route("/:id/xml", get(get_note_xml))
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /api/notes
async fn list_notes(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListNotesQuery>,
) -> ApiResult<Json<Vec<NoteResponse>>> {
    let filter = NoteFilter {
        notebook: query
            .notebook
            .as_deref()
            .map(NotebookId::parse)
            .transpose()?,
        favorite_only: query.favorite.unwrap_or(false),
        include_archived: query.archived.unwrap_or(false),
        search: query.search,
    };

    let notes = state.store.note_list(auth.user_id, &filter).await?;
    let summaries: HashMap<NotebookId, NotebookSummary> = state
        .store
        .notebook_list_by_owner(auth.user_id)
        .await?
        .iter()
        .map(|nb| (nb.notebook_id, NotebookSummary::from(nb)))
        .collect();

    let responses = notes
        .into_iter()
        .filter_map(|note| {
            let summary = summaries.get(&note.notebook)?;
            let embedded = notebook_ref(note.notebook, summary);
            Some(NoteResponse::new(note, embedded))
        })
        .collect();
    Ok(Json(responses))
}

/// GET /api/notes/:id
async fn get_note(
    State(state): State<AppState>,
    auth: AuthContext,
    PathId(note_id): PathId<NoteId>,
) -> ApiResult<Json<NoteResponse>> {
    let note = fetch_note(&state, note_id, auth.user_id).await?;
    let notebook = fetch_notebook(&state, note.notebook, auth.user_id).await?;
    let summary = NotebookSummary::from(&notebook);
    Ok(Json(NoteResponse::new(
        note,
        notebook_ref(notebook.notebook_id, &summary),
    )))
}

/// GET /api/notes/:id/xml
///
/// The note's shadow representation, served as `application/xml`.
async fn get_note_xml(
    State(state): State<AppState>,
    auth: AuthContext,
    PathId(note_id): PathId<NoteId>,
) -> ApiResult<impl IntoResponse> {
    let note = fetch_note(&state, note_id, auth.user_id).await?;
    Ok((
        [(header::CONTENT_TYPE, "application/xml")],
        note.content_xml,
    ))
}

/// GET /api/notes/schema
///
/// The note XSD, public so clients can validate before submitting.
pub async fn get_schema(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        state.schemas.source(SchemaKind::Note).to_string(),
    )
}

/// POST /api/notes
async fn create_note(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<impl IntoResponse> {
    let notebook_id = NotebookId::parse(&req.notebook)
        .map_err(|_| ApiError::invalid_format("notebook", "a 24-character hex ID"))?;

    let service = NoteService::new(state.store.clone(), state.schemas.clone());
    let note = service
        .create_note(
            auth.user_id,
            CreateNoteInput {
                title: req.title,
                content: req.content,
                notebook: notebook_id,
                tags: req.tags,
                cover_image: req.cover_image,
            },
        )
        .await?;

    let notebook = fetch_notebook(&state, note.notebook, auth.user_id).await?;
    let summary = NotebookSummary::from(&notebook);
    Ok((
        StatusCode::CREATED,
        Json(NoteResponse::new(
            note,
            notebook_ref(notebook.notebook_id, &summary),
        )),
    ))
}

/// PUT /api/notes/:id
async fn update_note(
    State(state): State<AppState>,
    auth: AuthContext,
    PathId(note_id): PathId<NoteId>,
    Json(req): Json<UpdateNoteRequest>,
) -> ApiResult<Json<NoteResponse>> {
    let notebook = req
        .notebook
        .as_deref()
        .map(NotebookId::parse)
        .transpose()
        .map_err(|_| ApiError::invalid_format("notebook", "a 24-character hex ID"))?;

    let service = NoteService::new(state.store.clone(), state.schemas.clone());
    let note = service
        .update_note(
            auth.user_id,
            note_id,
            UpdateNoteInput {
                title: req.title,
                content: req.content,
                notebook,
                tags: req.tags,
                is_pinned: req.is_pinned,
                is_favorite: req.is_favorite,
                is_archived: req.is_archived,
                cover_image: req.cover_image,
            },
        )
        .await?;

    let notebook = fetch_notebook(&state, note.notebook, auth.user_id).await?;
    let summary = NotebookSummary::from(&notebook);
    Ok(Json(NoteResponse::new(
        note,
        notebook_ref(notebook.notebook_id, &summary),
    )))
}

/// DELETE /api/notes/:id
async fn delete_note(
    State(state): State<AppState>,
    auth: AuthContext,
    PathId(note_id): PathId<NoteId>,
) -> ApiResult<Json<serde_json::Value>> {
    state.store.note_delete(note_id, auth.user_id).await?;
    tracing::debug!(note_id = %note_id, "Note deleted");
    Ok(Json(serde_json::json!({ "message": "Note deleted" })))
}

/// POST /api/notes/import-xml
async fn import_xml(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<ImportXmlRequest>,
) -> ApiResult<impl IntoResponse> {
    let notebook_id = NotebookId::parse(&req.notebook)
        .map_err(|_| ApiError::invalid_format("notebook", "a 24-character hex ID"))?;

    let service = NoteService::new(state.store.clone(), state.schemas.clone());
    let note = service.import_xml(auth.user_id, &req.xml, notebook_id).await?;

    let notebook = fetch_notebook(&state, note.notebook, auth.user_id).await?;
    let summary = NotebookSummary::from(&notebook);
    Ok((
        StatusCode::CREATED,
        Json(NoteResponse::new(
            note,
            notebook_ref(notebook.notebook_id, &summary),
        )),
    ))
}

async fn fetch_note(state: &AppState, note_id: NoteId, owner: UserId) -> ApiResult<Note> {
    state
        .store
        .note_get(note_id, owner)
        .await?
        .ok_or_else(ApiError::note_not_found)
}

async fn fetch_notebook(
    state: &AppState,
    notebook_id: NotebookId,
    owner: UserId,
) -> ApiResult<Notebook> {
    state
        .store
        .notebook_get(notebook_id, owner)
        .await?
        .ok_or_else(ApiError::notebook_not_found)
}
