//! Notebook routes

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::extractors::PathId;
use crate::state::AppState;
use crate::validation::{HasUpdates, ValidateMaxLen, ValidateNonEmpty};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use quill_core::{
    Notebook, NotebookId, Timestamp, NOTEBOOK_DESCRIPTION_MAX_LEN, NOTEBOOK_TITLE_MAX_LEN,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateNotebookRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNotebookRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub is_archived: Option<bool>,
}

impl HasUpdates for UpdateNotebookRequest {
    fn has_any_updates(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.color.is_some()
            || self.icon.is_some()
            || self.is_archived.is_some()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotebookResponse {
    pub id: NotebookId,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub color: String,
    pub icon: String,
    pub is_archived: bool,
    /// Number of non-archived notes in this notebook.
    pub note_count: u64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl NotebookResponse {
    fn new(notebook: Notebook, note_count: u64) -> Self {
        Self {
            id: notebook.notebook_id,
            title: notebook.title,
            // Stored as an empty string when unset; absent on the wire.
            description: if notebook.description.is_empty() {
                None
            } else {
                Some(notebook.description)
            },
            color: notebook.color,
            icon: notebook.icon,
            is_archived: notebook.is_archived,
            note_count,
            created_at: notebook.created_at,
            updated_at: notebook.updated_at,
        }
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_notebooks).post(create_notebook))
        .route(
            "/:id",
            get(get_notebook).put(update_notebook).delete(delete_notebook),
        )
}

/// GET /api/notebooks
async fn list_notebooks(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<Vec<NotebookResponse>>> {
    let notebooks = state.store.notebook_list_by_owner(auth.user_id).await?;
    let mut responses = Vec::with_capacity(notebooks.len());
    for notebook in notebooks {
        let count = state
            .store
            .note_count_by_notebook(notebook.notebook_id)
            .await?;
        responses.push(NotebookResponse::new(notebook, count));
    }
    Ok(Json(responses))
}

/// GET /api/notebooks/:id
async fn get_notebook(
    State(state): State<AppState>,
    auth: AuthContext,
    PathId(notebook_id): PathId<NotebookId>,
) -> ApiResult<Json<NotebookResponse>> {
    let notebook = fetch(&state, notebook_id, auth).await?;
    let count = state.store.note_count_by_notebook(notebook_id).await?;
    Ok(Json(NotebookResponse::new(notebook, count)))
}

/// POST /api/notebooks
async fn create_notebook(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateNotebookRequest>,
) -> ApiResult<impl IntoResponse> {
    req.title.validate_non_empty("title")?;
    req.title.validate_max_len("title", NOTEBOOK_TITLE_MAX_LEN)?;
    if let Some(description) = &req.description {
        description.validate_max_len("description", NOTEBOOK_DESCRIPTION_MAX_LEN)?;
    }

    let notebook = Notebook::new(auth.user_id, req.title, req.description, req.color, req.icon);
    state.store.notebook_insert(&notebook).await?;
    tracing::info!(notebook_id = %notebook.notebook_id, "Notebook created");

    Ok((StatusCode::CREATED, Json(NotebookResponse::new(notebook, 0))))
}

/// PUT /api/notebooks/:id
async fn update_notebook(
    State(state): State<AppState>,
    auth: AuthContext,
    PathId(notebook_id): PathId<NotebookId>,
    Json(req): Json<UpdateNotebookRequest>,
) -> ApiResult<Json<NotebookResponse>> {
    req.validate_has_updates()?;

    let mut notebook = fetch(&state, notebook_id, auth).await?;

    if let Some(title) = req.title {
        title.validate_non_empty("title")?;
        title.validate_max_len("title", NOTEBOOK_TITLE_MAX_LEN)?;
        notebook.title = title;
    }
    if let Some(description) = req.description {
        description.validate_max_len("description", NOTEBOOK_DESCRIPTION_MAX_LEN)?;
        notebook.description = description;
    }
    if let Some(color) = req.color {
        notebook.color = color;
    }
    if let Some(icon) = req.icon {
        notebook.icon = icon;
    }
    if let Some(is_archived) = req.is_archived {
        notebook.is_archived = is_archived;
    }
    notebook.updated_at = chrono::Utc::now();

    state.store.notebook_update(&notebook).await?;
    let count = state.store.note_count_by_notebook(notebook_id).await?;
    Ok(Json(NotebookResponse::new(notebook, count)))
}

/// DELETE /api/notebooks/:id
///
/// Deletes the notebook and every note inside it, atomically.
async fn delete_notebook(
    State(state): State<AppState>,
    auth: AuthContext,
    PathId(notebook_id): PathId<NotebookId>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted_notes = state
        .store
        .notebook_delete_cascade(notebook_id, auth.user_id)
        .await?;
    tracing::info!(
        notebook_id = %notebook_id,
        deleted_notes,
        "Notebook deleted with its notes"
    );
    Ok(Json(serde_json::json!({
        "message": "Notebook deleted",
        "deletedNotes": deleted_notes,
    })))
}

async fn fetch(
    state: &AppState,
    notebook_id: NotebookId,
    auth: AuthContext,
) -> ApiResult<Notebook> {
    state
        .store
        .notebook_get(notebook_id, auth.user_id)
        .await?
        .ok_or_else(ApiError::notebook_not_found)
}
