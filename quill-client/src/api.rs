//! API transport
//!
//! [`NotesApi`] is the seam between client state and the server. The
//! store and auto-saver only know this trait; tests substitute a mock,
//! production uses [`HttpNotesApi`] over reqwest.

use async_trait::async_trait;
use quill_core::NoteId;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Errors surfaced to client state.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The server rejected the request with a structured error.
    #[error("{code}: {message}")]
    Api { code: String, message: String },

    /// Transport failure, the request may or may not have reached the
    /// server.
    #[error("network error: {0}")]
    Network(String),

    /// The token was rejected. The UI should drop to the login screen.
    #[error("session expired")]
    SessionExpired,
}

/// A note as the client sees it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteView {
    pub id: NoteId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub is_pinned: bool,
    pub is_favorite: bool,
    pub is_archived: bool,
}

/// Server operations the client state machine needs.
#[async_trait]
pub trait NotesApi: Send + Sync {
    async fn list_notes(&self) -> Result<Vec<NoteView>, ClientError>;
    async fn get_note(&self, id: NoteId) -> Result<NoteView, ClientError>;
    async fn set_favorite(&self, id: NoteId, favorite: bool) -> Result<NoteView, ClientError>;
    async fn set_pinned(&self, id: NoteId, pinned: bool) -> Result<NoteView, ClientError>;
    async fn save_content(&self, id: NoteId, content: &str) -> Result<NoteView, ClientError>;
}

/// Callback invoked when the server rejects the session token.
pub type SessionExpiredHook = Arc<dyn Fn() + Send + Sync>;

/// HTTP implementation of [`NotesApi`].
pub struct HttpNotesApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
    on_session_expired: Option<SessionExpiredHook>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: String,
    message: String,
}

impl HttpNotesApi {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
            on_session_expired: None,
        }
    }

    /// Register a hook fired once per 401 response, before the error is
    /// returned to the caller.
    pub fn with_session_expired_hook(mut self, hook: SessionExpiredHook) -> Self {
        self.on_session_expired = Some(hook);
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn handle<T: serde::de::DeserializeOwned>(
        &self,
        response: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, ClientError> {
        let response = response.map_err(|e| ClientError::Network(e.to_string()))?;
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            if let Some(hook) = &self.on_session_expired {
                hook();
            }
            return Err(ClientError::SessionExpired);
        }
        if !status.is_success() {
            let body: ApiErrorBody = response.json().await.unwrap_or(ApiErrorBody {
                code: "UNKNOWN".to_string(),
                message: format!("HTTP {}", status),
            });
            return Err(ClientError::Api {
                code: body.code,
                message: body.message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::Network(e.to_string()))
    }

    async fn patch_note(
        &self,
        id: NoteId,
        body: serde_json::Value,
    ) -> Result<NoteView, ClientError> {
        let response = self
            .client
            .put(self.url(&format!("/api/notes/{id}")))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await;
        self.handle(response).await
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list_notes(&self) -> Result<Vec<NoteView>, ClientError> {
        let response = self
            .client
            .get(self.url("/api/notes"))
            .bearer_auth(&self.token)
            .send()
            .await;
        self.handle(response).await
    }

    async fn get_note(&self, id: NoteId) -> Result<NoteView, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/notes/{id}")))
            .bearer_auth(&self.token)
            .send()
            .await;
        self.handle(response).await
    }

    async fn set_favorite(&self, id: NoteId, favorite: bool) -> Result<NoteView, ClientError> {
        self.patch_note(id, serde_json::json!({ "isFavorite": favorite }))
            .await
    }

    async fn set_pinned(&self, id: NoteId, pinned: bool) -> Result<NoteView, ClientError> {
        self.patch_note(id, serde_json::json!({ "isPinned": pinned }))
            .await
    }

    async fn save_content(&self, id: NoteId, content: &str) -> Result<NoteView, ClientError> {
        self.patch_note(id, serde_json::json!({ "content": content }))
            .await
    }
}
