//! Current-user routes

use crate::auth::AuthContext;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use quill_core::{Timestamp, User, UserId};
use serde::Serialize;

/// Public view of a user. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub created_at: Timestamp,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.user_id,
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// GET /api/users/me
async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<UserResponse>> {
    let user = state
        .store
        .user_get(auth.user_id)
        .await?
        .ok_or_else(ApiError::user_not_found)?;
    Ok(Json(UserResponse::from(&user)))
}
