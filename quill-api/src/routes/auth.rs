//! Registration and login

use crate::auth::generate_jwt_token;
use crate::error::{ApiError, ApiResult};
use crate::password::{hash_password, verify_password};
use crate::routes::user::UserResponse;
use crate::state::AppState;
use crate::validation::ValidateNonEmpty;
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use quill_core::User;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<impl IntoResponse> {
    req.name.validate_non_empty("name")?;
    req.email.validate_non_empty("email")?;
    req.password.validate_non_empty("password")?;

    let password_hash = hash_password(&req.password)?;
    let user = User::new(req.name.trim(), req.email.trim().to_lowercase(), password_hash);

    // The store enforces email uniqueness; a duplicate surfaces as 409.
    state.store.user_insert(&user).await?;
    tracing::info!(user_id = %user.user_id, "User registered");

    let token = generate_jwt_token(&state.auth, user.user_id)?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: UserResponse::from(&user),
        }),
    ))
}

/// POST /api/auth/login
///
/// A wrong email and a wrong password produce the same message so the
/// endpoint cannot be used to probe which accounts exist.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let invalid = || ApiError::unauthorized("Invalid email or password");

    let user = state
        .store
        .user_get_by_email(req.email.trim())
        .await?
        .ok_or_else(invalid)?;

    if !verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    let token = generate_jwt_token(&state.auth, user.user_id)?;
    Ok(Json(AuthResponse {
        token,
        user: UserResponse::from(&user),
    }))
}
