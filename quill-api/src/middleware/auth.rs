//! Authentication middleware
//!
//! Validates the `Authorization: Bearer` header on protected routes and
//! injects [`AuthContext`] into request extensions. Unauthenticated
//! requests get 401 with an auth-class error code; they never reach a
//! handler.

use crate::auth::{authenticate, AuthConfig, AuthContext};
use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Shared state for the authentication middleware.
#[derive(Debug, Clone)]
pub struct AuthMiddlewareState {
    pub auth_config: Arc<AuthConfig>,
}

impl AuthMiddlewareState {
    pub fn new(auth_config: Arc<AuthConfig>) -> Self {
        Self { auth_config }
    }
}

/// Axum middleware for authentication.
///
/// 1. Extracts the `Authorization: Bearer` header
/// 2. Validates the JWT
/// 3. Injects [`AuthContext`] into request extensions on success
pub async fn auth_middleware(
    State(state): State<AuthMiddlewareState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = request
        .headers()
        .get("authorization")
        .and_then(|h| h.to_str().ok());

    let context = authenticate(&state.auth_config, auth_header).map_err(|err| {
        tracing::debug!(error = %err, "Authentication failed");
        err
    })?;

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

/// Extract the authenticated user from request extensions.
///
/// Only valid on routes behind [`auth_middleware`].
#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthContext>()
            .copied()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))
    }
}
