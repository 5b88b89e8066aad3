//! HTTP route composition
//!
//! Each entity module exposes a `create_router()`; this module nests
//! them, wires the authentication middleware onto the protected surface,
//! and layers CORS and request tracing over the whole app.
//!
//! Public (no token): `/api/auth/*`, `/api/notes/schema`, `/health/*`.
//! Everything else under `/api` requires a valid bearer token.

pub mod auth;
pub mod health;
pub mod note;
pub mod notebook;
pub mod user;

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, AuthMiddlewareState};
use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::get,
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the full application router.
pub fn create_api_router(state: AppState, config: &ApiConfig) -> Router {
    let auth_state = AuthMiddlewareState::new(state.auth.clone());

    let protected = Router::new()
        .nest("/users", user::create_router())
        .nest("/notes", note::create_router())
        .nest("/notebooks", notebook::create_router())
        .layer(from_fn_with_state(auth_state, auth_middleware));

    let public = Router::new()
        .nest("/auth", auth::create_router())
        .route("/notes/schema", get(note::get_schema));

    Router::new()
        .nest("/api", protected.merge(public))
        .nest("/health", health::create_router())
        .layer(build_cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS policy from configuration.
///
/// With no configured origins the layer is wide open, which is only
/// acceptable for development. Configured origins that fail to parse as
/// header values are skipped with a warning rather than aborting startup.
fn build_cors_layer(config: &ApiConfig) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_origins.is_empty() {
        tracing::warn!("No CORS origins configured, allowing any origin");
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin, "Skipping unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(methods)
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .max_age(std::time::Duration::from_secs(config.cors_max_age_secs))
}
