//! Quill HTTP API
//!
//! REST server for the Quill note-taking service. Notes are stored with
//! a canonical JSON form and a schema-validated XML shadow; every write
//! re-synthesizes and re-validates the shadow before anything persists.

pub mod auth;
pub mod config;
pub mod error;
pub mod extractors;
pub mod middleware;
pub mod password;
pub mod routes;
pub mod services;
pub mod state;
pub mod validation;

pub use auth::{AuthConfig, AuthContext};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult, ErrorCode};
pub use routes::create_api_router;
pub use state::AppState;
