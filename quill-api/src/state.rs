//! Shared application state

use crate::auth::AuthConfig;
use quill_store::Store;
use quill_xml::SchemaRegistry;
use std::sync::Arc;

/// State shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub schemas: Arc<SchemaRegistry>,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, schemas: Arc<SchemaRegistry>, auth: Arc<AuthConfig>) -> Self {
        Self {
            store,
            schemas,
            auth,
        }
    }
}
