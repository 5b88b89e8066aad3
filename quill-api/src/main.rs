//! Quill API server binary

use quill_api::auth::AuthConfig;
use quill_api::config::ApiConfig;
use quill_api::routes::create_api_router;
use quill_api::state::AppState;
use quill_store::InMemoryStore;
use quill_xml::SchemaRegistry;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quill_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();

    let auth_config = AuthConfig::from_env();
    if let Err(err) = auth_config.validate_for_production() {
        tracing::error!("{}", err);
        return Err(err.into());
    }

    let schemas = match &config.schema_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Loading schemas from directory");
            SchemaRegistry::load(dir)?
        }
        None => SchemaRegistry::builtin()?,
    };

    let state = AppState::new(
        Arc::new(InMemoryStore::new()),
        Arc::new(schemas),
        Arc::new(auth_config),
    );
    let app = create_api_router(state, &config);

    let addr = config.socket_addr()?;
    tracing::info!(%addr, "Quill API listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
