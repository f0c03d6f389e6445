use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::Router;
use serde::Serialize;
use tower_http::cors;
use tower_sessions::{MemoryStore, SessionManagerLayer};
use tracing::info;
use versemark_store::Store;

use crate::api::ApiResponse;
use crate::config::ServerConfig;

pub mod api;
pub mod config;
mod handlers;
pub mod owner;
pub mod storage;

#[cfg(test)]
mod tests;

/// Build the annotation service router over an opened store.
pub fn service(store: Store) -> Router {
    let session_store = MemoryStore::default();
    let session_layer = SessionManagerLayer::new(session_store).with_secure(false);

    let cors_layer = cors::CorsLayer::permissive();

    Router::new()
        .route("/health", get(health_check_handler))
        .route(
            "/annotations/:translation/:book/:chapter/markings",
            get(handlers::markings::get_markings_handler)
                .put(handlers::markings::put_markings_handler),
        )
        .route(
            "/annotations/:translation/:book/:chapter/markings/backup",
            get(handlers::backup::get_backup_handler),
        )
        .route(
            "/annotations/:translation/:book/:chapter/markings/restore",
            post(handlers::backup::restore_backup_handler),
        )
        .route(
            "/annotations/:translation/:book/:chapter/notes",
            get(handlers::resources::get_notes_handler)
                .put(handlers::resources::put_notes_handler),
        )
        .route(
            "/palette",
            get(handlers::resources::get_palette_handler)
                .put(handlers::resources::put_palette_handler),
        )
        .route(
            "/word-memory",
            get(handlers::resources::get_word_memory_handler)
                .put(handlers::resources::put_word_memory_handler),
        )
        .route(
            "/preferences",
            get(handlers::resources::get_preferences_handler)
                .put(handlers::resources::put_preferences_handler),
        )
        .route("/devices/claim", post(handlers::claim::claim_device_handler))
        .route("/account", delete(handlers::account::delete_account_handler))
        .layer(session_layer)
        .layer(cors_layer)
        .with_state(store)
}

/// Bind the configured address and serve until shutdown.
pub async fn start(config: ServerConfig, store: Store) -> eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.listen).await?;

    info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, service(store)).await?;

    Ok(())
}

#[derive(Debug, Serialize)]
struct GetHealthResponse {
    data: HealthStatus,
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: String,
}

async fn health_check_handler() -> impl IntoResponse {
    ApiResponse {
        payload: GetHealthResponse {
            data: HealthStatus {
                status: "alive".to_owned(),
            },
        },
    }
    .into_response()
}
