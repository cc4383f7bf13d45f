//! HTTP surface: router, shared state, and error responses.

pub mod error;
pub mod handlers;

use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::registry::ProviderRegistry;

pub use error::ApiError;

/// Shared application state injected into the handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProviderRegistry>,
}

/// Build the service router.
pub fn router(registry: Arc<ProviderRegistry>) -> Router {
    let state = AppState { registry };

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/chat-batch", post(handlers::chat_batch))
        .route("/api/chat-stream", post(handlers::chat_stream))
        .route("/api/provider-models", post(handlers::provider_models))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
