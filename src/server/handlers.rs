use axum::extract::State;
use axum::response::sse::{Event, Sse};
use axum::Json;
use futures_util::{stream, Stream, StreamExt};
use std::convert::Infallible;
use tracing::info;

use super::error::ApiError;
use super::AppState;
use crate::batch::run_batch;
use crate::catalog;
use crate::relay::open_relay;
use crate::types::streaming::DONE_SENTINEL;
use crate::types::{
    ChatBatchResponse, ModelChat, ProviderKind, ProviderModels, ProviderModelsRequest,
    ProviderModelsResponse,
};

/// `POST /api/chat-batch` — fan out the requests concurrently and return the
/// results in input order.
pub async fn chat_batch(
    State(state): State<AppState>,
    Json(requests): Json<Vec<ModelChat>>,
) -> Result<Json<ChatBatchResponse>, ApiError> {
    if requests.is_empty() {
        return Ok(Json(ChatBatchResponse { data: Vec::new() }));
    }

    // Reject bad elements before anything is dispatched.
    for request in &requests {
        request.validate()?;
    }

    info!(count = requests.len(), "running chat batch");
    let data = run_batch(&state.registry, &requests).await;
    Ok(Json(ChatBatchResponse { data }))
}

/// `POST /api/chat-stream` — relay one provider stream as SSE, closing with
/// the `[DONE]` sentinel after the terminal event.
pub async fn chat_stream(
    State(state): State<AppState>,
    Json(request): Json<ModelChat>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let relay = open_relay(&state.registry, &request).await?;
    info!(provider = %relay.provider(), model = %request.model, "streaming chat");

    let events = relay
        .map(|event| {
            let data = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
            Event::default().data(data)
        })
        .chain(stream::once(async {
            Event::default().data(DONE_SENTINEL)
        }))
        .map(Ok);

    Ok(Sse::new(events))
}

/// `POST /api/provider-models` — static catalog lookup for the requested
/// providers.
pub async fn provider_models(
    Json(request): Json<ProviderModelsRequest>,
) -> Result<Json<ProviderModelsResponse>, ApiError> {
    let mut data = Vec::with_capacity(request.providers.len());

    for id in &request.providers {
        let kind: ProviderKind = id.parse()?;
        data.push(ProviderModels {
            r#type: kind,
            models: catalog::models_for(kind),
        });
    }

    Ok(Json(ProviderModelsResponse { data }))
}

/// `GET /health` — liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
