//! Chat API
//!
//! `POST /api/chat`: normalize the history, run the primary/fallback protocol
//! and stream the reply back as UI message chunks.

use crate::api::streaming::create_sse_stream;
use crate::chat::models::{normalize_messages, ChatRequest};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    response::Response,
    Json,
};
use tracing::info;

/// POST /api/chat - Stream a model reply for the given message history
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(request) = payload.map_err(|e| AppError::InvalidRequest(e.body_text()))?;

    let messages = normalize_messages(&request.messages);
    info!(message_count = messages.len(), "Chat request received");

    let text = state.proxy.stream_reply(messages).await?;
    create_sse_stream(text)
}
