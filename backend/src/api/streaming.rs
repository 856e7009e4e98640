//! Streaming utilities for Server-Sent Events (SSE)
//!
//! Wraps a stream of text deltas in the UI message stream protocol: one JSON
//! chunk per `data:` frame, terminated by `data: [DONE]`.

use crate::error::AppError;
use crate::provider::TextStream;
use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use futures_util::{stream::Stream, StreamExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// SSE stream termination signal
pub const SSE_DONE_SIGNAL: &str = "[DONE]";

/// Header announcing the UI message stream protocol version
pub const UI_MESSAGE_STREAM_HEADER: &str = "x-vercel-ai-ui-message-stream";

/// One chunk of the UI message stream protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiMessageChunk {
    /// A new assistant message begins
    #[serde(rename_all = "camelCase")]
    Start {
        /// Identifier of the assistant message
        message_id: String,
    },
    /// A text part begins
    TextStart {
        /// Identifier of the text part
        id: String,
    },
    /// Incremental text for an open text part
    TextDelta {
        /// Identifier of the text part
        id: String,
        /// Text to append
        delta: String,
    },
    /// A text part is complete
    TextEnd {
        /// Identifier of the text part
        id: String,
    },
    /// The assistant message is complete
    Finish,
    /// Generation failed after the stream had started
    #[serde(rename_all = "camelCase")]
    Error {
        /// Human-readable error message
        error_text: String,
    },
}

impl UiMessageChunk {
    /// Render as one SSE frame
    pub fn to_sse_frame(&self) -> String {
        match serde_json::to_string(self) {
            Ok(json) => format!("data: {}\n\n", json),
            Err(e) => format!(
                "data: {{\"type\":\"error\",\"errorText\":\"failed to encode chunk: {}\"}}\n\n",
                e
            ),
        }
    }
}

/// Create an SSE response from a text stream
///
/// # Arguments
/// * `text` - Ordered text deltas from the model provider
///
/// # Returns
/// * `Result<Response, AppError>` - SSE HTTP response or error
pub fn create_sse_stream(text: TextStream) -> Result<Response, AppError> {
    let sse_stream = create_chunk_stream(text).map(|chunk| {
        let frame = match chunk {
            Some(chunk) => chunk.to_sse_frame(),
            None => format!("data: {}\n\n", SSE_DONE_SIGNAL),
        };
        Ok::<_, std::io::Error>(frame)
    });

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "text/event-stream")
        .header(header::CACHE_CONTROL, "no-cache")
        .header(header::CONNECTION, "keep-alive")
        .header(UI_MESSAGE_STREAM_HEADER, "v1")
        .body(Body::from_stream(sse_stream))
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Failed to build SSE response: {}", e)))
}

/// Map text deltas to protocol chunks; `None` marks the terminating `[DONE]`
fn create_chunk_stream(mut text: TextStream) -> impl Stream<Item = Option<UiMessageChunk>> {
    use async_stream::stream;

    stream! {
        let message_id = Uuid::new_v4().to_string();
        let part_id = format!("{}-text", message_id);

        yield Some(UiMessageChunk::Start { message_id });
        yield Some(UiMessageChunk::TextStart { id: part_id.clone() });

        let mut failed = false;
        while let Some(delta) = text.next().await {
            match delta {
                Ok(delta) => {
                    yield Some(UiMessageChunk::TextDelta {
                        id: part_id.clone(),
                        delta,
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "Model stream failed after it had started");
                    yield Some(UiMessageChunk::Error { error_text: e.to_string() });
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            yield Some(UiMessageChunk::TextEnd { id: part_id });
            yield Some(UiMessageChunk::Finish);
        }
        yield None;
    }
}
