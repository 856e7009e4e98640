// UI message stream protocol (client side)
// Decodes the event payloads streamed by POST /api/chat

use crate::chat::message::ChatMessage;
use serde::{Deserialize, Serialize};

/// Stream termination signal
pub const SSE_DONE_SIGNAL: &str = "[DONE]";

/// Request body of POST /api/chat
#[derive(Debug, Serialize)]
pub struct ChatRequestBody<'a> {
    pub messages: &'a [ChatMessage],
}

/// Error body returned by the backend with a 500 status
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub details: String,
}

/// One chunk of the UI message stream protocol
/// Only deltas and errors are acted on; the other chunks are decoded and dropped
#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UiMessageChunk {
    #[serde(rename_all = "camelCase")]
    Start {
        message_id: String,
    },
    TextStart {
        id: String,
    },
    TextDelta {
        id: String,
        delta: String,
    },
    TextEnd {
        id: String,
    },
    Finish,
    #[serde(rename_all = "camelCase")]
    Error {
        error_text: String,
    },
    /// Chunk types this client does not render (steps, reasoning, tools)
    #[serde(other)]
    Unknown,
}

/// A decoded event payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Chunk(UiMessageChunk),
    Done,
}

/// Decode the data of one server-sent event
/// Returns None for empty or undecodable payloads
pub fn decode_event_data(data: &str) -> Option<Frame> {
    let data = data.trim();
    if data.is_empty() {
        return None;
    }
    if data == SSE_DONE_SIGNAL {
        return Some(Frame::Done);
    }
    match serde_json::from_str(data) {
        Ok(chunk) => Some(Frame::Chunk(chunk)),
        Err(e) => {
            tracing::warn!(error = %e, payload = %data, "Skipping undecodable stream chunk");
            None
        }
    }
}
