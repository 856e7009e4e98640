//! Chat data models
//!
//! Wire shapes accepted by `POST /api/chat` and the canonical message form
//! every other component works with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user
    User,
    /// Message from the assistant/AI
    Assistant,
}

impl MessageRole {
    /// Convert the role to its string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }

    /// Role name used by the Gemini `contents` array
    pub fn gemini_role(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "model",
        }
    }
}

impl From<&str> for MessageRole {
    fn from(s: &str) -> Self {
        match s {
            "user" => MessageRole::User,
            "assistant" => MessageRole::Assistant,
            _ => MessageRole::User,
        }
    }
}

/// Request body of `POST /api/chat`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRequest {
    /// Conversation history, oldest first
    #[serde(default)]
    pub messages: Vec<IncomingMessage>,
}

/// One message as sent by the client
///
/// Every field is optional and loosely typed so that a malformed entry
/// degrades to empty content instead of rejecting the whole batch.
/// An entry that is not a JSON object at all decodes as the empty message.
#[derive(Debug, Clone, Default)]
pub struct IncomingMessage {
    /// Sender role (`user` or `assistant`)
    pub role: Option<Value>,
    /// Plain text content
    pub content: Option<Value>,
    /// Structured parts, of which only `{"type": "text"}` entries count
    pub parts: Option<Value>,
}

impl<'de> Deserialize<'de> for IncomingMessage {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let Value::Object(mut fields) = Value::deserialize(deserializer)? else {
            return Ok(IncomingMessage::default());
        };
        let mut take = |name: &str| fields.remove(name).filter(|value| !value.is_null());
        Ok(IncomingMessage {
            role: take("role"),
            content: take("content"),
            parts: take("parts"),
        })
    }
}

/// A typed part of a structured message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiPart {
    /// Text segment
    Text(String),
    /// Any part that carries no consumable text (files, reasoning, tool calls)
    Other,
}

/// Body of a message after decoding: direct text, structured parts, or nothing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    /// Direct text content
    Text(String),
    /// Structured parts
    Parts(Vec<UiPart>),
    /// Neither content nor parts were usable
    Empty,
}

impl MessageBody {
    /// Collapse the body into plain text
    pub fn into_text(self) -> String {
        match self {
            MessageBody::Text(text) => text,
            MessageBody::Parts(parts) => parts
                .into_iter()
                .filter_map(|part| match part {
                    UiPart::Text(text) => Some(text),
                    UiPart::Other => None,
                })
                .collect(),
            MessageBody::Empty => String::new(),
        }
    }
}

fn decode_part(value: &Value) -> UiPart {
    match (value.get("type").and_then(Value::as_str), value.get("text")) {
        (Some("text"), Some(Value::String(text))) => UiPart::Text(text.clone()),
        _ => UiPart::Other,
    }
}

impl From<&IncomingMessage> for MessageBody {
    fn from(message: &IncomingMessage) -> Self {
        let content = message
            .content
            .as_ref()
            .and_then(Value::as_str)
            .filter(|text| !text.is_empty());
        if let Some(text) = content {
            return MessageBody::Text(text.to_string());
        }

        match message.parts.as_ref().and_then(Value::as_array) {
            Some(parts) => MessageBody::Parts(parts.iter().map(decode_part).collect()),
            None => MessageBody::Empty,
        }
    }
}

/// Canonical plain-text message handed to the model provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedMessage {
    /// Sender role
    pub role: MessageRole,
    /// Text content, never absent
    pub content: String,
}

/// Normalize one incoming message
///
/// Prefers non-empty `content`; otherwise concatenates the text parts in order;
/// otherwise yields an empty string.
pub fn normalize_message(message: &IncomingMessage) -> NormalizedMessage {
    NormalizedMessage {
        role: MessageRole::from(message.role.as_ref().and_then(Value::as_str).unwrap_or("user")),
        content: MessageBody::from(message).into_text(),
    }
}

/// Normalize a whole history, preserving order
pub fn normalize_messages(messages: &[IncomingMessage]) -> Vec<NormalizedMessage> {
    messages.iter().map(normalize_message).collect()
}
