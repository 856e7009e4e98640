// Chat message model
// Messages as held by sessions and sent to the backend

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a message
pub type MessageId = String;

/// Role of a message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message typed by the user
    User,
    /// Reply produced by the model
    Assistant,
}

/// A typed segment of a message
/// Only text parts are shown and sent; reasoning parts are kept but ignored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum MessagePart {
    /// Visible text
    Text { text: String },
    /// Model reasoning, not part of the transcript text
    Reasoning { text: String },
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique identifier for the message
    pub id: MessageId,
    /// Who sent the message
    pub role: MessageRole,
    /// Ordered content parts
    pub parts: Vec<MessagePart>,
}

impl ChatMessage {
    /// Create a message with a single text part and a fresh ID
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            parts: vec![MessagePart::Text { text: text.into() }],
        }
    }

    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(MessageRole::User, text)
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, text)
    }

    /// Concatenated text of all text parts, in order
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                MessagePart::Text { text } => Some(text.as_str()),
                MessagePart::Reasoning { .. } => None,
            })
            .collect()
    }

    /// Extend the last text part, adding one if the message has none
    pub fn append_text(&mut self, delta: &str) {
        if let Some(MessagePart::Text { text }) = self.parts.last_mut() {
            text.push_str(delta);
        } else {
            self.parts.push(MessagePart::Text {
                text: delta.to_string(),
            });
        }
    }
}
