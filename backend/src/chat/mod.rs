//! Chat module
//!
//! Request shapes for the chat endpoint and message normalization.

pub mod models;

pub use models::{normalize_message, normalize_messages, ChatRequest, MessageRole, NormalizedMessage};
