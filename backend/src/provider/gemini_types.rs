//! Gemini API request and response types
//!
//! Structs that mirror the Gemini REST JSON format.

use crate::chat::models::NormalizedMessage;
use crate::provider::GenerationRequest;
use serde::{Deserialize, Serialize};

/// Request body for `models/{model}:streamGenerateContent`
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct GeminiApiRequest {
    /// Conversation turns
    pub contents: Vec<RequestContent>,
    /// System instruction, sent apart from the turns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<SystemInstruction>,
}

/// One conversation turn
#[derive(Serialize, Debug)]
pub struct RequestContent {
    /// `user` or `model`
    pub role: String,
    /// List of content parts
    pub parts: Vec<RequestPart>,
}

/// System instruction container
#[derive(Serialize, Debug)]
pub struct SystemInstruction {
    /// Instruction parts
    pub parts: Vec<RequestPart>,
}

/// A single text part for requests
#[derive(Serialize, Debug)]
pub struct RequestPart {
    /// The text content
    pub text: String,
}

impl From<&NormalizedMessage> for RequestContent {
    fn from(message: &NormalizedMessage) -> Self {
        Self {
            role: message.role.gemini_role().to_string(),
            parts: vec![RequestPart {
                text: message.content.clone(),
            }],
        }
    }
}

impl From<&GenerationRequest> for GeminiApiRequest {
    fn from(request: &GenerationRequest) -> Self {
        let system_instruction = (!request.system_prompt.is_empty()).then(|| SystemInstruction {
            parts: vec![RequestPart {
                text: request.system_prompt.clone(),
            }],
        });
        Self {
            contents: request.messages.iter().map(RequestContent::from).collect(),
            system_instruction,
        }
    }
}

/// One streamed response frame (same shape as a non-streaming response)
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GeminiApiResponse {
    /// Candidate responses; usually exactly one
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    /// Feedback about the prompt (e.g., if it was blocked)
    #[serde(default)]
    pub prompt_feedback: Option<PromptFeedback>,
}

/// A single candidate response from the model
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Content of this candidate; absent when generation was blocked
    #[serde(default)]
    pub content: Option<Content>,
    /// Why the model stopped generating (if applicable)
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Content structure containing parts of the response
#[derive(Deserialize, Debug)]
pub struct Content {
    /// Response parts
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// A single part of content
#[derive(Deserialize, Debug)]
pub struct Part {
    /// Text of this part; function-call parts carry none
    #[serde(default)]
    pub text: Option<String>,
}

/// Feedback about the prompt
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    /// Reason the prompt was blocked (if applicable)
    #[serde(default)]
    pub block_reason: Option<String>,
}

/// Response of `GET models`
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListModelsResponse {
    /// Available models
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}

/// One entry of the model listing
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    /// Resource name, e.g. `models/gemini-2.5-flash`
    pub name: String,
    /// Methods the model supports, e.g. `generateContent`
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}
