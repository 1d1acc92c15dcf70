//! Completion collaborator interface.
//!
//! The matcher talks to an external text-generation service through the
//! [`CompletionClient`] trait: a model identifier, role-tagged messages,
//! and an optional structured-response request go in; an ordered list of
//! choices comes out. Transport and auth failures are the collaborator's
//! to raise and this crate's callers' to handle.

pub mod decode;
pub mod openai;

use anyhow::Result;
use serde::{Deserialize, Serialize};

pub use openai::{CompletionError, OpenAiClient};

/// Role of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: Some(content.into()),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Some(content.into()),
        }
    }
}

/// Requested response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// Format type, e.g. "json_object"
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// A completion request
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Model identifier, passed through verbatim
    pub model: String,
    /// Ordered messages (system instruction first)
    pub messages: Vec<ChatMessage>,
    /// Requested structured response format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    /// Silently drop parameters the backend does not support
    #[serde(skip)]
    pub drop_params: bool,
}

/// One returned choice
#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ChatMessage,
}

/// A completion response: an ordered list of choices
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<Choice>,
}

/// Trait for completion backends.
///
/// The production implementation is [`OpenAiClient`]; tests substitute
/// scripted doubles.
pub trait CompletionClient: Send + Sync {
    /// Human-readable client name
    fn name(&self) -> &str;

    /// Execute a completion request
    fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}
