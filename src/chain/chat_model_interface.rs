use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A single chat turn as sent to the model provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("missing model provider credentials: {0} is not set")]
    MissingCredentials(&'static str),

    #[error("model provider request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("model provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("model provider response could not be parsed: {0}")]
    InvalidResponse(String),

    #[error("model provider returned no completion")]
    EmptyCompletion,
}

/// Interface for a stateless chat model.
/// The model keeps no memory between calls; every call carries the full
/// message list.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Complete the conversation and return the assistant's reply text.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChainError>;
}
