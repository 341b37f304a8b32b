use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use super::chat_model_interface::{ChainError, ChatMessage, ChatModel};

/// OpenAI compatible chat model.
/// Talks to `{base_url}/chat/completions` directly over HTTP.
pub struct OpenAIChatModel {
    client: Client,
    model: String,
    base_url: String,
    api_key: String,
    organization: Option<String>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

impl OpenAIChatModel {
    pub fn new(
        client: Client,
        model: String,
        base_url: String,
        api_key: String,
        organization: Option<String>,
        temperature: f32,
    ) -> Self {
        info!(
            "Initialized OpenAIChatModel: model={}, base_url={}",
            model, base_url
        );
        Self {
            client,
            model,
            base_url,
            api_key,
            organization,
            temperature,
        }
    }
}

#[async_trait]
impl ChatModel for OpenAIChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ChainError> {
        let endpoint = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = json!({
            "model": self.model,
            "messages": messages,
            "temperature": self.temperature,
        });

        debug!("Sending chat completion: model={}, turns={}", self.model, messages.len());

        let mut request = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body);
        if let Some(org) = &self.organization {
            request = request.header("OpenAI-Organization", org);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            return Err(ChainError::Provider {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| ChainError::InvalidResponse(e.to_string()))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ChainError::EmptyCompletion)
    }
}
