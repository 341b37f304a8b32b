use std::sync::Arc;

use reqwest::Client;
use tracing::info;

use super::basic_chain::BasicChain;
use super::chat_model_interface::{ChainError, ChatModel};
use super::openai_llm::OpenAIChatModel;
use super::prompt::{ChatPromptTemplate, PromptRole};
use crate::config::ModelConfig;

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// Builds a fresh chain for each request.
pub trait ChainBuilder: Send + Sync {
    fn build(&self) -> Result<BasicChain, ChainError>;
}

/// Bind the fixed assistant prompt to `llm`.
pub fn create_basic_chain(llm: Arc<dyn ChatModel>) -> BasicChain {
    let prompt = ChatPromptTemplate::from_messages([
        (PromptRole::System, SYSTEM_PROMPT),
        (PromptRole::Human, "{input}"),
    ]);
    BasicChain::new(llm, prompt)
}

/// Chain builder backed by an OpenAI-compatible provider.
pub struct OpenAIChainBuilder {
    config: ModelConfig,
    client: Client,
}

impl OpenAIChainBuilder {
    pub fn new(config: ModelConfig, client: Client) -> Self {
        Self { config, client }
    }
}

impl ChainBuilder for OpenAIChainBuilder {
    fn build(&self) -> Result<BasicChain, ChainError> {
        let api_key = self
            .config
            .api_key
            .clone()
            .ok_or(ChainError::MissingCredentials("OPENAI_API_KEY"))?;

        info!("Creating basic chain: model={}", self.config.model_name);

        let llm = OpenAIChatModel::new(
            self.client.clone(),
            self.config.model_name.clone(),
            self.config.base_url.clone(),
            api_key,
            self.config.organization.clone(),
            self.config.temperature,
        );
        Ok(create_basic_chain(Arc::new(llm)))
    }
}
