use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::chat_model_interface::{ChainError, ChatModel};
use super::prompt::ChatPromptTemplate;

/// Result of one chain invocation: the input echoed back with the
/// model's completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainOutput {
    pub input: String,
    pub text: String,
}

/// Prompt template bound to a chat model.
pub struct BasicChain {
    llm: Arc<dyn ChatModel>,
    prompt: ChatPromptTemplate,
}

impl BasicChain {
    pub fn new(llm: Arc<dyn ChatModel>, prompt: ChatPromptTemplate) -> Self {
        Self { llm, prompt }
    }

    pub async fn invoke(&self, input: &str) -> Result<ChainOutput, ChainError> {
        let messages = self.prompt.format_messages(input);
        debug!("Invoking chain with {} prompt turns", messages.len());

        let text = self.llm.complete(&messages).await?;
        Ok(ChainOutput {
            input: input.to_string(),
            text,
        })
    }
}
