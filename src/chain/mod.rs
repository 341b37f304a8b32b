pub mod basic_chain;
pub mod chain_factory;
pub mod chat_model_interface;
pub mod openai_llm;
pub mod prompt;

pub use basic_chain::*;
pub use chain_factory::*;
pub use chat_model_interface::*;
pub use openai_llm::*;
pub use prompt::*;
