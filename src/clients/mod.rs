pub mod llm_client;

#[cfg(test)]
pub(crate) mod scripted;

pub use llm_client::{ChatMessage, ChatRole, CompletionClient, CompletionRequest, OpenAiClient};
