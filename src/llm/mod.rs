// file: src/llm/mod.rs
// description: language model client abstraction and implementations
// reference: OpenAI-compatible chat completions

pub mod client;
pub mod retry;

pub use client::GroqChatClient;
pub use retry::RetryPolicy;

use crate::error::Result;
use async_trait::async_trait;

/// Text-in, text-out completion. Responses may wrap JSON in prose.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}
