use anyhow::Result;
use serde::{Deserialize, Serialize};

pub mod remote;
pub mod summarizer;

#[cfg(test)]
pub(crate) mod testing;

/// Inference backend: a dedicated summarization model plus chat-style
/// instruction-following models.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    /// Abstractive summary of `request.inputs` by `request.model`
    async fn summarize(&self, request: SummarizeRequest) -> Result<String>;

    /// Chat completion; returns the first choice's message content
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse>;
}

/// Request for a summarization model
#[derive(Debug, Clone)]
pub struct SummarizeRequest {
    pub model: String,
    pub inputs: String,
    pub min_length: usize,
    pub max_length: usize,
    pub timeout_seconds: Option<u64>,
}

/// Request structure for chat generation
#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Response from chat generation
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
}
