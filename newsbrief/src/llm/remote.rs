use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatMessage, LlmProvider, LlmRequest, LlmResponse, SummarizeRequest};
use crate::error::BriefingError;
use common::InferenceConfig;

pub const DEFAULT_SUMMARIZATION_URL: &str = "https://router.huggingface.co/hf-inference/models";
pub const DEFAULT_CHAT_URL: &str = "https://router.huggingface.co/v1/chat/completions";
pub const DEFAULT_API_KEY_ENV: &str = "HF_TOKEN";

/// Remote inference provider: Hugging Face style summarization endpoint
/// (`POST {summarization_url}/{model}`) plus an OpenAI-compatible chat endpoint.
pub struct RemoteLlmProvider {
    summarization_url: String,
    chat_url: String,
    api_key: String,
    default_timeout: Duration,
    default_max_tokens: usize,
    default_temperature: f32,
    client: reqwest::Client,
}

impl RemoteLlmProvider {
    pub fn new(
        summarization_url: impl Into<String>,
        chat_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            summarization_url: summarization_url.into(),
            chat_url: chat_url.into(),
            api_key: api_key.into(),
            default_timeout: Duration::from_secs(30),
            default_max_tokens: 200,
            default_temperature: 0.7,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_defaults(
        mut self,
        timeout_secs: u64,
        max_tokens: usize,
        temperature: f32,
    ) -> Self {
        self.default_timeout = Duration::from_secs(timeout_secs);
        self.default_max_tokens = max_tokens;
        self.default_temperature = temperature;
        self
    }

    /// Build from the `[inference]` section. The token is read from
    /// `api_key_env` (default `HF_TOKEN`) and must be present.
    pub fn from_config(cfg: &InferenceConfig) -> Result<Self, BriefingError> {
        let key_env = cfg.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        let api_key = common::read_secret(key_env).ok_or_else(|| BriefingError::missing_credential(key_env))?;

        let summarization_url = cfg.summarization_url.as_deref().unwrap_or(DEFAULT_SUMMARIZATION_URL);
        let chat_url = cfg.chat_url.as_deref().unwrap_or(DEFAULT_CHAT_URL);
        BriefingError::check_endpoint("inference.summarization_url", summarization_url)?;
        BriefingError::check_endpoint("inference.chat_url", chat_url)?;

        Ok(Self::new(summarization_url, chat_url, api_key)
        .with_defaults(
            cfg.timeout_seconds.unwrap_or(30),
            cfg.reformat_max_tokens.unwrap_or(200),
            cfg.temperature.unwrap_or(0.7),
        ))
    }

    fn timeout_for(&self, timeout_seconds: Option<u64>) -> Duration {
        timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout)
    }
}

#[async_trait::async_trait]
impl LlmProvider for RemoteLlmProvider {
    async fn summarize(&self, request: SummarizeRequest) -> Result<String> {
        let timeout = self.timeout_for(request.timeout_seconds);
        let url = format!("{}/{}", self.summarization_url.trim_end_matches('/'), request.model);

        let req_body = SummarizationBody {
            inputs: request.inputs,
            parameters: SummarizationParameters {
                min_length: request.min_length,
                max_length: request.max_length,
            },
        };

        let response = tokio::time::timeout(
            timeout,
            self.client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .context("Summarization request timed out")?
        .context("Summarization HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Summarization API error {}: {}", status, body);
        }

        let body_text = tokio::time::timeout(timeout, response.text())
            .await
            .context("Summarization request timed out")?
            .context("Failed to read summarization response body")?;

        // The hosted API answers with a one-element list; some deployments return the bare object
        if let Ok(outputs) = serde_json::from_str::<Vec<SummarizationOutput>>(&body_text) {
            let first = outputs
                .into_iter()
                .next()
                .context("Summarization response is an empty list")?;
            return Ok(first.summary_text);
        }

        let output: SummarizationOutput = serde_json::from_str(&body_text)
            .with_context(|| format!("Failed to parse summarization response: {}", body_text))?;
        Ok(output.summary_text)
    }

    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        let timeout = self.timeout_for(request.timeout_seconds);
        let max_tokens = request.max_tokens.unwrap_or(self.default_max_tokens);
        let temperature = request.temperature.unwrap_or(self.default_temperature);

        let req_body = ChatCompletionRequest {
            model: request.model.clone(),
            messages: request.messages,
            max_tokens: Some(max_tokens),
            temperature: Some(temperature),
        };

        let response = tokio::time::timeout(
            timeout,
            self.client
                .post(&self.chat_url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .context("LLM request timed out")?
        .context("LLM HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error {}: {}", status, body);
        }

        let resp_body = tokio::time::timeout(timeout, response.json::<ChatCompletionResponse>())
            .await
            .context("LLM request timed out")?
            .context("Failed to parse LLM response")?;

        let choice = resp_body
            .choices
            .into_iter()
            .next()
            .context("LLM response has no choices")?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: resp_body.model.unwrap_or(request.model),
        })
    }
}

#[derive(Debug, Serialize)]
struct SummarizationBody {
    inputs: String,
    parameters: SummarizationParameters,
}

#[derive(Debug, Serialize)]
struct SummarizationParameters {
    min_length: usize,
    max_length: usize,
}

#[derive(Debug, Deserialize)]
struct SummarizationOutput {
    summary_text: String,
}

// OpenAI-compatible chat request/response structures
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    model: Option<String>,
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
