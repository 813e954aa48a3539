// Summarization engine: extractive model chain, reformat pass, parse, degrade.
use std::sync::Arc;
use tracing::{info, warn};

use super::{ChatMessage, LlmProvider, LlmRequest, SummarizeRequest};
use crate::error::BriefingError;
use crate::models::{RawArticle, StructuredSummary, StyleMode, SummarizedArticle};
use crate::styles;
use common::InferenceConfig;

pub const DEFAULT_PRIMARY_MODEL: &str = "facebook/bart-large-cnn";
pub const DEFAULT_FALLBACK_MODELS: [&str; 1] = ["google/pegasus-xsum"];
pub const DEFAULT_REFORMAT_MODEL: &str = "mistralai/Mistral-7B-Instruct-v0.2";

/// Characters of article body handed to the models
const MAX_INPUT_CHARS: usize = 2000;
/// Characters kept when a text block is squeezed into a minimal summary
const MINIMAL_TEXT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct SummarizerSettings {
    pub primary_model: String,
    /// Tried in order once the primary model fails
    pub fallback_models: Vec<String>,
    pub reformat_model: String,
    pub min_length: usize,
    pub max_length: usize,
    pub reformat_max_tokens: usize,
    pub temperature: f32,
    pub timeout_seconds: Option<u64>,
}

impl Default for SummarizerSettings {
    fn default() -> Self {
        Self {
            primary_model: DEFAULT_PRIMARY_MODEL.to_string(),
            fallback_models: DEFAULT_FALLBACK_MODELS.iter().map(|m| m.to_string()).collect(),
            reformat_model: DEFAULT_REFORMAT_MODEL.to_string(),
            min_length: 40,
            max_length: 150,
            reformat_max_tokens: 200,
            temperature: 0.7,
            timeout_seconds: None,
        }
    }
}

impl SummarizerSettings {
    pub fn from_config(cfg: &InferenceConfig) -> Self {
        let defaults = Self::default();
        Self {
            primary_model: cfg.primary_model.clone().unwrap_or(defaults.primary_model),
            fallback_models: cfg.fallback_models.clone().unwrap_or(defaults.fallback_models),
            reformat_model: cfg.reformat_model.clone().unwrap_or(defaults.reformat_model),
            min_length: cfg.min_length.unwrap_or(defaults.min_length),
            max_length: cfg.max_length.unwrap_or(defaults.max_length),
            reformat_max_tokens: cfg.reformat_max_tokens.unwrap_or(defaults.reformat_max_tokens),
            temperature: cfg.temperature.unwrap_or(defaults.temperature),
            timeout_seconds: cfg.timeout_seconds,
        }
    }
}

/// Raw model summary and the model that produced it
#[derive(Debug, Clone)]
struct Extract {
    text: String,
    model: String,
}

pub struct Summarizer {
    provider: Arc<dyn LlmProvider>,
    settings: SummarizerSettings,
}

impl Summarizer {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: SummarizerSettings) -> Self {
        Self { provider, settings }
    }

    /// Summarize one article in `style`.
    ///
    /// Never fails: if every summarization model fails the result carries the
    /// title as headline and the failure reason as its only section; if only
    /// the reformat pass fails the raw summary is used instead.
    pub async fn summarize(&self, article: &RawArticle, style: StyleMode) -> SummarizedArticle {
        let input = build_input_text(article);

        let summary = match self.extract(&input).await {
            Ok(extract) => {
                info!(model = %extract.model, url = %article.url, "raw summary ready");
                self.shape(article, style, &input, &extract).await
            }
            Err(e) => {
                warn!(url = %article.url, "summarization failed, degrading: {}", e);
                StructuredSummary::minimal(
                    style,
                    fallback_headline(article),
                    minimal_text(&format!("Unable to generate summary: {}", e)),
                )
            }
        };

        SummarizedArticle::new(article, summary)
    }

    /// Primary model first, then each fallback; first success wins.
    async fn extract(&self, input: &str) -> Result<Extract, BriefingError> {
        let chain = std::iter::once(&self.settings.primary_model).chain(self.settings.fallback_models.iter());

        let mut last_error = None;
        for model in chain {
            match self.attempt(model, input).await {
                Ok(text) => {
                    return Ok(Extract {
                        text,
                        model: model.clone(),
                    })
                }
                Err(e) => {
                    warn!("{}", e);
                    last_error = Some(e);
                }
            }
        }

        Err(BriefingError::ModelsExhausted {
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no models configured".to_string()),
        })
    }

    async fn attempt(&self, model: &str, input: &str) -> Result<String, BriefingError> {
        let request = SummarizeRequest {
            model: model.to_string(),
            inputs: input.to_string(),
            min_length: self.settings.min_length,
            max_length: self.settings.max_length,
            timeout_seconds: self.settings.timeout_seconds,
        };

        let failed = |reason: String| BriefingError::ModelInvocation {
            model: model.to_string(),
            reason,
        };

        let text = self
            .provider
            .summarize(request)
            .await
            .map_err(|e| failed(format!("{:#}", e)))?;

        if text.trim().is_empty() {
            return Err(failed("empty summary".to_string()));
        }
        Ok(text.trim().to_string())
    }

    /// Reformat the raw summary into the style's bullets and parse them.
    async fn shape(&self, article: &RawArticle, style: StyleMode, input: &str, extract: &Extract) -> StructuredSummary {
        match self.reformat(style, input, &extract.text).await {
            Ok(reformatted) => {
                let text = if reformatted.trim().is_empty() {
                    &extract.text
                } else {
                    &reformatted
                };
                let mut summary = styles::parse_summary(style, text);
                summary.fill_headline(fallback_headline(article));
                summary
            }
            Err(e) => {
                warn!(url = %article.url, "{}, using raw summary", e);
                StructuredSummary::minimal(style, fallback_headline(article), minimal_text(&extract.text))
            }
        }
    }

    async fn reformat(&self, style: StyleMode, input: &str, raw_summary: &str) -> Result<String, BriefingError> {
        let request = LlmRequest {
            model: self.settings.reformat_model.clone(),
            messages: vec![
                ChatMessage::system(styles::system_prompt(style)),
                ChatMessage::user(format!(
                    "Summarize the following article based on the provided guidelines:\nArticle: {}\nRaw Summary: {}",
                    input, raw_summary
                )),
            ],
            max_tokens: Some(self.settings.reformat_max_tokens),
            temperature: Some(self.settings.temperature),
            timeout_seconds: self.settings.timeout_seconds,
        };

        let response = self
            .provider
            .generate(request)
            .await
            .map_err(|e| BriefingError::Reformat(format!("{:#}", e)))?;
        Ok(response.content)
    }
}

/// Model input: title, blank line, first 2000 characters of the body
/// (the title again when the article has no body).
pub fn build_input_text(article: &RawArticle) -> String {
    let body = if article.content.trim().is_empty() {
        &article.title
    } else {
        &article.content
    };
    format!("{}\n\n{}", article.title, truncate_chars(body, MAX_INPUT_CHARS))
}

/// Headline used when the model output has none: the title, else the source name, else the url.
fn fallback_headline(article: &RawArticle) -> &str {
    [&article.title, &article.source, &article.url]
        .into_iter()
        .map(|s| s.trim())
        .find(|s| !s.is_empty())
        .unwrap_or("Untitled article")
}

fn minimal_text(text: &str) -> String {
    format!("{}...", truncate_chars(text, MINIMAL_TEXT_CHARS))
}

fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
