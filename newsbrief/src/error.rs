use thiserror::Error;

/// Failure taxonomy of the briefing pipeline.
///
/// Only `Configuration` and `NoArticles` ever leave the pipeline as errors;
/// the other variants are logged at the point where they are recovered from.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BriefingError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("query for topic '{topic}' failed: {reason}")]
    SourceQuery { topic: String, reason: String },

    #[error("model '{model}' failed: {reason}")]
    ModelInvocation { model: String, reason: String },

    #[error("all summarization models failed to return a summary (last error: {last_error})")]
    ModelsExhausted { last_error: String },

    #[error("reformatting failed: {0}")]
    Reformat(String),

    #[error("No articles found")]
    NoArticles,

    #[error("Invalid style. Must be 'CEO' or 'ENTHUSIAST'")]
    InvalidStyle(String),
}

impl BriefingError {
    pub fn missing_credential(env_name: &str) -> Self {
        BriefingError::Configuration(format!("{} environment variable is not set", env_name))
    }

    /// Reject a configured endpoint that is not an absolute http(s) URL.
    pub fn check_endpoint(key: &str, value: &str) -> Result<(), BriefingError> {
        match url::Url::parse(value) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
            Ok(parsed) => Err(BriefingError::Configuration(format!(
                "{} must use http or https, got '{}'",
                key,
                parsed.scheme()
            ))),
            Err(e) => Err(BriefingError::Configuration(format!("{} is not a valid URL: {}", key, e))),
        }
    }
}
