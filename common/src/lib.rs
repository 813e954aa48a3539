/*!
common/src/lib.rs

Shared configuration types and helpers for Newsbrief.

This file provides:
- Config data structures (deserialized from TOML)
- An async loader layering an optional defaults file under an optional override file
- Credential lookup: the config names environment variables, never the secrets themselves
*/

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// HTTP server section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind (e.g. "0.0.0.0")
    pub bind: Option<String>,
    pub port: Option<u16>,
}

impl ServerConfig {
    pub fn bind(&self) -> &str {
        self.bind.as_deref().unwrap_or("127.0.0.1")
    }

    pub fn port(&self) -> u16 {
        self.port.unwrap_or(8000)
    }
}

/// Article search API section.
///
/// Provider-specific defaults (endpoint, key variable, topic list) live with the
/// provider implementations; anything left unset here falls back to them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsConfig {
    /// "gnews" (default) or "newsapi"
    pub provider: Option<String>,
    pub api_url: Option<String>,
    pub api_key_env: Option<String>,
    pub topics: Option<Vec<String>>,
    pub max_per_topic: Option<usize>,
    pub max_articles: Option<usize>,
    pub timeout_seconds: Option<u64>,
}

/// Model inference API section (summarization + instruction-following models)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL for summarization calls; the model id is appended as a path segment
    pub summarization_url: Option<String>,
    /// OpenAI-compatible chat completions endpoint used for reformatting
    pub chat_url: Option<String>,
    pub api_key_env: Option<String>,
    pub primary_model: Option<String>,
    /// Tried in order after the primary model fails
    pub fallback_models: Option<Vec<String>>,
    pub reformat_model: Option<String>,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub reformat_max_tokens: Option<usize>,
    pub temperature: Option<f32>,
    pub timeout_seconds: Option<u64>,
}

/// Summarization batching / pacing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchConfig {
    pub size: Option<usize>,
    pub pause_millis: Option<u64>,
}

/// Top-level application configuration (deserialized from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub server: Option<ServerConfig>,
    pub news: Option<NewsConfig>,
    pub inference: Option<InferenceConfig>,
    pub batch: Option<BatchConfig>,
}

impl Config {
    /// Load configuration from a TOML file asynchronously.
    ///
    /// Example:
    ///   let cfg = Config::from_file("config.toml").await?;
    pub async fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = tokio::fs::read_to_string(path.as_ref())
            .await
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let cfg: Config = toml::from_str(&data).context("Failed to parse TOML configuration")?;
        Ok(cfg)
    }

    /// Load configuration with an optional default file and an optional override file.
    /// If both are present, they are merged (override takes precedence).
    /// With neither present the result is an all-defaults config.
    pub async fn load_with_defaults(default_path: Option<&Path>, override_path: Option<&Path>) -> Result<Self> {
        let mut config_value = toml::Value::Table(toml::map::Map::new());

        if let Some(path) = default_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read default config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse default configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        if let Some(path) = override_path {
            if path.exists() {
                let data = tokio::fs::read_to_string(path).await
                    .with_context(|| format!("Failed to read override config: {}", path.display()))?;
                let val: toml::Value = toml::from_str(&data)
                    .context("Failed to parse override configuration")?;
                merge_toml(&mut config_value, val);
            }
        }

        let cfg: Config = config_value.try_into().context("Failed to parse merged configuration")?;
        Ok(cfg)
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn news(&self) -> NewsConfig {
        self.news.clone().unwrap_or_default()
    }

    pub fn inference(&self) -> InferenceConfig {
        self.inference.clone().unwrap_or_default()
    }

    pub fn batch(&self) -> BatchConfig {
        self.batch.clone().unwrap_or_default()
    }
}

fn merge_toml(a: &mut toml::Value, b: toml::Value) {
    match (a, b) {
        (toml::Value::Table(a_map), toml::Value::Table(b_map)) => {
            for (k, v) in b_map {
                if let Some(a_val) = a_map.get_mut(&k) {
                    merge_toml(a_val, v);
                } else {
                    a_map.insert(k, v);
                }
            }
        }
        (a_val, b_val) => *a_val = b_val,
    }
}

/// Read a credential from the named environment variable.
///
/// Unset, empty and whitespace-only values all count as missing.
pub fn read_secret(env_name: &str) -> Option<String> {
    std::env::var(env_name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
