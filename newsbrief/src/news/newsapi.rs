use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use super::{collect_topics, rank_articles, ArticleSource};
use crate::error::BriefingError;
use crate::models::RawArticle;
use common::NewsConfig;

pub const DEFAULT_API_URL: &str = "https://newsapi.org/v2/everything";
pub const DEFAULT_API_KEY_ENV: &str = "NEWS_API_KEY";

pub const DEFAULT_TOPICS: [&str; 6] = [
    "artificial intelligence",
    "fintech",
    "technology",
    "startups",
    "cloud computing",
    "cryptocurrency",
];

/// NewsAPI `everything` endpoint. Alternate source, selected with `news.provider = "newsapi"`.
pub struct NewsApiSource {
    api_url: String,
    api_key: String,
    topics: Vec<String>,
    page_size: usize,
    max_articles: usize,
    timeout: Duration,
    client: Client,
}

impl NewsApiSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            topics: DEFAULT_TOPICS.iter().map(|t| t.to_string()).collect(),
            page_size: super::DEFAULT_MAX_PER_TOPIC,
            max_articles: super::DEFAULT_MAX_ARTICLES,
            timeout: Duration::from_secs(super::DEFAULT_TIMEOUT_SECS),
            client: Client::new(),
        }
    }

    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_topics(mut self, topics: Vec<String>) -> Self {
        self.topics = topics;
        self
    }

    pub fn with_limits(mut self, page_size: usize, max_articles: usize) -> Self {
        self.page_size = page_size;
        self.max_articles = max_articles.min(super::DEFAULT_MAX_ARTICLES);
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout = Duration::from_secs(timeout_secs);
        self
    }

    pub fn from_config(cfg: &NewsConfig) -> Result<Self, BriefingError> {
        let key_env = cfg.api_key_env.as_deref().unwrap_or(DEFAULT_API_KEY_ENV);
        let api_key = common::read_secret(key_env).ok_or_else(|| BriefingError::missing_credential(key_env))?;

        let mut source = Self::new(api_key)
            .with_limits(
                cfg.max_per_topic.unwrap_or(super::DEFAULT_MAX_PER_TOPIC),
                cfg.max_articles.unwrap_or(super::DEFAULT_MAX_ARTICLES),
            )
            .with_timeout(cfg.timeout_seconds.unwrap_or(super::DEFAULT_TIMEOUT_SECS));
        if let Some(url) = &cfg.api_url {
            BriefingError::check_endpoint("news.api_url", url)?;
            source = source.with_api_url(url);
        }
        if let Some(topics) = &cfg.topics {
            source = source.with_topics(topics.clone());
        }
        Ok(source)
    }
}

#[async_trait]
impl ArticleSource for NewsApiSource {
    fn name(&self) -> &str {
        "newsapi"
    }

    async fn fetch_articles(&self) -> Result<Vec<RawArticle>, BriefingError> {
        if self.api_key.trim().is_empty() {
            return Err(BriefingError::missing_credential(DEFAULT_API_KEY_ENV));
        }

        let page_size = self.page_size.to_string();
        let merged = collect_topics(self.name(), &self.topics, self.timeout, |topic| {
            self.client.get(&self.api_url).query(&[
                ("q", topic),
                ("language", "en"),
                ("sortBy", "publishedAt"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
        })
        .await;

        let fetched = merged.len();
        let ranked = rank_articles(merged, self.max_articles);
        info!(source = self.name(), fetched, kept = ranked.len(), "articles ranked");
        Ok(ranked)
    }
}
