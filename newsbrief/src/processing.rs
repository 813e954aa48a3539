use chrono::Utc;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::error::BriefingError;
use crate::llm::remote::RemoteLlmProvider;
use crate::llm::summarizer::{Summarizer, SummarizerSettings};
use crate::models::{NewsResponse, RawArticle, StyleMode, SummarizedArticle};
use crate::news::{self, ArticleSource};
use common::{BatchConfig, Config};

pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_secs(1);

/// Fan-out width and pacing for the summarization calls
#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub size: usize,
    /// Sleep between consecutive batches (not after the last one)
    pub pause: Duration,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            size: DEFAULT_BATCH_SIZE,
            pause: DEFAULT_BATCH_PAUSE,
        }
    }
}

impl BatchSettings {
    pub fn from_config(cfg: &BatchConfig) -> Self {
        Self {
            size: cfg.size.unwrap_or(DEFAULT_BATCH_SIZE),
            pause: cfg
                .pause_millis
                .map(Duration::from_millis)
                .unwrap_or(DEFAULT_BATCH_PAUSE),
        }
    }
}

/// Summarize every article, `settings.size` at a time, in input order.
///
/// Members of a batch run concurrently; batches run one after another with
/// `settings.pause` in between to stay under the inference API's rate limit.
pub async fn summarize_all(
    summarizer: &Summarizer,
    articles: &[RawArticle],
    style: StyleMode,
    settings: &BatchSettings,
) -> Vec<SummarizedArticle> {
    if articles.is_empty() {
        return Vec::new();
    }

    let batch_size = settings.size.max(1);
    let batch_count = articles.len().div_ceil(batch_size);
    info!("Summarizing {} articles in {} batches of up to {}", articles.len(), batch_count, batch_size);

    let mut summarized = Vec::with_capacity(articles.len());
    for (index, batch) in articles.chunks(batch_size).enumerate() {
        // join_all yields results in submission order, whatever the completion order
        let results = join_all(batch.iter().map(|article| summarizer.summarize(article, style))).await;
        summarized.extend(results);

        if index + 1 < batch_count && !settings.pause.is_zero() {
            tokio::time::sleep(settings.pause).await;
        }
    }

    summarized
}

/// Whole request pipeline: fetch, rank, summarize.
pub struct Briefing {
    source: Arc<dyn ArticleSource>,
    summarizer: Summarizer,
    batch: BatchSettings,
}

impl Briefing {
    pub fn new(source: Arc<dyn ArticleSource>, summarizer: Summarizer, batch: BatchSettings) -> Self {
        Self {
            source,
            summarizer,
            batch,
        }
    }

    /// Wire the configured source and the remote inference provider.
    /// Fails before any network traffic when a credential is missing.
    pub fn from_config(config: &Config) -> Result<Self, BriefingError> {
        let source = news::create_article_source(&config.news())?;
        let inference = config.inference();
        let provider = RemoteLlmProvider::from_config(&inference)?;
        let summarizer = Summarizer::new(Arc::new(provider), SummarizerSettings::from_config(&inference));

        Ok(Self::new(
            Arc::from(source),
            summarizer,
            BatchSettings::from_config(&config.batch()),
        ))
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Build a briefing in `style`. An empty fetch is reported as `NoArticles`.
    pub async fn generate(&self, style: StyleMode) -> Result<NewsResponse, BriefingError> {
        let articles = self.source.fetch_articles().await?;
        if articles.is_empty() {
            return Err(BriefingError::NoArticles);
        }

        info!(source = self.source.name(), style = %style, "fetched {} articles", articles.len());
        let summarized = summarize_all(&self.summarizer, &articles, style, &self.batch).await;

        Ok(NewsResponse {
            style,
            articles: summarized,
            generated_at: Utc::now(),
        })
    }
}
