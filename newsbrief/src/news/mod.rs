use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::BriefingError;
use crate::models::RawArticle;
use common::NewsConfig;

pub mod gnews;
pub mod newsapi;

pub const USER_AGENT: &str = "Newsbrief/0.1.0";

/// Output cap applied after deduplication and sorting
pub const DEFAULT_MAX_ARTICLES: usize = 15;
pub const DEFAULT_MAX_PER_TOPIC: usize = 5;
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// A search API queried across a fixed topic list.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    fn name(&self) -> &str;

    /// Fetch, deduplicate (by url, first occurrence wins), sort newest first
    /// and cap the list. A failed topic is logged and skipped; the only error
    /// is a missing credential.
    async fn fetch_articles(&self) -> Result<Vec<RawArticle>, BriefingError>;
}

/// Build the configured source ("gnews" unless `news.provider` says otherwise).
pub fn create_article_source(cfg: &NewsConfig) -> Result<Box<dyn ArticleSource>, BriefingError> {
    let provider = cfg.provider.as_deref().unwrap_or("gnews");
    match provider {
        "gnews" => Ok(Box::new(gnews::GNewsSource::from_config(cfg)?)),
        "newsapi" => Ok(Box::new(newsapi::NewsApiSource::from_config(cfg)?)),
        other => Err(BriefingError::Configuration(format!(
            "unknown news provider '{}' (expected 'gnews' or 'newsapi')",
            other
        ))),
    }
}

/// Search response shape shared by GNews and NewsAPI
#[derive(Debug, Deserialize)]
pub(crate) struct SearchResponse {
    #[serde(default)]
    pub articles: Vec<ApiArticle>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ApiArticle {
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub published_at: Option<String>,
    pub source: Option<ApiSource>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ApiSource {
    pub name: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Normalize one API result. `now` stands in for a missing or unparseable publish time.
pub(crate) fn normalize(article: ApiArticle, now: DateTime<Utc>) -> RawArticle {
    let published_at = article
        .published_at
        .as_deref()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or(now);

    RawArticle {
        title: article.title.unwrap_or_default(),
        source: non_empty(article.source.and_then(|s| s.name)).unwrap_or_else(|| "Unknown".to_string()),
        url: article.url.unwrap_or_default(),
        content: non_empty(article.content)
            .or_else(|| non_empty(article.description))
            .unwrap_or_default(),
        published_at,
    }
}

/// Deduplicate by url keeping the first occurrence, stable-sort newest first, truncate to `cap`.
pub fn rank_articles(articles: Vec<RawArticle>, cap: usize) -> Vec<RawArticle> {
    let mut seen = HashSet::new();
    let mut unique: Vec<RawArticle> = articles
        .into_iter()
        .filter(|a| seen.insert(a.url.clone()))
        .collect();

    unique.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    unique.truncate(cap);
    unique
}

/// Run one search request per topic, in topic order, and merge whatever succeeded.
///
/// `build_request` supplies the provider-specific URL and query parameters for a topic.
pub(crate) async fn collect_topics<F>(
    source: &str,
    topics: &[String],
    timeout: Duration,
    build_request: F,
) -> Vec<RawArticle>
where
    F: Fn(&str) -> reqwest::RequestBuilder,
{
    let mut all_articles = Vec::new();

    for topic in topics {
        let topic = topic.trim();
        if topic.is_empty() {
            continue;
        }

        match query_topic(topic, timeout, &build_request).await {
            Ok(articles) => {
                info!(source, topic, count = articles.len(), "fetched topic");
                all_articles.extend(articles);
            }
            Err(e) => {
                warn!(source, "{}", e);
            }
        }
    }

    all_articles
}

async fn query_topic<F>(topic: &str, timeout: Duration, build_request: &F) -> Result<Vec<RawArticle>, BriefingError>
where
    F: Fn(&str) -> reqwest::RequestBuilder,
{
    let failed = |reason: String| BriefingError::SourceQuery {
        topic: topic.to_string(),
        reason,
    };

    let response = build_request(topic)
        .header(reqwest::header::USER_AGENT, USER_AGENT)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| failed(format!("request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("status {}", status)));
    }

    let body: SearchResponse = response
        .json()
        .await
        .map_err(|e| failed(format!("malformed response: {}", e)))?;

    let now = Utc::now();
    Ok(body.articles.into_iter().map(|a| normalize(a, now)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn article(url: &str, content: &str, minutes: i64) -> RawArticle {
        RawArticle {
            title: format!("title {}", url),
            source: "Test".to_string(),
            url: url.to_string(),
            content: content.to_string(),
            published_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
                + ChronoDuration::minutes(minutes),
        }
    }

    #[test]
    fn duplicate_urls_keep_first_occurrence() {
        let ranked = rank_articles(
            vec![article("a", "first", 0), article("b", "", 1), article("a", "second", 5)],
            DEFAULT_MAX_ARTICLES,
        );
        assert_eq!(ranked.len(), 2);
        let a = ranked.iter().find(|x| x.url == "a").unwrap();
        assert_eq!(a.content, "first");
    }

    #[test]
    fn sorted_newest_first_with_stable_ties() {
        let ranked = rank_articles(
            vec![
                article("old", "", 0),
                article("tie-1", "", 10),
                article("new", "", 20),
                article("tie-2", "", 10),
            ],
            DEFAULT_MAX_ARTICLES,
        );
        let urls: Vec<_> = ranked.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["new", "tie-1", "tie-2", "old"]);
        for pair in ranked.windows(2) {
            assert!(pair[0].published_at >= pair[1].published_at);
        }
    }

    #[test]
    fn output_is_capped_and_distinct() {
        let many: Vec<_> = (0..40)
            .map(|i| article(&format!("u{}", i % 25), "", i))
            .collect();
        let ranked = rank_articles(many, DEFAULT_MAX_ARTICLES);
        assert_eq!(ranked.len(), 15);
        let distinct: HashSet<_> = ranked.iter().map(|a| &a.url).collect();
        assert_eq!(distinct.len(), ranked.len());
    }

    #[test]
    fn empty_input_is_fine() {
        assert!(rank_articles(Vec::new(), DEFAULT_MAX_ARTICLES).is_empty());
    }

    #[test]
    fn normalize_applies_defaults() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap();
        let raw = normalize(
            ApiArticle {
                description: Some("from description".to_string()),
                content: Some("".to_string()),
                source: Some(ApiSource { name: None }),
                published_at: Some("not a date".to_string()),
                ..Default::default()
            },
            now,
        );

        assert_eq!(raw.title, "");
        assert_eq!(raw.source, "Unknown");
        assert_eq!(raw.url, "");
        assert_eq!(raw.content, "from description");
        assert_eq!(raw.published_at, now);
    }

    #[test]
    fn normalize_parses_publish_time() {
        let now = Utc::now();
        let raw = normalize(
            ApiArticle {
                title: Some("T".to_string()),
                url: Some("https://x.test/a".to_string()),
                content: Some("body".to_string()),
                published_at: Some("2025-03-04T05:06:07Z".to_string()),
                source: Some(ApiSource { name: Some("Wire".to_string()) }),
                ..Default::default()
            },
            now,
        );
        assert_eq!(raw.source, "Wire");
        assert_eq!(raw.content, "body");
        assert_eq!(raw.published_at, Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7).unwrap());
    }

    #[test]
    fn unknown_provider_is_a_configuration_error() {
        let cfg = NewsConfig {
            provider: Some("bing".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            create_article_source(&cfg),
            Err(BriefingError::Configuration(_))
        ));
    }
}
