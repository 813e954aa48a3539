use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use rocket::http::Status;
use rocket::local::asynchronous::Client;
use serde_json::Value;

use newsbrief::error::BriefingError;
use newsbrief::llm::summarizer::{Summarizer, SummarizerSettings};
use newsbrief::llm::{LlmProvider, LlmRequest, LlmResponse, SummarizeRequest};
use newsbrief::models::RawArticle;
use newsbrief::news::ArticleSource;
use newsbrief::processing::{BatchSettings, Briefing};
use newsbrief::server::{build_rocket, AppState};

enum SourceBehavior {
    Articles(Vec<RawArticle>),
    Empty,
    MissingKey,
}

struct StubSource(SourceBehavior);

#[async_trait]
impl ArticleSource for StubSource {
    fn name(&self) -> &str {
        "stub"
    }

    async fn fetch_articles(&self) -> Result<Vec<RawArticle>, BriefingError> {
        match &self.0 {
            SourceBehavior::Articles(articles) => Ok(articles.clone()),
            SourceBehavior::Empty => Ok(Vec::new()),
            SourceBehavior::MissingKey => Err(BriefingError::missing_credential("GNEWS_API_KEY")),
        }
    }
}

/// Summarizes everything and answers the reformat call with the requested style's bullets
struct StubProvider;

#[async_trait]
impl LlmProvider for StubProvider {
    async fn summarize(&self, _request: SummarizeRequest) -> anyhow::Result<String> {
        Ok("A raw summary.".to_string())
    }

    async fn generate(&self, request: LlmRequest) -> anyhow::Result<LlmResponse> {
        let content = if request.messages[0].content.contains("CEO") {
            "• Headline: Big move\n• Why it matters: Costs fall\n• Strategic implication: Reprice now"
        } else {
            "• What happened: A launch\n• Why it's interesting: It is open\n• What this unlocks: Cheaper apps"
        };
        Ok(LlmResponse {
            content: content.to_string(),
            model: request.model,
        })
    }
}

fn article(url: &str, hour: u32) -> RawArticle {
    RawArticle {
        title: format!("Title {}", url),
        source: "Wire".to_string(),
        url: url.to_string(),
        content: "Body".to_string(),
        published_at: Utc.with_ymd_and_hms(2025, 5, 1, hour, 0, 0).unwrap(),
    }
}

async fn client(behavior: SourceBehavior) -> Client {
    let summarizer = Summarizer::new(Arc::new(StubProvider), SummarizerSettings::default());
    let briefing = Briefing::new(
        Arc::new(StubSource(behavior)),
        summarizer,
        BatchSettings {
            size: 3,
            pause: Duration::ZERO,
        },
    );
    let rocket = build_rocket(AppState::new(Arc::new(briefing)), rocket::Config::figment());
    Client::tracked(rocket).await.expect("valid rocket instance")
}

#[tokio::test]
async fn health_reports_ok() {
    let client = client(SourceBehavior::Empty).await;

    let response = client.get("/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    assert_eq!(response.into_string().await.as_deref(), Some("OK"));
}

#[tokio::test]
async fn executive_briefing_shape() {
    let client = client(SourceBehavior::Articles(vec![
        article("https://news.test/newer", 10),
        article("https://news.test/older", 8),
    ]))
    .await;

    let response = client.get("/api/news?style=CEO").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["style"], "CEO");
    assert!(body["generatedAt"].is_string());

    let articles = body["articles"].as_array().expect("articles array");
    assert_eq!(articles.len(), 2);
    assert_eq!(articles[0]["url"], "https://news.test/newer");
    assert_eq!(articles[0]["source"], "Wire");
    assert!(articles[0]["publishedAt"].is_string());

    let summary = &articles[0]["summary"];
    assert_eq!(summary["headline"], "Big move");
    assert_eq!(summary["whyItMatters"], "Costs fall");
    assert_eq!(summary["strategicImplication"], "Reprice now");
    assert!(summary.get("whatHappened").is_none());
}

#[tokio::test]
async fn enthusiast_briefing_uses_title_as_headline() {
    let client = client(SourceBehavior::Articles(vec![article("https://news.test/a", 9)])).await;

    let response = client.get("/api/news?style=ENTHUSIAST").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["style"], "ENTHUSIAST");
    let summary = &body["articles"][0]["summary"];
    assert_eq!(summary["headline"], "Title https://news.test/a");
    assert_eq!(summary["whatHappened"], "A launch");
    assert_eq!(summary["whyInteresting"], "It is open");
    assert_eq!(summary["whatUnlocks"], "Cheaper apps");
    assert!(summary.get("whyItMatters").is_none());
}

#[tokio::test]
async fn style_defaults_to_ceo() {
    let client = client(SourceBehavior::Articles(vec![article("https://news.test/a", 9)])).await;

    let response = client.get("/api/news").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["style"], "CEO");
}

#[tokio::test]
async fn empty_style_falls_back_to_ceo() {
    let client = client(SourceBehavior::Articles(vec![article("https://news.test/a", 9)])).await;

    let response = client.get("/api/news?style=").dispatch().await;
    assert_eq!(response.status(), Status::Ok);

    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["style"], "CEO");
}

#[tokio::test]
async fn invalid_style_is_bad_request() {
    let client = client(SourceBehavior::Articles(vec![article("https://news.test/a", 9)])).await;

    let response = client.get("/api/news?style=ceo").dispatch().await;
    assert_eq!(response.status(), Status::BadRequest);

    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["error"], "Invalid style. Must be 'CEO' or 'ENTHUSIAST'");
}

#[tokio::test]
async fn no_articles_is_not_found() {
    let client = client(SourceBehavior::Empty).await;

    let response = client.get("/api/news?style=ENTHUSIAST").dispatch().await;
    assert_eq!(response.status(), Status::NotFound);

    let body: Value = response.into_json().await.expect("json body");
    assert_eq!(body["error"], "No articles found");
}

#[tokio::test]
async fn source_failure_is_internal_error() {
    let client = client(SourceBehavior::MissingKey).await;

    let response = client.get("/api/news").dispatch().await;
    assert_eq!(response.status(), Status::InternalServerError);

    let body: Value = response.into_json().await.expect("json body");
    assert!(body["error"].as_str().unwrap_or_default().contains("GNEWS_API_KEY"));
}
