use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::BriefingError;

/// Normalized article as produced by an article source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawArticle {
    pub title: String,
    pub source: String,
    /// Deduplication key across all topics and sources
    pub url: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
}

/// Briefing style. Selects both the prompt and the summary shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StyleMode {
    #[serde(rename = "CEO")]
    Executive,
    #[serde(rename = "ENTHUSIAST")]
    Enthusiast,
}

impl StyleMode {
    /// Public wire name, as accepted by the `style` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleMode::Executive => "CEO",
            StyleMode::Enthusiast => "ENTHUSIAST",
        }
    }
}

impl fmt::Display for StyleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleMode {
    type Err = BriefingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CEO" => Ok(StyleMode::Executive),
            "ENTHUSIAST" => Ok(StyleMode::Enthusiast),
            other => Err(BriefingError::InvalidStyle(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutiveSummary {
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_it_matters: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategic_implication: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnthusiastSummary {
    pub headline: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_happened: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub why_interesting: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub what_unlocks: Option<String>,
}

/// Style-shaped summary. Optional fields are `None` when the section could not
/// be located in model output; callers skip them when rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum StructuredSummary {
    Executive(ExecutiveSummary),
    Enthusiast(EnthusiastSummary),
}

impl StructuredSummary {
    pub fn style(&self) -> StyleMode {
        match self {
            StructuredSummary::Executive(_) => StyleMode::Executive,
            StructuredSummary::Enthusiast(_) => StyleMode::Enthusiast,
        }
    }

    pub fn headline(&self) -> &str {
        match self {
            StructuredSummary::Executive(s) => &s.headline,
            StructuredSummary::Enthusiast(s) => &s.headline,
        }
    }

    /// Replace an empty headline with `fallback`.
    pub fn fill_headline(&mut self, fallback: &str) {
        let headline = match self {
            StructuredSummary::Executive(s) => &mut s.headline,
            StructuredSummary::Enthusiast(s) => &mut s.headline,
        };
        if headline.trim().is_empty() {
            *headline = fallback.to_string();
        }
    }

    /// Minimal summary: the headline plus one text block in the style's leading section.
    pub fn minimal(style: StyleMode, headline: &str, text: String) -> Self {
        match style {
            StyleMode::Executive => StructuredSummary::Executive(ExecutiveSummary {
                headline: headline.to_string(),
                why_it_matters: Some(text),
                strategic_implication: None,
            }),
            StyleMode::Enthusiast => StructuredSummary::Enthusiast(EnthusiastSummary {
                headline: headline.to_string(),
                what_happened: Some(text),
                why_interesting: None,
                what_unlocks: None,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummarizedArticle {
    pub title: String,
    pub source: String,
    pub url: String,
    pub published_at: DateTime<Utc>,
    pub summary: StructuredSummary,
}

impl SummarizedArticle {
    pub fn new(article: &RawArticle, summary: StructuredSummary) -> Self {
        Self {
            title: article.title.clone(),
            source: article.source.clone(),
            url: article.url.clone(),
            published_at: article.published_at,
            summary,
        }
    }
}

/// Payload of `GET /api/news`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsResponse {
    pub style: StyleMode,
    pub articles: Vec<SummarizedArticle>,
    pub generated_at: DateTime<Utc>,
}
