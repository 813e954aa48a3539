//! Style-specific instructions for the reformatting model, and the parser
//! that reads the bulleted answer back.
//!
//! The bullet labels below are shared by both halves: the prompt asks for
//! `• <Label>: <content>` lines and the parser looks for exactly those labels.

use regex::Regex;
use std::sync::LazyLock;

use crate::models::{EnthusiastSummary, ExecutiveSummary, StructuredSummary, StyleMode};

pub const HEADLINE: &str = "Headline";
pub const WHY_IT_MATTERS: &str = "Why it matters";
pub const STRATEGIC_IMPLICATION: &str = "Strategic implication";

pub const WHAT_HAPPENED: &str = "What happened";
pub const WHY_INTERESTING: &str = "Why it's interesting";
pub const WHAT_UNLOCKS: &str = "What this unlocks";

/// Bullet labels requested (and parsed) for a style, in output order
pub fn labels(style: StyleMode) -> [&'static str; 3] {
    match style {
        StyleMode::Executive => [HEADLINE, WHY_IT_MATTERS, STRATEGIC_IMPLICATION],
        StyleMode::Enthusiast => [WHAT_HAPPENED, WHY_INTERESTING, WHAT_UNLOCKS],
    }
}

/// System prompt for the reformatting model.
pub fn system_prompt(style: StyleMode) -> String {
    match style {
        StyleMode::Executive => format!(
            r#"You are a strategic business advisor writing a daily news briefing for a CEO.

Your writing style:
- Strategic, concise, executive tone
- Focus on business impact, risks, and opportunities
- No hype, minimal jargon
- Direct and actionable insights

For each article, provide a summary in this exact format:
• {}: A clear, executive-friendly headline
• {}: 1-2 sentences on business impact
• {}: 1-2 sentences on what this means strategically

Keep each section concise. Total reading time should be under 30 seconds per article."#,
            HEADLINE, WHY_IT_MATTERS, STRATEGIC_IMPLICATION
        ),
        StyleMode::Enthusiast => format!(
            r#"You are a tech enthusiast writing a daily news briefing for fellow builders and tech enthusiasts.

Your writing style:
- Curious, insightful, slightly informal
- Focus on how it works, why it's interesting, what builders should care about
- Technical depth without being overwhelming
- Engaging and conversational

For each article, provide a summary in this exact format:
• {}: A clear explanation of the news
• {}: 1-2 sentences on what makes this noteworthy
• {}: 1-2 sentences on potential implications or opportunities

Keep each section concise. Total reading time should be under 30 seconds per article."#,
            WHAT_HAPPENED, WHY_INTERESTING, WHAT_UNLOCKS
        ),
    }
}

/// `• Label: text` up to the next bullet, newline or end of input.
/// Case-insensitive; tolerates markdown bold around the label and a typographic apostrophe.
fn label_pattern(label: &str) -> Regex {
    let label = regex::escape(label).replace('\'', "['’]");
    Regex::new(&format!(
        r"(?i)•[ \t]*\**[ \t]*{}\**[ \t]*:[ \t]*\**[ \t]*([^•\n]*)",
        label
    ))
    .unwrap()
}

static EXECUTIVE_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| labels(StyleMode::Executive).map(label_pattern));
static ENTHUSIAST_PATTERNS: LazyLock<[Regex; 3]> = LazyLock::new(|| labels(StyleMode::Enthusiast).map(label_pattern));

fn capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Parse model output for `style`. Missing sections come back as `None`
/// and a missing headline as an empty string; nothing here fails.
///
/// The enthusiast format has no headline bullet, so its headline is always empty.
pub fn parse_summary(style: StyleMode, text: &str) -> StructuredSummary {
    match style {
        StyleMode::Executive => {
            let [headline, why, strategic] = &*EXECUTIVE_PATTERNS;
            StructuredSummary::Executive(ExecutiveSummary {
                headline: capture(headline, text).unwrap_or_default(),
                why_it_matters: capture(why, text),
                strategic_implication: capture(strategic, text),
            })
        }
        StyleMode::Enthusiast => {
            let [happened, interesting, unlocks] = &*ENTHUSIAST_PATTERNS;
            StructuredSummary::Enthusiast(EnthusiastSummary {
                headline: String::new(),
                what_happened: capture(happened, text),
                why_interesting: capture(interesting, text),
                what_unlocks: capture(unlocks, text),
            })
        }
    }
}
