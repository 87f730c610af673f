//! Prompts for the classifier.
//!
//! Every prompt asks for exactly one JSON object and embeds the JSON schema
//! of the contract it expects back.

use schemars::JsonSchema;

use super::contracts::{BulkContract, ExternalContract, PageContract, SingleContract};
use crate::html::truncate_chars;
use crate::types::bulk::FeedbackItem;

/// Prompt for classifying one customer message.
pub const SINGLE_PROMPT: &str = r#"You are a customer feedback analyst. Classify the sentiment of the customer message below.

Respond with exactly one JSON object and nothing else (no markdown, no code fences) matching this JSON schema:
{schema}

Rules:
- sentiment: "positive", "negative" or "neutral"
- confidence: integer from 0 to 100
- summary: one short sentence
- keyPoints: up to 3 short phrases taken from the message

Customer message:
{message}"#;

/// Prompt for classifying imported review text.
pub const EXTERNAL_PROMPT: &str = r#"You are a customer feedback analyst. The text below is a review imported from an external source.

Respond with exactly one JSON object and nothing else (no markdown, no code fences) matching this JSON schema:
{schema}

Rules:
- sentiment: "positive", "negative" or "neutral"
- confidence: integer from 0 to 100
- summary: one short sentence
- keyPoints: up to 3 short phrases
- rating: the star rating (1-5) the author would most likely give
- isPositive: true if the review is favorable overall
- category: one of "Service", "Quality", "Price", "Ambiance", "Staff", "Other"

Review text:
{text}"#;

/// Prompt for summarizing a batch of feedback.
pub const BULK_PROMPT: &str = r#"You are a customer feedback analyst. Summarize the {count} feedback entries below for the business owner.

Respond with exactly one JSON object and nothing else (no markdown, no code fences) matching this JSON schema:
{schema}

Rules:
- overallSentiment: "positive", "negative" or "mixed"
- overallScore: integer from 0 (all negative) to 100 (all positive)
- overallSummary: 2-3 sentences
- positive / negative: number of positive and negative entries
- topPositivePoints / topNegativePoints: up to 5 recurring themes each
- recommendations: up to 5 concrete, actionable suggestions
- categoryBreakdown: counts per category ("Service", "Quality", "Price", "Ambiance", "Staff", "Other") and sentiment

Feedback entries (rating out of 5, polarity, message):
{entries}"#;

/// Prompt for extracting feedback from a scraped page.
pub const PAGE_PROMPT: &str = r#"You are a customer feedback analyst. The text below was scraped from a review or survey page at {url}.

Find every individual piece of customer feedback on the page and analyze them. Ignore navigation, ads and boilerplate. If the page contains no feedback, return totalFound 0 and an empty feedbacks array.

Respond with exactly one JSON object and nothing else (no markdown, no code fences) matching this JSON schema:
{schema}

Rules:
- feedbacks: each entry has the original text, sentiment ("positive", "negative" or "neutral"), rating (1-5) and a one-sentence summary
- totalFound: number of feedback entries found
- overallSentiment: "positive", "negative" or "mixed"
- overallScore: integer from 0 to 100
- positiveCount / negativeCount: number of positive and negative entries
- topPositivePoints / topNegativePoints / recommendations: up to 5 each
- platformName: the review platform or site name, if recognizable

Page text:
{content}"#;

/// Pretty JSON schema for a contract type.
pub fn schema_json<T: JsonSchema>() -> String {
    let schema = schemars::schema_for!(T);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

/// Format the single-message prompt.
pub fn format_single_prompt(message: &str) -> String {
    SINGLE_PROMPT
        .replace("{schema}", &schema_json::<SingleContract>())
        .replace("{message}", message.trim())
}

/// Format the external-text prompt.
pub fn format_external_prompt(text: &str) -> String {
    EXTERNAL_PROMPT
        .replace("{schema}", &schema_json::<ExternalContract>())
        .replace("{text}", text.trim())
}

/// Format the bulk prompt. Each message is cut to `max_message_chars`.
pub fn format_bulk_prompt(items: &[FeedbackItem], max_message_chars: usize) -> String {
    let entries = items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            format!(
                "{}. [{}/5, {}] {}",
                i + 1,
                item.rating,
                if item.is_positive { "positive" } else { "negative" },
                truncate_chars(item.message.trim(), max_message_chars).replace('\n', " ")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    BULK_PROMPT
        .replace("{count}", &items.len().to_string())
        .replace("{schema}", &schema_json::<BulkContract>())
        .replace("{entries}", &entries)
}

/// Format the page extraction prompt.
///
/// The URL and the page text are each substituted once, so neither can
/// expand a placeholder carried by the other.
pub fn format_page_prompt(url: &str, content: &str) -> String {
    let template = PAGE_PROMPT.replace("{schema}", &schema_json::<PageContract>());
    match template.split_once("{content}") {
        Some((head, tail)) => format!(
            "{}{}{}",
            head.replace("{url}", url),
            content,
            tail.replace("{url}", url)
        ),
        None => template.replace("{url}", url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_prompt_embeds_schema_and_message() {
        let prompt = format_single_prompt("  The soup was cold  ");
        assert!(prompt.contains("The soup was cold"));
        assert!(prompt.contains("\"keyPoints\""));
        assert!(!prompt.contains("{schema}"));
    }

    #[test]
    fn test_bulk_prompt_caps_message_length() {
        let long = "x".repeat(900);
        let items = vec![
            FeedbackItem::new(5, "Great\nstaff", true),
            FeedbackItem::new(1, long, false),
        ];
        let prompt = format_bulk_prompt(&items, 500);

        assert!(prompt.contains("1. [5/5, positive] Great staff"));
        assert!(prompt.contains(&format!("2. [1/5, negative] {}", "x".repeat(500))));
        assert!(!prompt.contains(&"x".repeat(501)));
        assert!(prompt.contains("the 2 feedback entries"));
    }

    #[test]
    fn test_placeholders_in_user_text_are_not_expanded() {
        let prompt = format_page_prompt("https://example.com", "see {schema} here");
        assert!(prompt.ends_with("see {schema} here"));
    }

    #[test]
    fn test_page_url_and_content_do_not_cross_expand() {
        let prompt = format_page_prompt("https://example.com/{content}", "Body mentions {url}");

        assert!(prompt.contains("page at https://example.com/{content}."));
        assert!(prompt.ends_with("Body mentions {url}"));
        assert_eq!(prompt.matches("Body mentions").count(), 1);
    }
}
