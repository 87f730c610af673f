//! Page extraction results.

use serde::{Deserialize, Serialize};

use super::bulk::OverallSentiment;
use super::classification::Sentiment;
use crate::error::{ExtractionErrorKind, ExtractionFailure};

/// One feedback item found on a scraped page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedFeedback {
    pub text: String,
    pub sentiment: Sentiment,
    /// 1-5
    pub rating: u8,
    pub summary: String,
}

/// Outcome of scraping and classifying a review/survey page.
///
/// Failures are represented in-band (`success: false`) so the caller can
/// render them to the user who triggered the scrape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub success: bool,
    pub platform_name: String,
    pub source_url: String,
    pub total_found: u32,
    pub overall_sentiment: OverallSentiment,
    /// 0-100
    pub overall_score: u8,
    pub overall_summary: String,
    pub feedbacks: Vec<ExtractedFeedback>,
    pub top_positive_points: Vec<String>,
    pub top_negative_points: Vec<String>,
    pub recommendations: Vec<String>,
    pub positive_count: u32,
    pub negative_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ExtractionErrorKind>,
    /// Start of the extracted text, for manual inspection after a failure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_preview: Option<String>,
}

impl ExtractionResult {
    /// Build a failed result with no feedback.
    pub fn failure(
        platform_name: impl Into<String>,
        source_url: impl Into<String>,
        failure: &ExtractionFailure,
        content_preview: Option<String>,
    ) -> Self {
        Self {
            success: false,
            platform_name: platform_name.into(),
            source_url: source_url.into(),
            total_found: 0,
            overall_sentiment: OverallSentiment::Mixed,
            overall_score: 0,
            overall_summary: String::new(),
            feedbacks: Vec::new(),
            top_positive_points: Vec::new(),
            top_negative_points: Vec::new(),
            recommendations: Vec::new(),
            positive_count: 0,
            negative_count: 0,
            error: Some(failure.user_message()),
            error_kind: Some(failure.kind()),
            content_preview,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_has_no_feedback() {
        let failure = ExtractionFailure::ContentTooSparse { length: 5 };
        let result = ExtractionResult::failure("Yelp", "https://yelp.com/x", &failure, None);

        assert!(!result.success);
        assert!(result.feedbacks.is_empty());
        assert_eq!(result.error_kind, Some(ExtractionErrorKind::ContentTooSparse));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["errorKind"], "contentTooSparse");
        assert!(json.get("contentPreview").is_none());
    }
}
