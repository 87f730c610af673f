//! Per-item classification results.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Categorical tone of a piece of feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    Neutral,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Negative => "negative",
            Sentiment::Neutral => "neutral",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(Sentiment::Positive),
            "negative" => Ok(Sentiment::Negative),
            "neutral" => Ok(Sentiment::Neutral),
            other => Err(format!("unknown sentiment: {}", other)),
        }
    }
}

/// Topic a review is mostly about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum FeedbackCategory {
    Service,
    Quality,
    Price,
    Ambiance,
    Staff,
    Other,
}

impl FeedbackCategory {
    pub const ALL: [FeedbackCategory; 6] = [
        FeedbackCategory::Service,
        FeedbackCategory::Quality,
        FeedbackCategory::Price,
        FeedbackCategory::Ambiance,
        FeedbackCategory::Staff,
        FeedbackCategory::Other,
    ];

    /// Parse a label case-insensitively. Unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(label))
            .unwrap_or(FeedbackCategory::Other)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackCategory::Service => "Service",
            FeedbackCategory::Quality => "Quality",
            FeedbackCategory::Price => "Price",
            FeedbackCategory::Ambiance => "Ambiance",
            FeedbackCategory::Staff => "Staff",
            FeedbackCategory::Other => "Other",
        }
    }
}

impl fmt::Display for FeedbackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackCategory {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_label(s))
    }
}

/// Clamp a confidence or score into `[0, 100]`.
pub fn clamp_percent(value: i64) -> u8 {
    value.clamp(0, 100) as u8
}

/// Clamp a star rating into `[1, 5]`.
pub fn clamp_rating(value: i64) -> u8 {
    value.clamp(1, 5) as u8
}

/// Sentiment classification of a single feedback message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult {
    pub sentiment: Sentiment,

    /// Classifier certainty, 0-100
    pub confidence: u8,

    pub summary: String,

    #[serde(default)]
    pub key_points: Vec<String>,
}

impl ClassificationResult {
    /// Build a result, clamping confidence into range.
    pub fn new(
        sentiment: Sentiment,
        confidence: i64,
        summary: impl Into<String>,
        key_points: Vec<String>,
    ) -> Self {
        Self {
            sentiment,
            confidence: clamp_percent(confidence),
            summary: summary.into(),
            key_points,
        }
    }

    /// Canonical result for blank input.
    pub fn no_message() -> Self {
        Self::new(Sentiment::Neutral, 50, "No message provided", Vec::new())
    }
}

/// Classification of externally sourced text (imported reviews).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalClassification {
    #[serde(flatten)]
    pub classification: ClassificationResult,

    /// Star rating, 1-5
    pub rating: u8,

    pub is_positive: bool,

    pub category: FeedbackCategory,
}

impl ExternalClassification {
    /// Build a result, clamping the rating. `is_positive` defaults to
    /// `rating >= 4` when not given.
    pub fn new(
        classification: ClassificationResult,
        rating: i64,
        is_positive: Option<bool>,
        category: FeedbackCategory,
    ) -> Self {
        let rating = clamp_rating(rating);
        Self {
            classification,
            rating,
            is_positive: is_positive.unwrap_or(rating >= 4),
            category,
        }
    }

    /// Canonical result for blank input.
    pub fn no_text() -> Self {
        Self::new(
            ClassificationResult::new(Sentiment::Neutral, 50, "No text provided", Vec::new()),
            3,
            Some(false),
            FeedbackCategory::Other,
        )
    }
}

/// Rating implied by a sentiment when none was given.
pub fn default_rating(sentiment: Sentiment) -> i64 {
    match sentiment {
        Sentiment::Positive => 4,
        Sentiment::Negative => 2,
        Sentiment::Neutral => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentiment_parse_is_case_insensitive() {
        assert_eq!("Positive".parse::<Sentiment>(), Ok(Sentiment::Positive));
        assert_eq!(" NEGATIVE ".parse::<Sentiment>(), Ok(Sentiment::Negative));
        assert!("mixed".parse::<Sentiment>().is_err());
    }

    #[test]
    fn test_category_unknown_is_other() {
        assert_eq!(FeedbackCategory::from_label("staff"), FeedbackCategory::Staff);
        assert_eq!(FeedbackCategory::from_label("Parking"), FeedbackCategory::Other);
    }

    #[test]
    fn test_external_clamps_and_defaults_positivity() {
        let base = ClassificationResult::new(Sentiment::Positive, 140, "Great", vec![]);
        assert_eq!(base.confidence, 100);

        let high = ExternalClassification::new(base.clone(), 9, None, FeedbackCategory::Quality);
        assert_eq!(high.rating, 5);
        assert!(high.is_positive);

        let low = ExternalClassification::new(base, 0, None, FeedbackCategory::Quality);
        assert_eq!(low.rating, 1);
        assert!(!low.is_positive);
    }

    #[test]
    fn test_external_serializes_flat() {
        let json = serde_json::to_value(ExternalClassification::no_text()).unwrap();
        assert_eq!(json["sentiment"], "neutral");
        assert_eq!(json["isPositive"], false);
        assert_eq!(json["keyPoints"], serde_json::json!([]));
        assert_eq!(json["category"], "Other");
    }
}
