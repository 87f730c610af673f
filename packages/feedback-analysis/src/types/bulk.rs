//! Batch summarization input and report types.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::classification::{FeedbackCategory, Sentiment};

/// One feedback entry to be summarized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackItem {
    pub rating: u8,
    pub message: String,
    pub is_positive: bool,
}

impl FeedbackItem {
    pub fn new(rating: u8, message: impl Into<String>, is_positive: bool) -> Self {
        Self {
            rating,
            message: message.into(),
            is_positive,
        }
    }
}

/// A stored feedback record supplied by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackRecord {
    pub rating: u8,
    pub message: String,
    pub is_positive: bool,
    pub created_at: DateTime<Utc>,
}

impl From<FeedbackRecord> for FeedbackItem {
    fn from(record: FeedbackRecord) -> Self {
        Self {
            rating: record.rating,
            message: record.message,
            is_positive: record.is_positive,
        }
    }
}

/// Aggregate tone of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OverallSentiment {
    Positive,
    Negative,
    Mixed,
}

impl FromStr for OverallSentiment {
    type Err = String;

    /// Case-insensitive. `neutral` is folded into `mixed`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "positive" => Ok(OverallSentiment::Positive),
            "negative" => Ok(OverallSentiment::Negative),
            "mixed" | "neutral" => Ok(OverallSentiment::Mixed),
            other => Err(format!("unknown overall sentiment: {}", other)),
        }
    }
}

impl fmt::Display for OverallSentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OverallSentiment::Positive => "positive",
            OverallSentiment::Negative => "negative",
            OverallSentiment::Mixed => "mixed",
        })
    }
}

/// Which path produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSource {
    /// Parsed from the remote classifier
    Ai,
    /// Computed locally from the input
    Heuristic,
}

/// Count of feedback for one (category, sentiment) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCount {
    pub category: FeedbackCategory,
    pub sentiment: Sentiment,
    pub count: u32,
}

/// Aggregate report over a batch of feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkReport {
    pub total_analyzed: u32,
    pub overall_sentiment: OverallSentiment,
    /// 0-100
    pub overall_score: u8,
    pub overall_summary: String,
    pub positive: u32,
    pub negative: u32,
    #[serde(default)]
    pub top_positive_points: Vec<String>,
    #[serde(default)]
    pub top_negative_points: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub category_breakdown: Vec<CategoryCount>,
    pub source: ReportSource,
}

impl BulkReport {
    /// Canonical report for an empty batch.
    pub fn empty() -> Self {
        Self {
            total_analyzed: 0,
            overall_sentiment: OverallSentiment::Mixed,
            overall_score: 50,
            overall_summary: "No feedback available to analyze yet.".to_string(),
            positive: 0,
            negative: 0,
            top_positive_points: Vec::new(),
            top_negative_points: Vec::new(),
            recommendations: Vec::new(),
            category_breakdown: Vec::new(),
            source: ReportSource::Heuristic,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_sentiment_folds_neutral() {
        assert_eq!("Neutral".parse::<OverallSentiment>(), Ok(OverallSentiment::Mixed));
        assert_eq!("positive".parse::<OverallSentiment>(), Ok(OverallSentiment::Positive));
        assert!("great".parse::<OverallSentiment>().is_err());
    }

    #[test]
    fn test_empty_report_shape() {
        let json = serde_json::to_value(BulkReport::empty()).unwrap();
        assert_eq!(json["totalAnalyzed"], 0);
        assert_eq!(json["overallSentiment"], "mixed");
        assert_eq!(json["source"], "heuristic");
    }

    #[test]
    fn test_record_into_item() {
        let record = FeedbackRecord {
            rating: 5,
            message: "Lovely".into(),
            is_positive: true,
            created_at: Utc::now(),
        };
        let item: FeedbackItem = record.into();
        assert_eq!(item, FeedbackItem::new(5, "Lovely", true));
    }
}
