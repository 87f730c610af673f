//! Structured contracts exchanged with the classifier.
//!
//! Each contract is the JSON object a prompt asks for. The same types
//! generate the schema embedded in the prompt (`schemars`) and parse the
//! reply (`serde`, through the tolerant helpers in [`super::lenient`]).
//! Conversion into public result types applies defaults and clamps.

use schemars::JsonSchema;
use serde::Deserialize;

use super::lenient;
use crate::error::MalformedResponse;
use crate::heuristics::rating_score;
use crate::types::bulk::{BulkReport, CategoryCount, FeedbackItem, OverallSentiment, ReportSource};
use crate::types::classification::{
    clamp_percent, clamp_rating, default_rating, ClassificationResult, ExternalClassification,
    FeedbackCategory, Sentiment,
};
use crate::types::extraction::{ExtractedFeedback, ExtractionResult};

/// Reply to a single-message classification prompt.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SingleContract {
    #[serde(default, deserialize_with = "lenient::label")]
    pub sentiment: Option<Sentiment>,

    /// 0-100
    #[serde(default, deserialize_with = "lenient::integer")]
    pub confidence: Option<i64>,

    /// One sentence
    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub key_points: Vec<String>,
}

impl SingleContract {
    pub fn into_result(self) -> Result<ClassificationResult, MalformedResponse> {
        let sentiment = self
            .sentiment
            .ok_or_else(|| MalformedResponse("missing or invalid sentiment".into()))?;
        let summary = self
            .summary
            .ok_or_else(|| MalformedResponse("missing summary".into()))?;

        Ok(ClassificationResult::new(
            sentiment,
            self.confidence.unwrap_or(50),
            summary,
            self.key_points,
        ))
    }
}

/// Reply to an external-text classification prompt.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExternalContract {
    #[serde(flatten)]
    pub base: SingleContract,

    /// Star rating, 1-5
    #[serde(default, deserialize_with = "lenient::integer")]
    pub rating: Option<i64>,

    #[serde(default, deserialize_with = "lenient::boolean")]
    pub is_positive: Option<bool>,

    #[serde(default, deserialize_with = "lenient::label")]
    pub category: Option<FeedbackCategory>,
}

impl ExternalContract {
    pub fn into_result(self) -> Result<ExternalClassification, MalformedResponse> {
        let classification = self.base.into_result()?;
        let rating = self
            .rating
            .unwrap_or_else(|| default_rating(classification.sentiment));

        Ok(ExternalClassification::new(
            classification,
            rating,
            self.is_positive,
            self.category.unwrap_or(FeedbackCategory::Other),
        ))
    }
}

/// One row of a category breakdown.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCountContract {
    #[serde(default, deserialize_with = "lenient::label")]
    pub category: Option<FeedbackCategory>,

    #[serde(default, deserialize_with = "lenient::label")]
    pub sentiment: Option<Sentiment>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub count: Option<i64>,
}

/// Reply to a bulk summary prompt.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct BulkContract {
    #[serde(default, deserialize_with = "lenient::label")]
    pub overall_sentiment: Option<OverallSentiment>,

    /// 0-100
    #[serde(default, deserialize_with = "lenient::integer")]
    pub overall_score: Option<i64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub overall_summary: Option<String>,

    /// Number of positive entries
    #[serde(default, deserialize_with = "lenient::integer")]
    pub positive: Option<i64>,

    /// Number of negative entries
    #[serde(default, deserialize_with = "lenient::integer")]
    pub negative: Option<i64>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub top_positive_points: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub top_negative_points: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub recommendations: Vec<String>,

    #[serde(default, deserialize_with = "lenient::lossy_list")]
    pub category_breakdown: Vec<CategoryCountContract>,
}

impl BulkContract {
    /// Build the report for `items`, the batch that was sent.
    ///
    /// `totalAnalyzed` is always `items.len()`; parsed counts are clamped to
    /// it and missing counts are tallied from the input.
    pub fn into_report(self, items: &[FeedbackItem]) -> Result<BulkReport, MalformedResponse> {
        let overall_sentiment = self
            .overall_sentiment
            .ok_or_else(|| MalformedResponse("missing or invalid overallSentiment".into()))?;
        let overall_summary = self
            .overall_summary
            .ok_or_else(|| MalformedResponse("missing overallSummary".into()))?;

        let total = items.len() as u32;
        let clamp_count = |n: i64| n.clamp(0, total as i64) as u32;
        let tallied_positive = items.iter().filter(|i| i.is_positive).count() as u32;

        let positive = self.positive.map(clamp_count).unwrap_or(tallied_positive);
        // positive + negative never exceeds total
        let negative = self
            .negative
            .map(clamp_count)
            .unwrap_or(total - tallied_positive)
            .min(total - positive);

        let category_breakdown = self
            .category_breakdown
            .into_iter()
            .filter_map(|row| {
                Some(CategoryCount {
                    category: row.category.unwrap_or(FeedbackCategory::Other),
                    sentiment: row.sentiment?,
                    count: clamp_count(row.count?),
                })
            })
            .filter(|row| row.count > 0)
            .collect();

        Ok(BulkReport {
            total_analyzed: total,
            overall_sentiment,
            overall_score: self
                .overall_score
                .map(clamp_percent)
                .unwrap_or_else(|| rating_score(items)),
            overall_summary,
            positive,
            negative,
            top_positive_points: self.top_positive_points,
            top_negative_points: self.top_negative_points,
            recommendations: self.recommendations,
            category_breakdown,
            source: ReportSource::Ai,
        })
    }
}

/// One feedback entry found on a page.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageFeedbackContract {
    /// The feedback text as written on the page
    #[serde(default, deserialize_with = "lenient::text")]
    pub text: Option<String>,

    #[serde(default, deserialize_with = "lenient::label")]
    pub sentiment: Option<Sentiment>,

    /// Star rating, 1-5
    #[serde(default, deserialize_with = "lenient::integer")]
    pub rating: Option<i64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub summary: Option<String>,
}

impl PageFeedbackContract {
    /// Entries without text are dropped.
    fn into_feedback(self) -> Option<ExtractedFeedback> {
        let text = self.text?;
        let sentiment = match (self.sentiment, self.rating) {
            (Some(s), _) => s,
            (None, Some(r)) if r >= 4 => Sentiment::Positive,
            (None, Some(r)) if r <= 2 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        };
        let rating = clamp_rating(self.rating.unwrap_or_else(|| default_rating(sentiment)));
        let summary = self.summary.unwrap_or_else(|| text.clone());

        Some(ExtractedFeedback {
            text,
            sentiment,
            rating,
            summary,
        })
    }
}

/// Reply to a page extraction prompt.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageContract {
    /// Name of the review platform or site, if recognizable
    #[serde(default, deserialize_with = "lenient::text")]
    pub platform_name: Option<String>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub total_found: Option<i64>,

    #[serde(default, deserialize_with = "lenient::label")]
    pub overall_sentiment: Option<OverallSentiment>,

    /// 0-100
    #[serde(default, deserialize_with = "lenient::integer")]
    pub overall_score: Option<i64>,

    #[serde(default, deserialize_with = "lenient::text")]
    pub overall_summary: Option<String>,

    #[serde(default, deserialize_with = "lenient::lossy_list")]
    pub feedbacks: Vec<PageFeedbackContract>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub top_positive_points: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub top_negative_points: Vec<String>,

    #[serde(default, deserialize_with = "lenient::string_list")]
    pub recommendations: Vec<String>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub positive_count: Option<i64>,

    #[serde(default, deserialize_with = "lenient::integer")]
    pub negative_count: Option<i64>,
}

impl PageContract {
    /// Build a successful result. `platform_label` wins over the parsed
    /// platform name, which wins over `fallback_platform`.
    pub fn into_result(
        self,
        platform_label: Option<&str>,
        fallback_platform: &str,
        source_url: &str,
    ) -> ExtractionResult {
        let feedbacks: Vec<ExtractedFeedback> = self
            .feedbacks
            .into_iter()
            .filter_map(PageFeedbackContract::into_feedback)
            .collect();

        let found = feedbacks.len() as i64;
        let total_found = self
            .total_found
            .unwrap_or(found)
            .clamp(0, u32::MAX as i64) as u32;

        let tally = |sentiment: Sentiment| {
            feedbacks.iter().filter(|f| f.sentiment == sentiment).count() as i64
        };
        let positive_count = self
            .positive_count
            .unwrap_or_else(|| tally(Sentiment::Positive))
            .clamp(0, total_found.max(found as u32) as i64) as u32;
        let negative_count = self
            .negative_count
            .unwrap_or_else(|| tally(Sentiment::Negative))
            .clamp(0, total_found.max(found as u32) as i64) as u32;

        let overall_sentiment = self.overall_sentiment.unwrap_or({
            if positive_count > negative_count {
                OverallSentiment::Positive
            } else if negative_count > positive_count {
                OverallSentiment::Negative
            } else {
                OverallSentiment::Mixed
            }
        });

        let overall_score = match self.overall_score {
            Some(score) => clamp_percent(score),
            None if feedbacks.is_empty() => 50,
            None => {
                let mean = feedbacks.iter().map(|f| f.rating as f64).sum::<f64>()
                    / feedbacks.len() as f64;
                clamp_percent(((mean - 1.0) / 4.0 * 100.0).round() as i64)
            }
        };

        let overall_summary = self.overall_summary.unwrap_or_else(|| match total_found {
            0 => "No feedback found on this page.".to_string(),
            n => format!("Found {} feedback entries.", n),
        });

        let platform_name = platform_label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .or(self.platform_name)
            .unwrap_or_else(|| fallback_platform.to_string());

        ExtractionResult {
            success: true,
            platform_name,
            source_url: source_url.to_string(),
            total_found,
            overall_sentiment,
            overall_score,
            overall_summary,
            feedbacks,
            top_positive_points: self.top_positive_points,
            top_negative_points: self.top_negative_points,
            recommendations: self.recommendations,
            positive_count,
            negative_count,
            error: None,
            error_kind: None,
            content_preview: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::parse::parse_json;

    #[test]
    fn test_contract_schemas_generate() {
        let schema = schemars::schema_for!(SingleContract);
        assert!(schema.schema.object.is_some());
        let schema = schemars::schema_for!(PageContract);
        assert!(schema.schema.object.is_some());
    }

    #[test]
    fn test_single_defaults_and_clamps() {
        let contract: SingleContract =
            parse_json(r#"{"sentiment": "Positive", "confidence": "140", "summary": "Nice"}"#)
                .unwrap();
        let result = contract.into_result().unwrap();
        assert_eq!(result.sentiment, Sentiment::Positive);
        assert_eq!(result.confidence, 100);
        assert!(result.key_points.is_empty());

        let contract: SingleContract = parse_json(r#"{"sentiment": "neutral", "summary": "Ok"}"#).unwrap();
        assert_eq!(contract.into_result().unwrap().confidence, 50);
    }

    #[test]
    fn test_single_requires_sentiment_and_summary() {
        let contract: SingleContract = parse_json(r#"{"sentiment": "ecstatic", "summary": "x"}"#).unwrap();
        assert!(contract.into_result().is_err());

        let contract: SingleContract = parse_json(r#"{"sentiment": "positive"}"#).unwrap();
        assert!(contract.into_result().is_err());
    }

    #[test]
    fn test_external_rating_defaults() {
        let contract: ExternalContract = parse_json(
            r#"{"sentiment": "negative", "summary": "Meh", "category": "price"}"#,
        )
        .unwrap();
        let result = contract.into_result().unwrap();
        assert_eq!(result.rating, 2);
        assert!(!result.is_positive);
        assert_eq!(result.category, FeedbackCategory::Price);

        let contract: ExternalContract = parse_json(
            r#"{"sentiment": "positive", "summary": "Wow", "rating": 9, "category": "vibes"}"#,
        )
        .unwrap();
        let result = contract.into_result().unwrap();
        assert_eq!(result.rating, 5);
        assert!(result.is_positive);
        assert_eq!(result.category, FeedbackCategory::Other);
    }

    #[test]
    fn test_bulk_counts_clamped_to_total() {
        let items = vec![
            FeedbackItem::new(5, "Great", true),
            FeedbackItem::new(2, "Slow", false),
        ];
        let contract: BulkContract = parse_json(
            r#"{
                "overallSentiment": "neutral",
                "overallScore": 61.2,
                "overallSummary": "Mixed bag",
                "positive": 40,
                "negative": -3,
                "categoryBreakdown": [
                    {"category": "Service", "sentiment": "negative", "count": 1},
                    {"category": "Staff", "count": 2},
                    "garbage"
                ]
            }"#,
        )
        .unwrap();
        let report = contract.into_report(&items).unwrap();

        assert_eq!(report.total_analyzed, 2);
        assert_eq!(report.overall_sentiment, OverallSentiment::Mixed);
        assert_eq!(report.overall_score, 61);
        assert_eq!(report.positive, 2);
        assert_eq!(report.negative, 0);
        assert_eq!(report.category_breakdown.len(), 1);
        assert_eq!(report.source, ReportSource::Ai);
    }

    #[test]
    fn test_bulk_missing_counts_use_tallies() {
        let items = vec![
            FeedbackItem::new(5, "Great", true),
            FeedbackItem::new(1, "Awful", false),
            FeedbackItem::new(1, "Bad", false),
        ];
        let contract: BulkContract =
            parse_json(r#"{"overallSentiment": "negative", "overallSummary": "Rough week"}"#).unwrap();
        let report = contract.into_report(&items).unwrap();

        assert_eq!(report.positive, 1);
        assert_eq!(report.negative, 2);
        assert_eq!(report.overall_score, rating_score(&items));
    }

    #[test]
    fn test_bulk_counts_never_exceed_total() {
        let items = vec![
            FeedbackItem::new(5, "Great", true),
            FeedbackItem::new(4, "Good", true),
            FeedbackItem::new(1, "Awful", false),
        ];
        let contract: BulkContract = parse_json(
            r#"{"overallSentiment": "positive", "overallSummary": "Mostly good", "positive": 2, "negative": 3}"#,
        )
        .unwrap();
        let report = contract.into_report(&items).unwrap();
        assert_eq!(report.positive, 2);
        assert_eq!(report.negative, 1);

        let contract: BulkContract = parse_json(
            r#"{"overallSentiment": "positive", "overallSummary": "Glowing", "positive": 3}"#,
        )
        .unwrap();
        let report = contract.into_report(&items).unwrap();
        assert_eq!(report.positive, 3);
        assert_eq!(report.negative, 0);
    }

    #[test]
    fn test_page_total_found_saturates() {
        let contract: PageContract =
            parse_json(r#"{"totalFound": 4294967296, "feedbacks": []}"#).unwrap();
        let result = contract.into_result(None, "host", "u");
        assert_eq!(result.total_found, u32::MAX);

        let contract: PageContract = parse_json(r#"{"totalFound": -4}"#).unwrap();
        assert_eq!(contract.into_result(None, "host", "u").total_found, 0);
    }

    #[test]
    fn test_page_defaults() {
        let contract: PageContract = parse_json(
            r#"{
                "platformName": "Yelp",
                "feedbacks": [
                    {"text": "Loved it", "rating": 12},
                    {"text": "Never again", "sentiment": "negative", "rating": "1"},
                    {"sentiment": "positive"}
                ]
            }"#,
        )
        .unwrap();
        let result = contract.into_result(None, "example.com", "https://example.com/r");

        assert!(result.success);
        assert_eq!(result.platform_name, "Yelp");
        assert_eq!(result.total_found, 2);
        assert_eq!(result.feedbacks[0].rating, 5);
        assert_eq!(result.feedbacks[0].sentiment, Sentiment::Positive);
        assert_eq!(result.feedbacks[1].rating, 1);
        assert_eq!(result.positive_count, 1);
        assert_eq!(result.negative_count, 1);
        assert_eq!(result.overall_sentiment, OverallSentiment::Mixed);
    }

    #[test]
    fn test_page_platform_precedence() {
        let contract: PageContract = parse_json(r#"{"platformName": "Yelp", "feedbacks": []}"#).unwrap();
        let labelled = contract.clone().into_result(Some("My Survey"), "host", "u");
        assert_eq!(labelled.platform_name, "My Survey");

        let blank_label = contract.into_result(Some("  "), "host", "u");
        assert_eq!(blank_label.platform_name, "Yelp");

        let contract: PageContract = parse_json(r#"{"totalFound": 0}"#).unwrap();
        let unnamed = contract.into_result(None, "host", "u");
        assert_eq!(unnamed.platform_name, "host");
        assert!(unnamed.success);
        assert_eq!(unnamed.total_found, 0);
        assert_eq!(unnamed.overall_score, 50);
    }
}
