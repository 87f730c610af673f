//! The analyzer - main entry point for feedback classification.
//!
//! Four operations, all total: they always return a result value and never
//! an `Err`. Inline operations (single messages, imported text, batches)
//! degrade to the lexicon heuristics; page extraction is user-triggered and
//! reports failures in-band so they can be shown to the user.

use tracing::{debug, error, info, warn};

use super::contracts::{BulkContract, ExternalContract, PageContract, SingleContract};
use super::parse::parse_json;
use super::prompts::{
    format_bulk_prompt, format_external_prompt, format_page_prompt, format_single_prompt,
};
use crate::error::{ExtractionFailure, FetchResult};
use crate::fetchers::GuardedFetcher;
use crate::gateway::ClassifierGateway;
use crate::heuristics::{fallback_bulk, fallback_classification, fallback_external};
use crate::html::{html_to_text, truncate_chars};
use crate::traits::{fetcher::PageFetcher, generator::TextGenerator, source::FeedbackSource};
use crate::types::{
    bulk::{BulkReport, FeedbackItem},
    classification::{ClassificationResult, ExternalClassification},
    config::AnalyzerConfig,
    extraction::ExtractionResult,
};

/// Feedback analyzer over a classifier gateway and a page fetcher.
///
/// # Example
///
/// ```rust,ignore
/// let analyzer = FeedbackAnalyzer::new(gateway, HttpFetcher::new(&FetchConfig::default())?);
///
/// let result = analyzer.classify_single("The soup was cold").await;
/// let report = analyzer.summarize_bulk(&items).await;
/// let page = analyzer.extract_from_url("https://example.com/reviews", Some("Yelp")).await;
/// ```
pub struct FeedbackAnalyzer<G: TextGenerator, F: PageFetcher> {
    gateway: ClassifierGateway<G>,
    fetcher: GuardedFetcher<F>,
    config: AnalyzerConfig,
}

impl<G: TextGenerator, F: PageFetcher> FeedbackAnalyzer<G, F> {
    /// Create an analyzer. `fetcher` is wrapped in the default URL guard.
    pub fn new(gateway: ClassifierGateway<G>, fetcher: F) -> Self {
        Self::with_config(gateway, fetcher, AnalyzerConfig::default())
    }

    /// Create with custom configuration.
    pub fn with_config(gateway: ClassifierGateway<G>, fetcher: F, config: AnalyzerConfig) -> Self {
        Self {
            gateway,
            fetcher: GuardedFetcher::new(fetcher),
            config,
        }
    }

    /// Create from an already-guarded fetcher.
    pub fn from_parts(
        gateway: ClassifierGateway<G>,
        fetcher: GuardedFetcher<F>,
        config: AnalyzerConfig,
    ) -> Self {
        Self {
            gateway,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn gateway(&self) -> &ClassifierGateway<G> {
        &self.gateway
    }

    // =========================================================================
    // Inline classification
    // =========================================================================

    /// Classify one feedback message.
    ///
    /// Runs inline with feedback submission, so it makes a single attempt
    /// and falls back to the lexicon on any failure.
    pub async fn classify_single(&self, message: &str) -> ClassificationResult {
        if message.trim().is_empty() {
            return ClassificationResult::no_message();
        }

        let prompt = format_single_prompt(message);
        let outcome = self
            .gateway
            .invoke(&prompt, self.config.single_max_tokens, &self.config.single_policy)
            .await;

        match outcome {
            Ok(text) => match parse_json::<SingleContract>(&text).and_then(|c| c.into_result()) {
                Ok(result) => {
                    debug!(sentiment = %result.sentiment, confidence = result.confidence, "Message classified");
                    result
                }
                Err(e) => {
                    warn!(error = %e, "Unusable classification, using fallback");
                    fallback_classification(message)
                }
            },
            Err(failure) => {
                warn!(reason = %failure, "Classifier unavailable, using fallback");
                fallback_classification(message)
            }
        }
    }

    /// Classify review text imported from an external source.
    pub async fn classify_external(&self, text: &str) -> ExternalClassification {
        if text.trim().is_empty() {
            return ExternalClassification::no_text();
        }

        let prompt = format_external_prompt(text);
        let outcome = self
            .gateway
            .invoke(&prompt, self.config.external_max_tokens, &self.config.retry_policy)
            .await;

        match outcome {
            Ok(reply) => match parse_json::<ExternalContract>(&reply).and_then(|c| c.into_result()) {
                Ok(result) => {
                    debug!(
                        sentiment = %result.classification.sentiment,
                        rating = result.rating,
                        category = %result.category,
                        "External text classified"
                    );
                    result
                }
                Err(e) => {
                    warn!(error = %e, "Unusable external classification, using fallback");
                    fallback_external(text)
                }
            },
            Err(failure) => {
                warn!(reason = %failure, "Classifier unavailable, using fallback");
                fallback_external(text)
            }
        }
    }

    // =========================================================================
    // Batch summaries
    // =========================================================================

    /// Summarize a batch of feedback.
    ///
    /// Only the first `max_bulk_items` entries are analyzed.
    pub async fn summarize_bulk(&self, items: &[FeedbackItem]) -> BulkReport {
        if items.is_empty() {
            return BulkReport::empty();
        }

        let items = if items.len() > self.config.max_bulk_items {
            warn!(
                received = items.len(),
                limit = self.config.max_bulk_items,
                "Bulk input over limit, truncating"
            );
            &items[..self.config.max_bulk_items]
        } else {
            items
        };

        info!(items = items.len(), "Summarizing feedback batch");

        let prompt = format_bulk_prompt(items, self.config.max_bulk_message_chars);
        let outcome = self
            .gateway
            .invoke(&prompt, self.config.bulk_max_tokens, &self.config.retry_policy)
            .await;

        match outcome {
            Ok(reply) => {
                match parse_json::<BulkContract>(&reply).and_then(|c| c.into_report(items)) {
                    Ok(report) => report,
                    Err(e) => {
                        warn!(error = %e, "Unusable bulk summary, computing locally");
                        fallback_bulk(items)
                    }
                }
            }
            Err(failure) => {
                warn!(reason = %failure, "Classifier unavailable, computing summary locally");
                fallback_bulk(items)
            }
        }
    }

    /// Summarize the most recent feedback held by `source`.
    pub async fn summarize_from_source<S>(&self, source: &S) -> BulkReport
    where
        S: FeedbackSource + ?Sized,
    {
        match source.recent_feedback(self.config.max_bulk_items).await {
            Ok(records) => {
                let items: Vec<FeedbackItem> = records.into_iter().map(Into::into).collect();
                self.summarize_bulk(&items).await
            }
            Err(e) => {
                error!(error = %e, "Failed to load feedback for summary");
                BulkReport::empty()
            }
        }
    }

    // =========================================================================
    // Page extraction
    // =========================================================================

    /// Scrape a review or survey page and classify the feedback on it.
    ///
    /// `platform_label` overrides the platform name reported by the
    /// classifier; without either, the URL host is used.
    pub async fn extract_from_url(&self, url: &str, platform_label: Option<&str>) -> ExtractionResult {
        let url = url.trim();
        let fallback_platform = platform_from_url(url);
        let failed_platform = platform_label
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .unwrap_or(fallback_platform.as_str());

        info!(url = %url, "Extracting feedback from page");

        let page = match self.fetcher.fetch(url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(url = %url, error = %e, "Page fetch failed");
                let failure = ExtractionFailure::from(e);
                return ExtractionResult::failure(failed_platform, url, &failure, None);
            }
        };

        let text = html_to_text(&page.html);
        let length = text.chars().count();
        let preview = || {
            Some(truncate_chars(&text, self.config.preview_chars).to_string())
                .filter(|p| !p.is_empty())
        };

        if length < self.config.min_page_chars {
            warn!(url = %url, length, "Page content too sparse");
            let failure = ExtractionFailure::ContentTooSparse { length };
            return ExtractionResult::failure(failed_platform, url, &failure, preview());
        }

        let content = truncate_chars(&text, self.config.max_page_chars);
        debug!(
            url = %url,
            html_bytes = page.html.len(),
            text_chars = length,
            prompt_chars = content.chars().count(),
            "Page text extracted"
        );

        let prompt = format_page_prompt(&page.url, content);
        let reply = match self
            .gateway
            .invoke(&prompt, self.config.extraction_max_tokens, &self.config.retry_policy)
            .await
        {
            Ok(reply) => reply,
            Err(failure) => {
                warn!(url = %url, reason = %failure, "Page classification failed");
                let failure = ExtractionFailure::from(failure);
                return ExtractionResult::failure(failed_platform, url, &failure, preview());
            }
        };

        match parse_json::<PageContract>(&reply) {
            Ok(contract) => {
                let result = contract.into_result(platform_label, &fallback_platform, url);
                info!(
                    url = %url,
                    platform = %result.platform_name,
                    total_found = result.total_found,
                    "Page extraction complete"
                );
                result
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Unusable page classification");
                let failure = ExtractionFailure::from(e);
                ExtractionResult::failure(failed_platform, url, &failure, preview())
            }
        }
    }

    /// Check that `url` is allowed and reachable. Returns the HEAD status.
    pub async fn check_url(&self, url: &str) -> FetchResult<u16> {
        self.fetcher.head(url.trim()).await
    }
}

/// Host of `url` without a leading `www.`, or `"Unknown"`.
fn platform_from_url(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()))
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, MockGenerator};
    use crate::types::classification::Sentiment;

    fn analyzer(generator: MockGenerator, fetcher: MockFetcher) -> FeedbackAnalyzer<MockGenerator, MockFetcher> {
        FeedbackAnalyzer::new(ClassifierGateway::new(generator), fetcher)
    }

    #[test]
    fn test_platform_from_url() {
        assert_eq!(platform_from_url("https://www.yelp.com/biz/x"), "yelp.com");
        assert_eq!(platform_from_url("not a url"), "Unknown");
    }

    #[tokio::test]
    async fn test_classify_single_parses_reply() {
        let generator = MockGenerator::new().with_reply(
            "```json\n{\"sentiment\": \"negative\", \"confidence\": 91, \"summary\": \"Cold soup\", \"keyPoints\": [\"cold\"]}\n```",
        );
        let analyzer = analyzer(generator.clone(), MockFetcher::new());

        let result = analyzer.classify_single("The soup was cold").await;
        assert_eq!(result.sentiment, Sentiment::Negative);
        assert_eq!(result.confidence, 91);
        assert_eq!(result.key_points, vec!["cold"]);
        assert!(generator.last_prompt().unwrap().contains("The soup was cold"));
        assert_eq!(generator.calls()[0].max_output_tokens, 512);
    }

    #[tokio::test]
    async fn test_classify_single_malformed_reply_falls_back() {
        let generator = MockGenerator::new().with_reply("I think it's positive!");
        let analyzer = analyzer(generator, MockFetcher::new());

        let result = analyzer.classify_single("Great food").await;
        assert_eq!(result, fallback_classification("Great food"));
    }

    #[tokio::test]
    async fn test_disabled_gateway_uses_fallbacks() {
        let analyzer: FeedbackAnalyzer<MockGenerator, MockFetcher> =
            FeedbackAnalyzer::new(ClassifierGateway::disabled(), MockFetcher::new());

        let external = analyzer.classify_external("Terrible service").await;
        assert_eq!(external, fallback_external("Terrible service"));

        let items = vec![FeedbackItem::new(4, "Nice", true)];
        let report = analyzer.summarize_bulk(&items).await;
        assert_eq!(report, fallback_bulk(&items));
    }

    #[tokio::test]
    async fn test_check_url_is_guarded() {
        let fetcher = MockFetcher::new().with_page("https://example.com/", "<p>hi</p>");
        let analyzer = analyzer(MockGenerator::new(), fetcher.clone());

        assert_eq!(analyzer.check_url(" https://example.com/ ").await.unwrap(), 200);
        assert!(analyzer.check_url("http://10.0.0.1/").await.is_err());
        assert_eq!(fetcher.call_count(), 1);
    }
}
