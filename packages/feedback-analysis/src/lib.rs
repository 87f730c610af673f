//! Feedback Sentiment Analysis Library
//!
//! Classifies free-text customer feedback (submitted directly, imported from
//! external sources, or scraped from review and survey pages) with a remote
//! generative-text classifier, falling back to deterministic heuristics
//! whenever the classifier is unavailable or rate limited.
//!
//! # Usage
//!
//! ```rust,ignore
//! use feedback_analysis::{AnalysisConfig, FeedbackAnalyzer, FeedbackItem};
//!
//! let config = AnalysisConfig::from_env()?;
//! let analyzer = FeedbackAnalyzer::from_config(&config)?;
//!
//! // Inline: never blocks on classifier outages
//! let result = analyzer.classify_single("The pasta was amazing").await;
//!
//! // Batch report
//! let report = analyzer.summarize_bulk(&items).await;
//!
//! // User-triggered page scrape, failures reported in the result
//! let page = analyzer.extract_from_url("https://example.com/reviews", None).await;
//! ```
//!
//! # Modules
//!
//! - [`gateway`] - Classifier gateway with 429 retry and backoff
//! - [`fetchers`] - SSRF-guarded page fetching
//! - [`html`] - HTML to plain text
//! - [`heuristics`] - Lexicon fallbacks
//! - [`pipeline`] - Prompts, contracts and the analyzer
//! - [`traits`] - Core trait abstractions (TextGenerator, PageFetcher, FeedbackSource)
//! - [`types`] - Results, reports and configuration
//! - [`stores`] - Feedback source implementations
//! - [`security`] - Credential handling and SSRF protection
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod fetchers;
pub mod gateway;
pub mod heuristics;
pub mod html;
pub mod pipeline;
pub mod security;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "gemini")]
pub mod ai;

// Re-export core types at crate root
pub use error::{
    ConfigError, ExtractionErrorKind, ExtractionFailure, FetchError, GatewayFailure,
    MalformedResponse, SecurityError, SourceError,
};
pub use fetchers::{GuardedFetcher, HttpFetcher};
pub use gateway::ClassifierGateway;
pub use html::html_to_text;
pub use pipeline::FeedbackAnalyzer;
pub use security::{SecretString, UrlGuard};
pub use stores::MemoryFeedbackSource;
pub use traits::{
    fetcher::{FetchedPage, PageFetcher},
    generator::{GenerationError, GenerationRequest, TextGenerator},
    source::FeedbackSource,
};
pub use types::{
    bulk::{BulkReport, CategoryCount, FeedbackItem, FeedbackRecord, OverallSentiment, ReportSource},
    classification::{ClassificationResult, ExternalClassification, FeedbackCategory, Sentiment},
    config::{AnalysisConfig, AnalyzerConfig, FetchConfig, GatewayConfig, RetryPolicy},
    extraction::{ExtractedFeedback, ExtractionResult},
};

#[cfg(feature = "gemini")]
pub use ai::GeminiGenerator;
