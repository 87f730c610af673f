//! Core trait abstractions.
//!
//! - [`generator::TextGenerator`] - one outbound call to the remote classifier
//! - [`fetcher::PageFetcher`] - one outbound page request
//! - [`source::FeedbackSource`] - stored feedback supplied by the application

pub mod fetcher;
pub mod generator;
pub mod source;
