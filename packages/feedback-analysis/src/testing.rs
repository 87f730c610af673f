//! Testing utilities including mock implementations.
//!
//! These let applications exercise the analysis pipeline without making
//! real classifier or network calls.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{FetchError, FetchResult};
use crate::traits::{
    fetcher::{FetchedPage, PageFetcher},
    generator::{GenerationError, GenerationRequest, TextGenerator},
};

/// Record of a call made to the mock generator.
#[derive(Debug, Clone)]
pub struct MockGeneratorCall {
    pub prompt: String,
    pub max_output_tokens: u32,
    /// Tokio clock time, so paused-clock tests see backoff exactly
    pub at: Instant,
}

/// A scripted text generator.
///
/// Replies are consumed in order; once the script is empty the fallback
/// reply (if any) is repeated. Cloning shares the script and call log, so a
/// test can keep a handle after moving a clone into a gateway.
#[derive(Clone, Default)]
pub struct MockGenerator {
    script: Arc<RwLock<VecDeque<Result<String, GenerationError>>>>,
    fallback: Arc<RwLock<Option<Result<String, GenerationError>>>>,
    calls: Arc<RwLock<Vec<MockGeneratorCall>>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        self.script.write().unwrap().push_back(Ok(text.into()));
        self
    }

    /// Queue an HTTP status failure.
    pub fn with_status(self, status: u16) -> Self {
        self.with_error(GenerationError::Status(status))
    }

    /// Queue a transport failure.
    pub fn with_error(self, error: GenerationError) -> Self {
        self.script.write().unwrap().push_back(Err(error));
        self
    }

    /// Reply with `text` once the script is exhausted.
    pub fn always_reply(self, text: impl Into<String>) -> Self {
        *self.fallback.write().unwrap() = Some(Ok(text.into()));
        self
    }

    /// Fail with `status` once the script is exhausted.
    pub fn always_status(self, status: u16) -> Self {
        *self.fallback.write().unwrap() = Some(Err(GenerationError::Status(status)));
        self
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<MockGeneratorCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Time between consecutive calls.
    pub fn call_gaps(&self) -> Vec<Duration> {
        self.calls()
            .windows(2)
            .map(|w| w[1].at.duration_since(w[0].at))
            .collect()
    }

    /// Prompt of the most recent call.
    pub fn last_prompt(&self) -> Option<String> {
        self.calls.read().unwrap().last().map(|c| c.prompt.clone())
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.write().unwrap().push(MockGeneratorCall {
            prompt: request.prompt.clone(),
            max_output_tokens: request.max_output_tokens,
            at: Instant::now(),
        });

        if let Some(reply) = self.script.write().unwrap().pop_front() {
            return reply;
        }

        self.fallback
            .read()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(GenerationError::Network("no scripted reply".into())))
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[derive(Debug, Clone)]
enum MockPage {
    Html(String),
    Status(u16),
    Timeout,
}

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFetchCall {
    Get { url: String },
    Head { url: String },
}

/// A fetcher serving canned pages.
///
/// Unknown URLs answer 404. Keys are normalized through `url::Url` so
/// `https://example.com` and `https://example.com/` match.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<RwLock<HashMap<String, MockPage>>>,
    calls: Arc<RwLock<Vec<MockFetchCall>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(url: &str) -> String {
        url::Url::parse(url)
            .map(|u| u.to_string())
            .unwrap_or_else(|_| url.to_string())
    }

    /// Serve `html` at `url`.
    pub fn with_page(self, url: &str, html: impl Into<String>) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(Self::key(url), MockPage::Html(html.into()));
        self
    }

    /// Answer `url` with a non-2xx status.
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(Self::key(url), MockPage::Status(status));
        self
    }

    /// Make `url` time out.
    pub fn with_timeout(self, url: &str) -> Self {
        self.pages
            .write()
            .unwrap()
            .insert(Self::key(url), MockPage::Timeout);
        self
    }

    pub fn calls(&self) -> Vec<MockFetchCall> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    fn lookup(&self, url: &str) -> Option<MockPage> {
        self.pages.read().unwrap().get(&Self::key(url)).cloned()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        self.calls.write().unwrap().push(MockFetchCall::Get {
            url: url.to_string(),
        });

        match self.lookup(url) {
            Some(MockPage::Html(html)) => Ok(FetchedPage::new(url, html)),
            Some(MockPage::Status(status)) => Err(FetchError::FetchFailed { status }),
            Some(MockPage::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            None => Err(FetchError::FetchFailed { status: 404 }),
        }
    }

    async fn head(&self, url: &str) -> FetchResult<u16> {
        self.calls.write().unwrap().push(MockFetchCall::Head {
            url: url.to_string(),
        });

        match self.lookup(url) {
            Some(MockPage::Html(_)) => Ok(200),
            Some(MockPage::Status(status)) => Ok(status),
            Some(MockPage::Timeout) => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            None => Ok(404),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_script_then_fallback() {
        let mock = MockGenerator::new().with_status(429).always_reply("done");
        let request = GenerationRequest::new("p", 10);

        assert_eq!(mock.generate(&request).await, Err(GenerationError::Status(429)));
        assert_eq!(mock.generate(&request).await, Ok("done".to_string()));
        assert_eq!(mock.generate(&request).await, Ok("done".to_string()));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_generator_without_script_errors() {
        let mock = MockGenerator::new();
        let result = mock.generate(&GenerationRequest::new("p", 10)).await;
        assert!(matches!(result, Err(GenerationError::Network(_))));
    }

    #[tokio::test]
    async fn test_mock_fetcher_normalizes_keys() {
        let fetcher = MockFetcher::new().with_page("https://example.com", "<p>hi</p>");
        let page = fetcher.fetch("https://example.com/").await.unwrap();
        assert_eq!(page.html, "<p>hi</p>");

        let missing = fetcher.fetch("https://example.com/missing").await;
        assert!(matches!(missing, Err(FetchError::FetchFailed { status: 404 })));
        assert_eq!(fetcher.call_count(), 2);
    }
}
