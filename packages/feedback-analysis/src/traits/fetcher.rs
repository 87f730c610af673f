//! Page fetcher trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;

/// A fetched HTML page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    pub status: u16,

    /// Raw response body
    pub html: String,

    pub content_type: Option<String>,

    pub fetched_at: DateTime<Utc>,
}

impl FetchedPage {
    /// Create a 200 page with the given body.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            html: html.into(),
            content_type: Some("text/html".to_string()),
            fetched_at: Utc::now(),
        }
    }
}

/// Fetches pages over the network.
///
/// # SSRF Protection
///
/// Raw fetchers do not validate destinations. Wrap them in
/// [`GuardedFetcher`](crate::fetchers::GuardedFetcher) before handing them
/// user-supplied URLs:
///
/// ```rust,ignore
/// let fetcher = GuardedFetcher::new(HttpFetcher::new(&FetchConfig::default())?);
/// ```
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET a page. Non-2xx responses are errors.
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;

    /// HEAD a URL and return its status.
    async fn head(&self, url: &str) -> FetchResult<u16>;

    /// Name for logging.
    fn name(&self) -> &str;
}
