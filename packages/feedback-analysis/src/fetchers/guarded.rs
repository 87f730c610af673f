//! SSRF-guarded fetcher wrapper.

use async_trait::async_trait;
use tracing::warn;

use crate::error::{FetchError, FetchResult, SecurityError};
use crate::security::UrlGuard;
use crate::traits::fetcher::{FetchedPage, PageFetcher};

use super::normalize::normalize_url;

/// A fetcher that validates and normalizes URLs before delegating.
///
/// Rejected URLs never reach the inner fetcher.
pub struct GuardedFetcher<F> {
    inner: F,
    guard: UrlGuard,
}

impl<F: PageFetcher> GuardedFetcher<F> {
    /// Wrap `inner` with the default guard.
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            guard: UrlGuard::new(),
        }
    }

    /// Wrap `inner` with a custom guard.
    pub fn with_guard(inner: F, guard: UrlGuard) -> Self {
        Self { inner, guard }
    }

    pub fn inner(&self) -> &F {
        &self.inner
    }

    /// Validate `url` and apply known-pattern rewrites.
    pub fn prepare(&self, url: &str) -> FetchResult<String> {
        match self.guard.validate(url) {
            Ok(parsed) => Ok(normalize_url(parsed).to_string()),
            Err(SecurityError::UrlParse(_)) | Err(SecurityError::NoHost) => {
                Err(FetchError::InvalidUrl {
                    url: url.to_string(),
                })
            }
            Err(e) => {
                warn!(url = %url, error = %e, "Blocked URL");
                Err(FetchError::Security(e))
            }
        }
    }
}

#[async_trait]
impl<F: PageFetcher> PageFetcher for GuardedFetcher<F> {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let url = self.prepare(url)?;
        self.inner.fetch(&url).await
    }

    async fn head(&self, url: &str) -> FetchResult<u16> {
        let url = self.prepare(url)?;
        self.inner.head(&url).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
