//! HTTP page fetcher.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::redirect::{Attempt, Policy};
use tracing::{debug, warn};

use crate::error::{FetchError, FetchResult, SecurityError};
use crate::security::UrlGuard;
use crate::traits::fetcher::{FetchedPage, PageFetcher};
use crate::types::config::FetchConfig;

/// Fetches pages with reqwest.
///
/// Every request is bounded by `FetchConfig::timeout`; a timeout drops the
/// in-flight request. Redirect hops are re-checked against a [`UrlGuard`],
/// so a public URL cannot bounce the fetcher onto an internal host.
pub struct HttpFetcher {
    client: reqwest::Client,
    config: FetchConfig,
}

impl HttpFetcher {
    /// Create a fetcher with the default redirect guard.
    pub fn new(config: &FetchConfig) -> FetchResult<Self> {
        Self::with_guard(config, UrlGuard::new())
    }

    /// Create a fetcher that validates redirect hops with `guard`.
    pub fn with_guard(config: &FetchConfig, guard: UrlGuard) -> FetchResult<Self> {
        let max_redirects = config.max_redirects;
        let policy = Policy::custom(move |attempt: Attempt| {
            // previous() includes the original request URL
            if attempt.previous().len() > max_redirects {
                return attempt.error("too many redirects");
            }
            match guard.validate_url(attempt.url()) {
                Ok(()) => attempt.follow(),
                Err(e) => attempt.error(e),
            }
        });

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .redirect(policy)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("User-Agent", &self.config.user_agent)
            .header("Accept", &self.config.accept)
            .header("Accept-Language", &self.config.accept_language)
    }

    fn map_error(url: &str, e: reqwest::Error) -> FetchError {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else if e.is_redirect() {
            let hop = e.url().map(|u| u.to_string()).unwrap_or_else(|| url.to_string());
            let blocked = std::error::Error::source(&e)
                .map(|source| source.is::<SecurityError>())
                .unwrap_or(false);
            if blocked {
                FetchError::RedirectBlocked { url: hop }
            } else {
                FetchError::TooManyRedirects { url: hop }
            }
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        debug!(url = %url, "HTTP fetch starting");
        let start = std::time::Instant::now();

        let response = self
            .request(reqwest::Method::GET, url)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                Self::map_error(url, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "HTTP fetch returned non-success status");
            return Err(FetchError::FetchFailed {
                status: status.as_u16(),
            });
        }

        // Capture final URL after redirects
        let final_url = response.url().to_string();

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let html = response
            .text()
            .await
            .map_err(|e| Self::map_error(url, e))?;

        debug!(
            url = %url,
            final_url = %final_url,
            bytes = html.len(),
            duration_ms = start.elapsed().as_millis(),
            "HTTP fetch completed"
        );

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            html,
            content_type,
            fetched_at: Utc::now(),
        })
    }

    async fn head(&self, url: &str) -> FetchResult<u16> {
        let response = self
            .request(reqwest::Method::HEAD, url)
            .send()
            .await
            .map_err(|e| Self::map_error(url, e))?;

        Ok(response.status().as_u16())
    }

    fn name(&self) -> &str {
        "http"
    }
}
