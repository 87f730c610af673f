//! Typed errors for the feedback analysis library.
//!
//! Uses `thiserror` for library errors (not `anyhow`). The public analysis
//! operations never return these; they fold them into fallbacks or into
//! structured failure results. The lower-level gateway and fetcher surface
//! them directly.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a classifier call produced no text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayFailure {
    /// No credential configured. Degraded mode, not fatal.
    #[error("classifier disabled: no credential configured")]
    Disabled,

    /// Every attempt was answered with 429.
    #[error("classifier rate limited after {attempts} attempt(s)")]
    RateLimited { attempts: u32 },

    /// Non-2xx other than 429. Not retried.
    #[error("classifier upstream error: HTTP {status}")]
    Upstream { status: u16 },

    /// The request did not complete in time.
    #[error("classifier request timed out")]
    Timeout,

    /// Connection-level failure.
    #[error("classifier network error: {0}")]
    Network(String),
}

/// Errors that can occur while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Security validation failed
    #[error("security error: {0}")]
    Security(#[from] SecurityError),

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Request did not complete in time
    #[error("timeout fetching: {url}")]
    Timeout { url: String },

    /// Non-2xx response
    #[error("fetch failed with HTTP {status}")]
    FetchFailed { status: u16 },

    /// A redirect pointed at a disallowed destination
    #[error("redirect blocked: {url}")]
    RedirectBlocked { url: String },

    /// The redirect chain was longer than allowed
    #[error("too many redirects: {url}")]
    TooManyRedirects { url: String },

    /// Connection-level failure
    #[error("network error: {0}")]
    Network(String),

    /// HTTP client could not be constructed
    #[error("HTTP client error: {0}")]
    Client(String),
}

/// Security-related errors, primarily for SSRF protection.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// URL scheme not allowed (e.g., file://, ftp://)
    #[error("disallowed URL scheme: {0}")]
    DisallowedScheme(String),

    /// Host is blocked (e.g., localhost, *.internal)
    #[error("blocked host: {0}")]
    BlockedHost(String),

    /// Literal IP in a blocked range (e.g., 10.0.0.0/8)
    #[error("blocked IP range: {0}")]
    BlockedIp(String),

    /// URL has no host
    #[error("URL has no host")]
    NoHost,

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// The classifier answered, but not with the contract we asked for.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed classifier response: {0}")]
pub struct MalformedResponse(pub String);

impl From<serde_json::Error> for MalformedResponse {
    fn from(e: serde_json::Error) -> Self {
        Self(e.to_string())
    }
}

/// Reasons a page extraction did not produce feedback.
#[derive(Debug, Error)]
pub enum ExtractionFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Extracted text below the minimum length (empty or login pages)
    #[error("page content too sparse: {length} characters")]
    ContentTooSparse { length: usize },

    #[error(transparent)]
    Gateway(#[from] GatewayFailure),

    #[error(transparent)]
    Malformed(#[from] MalformedResponse),
}

impl ExtractionFailure {
    /// Serializable classification of this failure.
    pub fn kind(&self) -> ExtractionErrorKind {
        match self {
            ExtractionFailure::Fetch(e) => match e {
                FetchError::Security(_) | FetchError::RedirectBlocked { .. } => {
                    ExtractionErrorKind::SsrfBlocked
                }
                FetchError::InvalidUrl { .. } => ExtractionErrorKind::InvalidUrl,
                FetchError::Timeout { .. } => ExtractionErrorKind::Timeout,
                FetchError::FetchFailed { .. } | FetchError::TooManyRedirects { .. } => {
                    ExtractionErrorKind::FetchFailed
                }
                FetchError::Network(_) | FetchError::Client(_) => ExtractionErrorKind::NetworkError,
            },
            ExtractionFailure::ContentTooSparse { .. } => ExtractionErrorKind::ContentTooSparse,
            ExtractionFailure::Gateway(g) => match g {
                GatewayFailure::Disabled => ExtractionErrorKind::Disabled,
                GatewayFailure::RateLimited { .. } => ExtractionErrorKind::RateLimited,
                GatewayFailure::Upstream { .. } => ExtractionErrorKind::UpstreamError,
                GatewayFailure::Timeout => ExtractionErrorKind::Timeout,
                GatewayFailure::Network(_) => ExtractionErrorKind::NetworkError,
            },
            ExtractionFailure::Malformed(_) => ExtractionErrorKind::MalformedResponse,
        }
    }

    /// Message shown to the user who triggered the extraction.
    pub fn user_message(&self) -> String {
        match self {
            ExtractionFailure::Fetch(FetchError::Security(_))
            | ExtractionFailure::Fetch(FetchError::RedirectBlocked { .. }) => {
                "This URL points to a restricted address and cannot be scraped.".to_string()
            }
            ExtractionFailure::Fetch(FetchError::InvalidUrl { .. }) => {
                "The URL is not valid. Please check it and try again.".to_string()
            }
            ExtractionFailure::Fetch(FetchError::Timeout { .. }) => {
                "The page took too long to respond. Please try again later.".to_string()
            }
            ExtractionFailure::Fetch(FetchError::FetchFailed { status }) => format!(
                "The page could not be loaded (HTTP {}). Make sure it is publicly accessible.",
                status
            ),
            ExtractionFailure::Fetch(FetchError::TooManyRedirects { .. }) => {
                "The page redirected too many times and could not be loaded.".to_string()
            }
            ExtractionFailure::Fetch(_) => {
                "The page could not be reached. Please check the URL and try again.".to_string()
            }
            ExtractionFailure::ContentTooSparse { .. } => {
                "The page has too little readable text. It may require a login or render content with JavaScript."
                    .to_string()
            }
            ExtractionFailure::Gateway(GatewayFailure::RateLimited { .. }) => {
                "The AI service is currently rate limited. Please retry in about 30 seconds."
                    .to_string()
            }
            ExtractionFailure::Gateway(GatewayFailure::Disabled) => {
                "AI analysis is not configured on this server.".to_string()
            }
            ExtractionFailure::Gateway(_) | ExtractionFailure::Malformed(_) => {
                "Could not analyze the page content. Please try again.".to_string()
            }
        }
    }
}

/// Failure category carried in an `ExtractionResult`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ExtractionErrorKind {
    InvalidUrl,
    SsrfBlocked,
    Timeout,
    FetchFailed,
    NetworkError,
    ContentTooSparse,
    Disabled,
    RateLimited,
    UpstreamError,
    MalformedResponse,
}

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable held an unparseable value
    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    /// The classifier HTTP client could not be built
    #[error("failed to build classifier client: {0}")]
    Client(String),
}

/// Errors raised by a feedback source collaborator.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("feedback source unavailable: {0}")]
    Unavailable(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result type alias for gateway calls.
pub type GatewayResult<T> = std::result::Result<T, GatewayFailure>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for security operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limited_message_differs_from_generic() {
        let limited = ExtractionFailure::from(GatewayFailure::RateLimited { attempts: 3 });
        let generic = ExtractionFailure::from(GatewayFailure::Upstream { status: 500 });

        assert!(limited.user_message().contains("30 seconds"));
        assert_ne!(limited.user_message(), generic.user_message());
        assert_eq!(limited.kind(), ExtractionErrorKind::RateLimited);
        assert_eq!(generic.kind(), ExtractionErrorKind::UpstreamError);
    }

    #[test]
    fn test_security_errors_map_to_ssrf_kind() {
        let failure = ExtractionFailure::from(FetchError::from(SecurityError::BlockedHost(
            "localhost".into(),
        )));
        assert_eq!(failure.kind(), ExtractionErrorKind::SsrfBlocked);
    }

    #[test]
    fn test_redirect_loop_is_not_ssrf() {
        let failure = ExtractionFailure::from(FetchError::TooManyRedirects {
            url: "https://example.com/6".into(),
        });
        assert_eq!(failure.kind(), ExtractionErrorKind::FetchFailed);
        assert!(!failure.user_message().contains("restricted"));

        let blocked = ExtractionFailure::from(FetchError::RedirectBlocked {
            url: "http://10.0.0.1/".into(),
        });
        assert_eq!(blocked.kind(), ExtractionErrorKind::SsrfBlocked);
    }

    #[test]
    fn test_kind_serializes_camel_case() {
        let json = serde_json::to_string(&ExtractionErrorKind::ContentTooSparse).unwrap();
        assert_eq!(json, "\"contentTooSparse\"");
    }
}
