//! Configuration types for the gateway, fetcher and analysis operations.

use std::time::Duration;

use crate::error::ConfigError;
use crate::security::SecretString;

/// Retry schedule for classifier calls.
///
/// After a 429 on attempt `n` (1-indexed) the gateway waits `n × base_delay`
/// before attempt `n + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::standard()
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
        }
    }

    /// One attempt, no backoff. For calls made inline with a user request.
    pub fn single() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Three attempts with a 2s linear backoff.
    pub fn standard() -> Self {
        Self::new(3, Duration::from_millis(2000))
    }

    /// Attempts actually allowed. Zero is treated as one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Wait after a rate-limited `attempt` (1-indexed).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Remote classifier settings.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// API key. `None` disables the classifier.
    pub credential: Option<SecretString>,

    pub model: String,

    /// Override for the service base URL
    pub base_url: Option<String>,

    pub temperature: f32,

    /// Per-request timeout
    pub request_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            credential: None,
            model: "gemini-2.0-flash".to_string(),
            base_url: None,
            temperature: 0.2,
            request_timeout: Duration::from_secs(60),
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(mut self, key: impl Into<SecretString>) -> Self {
        self.credential = Some(key.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// True when a credential is configured.
    pub fn is_enabled(&self) -> bool {
        self.credential.is_some()
    }
}

/// Page fetch settings.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub timeout: Duration,
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(15),
            user_agent: "Mozilla/5.0 (compatible; FeedbackInsightsBot/1.0)".to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Limits and budgets for the four analysis operations.
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Policy for single-item classification (latency sensitive)
    pub single_policy: RetryPolicy,

    /// Policy for every other operation
    pub retry_policy: RetryPolicy,

    pub single_max_tokens: u32,
    pub external_max_tokens: u32,
    pub bulk_max_tokens: u32,
    pub extraction_max_tokens: u32,

    /// Upper bound on items per bulk summary
    pub max_bulk_items: usize,

    /// Per-message cap inside the bulk prompt (characters)
    pub max_bulk_message_chars: usize,

    /// Pages with less extracted text than this are rejected (characters)
    pub min_page_chars: usize,

    /// Extracted page text is cut to this many characters before prompting
    pub max_page_chars: usize,

    /// Length of the text preview attached to failed extractions
    pub preview_chars: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            single_policy: RetryPolicy::single(),
            retry_policy: RetryPolicy::standard(),
            single_max_tokens: 512,
            external_max_tokens: 512,
            bulk_max_tokens: 2048,
            extraction_max_tokens: 8192,
            max_bulk_items: 200,
            max_bulk_message_chars: 500,
            min_page_chars: 20,
            max_page_chars: 8000,
            preview_chars: 300,
        }
    }
}

impl AnalyzerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn with_single_policy(mut self, policy: RetryPolicy) -> Self {
        self.single_policy = policy;
        self
    }
}

/// Everything needed to build an analyzer.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    pub gateway: GatewayConfig,
    pub fetch: FetchConfig,
    pub analyzer: AnalyzerConfig,
}

impl AnalysisConfig {
    /// Load configuration from environment variables.
    ///
    /// - `GEMINI_API_KEY` (unset or blank disables the classifier)
    /// - `GEMINI_MODEL`, `GEMINI_BASE_URL`
    /// - `CLASSIFIER_MAX_ATTEMPTS`, `CLASSIFIER_RETRY_BASE_MS`
    /// - `FETCH_TIMEOUT_SECS`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        config.gateway.credential = SecretString::non_blank(lookup("GEMINI_API_KEY"));
        if let Some(model) = lookup("GEMINI_MODEL").filter(|m| !m.trim().is_empty()) {
            config.gateway.model = model.trim().to_string();
        }
        config.gateway.base_url = lookup("GEMINI_BASE_URL").filter(|u| !u.trim().is_empty());

        if let Some(attempts) = parse_var::<u32>(&lookup, "CLASSIFIER_MAX_ATTEMPTS")? {
            config.analyzer.retry_policy.max_attempts = attempts;
        }
        if let Some(ms) = parse_var::<u64>(&lookup, "CLASSIFIER_RETRY_BASE_MS")? {
            config.analyzer.retry_policy.base_delay = Duration::from_millis(ms);
        }
        if let Some(secs) = parse_var::<u64>(&lookup, "FETCH_TIMEOUT_SECS")? {
            config.fetch.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value: raw,
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_retry_delays_are_linear() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(RetryPolicy::single().delay_after(1), Duration::ZERO);
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts(), 1);
    }

    #[test]
    fn test_from_lookup_defaults_to_disabled() {
        let config = AnalysisConfig::from_lookup(lookup(&[])).unwrap();
        assert!(!config.gateway.is_enabled());
        assert_eq!(config.fetch.timeout, Duration::from_secs(15));
        assert_eq!(config.analyzer.retry_policy, RetryPolicy::standard());
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = AnalysisConfig::from_lookup(lookup(&[
            ("GEMINI_API_KEY", "secret"),
            ("GEMINI_MODEL", "gemini-1.5-pro"),
            ("CLASSIFIER_MAX_ATTEMPTS", "5"),
            ("CLASSIFIER_RETRY_BASE_MS", "250"),
            ("FETCH_TIMEOUT_SECS", "7"),
        ]))
        .unwrap();

        assert!(config.gateway.is_enabled());
        assert_eq!(config.gateway.model, "gemini-1.5-pro");
        assert_eq!(config.analyzer.retry_policy.max_attempts, 5);
        assert_eq!(
            config.analyzer.retry_policy.base_delay,
            Duration::from_millis(250)
        );
        assert_eq!(config.fetch.timeout, Duration::from_secs(7));
    }

    #[test]
    fn test_blank_key_is_disabled() {
        let config = AnalysisConfig::from_lookup(lookup(&[("GEMINI_API_KEY", "  ")])).unwrap();
        assert!(!config.gateway.is_enabled());
    }

    #[test]
    fn test_invalid_number_is_error() {
        let err = AnalysisConfig::from_lookup(lookup(&[("CLASSIFIER_MAX_ATTEMPTS", "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains("CLASSIFIER_MAX_ATTEMPTS"));
    }
}
