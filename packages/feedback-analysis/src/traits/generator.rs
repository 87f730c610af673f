//! Text generation trait for the remote classifier.
//!
//! Implementations make exactly one outbound request per call and report the
//! HTTP status of failures. Retry and backoff live in the gateway, not here.

use async_trait::async_trait;
use thiserror::Error;

/// A single generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub max_output_tokens: u32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, max_output_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            max_output_tokens,
        }
    }
}

/// Transport-level failure of one generation call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    /// Non-2xx HTTP status
    #[error("HTTP {0}")]
    Status(u16),

    #[error("request timed out")]
    Timeout,

    /// Connection failure, or a 2xx body we could not read
    #[error("network error: {0}")]
    Network(String),
}

/// Remote generative-text service.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Send one request and return the generated text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;

    /// Name for logging.
    fn name(&self) -> &str {
        "generator"
    }
}
