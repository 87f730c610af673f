//! Classifier gateway.
//!
//! Every classification operation reaches the remote service through
//! [`ClassifierGateway::invoke`], which owns credential gating and the
//! 429 retry loop. The gateway hands back raw text; parsing is the caller's
//! job.

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{GatewayFailure, GatewayResult};
use crate::traits::generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::types::config::RetryPolicy;

/// Gateway to the remote generative-text classifier.
///
/// A gateway without a generator is disabled: every call returns
/// [`GatewayFailure::Disabled`] without touching the network.
pub struct ClassifierGateway<G> {
    generator: Option<G>,
}

impl<G: TextGenerator> ClassifierGateway<G> {
    /// Create an enabled gateway.
    pub fn new(generator: G) -> Self {
        Self {
            generator: Some(generator),
        }
    }

    /// Create a gateway that never calls out.
    pub fn disabled() -> Self {
        Self { generator: None }
    }

    /// True when a generator (and therefore a credential) is configured.
    pub fn is_enabled(&self) -> bool {
        self.generator.is_some()
    }

    /// The underlying generator, if enabled.
    pub fn generator(&self) -> Option<&G> {
        self.generator.as_ref()
    }

    /// Send `prompt` to the classifier.
    ///
    /// Makes at most `policy.attempts()` calls. Only 429 is retried, after
    /// waiting `attempt × base_delay`; any other failure returns immediately.
    pub async fn invoke(
        &self,
        prompt: &str,
        max_tokens: u32,
        policy: &RetryPolicy,
    ) -> GatewayResult<String> {
        let Some(generator) = &self.generator else {
            debug!("Classifier disabled, skipping call");
            return Err(GatewayFailure::Disabled);
        };

        let request = GenerationRequest::new(prompt, max_tokens);
        let attempts = policy.attempts();

        for attempt in 1..=attempts {
            let start = std::time::Instant::now();
            match generator.generate(&request).await {
                Ok(text) => {
                    debug!(
                        generator = generator.name(),
                        attempt,
                        duration_ms = start.elapsed().as_millis(),
                        response_len = text.len(),
                        "Classifier call succeeded"
                    );
                    return Ok(text);
                }
                Err(GenerationError::Status(429)) => {
                    if attempt < attempts {
                        let delay = policy.delay_after(attempt);
                        warn!(
                            generator = generator.name(),
                            attempt,
                            max_attempts = attempts,
                            delay_ms = delay.as_millis(),
                            "Classifier rate limited, backing off"
                        );
                        if !delay.is_zero() {
                            sleep(delay).await;
                        }
                    }
                }
                Err(GenerationError::Status(status)) => {
                    warn!(generator = generator.name(), status, "Classifier upstream error");
                    return Err(GatewayFailure::Upstream { status });
                }
                Err(GenerationError::Timeout) => {
                    warn!(generator = generator.name(), attempt, "Classifier call timed out");
                    return Err(GatewayFailure::Timeout);
                }
                Err(GenerationError::Network(e)) => {
                    warn!(generator = generator.name(), error = %e, "Classifier network error");
                    return Err(GatewayFailure::Network(e));
                }
            }
        }

        warn!(attempts, "Classifier still rate limited, giving up");
        Err(GatewayFailure::RateLimited { attempts })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockGenerator;
    use std::time::Duration;

    fn policy(attempts: u32, base_ms: u64) -> RetryPolicy {
        RetryPolicy::new(attempts, Duration::from_millis(base_ms))
    }

    #[tokio::test]
    async fn test_disabled_makes_no_calls() {
        let gateway: ClassifierGateway<MockGenerator> = ClassifierGateway::disabled();
        assert!(!gateway.is_enabled());

        let result = gateway.invoke("prompt", 100, &policy(3, 10)).await;
        assert_eq!(result, Err(GatewayFailure::Disabled));
    }

    #[tokio::test]
    async fn test_success_returns_raw_text() {
        let mock = MockGenerator::new().with_reply("not json at all");
        let gateway = ClassifierGateway::new(mock.clone());

        let result = gateway.invoke("prompt", 100, &policy(3, 10)).await;
        assert_eq!(result.as_deref(), Ok("not json at all"));
        assert_eq!(mock.call_count(), 1);
        assert_eq!(mock.calls()[0].max_output_tokens, 100);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_429_with_linear_backoff() {
        let mock = MockGenerator::new()
            .with_status(429)
            .with_status(429)
            .with_reply("ok");
        let gateway = ClassifierGateway::new(mock.clone());

        let result = gateway.invoke("prompt", 100, &policy(3, 1000)).await;
        assert_eq!(result.as_deref(), Ok("ok"));
        assert_eq!(mock.call_count(), 3);
        assert_eq!(
            mock.call_gaps(),
            vec![Duration::from_millis(1000), Duration::from_millis(2000)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausted_retries_is_rate_limited() {
        let mock = MockGenerator::new().always_status(429);
        let gateway = ClassifierGateway::new(mock.clone());

        let result = gateway.invoke("prompt", 100, &policy(3, 10)).await;
        assert_eq!(result, Err(GatewayFailure::RateLimited { attempts: 3 }));
        assert_eq!(mock.call_count(), 3);
    }

    #[tokio::test]
    async fn test_single_attempt_policy_calls_once() {
        let mock = MockGenerator::new().always_status(429);
        let gateway = ClassifierGateway::new(mock.clone());

        let result = gateway.invoke("prompt", 100, &RetryPolicy::single()).await;
        assert_eq!(result, Err(GatewayFailure::RateLimited { attempts: 1 }));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_other_status_is_not_retried() {
        let mock = MockGenerator::new().always_status(503);
        let gateway = ClassifierGateway::new(mock.clone());

        let result = gateway.invoke("prompt", 100, &policy(3, 10)).await;
        assert_eq!(result, Err(GatewayFailure::Upstream { status: 503 }));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_timeout_is_not_retried() {
        let mock = MockGenerator::new().with_error(GenerationError::Timeout);
        let gateway = ClassifierGateway::new(mock.clone());

        let result = gateway.invoke("prompt", 100, &policy(3, 10)).await;
        assert_eq!(result, Err(GatewayFailure::Timeout));
        assert_eq!(mock.call_count(), 1);
    }
}
