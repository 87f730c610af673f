//! Gemini implementation of the `TextGenerator` trait.
//!
//! # Example
//!
//! ```rust,ignore
//! use feedback_analysis::{AnalysisConfig, ClassifierGateway};
//!
//! let config = AnalysisConfig::from_env()?;
//! let gateway = ClassifierGateway::from_config(&config.gateway)?;
//! ```

use async_trait::async_trait;
use gemini_client::{GeminiClient, GeminiError, GenerateContentRequest};

use crate::error::ConfigError;
use crate::fetchers::HttpFetcher;
use crate::gateway::ClassifierGateway;
use crate::pipeline::FeedbackAnalyzer;
use crate::traits::generator::{GenerationError, GenerationRequest, TextGenerator};
use crate::types::config::{AnalysisConfig, GatewayConfig};

/// Gemini-backed text generator.
#[derive(Clone)]
pub struct GeminiGenerator {
    client: GeminiClient,
    temperature: f32,
}

impl GeminiGenerator {
    /// Wrap an existing client.
    pub fn new(client: GeminiClient) -> Self {
        Self {
            client,
            temperature: 0.2,
        }
    }

    /// Build a client from gateway settings. Returns `None` when no
    /// credential is configured.
    pub fn from_config(config: &GatewayConfig) -> Result<Option<Self>, ConfigError> {
        let Some(credential) = &config.credential else {
            return Ok(None);
        };

        let mut client = GeminiClient::new(credential.expose())
            .with_model(&config.model)
            .with_timeout(config.request_timeout)
            .map_err(|e| ConfigError::Client(e.to_string()))?;
        if let Some(base_url) = &config.base_url {
            client = client.with_base_url(base_url);
        }

        Ok(Some(Self::new(client).with_temperature(config.temperature)))
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let body = GenerateContentRequest::from_prompt(request.prompt.as_str())
            .temperature(self.temperature)
            .max_output_tokens(request.max_output_tokens);

        self.client
            .generate_content(&body)
            .await
            .map_err(map_gemini_error)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

fn map_gemini_error(e: GeminiError) -> GenerationError {
    match e {
        GeminiError::Api { status, .. } => GenerationError::Status(status),
        GeminiError::Timeout => GenerationError::Timeout,
        other => GenerationError::Network(other.to_string()),
    }
}

impl ClassifierGateway<GeminiGenerator> {
    /// Build a gateway from configuration. No credential gives a disabled
    /// gateway, not an error.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, ConfigError> {
        Ok(match GeminiGenerator::from_config(config)? {
            Some(generator) => Self::new(generator),
            None => Self::disabled(),
        })
    }
}

impl FeedbackAnalyzer<GeminiGenerator, HttpFetcher> {
    /// Build the production analyzer: Gemini classifier, HTTP fetcher.
    pub fn from_config(config: &AnalysisConfig) -> Result<Self, ConfigError> {
        let gateway = ClassifierGateway::from_config(&config.gateway)?;
        let fetcher =
            HttpFetcher::new(&config.fetch).map_err(|e| ConfigError::Client(e.to_string()))?;
        Ok(Self::with_config(gateway, fetcher, config.analyzer.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_credential_is_disabled() {
        let gateway = ClassifierGateway::from_config(&GatewayConfig::default()).unwrap();
        assert!(!gateway.is_enabled());
    }

    #[test]
    fn test_credential_enables_gateway() {
        let config = GatewayConfig::default()
            .with_credential("test-key")
            .with_model("gemini-1.5-flash")
            .with_base_url("http://proxy.test/v1beta/");
        let gateway = ClassifierGateway::from_config(&config).unwrap();

        assert!(gateway.is_enabled());
        let generator = gateway.generator().unwrap();
        assert_eq!(generator.model(), "gemini-1.5-flash");
        assert_eq!(generator.name(), "gemini");
    }

    #[test]
    fn test_error_mapping_keeps_status() {
        assert_eq!(
            map_gemini_error(GeminiError::Api {
                status: 429,
                message: "quota".into()
            }),
            GenerationError::Status(429)
        );
        assert_eq!(map_gemini_error(GeminiError::Timeout), GenerationError::Timeout);
        assert!(matches!(
            map_gemini_error(GeminiError::Parse("bad".into())),
            GenerationError::Network(_)
        ));
    }

    #[test]
    fn test_analyzer_from_config() {
        let analyzer = FeedbackAnalyzer::from_config(&AnalysisConfig::default()).unwrap();
        assert!(!analyzer.gateway().is_enabled());
    }
}
