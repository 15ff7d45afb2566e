//! Embedding provider abstraction and implementations.
//!
//! Two backends:
//! - [`DisabledEmbeddingProvider`]: the subsystem is off; search falls back
//!   to prefix matching and mutations skip embedding computation.
//! - [`OpenAiEmbeddingProvider`]: calls an OpenAI-compatible `/embeddings`
//!   endpoint with retry and exponential backoff.
//!
//! Retry policy for the remote provider:
//! - HTTP 429 and 5xx → retry with backoff (1s, 2s, 4s, ... capped at 32s)
//! - other 4xx → fail immediately
//! - network errors → retry

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

use core_config::embedding::EmbeddingConfig;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Embedding provider is disabled")]
    Disabled,

    #[error("Embedding request failed: {0}")]
    Request(String),

    #[error("Embedding response malformed: {0}")]
    Response(String),

    #[error("Embedding configuration invalid: {0}")]
    Config(String),
}

/// The text an item's embedding is computed from.
pub fn content_text(name: &str, description: &str) -> String {
    format!("{} {}", name, description)
}

/// Trait for embedding providers.
///
/// Implementations must be idempotent and side-effect-free: embedding the
/// same text twice yields the same vector, and a failed call leaves nothing
/// behind.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Whether the embedding subsystem is active. Coordinators must check
    /// this before computing or ranking by vector.
    fn is_enabled(&self) -> bool;

    /// Vector dimensionality this provider returns.
    fn dims(&self) -> usize;

    /// Embed a free-text query or item content.
    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// A no-op provider used when embeddings are not configured.
pub struct DisabledEmbeddingProvider;

#[async_trait]
impl EmbeddingProvider for DisabledEmbeddingProvider {
    fn is_enabled(&self) -> bool {
        false
    }

    fn dims(&self) -> usize {
        0
    }

    async fn embed_text(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Err(EmbeddingError::Disabled)
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embedding provider backed by an OpenAI-compatible embeddings API.
///
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAiEmbeddingProvider {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    dims: usize,
    max_retries: u32,
}

impl OpenAiEmbeddingProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| EmbeddingError::Config("OPENAI_API_KEY is not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Config(e.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_key,
            model: config.model.clone(),
            dims: config.dims,
            max_retries: config.max_retries,
        })
    }

    async fn request_embedding(&self, text: &str) -> Result<Vec<f32>, AttemptError> {
        let url = format!("{}/embeddings", self.api_base);
        let body = EmbeddingRequest {
            model: &self.model,
            input: text,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AttemptError::retryable(format!("network error: {e}")))?;

        let status = response.status();
        if status.as_u16() == 429 || status.is_server_error() {
            return Err(AttemptError::retryable(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(AttemptError::fatal(format!("HTTP {status}")));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::fatal(format!("invalid response body: {e}")))?;

        let vector = parsed
            .data
            .into_iter()
            .next()
            .ok_or_else(|| AttemptError::fatal("empty embedding response".to_string()))?
            .embedding;

        if vector.len() != self.dims {
            return Err(AttemptError::fatal(format!(
                "expected {} dimensions, got {}",
                self.dims,
                vector.len()
            )));
        }

        Ok(vector)
    }
}

struct AttemptError {
    retryable: bool,
    message: String,
}

impl AttemptError {
    fn retryable(message: String) -> Self {
        Self {
            retryable: true,
            message,
        }
    }

    fn fatal(message: String) -> Self {
        Self {
            retryable: false,
            message,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn is_enabled(&self) -> bool {
        true
    }

    fn dims(&self) -> usize {
        self.dims
    }

    async fn embed_text(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut attempt = 0u32;
        loop {
            match self.request_embedding(text).await {
                Ok(vector) => {
                    debug!(model = %self.model, dims = vector.len(), "Computed embedding");
                    return Ok(vector);
                }
                Err(e) if e.retryable && attempt < self.max_retries => {
                    // Backoff: 1s, 2s, 4s, ... capped at 32s
                    let delay_secs = 1u64 << attempt.min(5);
                    warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_secs,
                        error = %e.message,
                        "Embedding request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_secs(delay_secs)).await;
                    attempt += 1;
                }
                Err(e) if e.retryable => {
                    return Err(EmbeddingError::Request(format!(
                        "giving up after {} retries: {}",
                        self.max_retries, e.message
                    )));
                }
                Err(e) => return Err(EmbeddingError::Request(e.message)),
            }
        }
    }
}

/// Instantiate the provider named by the configuration.
pub fn provider_from_config(
    config: &EmbeddingConfig,
) -> Result<std::sync::Arc<dyn EmbeddingProvider>, EmbeddingError> {
    match config.provider.as_str() {
        "openai" => Ok(std::sync::Arc::new(OpenAiEmbeddingProvider::new(config)?)),
        "disabled" => Ok(std::sync::Arc::new(DisabledEmbeddingProvider)),
        other => Err(EmbeddingError::Config(format!(
            "Unknown embedding provider: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_text_combines_name_and_description() {
        assert_eq!(content_text("Mug", "Enameled"), "Mug Enameled");
    }

    #[tokio::test]
    async fn test_disabled_provider() {
        let provider = DisabledEmbeddingProvider;
        assert!(!provider.is_enabled());
        assert_eq!(provider.dims(), 0);

        let result = provider.embed_text("anything").await;
        assert!(matches!(result, Err(EmbeddingError::Disabled)));
    }

    #[test]
    fn test_provider_from_config_disabled() {
        let config = EmbeddingConfig::disabled();
        let provider = provider_from_config(&config).unwrap();
        assert!(!provider.is_enabled());
    }

    #[test]
    fn test_provider_from_config_unknown() {
        let config = EmbeddingConfig {
            provider: "quantum".to_string(),
            ..EmbeddingConfig::disabled()
        };
        assert!(provider_from_config(&config).is_err());
    }
}
