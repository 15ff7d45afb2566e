use crate::{env_or_default, env_parse_or_default, ConfigError, FromEnv};

/// Embedding subsystem configuration.
///
/// The provider is selected by name; `"disabled"` (the default) turns the
/// whole subsystem off and search falls back to prefix matching.
#[derive(Clone, Debug)]
pub struct EmbeddingConfig {
    /// Provider name: "openai" or "disabled"
    pub provider: String,
    /// Model identifier (e.g. "text-embedding-3-small")
    pub model: String,
    /// Vector dimensionality the provider returns
    pub dims: usize,
    /// Base URL of the embeddings API
    pub api_base: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum retries for rate-limited or failing calls
    pub max_retries: u32,
}

impl EmbeddingConfig {
    pub fn disabled() -> Self {
        Self {
            provider: "disabled".to_string(),
            model: String::new(),
            dims: 0,
            api_base: String::new(),
            timeout_secs: 30,
            max_retries: 5,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self::disabled()
    }
}

impl FromEnv for EmbeddingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            provider: env_or_default("EMBEDDING_PROVIDER", "disabled"),
            model: env_or_default("EMBEDDING_MODEL", "text-embedding-3-small"),
            dims: env_parse_or_default("EMBEDDING_DIMS", 1536)?,
            api_base: env_or_default("EMBEDDING_API_BASE", "https://api.openai.com/v1"),
            timeout_secs: env_parse_or_default("EMBEDDING_TIMEOUT_SECS", 30)?,
            max_retries: env_parse_or_default("EMBEDDING_MAX_RETRIES", 5)?,
        })
    }
}
