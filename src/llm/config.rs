//! Environment-driven provider configuration

use super::{AnthropicService, LlmError, LlmService, LoggingService};
use std::path::PathBuf;
use std::sync::Arc;

/// Model used when `LAZYLM_MODEL` is unset
pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";

/// Response cap used when `LAZYLM_MAX_TOKENS` is unset
pub const DEFAULT_MAX_TOKENS: u32 = 100;

/// Placeholder key sent in gateway mode; the gateway authenticates
const GATEWAY_API_KEY: &str = "implicit";

/// Configuration for the model provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub anthropic_api_key: Option<String>,
    /// Gateway base URL (e.g., `http://169.254.169.254/gateway/llm`)
    pub gateway: Option<String>,
    pub model: String,
    pub max_tokens: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            anthropic_api_key: None,
            gateway: None,
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

/// Load `.env` from the working directory or its ancestors into the process
/// environment. Variables already set are not overridden.
///
/// Returns the loaded path, or `None` when no `.env` file exists.
///
/// # Errors
///
/// Returns the `dotenvy` error when a `.env` file exists but cannot be read
/// or parsed.
pub fn load_dotenv() -> Result<Option<PathBuf>, dotenvy::Error> {
    missing_is_none(dotenvy::dotenv())
}

fn missing_is_none(result: Result<PathBuf, dotenvy::Error>) -> Result<Option<PathBuf>, dotenvy::Error> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

impl LlmConfig {
    /// Read configuration from the process environment. Call
    /// [`load_dotenv`] first to pick up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Empty values count as unset
    /// and an unparsable `LAZYLM_MAX_TOKENS` falls back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let max_tokens = match get("LAZYLM_MAX_TOKENS") {
            Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "Ignoring invalid LAZYLM_MAX_TOKENS");
                DEFAULT_MAX_TOKENS
            }),
            None => DEFAULT_MAX_TOKENS,
        };

        Self {
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            gateway: get("LLM_GATEWAY"),
            model: get("LAZYLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_tokens,
        }
    }

    /// Create the configured service, wrapped with request logging.
    ///
    /// # Errors
    ///
    /// Returns an `Auth` error when neither an API key nor a gateway is set,
    /// or whatever the provider returns when its client cannot be built.
    pub fn build_service(&self) -> Result<Arc<dyn LlmService>, LlmError> {
        let api_key = match (&self.gateway, &self.anthropic_api_key) {
            (Some(_), _) => GATEWAY_API_KEY.to_string(),
            (None, Some(key)) => key.clone(),
            (None, None) => {
                return Err(LlmError::auth(
                    "No credentials configured. Set ANTHROPIC_API_KEY or LLM_GATEWAY.",
                ))
            }
        };

        let service = AnthropicService::new(api_key, self.model.clone(), self.gateway.as_deref())?;
        Ok(Arc::new(LoggingService::new(Arc::new(service))))
    }
}
