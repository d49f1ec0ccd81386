//! Model provider configuration

use serde::Deserialize;
use std::time::Duration;

use crate::adapters::ai::{GeminiConfig, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL};

use super::error::ValidationError;

/// Upper bound for `timeout_secs`.
const MAX_TIMEOUT_SECS: u64 = 300;

/// Model provider configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    /// Gemini API key
    pub gemini_api_key: Option<String>,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL (override for proxies and tests)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call deadline in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sampling temperature
    pub temperature: Option<f32>,
}

impl AiConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Check if Gemini is configured
    pub fn has_gemini(&self) -> bool {
        self.gemini_api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validate model provider configuration
    ///
    /// A missing API key is not an error here; hosts running only against
    /// the mock adapter never need one. [`gemini_config`](Self::gemini_config)
    /// reports it instead.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > MAX_TIMEOUT_SECS {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::EmptyModel);
        }
        if let Some(t) = self.temperature {
            if !(0.0..=2.0).contains(&t) {
                return Err(ValidationError::InvalidTemperature);
            }
        }
        Ok(())
    }

    /// Builds the Gemini adapter configuration.
    ///
    /// # Errors
    /// `ValidationError::MissingRequired` if no API key is set
    pub fn gemini_config(&self) -> Result<GeminiConfig, ValidationError> {
        let key = self
            .gemini_api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(ValidationError::MissingRequired("GEMINI_API_KEY"))?;

        let mut config = GeminiConfig::new(key)
            .with_model(&self.model)
            .with_base_url(&self.base_url)
            .with_timeout(self.timeout());
        if let Some(t) = self.temperature {
            config = config.with_temperature(t);
        }
        Ok(config)
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            temperature: None,
        }
    }
}

fn default_model() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_GEMINI_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    60
}
