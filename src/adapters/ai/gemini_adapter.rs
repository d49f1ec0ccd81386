//! Gemini Adapter - Implementation of ExecutionAdapter for the Gemini API.
//!
//! Calls the `generateContent` endpoint with the prompt's system
//! instruction, turn history and, for structured prompts, a
//! `responseSchema` so the model answers in JSON.
//!
//! # Configuration
//!
//! ```ignore
//! let config = GeminiConfig::new(api_key)
//!     .with_model("gemini-2.0-flash")
//!     .with_timeout(Duration::from_secs(30));
//!
//! let adapter = GeminiExecutionAdapter::try_new(config)?;
//! ```
//!
//! The adapter never retries. Status codes map onto `ExecutionError`:
//! 429 is `QuotaExceeded`, 408/504 and client timeouts are `Timeout`,
//! everything else is `ProviderError`.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::domain::dialogue::{TokenUsage, TurnRole};
use crate::domain::prompt::Prompt;
use crate::ports::{ExecutionAdapter, ExecutionError, ExecutionOutcome, ProviderInfo};

/// Default model identifier.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Default API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Configuration for the Gemini adapter.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    api_key: Secret<String>,
    pub model: String,
    pub base_url: String,
    /// HTTP client timeout. Reported as `ExecutionError::Timeout`.
    pub timeout: Duration,
    pub temperature: Option<f32>,
}

impl GeminiConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: DEFAULT_GEMINI_MODEL.to_string(),
            base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            timeout: Duration::from_secs(60),
            temperature: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Gemini API adapter.
pub struct GeminiExecutionAdapter {
    config: GeminiConfig,
    client: Client,
}

impl GeminiExecutionAdapter {
    /// Creates the adapter and its HTTP client.
    ///
    /// # Errors
    /// `ExecutionError::ProviderError` if the HTTP client cannot be built
    pub fn try_new(config: GeminiConfig) -> Result<Self, ExecutionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ExecutionError::provider(format!("Failed to create HTTP client: {}", e), None)
            })?;

        Ok(Self { config, client })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn timeout_ms(&self) -> u64 {
        self.config.timeout.as_millis() as u64
    }
}

/// Converts a prompt into Gemini's request format.
fn to_gemini_request(prompt: &Prompt, temperature: Option<f32>) -> GenerateContentRequest {
    let contents = prompt
        .contents
        .iter()
        .map(|turn| GeminiContent {
            role: Some(
                match turn.role {
                    TurnRole::User => "user",
                    TurnRole::Model => "model",
                }
                .to_string(),
            ),
            parts: vec![GeminiPart {
                text: turn.text.clone(),
            }],
        })
        .collect();

    let response_mime_type = if prompt.schema.expects_json() {
        "application/json"
    } else {
        "text/plain"
    };

    GenerateContentRequest {
        system_instruction: GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: prompt.system_instruction.clone(),
            }],
        },
        contents,
        generation_config: GenerationConfig {
            temperature,
            response_mime_type,
            response_schema: prompt.schema.to_json_schema(),
        },
    }
}

/// Maps a non-success HTTP status to an execution error.
fn map_status(status: u16, body: &str) -> ExecutionError {
    let message = extract_error_message(body).unwrap_or_else(|| format!("HTTP {}", status));
    match status {
        429 => ExecutionError::quota_exceeded(message),
        408 | 504 => ExecutionError::timeout(0),
        _ => ExecutionError::provider(message, Some(status)),
    }
}

fn extract_error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

/// Parses a successful response body into a decoded outcome.
fn parse_body(prompt: &Prompt, body: &str) -> Result<ExecutionOutcome, ExecutionError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| ExecutionError::provider(format!("Failed to parse response: {}", e), None))?;

    let usage = response
        .usage_metadata
        .map(|u| {
            TokenUsage::from_counts(
                u.prompt_token_count,
                u.candidates_token_count,
                u.total_token_count
                    .max(u.prompt_token_count.saturating_add(u.candidates_token_count)),
            )
        })
        .unwrap_or_default();

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = response
            .prompt_feedback
            .and_then(|f| f.block_reason)
            .unwrap_or_else(|| "no candidates".to_string());
        return Err(ExecutionError::invalid_output(
            format!("response has no candidates: {}", reason),
            Some(usage),
        ));
    };

    let text: String = candidate
        .content
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ExecutionError::invalid_output(
            format!(
                "candidate has no text (finish reason {})",
                candidate.finish_reason.as_deref().unwrap_or("unknown")
            ),
            Some(usage),
        ));
    }

    ExecutionOutcome::decode(prompt, &text, usage)
}

#[async_trait]
impl ExecutionAdapter for GeminiExecutionAdapter {
    async fn execute(&self, prompt: &Prompt) -> Result<ExecutionOutcome, ExecutionError> {
        let request = to_gemini_request(prompt, self.config.temperature);

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExecutionError::timeout(self.timeout_ms())
                } else if e.is_connect() {
                    ExecutionError::provider(format!("Connection failed: {}", e), None)
                } else {
                    ExecutionError::provider(e.to_string(), None)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ExecutionError::timeout(self.timeout_ms())
            } else {
                ExecutionError::provider(format!("Failed to read response: {}", e), None)
            }
        })?;

        if !status.is_success() {
            let err = match map_status(status.as_u16(), &body) {
                ExecutionError::Timeout { .. } => ExecutionError::timeout(self.timeout_ms()),
                other => other,
            };
            tracing::debug!(status = status.as_u16(), kind = ?err.kind(), "Gemini call failed");
            return Err(err);
        }

        parse_body(prompt, &body)
    }

    fn provider_info(&self) -> ProviderInfo {
        ProviderInfo::new("gemini", &self.config.model)
    }
}

// ============================================================================
// Gemini API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    response_mime_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_schema: Option<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
    #[serde(default)]
    total_token_count: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}
