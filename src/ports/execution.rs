//! Execution Port - Interface for language-model calls.
//!
//! The dialogue engine treats the model as a stateless function from a
//! [`Prompt`] to a schema-validated result. Everything provider-specific
//! (transport, authentication, response envelopes) lives behind this port.
//!
//! # Contract
//!
//! - The last entry of `prompt.contents` has the user role
//! - The response is decoded against `prompt.schema` before it is returned
//! - Token usage is reported with every success, and with errors where the
//!   provider billed the call anyway
//! - Implementations never retry; retry is the caller's policy

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::dialogue::TokenUsage;
use crate::domain::prompt::{decode_output, ParsedOutput, Prompt, SchemaValidationError};

/// Port for executing prompts against a language model.
#[async_trait]
pub trait ExecutionAdapter: Send + Sync {
    /// Issues one model call and returns its decoded output.
    async fn execute(&self, prompt: &Prompt) -> Result<ExecutionOutcome, ExecutionError>;

    /// Get provider information (name, model).
    fn provider_info(&self) -> ProviderInfo;
}

/// Lets shared adapters be wrapped (e.g. with a deadline) without giving up
/// the caller's handle.
#[async_trait]
impl<T: ExecutionAdapter + ?Sized> ExecutionAdapter for Arc<T> {
    async fn execute(&self, prompt: &Prompt) -> Result<ExecutionOutcome, ExecutionError> {
        (**self).execute(prompt).await
    }

    fn provider_info(&self) -> ProviderInfo {
        (**self).provider_info()
    }
}

/// A decoded model response with the tokens it cost.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionOutcome {
    pub output: ParsedOutput,
    pub usage: TokenUsage,
}

impl ExecutionOutcome {
    /// Decodes `raw` against the prompt's schema, attaching `usage` to the
    /// error if decoding fails.
    pub fn decode(prompt: &Prompt, raw: &str, usage: TokenUsage) -> Result<Self, ExecutionError> {
        decode_output(&prompt.schema, raw)
            .map(|output| Self { output, usage })
            .map_err(|e| ExecutionError::from(e).with_usage(usage))
    }
}

/// Provider information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "gemini", "mock").
    pub name: String,
    /// Model identifier.
    pub model: String,
}

impl ProviderInfo {
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            model: model.into(),
        }
    }
}

/// The four failure kinds of a model call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionErrorKind {
    Timeout,
    QuotaExceeded,
    InvalidOutput,
    ProviderError,
}

/// Errors from a model call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExecutionError {
    /// The call exceeded its deadline.
    #[error("model call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Provider quota or rate limit exhausted.
    #[error("quota exceeded: {message}")]
    QuotaExceeded {
        message: String,
        partial_usage: Option<TokenUsage>,
    },

    /// The response failed schema validation. Always fatal for the turn.
    #[error("invalid model output: {reason}")]
    InvalidOutput {
        reason: String,
        usage: Option<TokenUsage>,
    },

    /// Transport failure or unexpected provider response.
    #[error("provider error: {message}")]
    ProviderError {
        message: String,
        status: Option<u16>,
    },
}

impl ExecutionError {
    pub fn timeout(timeout_ms: u64) -> Self {
        Self::Timeout { timeout_ms }
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::QuotaExceeded {
            message: message.into(),
            partial_usage: None,
        }
    }

    pub fn invalid_output(reason: impl Into<String>, usage: Option<TokenUsage>) -> Self {
        Self::InvalidOutput {
            reason: reason.into(),
            usage,
        }
    }

    pub fn provider(message: impl Into<String>, status: Option<u16>) -> Self {
        Self::ProviderError {
            message: message.into(),
            status,
        }
    }

    /// Attaches billed usage where the variant can carry it.
    pub fn with_usage(self, usage: TokenUsage) -> Self {
        match self {
            Self::QuotaExceeded { message, .. } => Self::QuotaExceeded {
                message,
                partial_usage: Some(usage),
            },
            Self::InvalidOutput { reason, .. } => Self::InvalidOutput {
                reason,
                usage: Some(usage),
            },
            other => other,
        }
    }

    pub fn kind(&self) -> ExecutionErrorKind {
        match self {
            Self::Timeout { .. } => ExecutionErrorKind::Timeout,
            Self::QuotaExceeded { .. } => ExecutionErrorKind::QuotaExceeded,
            Self::InvalidOutput { .. } => ExecutionErrorKind::InvalidOutput,
            Self::ProviderError { .. } => ExecutionErrorKind::ProviderError,
        }
    }

    /// Usage the provider billed before failing, if known.
    pub fn partial_usage(&self) -> Option<TokenUsage> {
        match self {
            Self::QuotaExceeded { partial_usage, .. } => *partial_usage,
            Self::InvalidOutput { usage, .. } => *usage,
            Self::Timeout { .. } | Self::ProviderError { .. } => None,
        }
    }

    /// Returns true if the caller may retry the same call.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidOutput { .. })
    }

    /// Message safe to show a student. Never echoes model output.
    pub fn to_client_message(&self) -> &'static str {
        match self {
            Self::Timeout { .. } | Self::QuotaExceeded { .. } | Self::ProviderError { .. } => {
                "The tutor is unavailable right now, please try again."
            }
            Self::InvalidOutput { .. } => {
                "The tutor could not produce a valid reply, please try again."
            }
        }
    }
}

impl From<SchemaValidationError> for ExecutionError {
    fn from(err: SchemaValidationError) -> Self {
        Self::invalid_output(err.to_string(), None)
    }
}
