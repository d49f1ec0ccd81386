//! Mock Execution Adapter for testing.
//!
//! Provides a scripted implementation of the ExecutionAdapter port, allowing
//! dialogue tests to run without calling a real model.
//!
//! # Features
//!
//! - Scripted raw responses, decoded exactly like a real provider's
//! - Helpers for classifier, generator and summary payloads
//! - Simulated delays for deadline testing
//! - Error injection
//! - Call tracking for verification
//!
//! # Example
//!
//! ```ignore
//! let adapter = MockExecutionAdapter::new()
//!     .with_classification(Trigger::V1Established, json!({ "stance": "yes" }))
//!     .with_generation("Consider this case.", "Does your view still hold?");
//! ```

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::sleep;

use crate::domain::dialogue::{TokenUsage, Trigger};
use crate::domain::prompt::Prompt;
use crate::ports::{ExecutionAdapter, ExecutionError, ExecutionOutcome, ProviderInfo};

/// Usage reported for scripted responses unless overridden.
pub const MOCK_USAGE: TokenUsage = TokenUsage {
    input_token_count: 100,
    output_token_count: 20,
    total_token_count: 120,
};

/// A configured mock response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Raw model text, decoded against the prompt's schema.
    Raw { content: String, usage: TokenUsage },
    /// Return an error without decoding anything.
    Error(ExecutionError),
}

/// Scripted execution adapter.
///
/// Responses are consumed in order. An empty queue yields a provider error,
/// so a test that makes more calls than it scripted fails loudly.
#[derive(Debug, Clone)]
pub struct MockExecutionAdapter {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    info: ProviderInfo,
    delay: Duration,
    calls: Arc<Mutex<Vec<Prompt>>>,
}

impl Default for MockExecutionAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExecutionAdapter {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            info: ProviderInfo::new("mock", "mock-model-1"),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Adds a raw response to the queue.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_response_usage(content, MOCK_USAGE)
    }

    /// Adds a raw response with explicit usage.
    pub fn with_response_usage(self, content: impl Into<String>, usage: TokenUsage) -> Self {
        self.push(MockResponse::Raw {
            content: content.into(),
            usage,
        })
    }

    /// Adds a classifier response. `extracted` may be `Value::Null`.
    pub fn with_classification(self, intent: Trigger, extracted: Value) -> Self {
        self.with_response(
            json!({
                "rationale": "scripted",
                "detected_intent": intent.as_str(),
                "confidence_score": 0.9,
                "extracted_data": extracted,
            })
            .to_string(),
        )
    }

    /// Adds a generator response.
    pub fn with_generation(self, message: &str, question: &str) -> Self {
        self.with_response(
            json!({
                "rationale": "scripted",
                "response_message": message,
                "concise_question": question,
            })
            .to_string(),
        )
    }

    /// Adds a free-text response (closing summary).
    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_response(text)
    }

    /// Adds an error response to the queue.
    pub fn with_error(self, error: ExecutionError) -> Self {
        self.push(MockResponse::Error(error))
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns the number of calls made to this adapter.
    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Returns all recorded prompts.
    pub fn get_calls(&self) -> Vec<Prompt> {
        lock(&self.calls).clone()
    }

    /// Number of scripted responses not yet consumed.
    pub fn remaining(&self) -> usize {
        lock(&self.responses).len()
    }

    fn push(self, response: MockResponse) -> Self {
        lock(&self.responses).push_back(response);
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

#[async_trait]
impl ExecutionAdapter for MockExecutionAdapter {
    async fn execute(&self, prompt: &Prompt) -> Result<ExecutionOutcome, ExecutionError> {
        lock(&self.calls).push(prompt.clone());

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        // Real chat endpoints reject a request whose last turn is not the user's.
        if !prompt.ends_with_user_turn() {
            return Err(ExecutionError::provider(
                "last content turn must have the user role",
                Some(400),
            ));
        }

        let next = lock(&self.responses).pop_front();
        match next {
            Some(MockResponse::Raw { content, usage }) => {
                ExecutionOutcome::decode(prompt, &content, usage)
            }
            Some(MockResponse::Error(err)) => Err(err),
            None => Err(ExecutionError::provider("mock response queue is empty", None)),
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.info.clone()
    }
}
