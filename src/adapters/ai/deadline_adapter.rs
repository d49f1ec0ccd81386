//! Deadline wrapper for any ExecutionAdapter.
//!
//! Enforces an externally supplied per-call deadline. When it expires the
//! inner call is dropped and `ExecutionError::Timeout` is returned; nothing
//! is retried.

use async_trait::async_trait;
use std::time::Duration;

use crate::domain::prompt::Prompt;
use crate::ports::{ExecutionAdapter, ExecutionError, ExecutionOutcome, ProviderInfo};

/// Wraps an adapter with a per-call deadline.
#[derive(Debug, Clone)]
pub struct DeadlineExecutionAdapter<A> {
    inner: A,
    deadline: Duration,
}

impl<A: ExecutionAdapter> DeadlineExecutionAdapter<A> {
    pub fn new(inner: A, deadline: Duration) -> Self {
        Self { inner, deadline }
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn into_inner(self) -> A {
        self.inner
    }
}

#[async_trait]
impl<A: ExecutionAdapter> ExecutionAdapter for DeadlineExecutionAdapter<A> {
    async fn execute(&self, prompt: &Prompt) -> Result<ExecutionOutcome, ExecutionError> {
        match tokio::time::timeout(self.deadline, self.inner.execute(prompt)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    deadline_ms = self.deadline.as_millis() as u64,
                    prompt = ?prompt.kind,
                    "Model call exceeded deadline"
                );
                Err(ExecutionError::timeout(self.deadline.as_millis() as u64))
            }
        }
    }

    fn provider_info(&self) -> ProviderInfo {
        self.inner.provider_info()
    }
}
