//! Error types for dialogue orchestration.

use crate::domain::foundation::ValidationError;
use crate::ports::ExecutionError;

use super::stage::DialogueStage;
use super::usage::TokenUsageReport;

/// Wiring mistakes. Never expected in a correctly assembled system.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("no handler registered for stage {0}")]
    UnregisteredStage(DialogueStage),

    /// A handler asked for more model calls than one invocation allows.
    #[error("handler for stage {stage} exceeded {limit} model calls")]
    CallBudgetExceeded { stage: DialogueStage, limit: u8 },
}

/// Errors returned by the orchestrator.
///
/// On every variant the caller's `DialogueState` is unchanged, so the same
/// call can simply be retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DialogueError {
    /// A model call failed. `usage` holds what was billed before the failure.
    #[error("model execution failed: {source}")]
    Execution {
        #[source]
        source: ExecutionError,
        usage: TokenUsageReport,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// The operation is not valid for the state's current stage.
    #[error("cannot {operation} while dialogue is {stage}")]
    InvalidStage {
        stage: DialogueStage,
        operation: &'static str,
    },

    /// A handler attempted a transition the stage machine forbids.
    #[error("invalid transition: {0}")]
    Transition(#[from] ValidationError),
}

impl DialogueError {
    /// Wraps an execution failure together with usage billed so far.
    pub fn execution(source: ExecutionError, usage: TokenUsageReport) -> Self {
        Self::Execution { source, usage }
    }

    /// Token usage that was incurred before the error, if any.
    pub fn usage(&self) -> Option<&TokenUsageReport> {
        match self {
            Self::Execution { usage, .. } => Some(usage),
            _ => None,
        }
    }

    /// Returns true if the caller may retry the identical call.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Execution { source, .. } => source.is_retryable(),
            _ => false,
        }
    }
}
