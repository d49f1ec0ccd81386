//! Per-invocation context shared by all stage handlers.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::dialogue::{
    ConfigurationError, DialogueError, DialogueLimits, DialogueState, TokenUsageReport, Trigger,
};
use crate::domain::foundation::ValidationError;
use crate::domain::prompt::{
    ClassifierOutput, GeneratorOutput, ParsedOutput, PromptBuilder, PromptContext, PromptKind,
};
use crate::ports::{ExecutionAdapter, ExecutionError};

/// Upper bound on model calls within one handler invocation.
pub const MAX_MODEL_CALLS: u8 = 2;

/// What a handler returns to the orchestrator.
///
/// `new_state` does not yet contain `message`; the orchestrator appends it.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerOutcome {
    pub message: String,
    pub new_state: DialogueState,
    pub ended: bool,
    pub usage: TokenUsageReport,
}

/// Input to [`StageHandler::handle`](super::StageHandler::handle).
///
/// Owns the only route to the model, so it can enforce the call budget and
/// keep usage accounting consistent across handlers.
pub struct HandlerContext {
    executor: Arc<dyn ExecutionAdapter>,
    state: DialogueState,
    student_input: String,
    topic_context: Option<String>,
    limits: DialogueLimits,
    usage: TokenUsageReport,
    calls: u8,
}

impl HandlerContext {
    /// `state` must already contain the student's turn.
    pub fn new(
        executor: Arc<dyn ExecutionAdapter>,
        state: DialogueState,
        student_input: impl Into<String>,
        topic_context: Option<String>,
        limits: DialogueLimits,
    ) -> Self {
        Self {
            executor,
            state,
            student_input: student_input.into(),
            topic_context,
            limits,
            usage: TokenUsageReport::empty(),
            calls: 0,
        }
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn student_input(&self) -> &str {
        &self.student_input
    }

    pub fn limits(&self) -> DialogueLimits {
        self.limits
    }

    /// Runs the classifier for the current stage.
    pub async fn classify(&mut self) -> Result<ClassifierOutput, DialogueError> {
        let stage = self.state.stage();
        let kind = PromptKind::classifier_for(stage).ok_or_else(|| DialogueError::InvalidStage {
            stage,
            operation: "classify input",
        })?;
        let state = self.state.clone();
        match self.execute(kind, &state).await? {
            ParsedOutput::Classification(decision) => {
                debug!(
                    stage = %stage,
                    intent = %decision.detected_intent,
                    confidence = decision.confidence_score,
                    "Classified student input"
                );
                Ok(decision)
            }
            _ => Err(self.invalid_output(format!("{:?} did not return a classification", kind))),
        }
    }

    /// Runs a response generator against `state`.
    pub async fn generate(
        &mut self,
        kind: PromptKind,
        state: &DialogueState,
    ) -> Result<GeneratorOutput, DialogueError> {
        match self.execute(kind, state).await? {
            ParsedOutput::Generation(reply) => Ok(reply),
            _ => Err(self.invalid_output(format!("{:?} did not return a generation", kind))),
        }
    }

    /// Produces the free-text closing summary for `state`.
    pub async fn summarize(&mut self, state: &DialogueState) -> Result<String, DialogueError> {
        match self.execute(PromptKind::Summary, state).await? {
            ParsedOutput::Text(text) => Ok(text),
            _ => Err(self.invalid_output("summary did not return text")),
        }
    }

    /// Error for a decoded intent the handler has no branch for.
    pub fn unexpected_intent(&self, intent: Trigger) -> DialogueError {
        self.invalid_output(format!(
            "intent {} is not handled in stage {}",
            intent,
            self.state.stage()
        ))
    }

    /// Stance text from the classifier, or the raw student input.
    ///
    /// Returns `(position, reason)`.
    pub fn stance_or_fallback(&self, decision: &ClassifierOutput) -> (String, String) {
        let reason = decision.reasoning().unwrap_or_default().to_string();
        match decision.stance() {
            Some(position) => (position.to_string(), reason),
            None => {
                let err = ValidationError::empty_field("extracted_data.stance");
                warn!(error = %err, stage = %self.state.stage(), "Falling back to raw input for stance");
                (self.student_input.clone(), reason)
            }
        }
    }

    /// Consumes the context into a handler outcome carrying the merged usage.
    pub fn finish(self, message: String, new_state: DialogueState, ended: bool) -> HandlerOutcome {
        HandlerOutcome {
            message,
            new_state,
            ended,
            usage: self.usage,
        }
    }

    async fn execute(
        &mut self,
        kind: PromptKind,
        state: &DialogueState,
    ) -> Result<ParsedOutput, DialogueError> {
        if self.calls >= MAX_MODEL_CALLS {
            warn!(
                stage = %self.state.stage(),
                prompt = ?kind,
                "Handler exceeded model call budget"
            );
            return Err(ConfigurationError::CallBudgetExceeded {
                stage: self.state.stage(),
                limit: MAX_MODEL_CALLS,
            }
            .into());
        }
        self.calls += 1;

        let mut context =
            PromptContext::from_state(state, self.topic_context.as_deref(), self.limits.max_loops());
        if kind.is_classifier() {
            context = context.with_student_input(self.student_input.clone());
        }
        let prompt = PromptBuilder::new(kind).build(state.conversation_history(), &context);

        match self.executor.execute(&prompt).await {
            Ok(outcome) => {
                debug!(
                    prompt = ?kind,
                    input_tokens = outcome.usage.input_token_count,
                    output_tokens = outcome.usage.output_token_count,
                    "Model call completed"
                );
                self.usage = self.usage.record(kind.feature(), outcome.usage);
                Ok(outcome.output)
            }
            Err(err) => {
                if let Some(partial) = err.partial_usage() {
                    self.usage = self.usage.record(kind.feature(), partial);
                }
                debug!(prompt = ?kind, kind = ?err.kind(), "Model call failed");
                Err(DialogueError::execution(err, self.usage.clone()))
            }
        }
    }

    fn invalid_output(&self, reason: impl Into<String>) -> DialogueError {
        DialogueError::execution(
            ExecutionError::invalid_output(reason, None),
            self.usage.clone(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockExecutionAdapter;
    use crate::domain::dialogue::{DialogueStage, SubState};

    #[tokio::test]
    async fn third_model_call_is_refused_without_reaching_adapter() {
        let mock = Arc::new(
            MockExecutionAdapter::new()
                .with_generation("One.", "First?")
                .with_generation("Two.", "Second?")
                .with_generation("Three.", "Third?"),
        );
        let state = DialogueState::new("X")
            .transition(DialogueStage::AskingStance, SubState::Main)
            .unwrap();
        let mut ctx = HandlerContext::new(
            mock.clone(),
            state.clone(),
            "",
            None,
            DialogueLimits::default(),
        );

        ctx.generate(PromptKind::StanceOpening, &state).await.unwrap();
        ctx.generate(PromptKind::StanceOpening, &state).await.unwrap();
        let err = ctx
            .generate(PromptKind::StanceOpening, &state)
            .await
            .unwrap_err();

        assert_eq!(
            err,
            DialogueError::Configuration(ConfigurationError::CallBudgetExceeded {
                stage: DialogueStage::AskingStance,
                limit: MAX_MODEL_CALLS,
            })
        );
        assert_eq!(mock.call_count(), 2);
    }
}
