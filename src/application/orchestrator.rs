//! DialogueOrchestrator - The four session operations.
//!
//! Holds no per-session data. Every call is a function of the state passed
//! in plus the configured limits, and returns a new state alongside the
//! message and usage. On error the caller's state is untouched.

use std::sync::Arc;
use std::time::Duration;

use tracing::{info, instrument};

use crate::adapters::ai::{DeadlineExecutionAdapter, GeminiExecutionAdapter};
use crate::config::{AppConfig, ConfigError};
use crate::domain::dialogue::{
    DialogueError, DialogueLimits, DialogueStage, DialogueState, StageResult, SubState, TurnRole,
};
use crate::domain::handlers::{HandlerContext, HandlerOutcome, HandlerRegistry};
use crate::domain::prompt::PromptKind;
use crate::ports::ExecutionAdapter;

/// Drives a dialogue one step at a time.
#[derive(Clone)]
pub struct DialogueOrchestrator {
    executor: Arc<dyn ExecutionAdapter>,
    registry: HandlerRegistry,
    limits: DialogueLimits,
}

impl DialogueOrchestrator {
    /// Orchestrator with the standard handler for every active stage.
    pub fn new(executor: Arc<dyn ExecutionAdapter>, limits: DialogueLimits) -> Self {
        Self {
            executor,
            registry: HandlerRegistry::standard(),
            limits,
        }
    }

    /// Replaces the handler registry.
    pub fn with_registry(mut self, registry: HandlerRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Bounds every model call by `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.executor = Arc::new(DeadlineExecutionAdapter::new(self.executor, deadline));
        self
    }

    /// Wires the Gemini adapter and loop limits from configuration.
    ///
    /// # Errors
    /// - `ConfigError::ValidationFailed` if the configuration is invalid
    /// - `ConfigError::ClientSetup` if the HTTP client cannot be created
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let limits = config.dialogue.limits()?;
        let adapter = GeminiExecutionAdapter::try_new(config.ai.gemini_config()?)
            .map_err(|e| ConfigError::ClientSetup(e.to_string()))?;

        Ok(Self::new(Arc::new(adapter), limits).with_deadline(config.ai.timeout()))
    }

    pub fn limits(&self) -> DialogueLimits {
        self.limits
    }

    /// A fresh dialogue on `topic`. No model call.
    pub fn initialize_session(&self, topic: impl Into<String>) -> DialogueState {
        let state = DialogueState::new(topic);
        info!(topic = %state.topic(), "Dialogue session initialized");
        state
    }

    /// Issues the opening question and moves to `AskingStance`.
    ///
    /// # Errors
    /// - `DialogueError::InvalidStage` unless `state` is `AwaitingStart`
    /// - `DialogueError::Execution` if the model call fails
    #[instrument(skip(self, state, topic_context), fields(topic = %state.topic()))]
    pub async fn start_conversation(
        &self,
        state: &DialogueState,
        topic_context: Option<&str>,
    ) -> Result<StageResult, DialogueError> {
        if state.stage() != DialogueStage::AwaitingStart {
            return Err(DialogueError::InvalidStage {
                stage: state.stage(),
                operation: "start conversation",
            });
        }

        let next = state.transition(DialogueStage::AskingStance, SubState::Main)?;
        let mut ctx = HandlerContext::new(
            Arc::clone(&self.executor),
            next.clone(),
            String::new(),
            topic_context.map(str::to_owned),
            self.limits,
        );
        let opening = ctx.generate(PromptKind::StanceOpening, &next).await?;
        let result = self.complete(ctx.finish(opening.message(), next, false));

        info!(stage = %result.new_state.stage(), "Dialogue started");
        Ok(result)
    }

    /// Runs the current stage's handler on one student turn.
    ///
    /// The student's turn is appended before the handler runs and the
    /// handler's message after it. Usage covers every model call made.
    ///
    /// # Errors
    /// - `DialogueError::InvalidStage` if the dialogue has ended or was aborted
    /// - `DialogueError::Configuration` if no handler serves the stage
    /// - `DialogueError::Execution` if a model call fails
    #[instrument(
        skip(self, state, text, topic_context),
        fields(stage = %state.stage(), loop_count = state.loop_count())
    )]
    pub async fn process_student_input(
        &self,
        state: &DialogueState,
        text: &str,
        topic_context: Option<&str>,
    ) -> Result<StageResult, DialogueError> {
        if state.is_terminal() {
            return Err(DialogueError::InvalidStage {
                stage: state.stage(),
                operation: "process input",
            });
        }

        let with_input = state.with_turn(TurnRole::User, text);
        let handler = self.registry.get(state.stage())?;
        let ctx = HandlerContext::new(
            Arc::clone(&self.executor),
            with_input,
            text,
            topic_context.map(str::to_owned),
            self.limits,
        );
        let result = self.complete(handler.handle(ctx).await?);

        info!(
            from = %state.stage(),
            to = %result.new_state.stage(),
            sub_state = %result.new_state.sub_state(),
            loop_count = result.new_state.loop_count(),
            ended = result.ended,
            "Dialogue advanced"
        );
        Ok(result)
    }

    /// Stops the dialogue. No model call.
    pub fn abort(&self, state: &DialogueState) -> DialogueState {
        let next = state.aborted();
        info!(from = %state.stage(), "Dialogue aborted");
        next
    }

    fn complete(&self, outcome: HandlerOutcome) -> StageResult {
        let HandlerOutcome {
            message,
            new_state,
            ended,
            usage,
        } = outcome;
        StageResult {
            new_state: new_state.with_turn(TurnRole::Model, message.as_str()),
            message,
            ended,
            usage,
        }
    }
}
