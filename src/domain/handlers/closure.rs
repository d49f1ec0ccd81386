//! Handler for the closure stage.

use async_trait::async_trait;
use tracing::info;

use crate::domain::dialogue::{DialogueError, DialogueStage, SubState, Trigger};
use crate::domain::prompt::PromptKind;

use super::{HandlerContext, HandlerOutcome, StageHandler};

/// Confirms the student is done and writes the closing summary.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClosureHandler;

#[async_trait]
impl StageHandler for ClosureHandler {
    fn stage(&self) -> DialogueStage {
        DialogueStage::Closure
    }

    async fn handle(&self, mut ctx: HandlerContext) -> Result<HandlerOutcome, DialogueError> {
        let decision = ctx.classify().await?;

        match decision.detected_intent {
            Trigger::Clarify => {
                let next = ctx
                    .state()
                    .transition(DialogueStage::Closure, SubState::Clarify)?;
                let reply = ctx.generate(PromptKind::ClosureClarify, &next).await?;
                Ok(ctx.finish(reply.message(), next, false))
            }
            Trigger::ConfirmEnd => {
                let state = ctx.state().clone();
                let summary = ctx.summarize(&state).await?;
                let next = state.concluded(summary.clone())?;
                info!(
                    stances = next.stance_history().len(),
                    principles = next.principle_history().len(),
                    loops = next.loop_count(),
                    "Dialogue concluded"
                );
                Ok(ctx.finish(summary, next, true))
            }
            other => Err(ctx.unexpected_intent(other)),
        }
    }
}
