//! Handler for the stance-asking stage.

use async_trait::async_trait;
use tracing::info;

use crate::domain::dialogue::{DialogueError, DialogueStage, SubState, Trigger};
use crate::domain::prompt::PromptKind;

use super::{HandlerContext, HandlerOutcome, StageHandler};

/// Waits for a first stance, then opens the first case challenge.
#[derive(Debug, Default, Clone, Copy)]
pub struct AskingStanceHandler;

#[async_trait]
impl StageHandler for AskingStanceHandler {
    fn stage(&self) -> DialogueStage {
        DialogueStage::AskingStance
    }

    async fn handle(&self, mut ctx: HandlerContext) -> Result<HandlerOutcome, DialogueError> {
        let decision = ctx.classify().await?;

        match decision.detected_intent {
            Trigger::Clarify => {
                let next = ctx
                    .state()
                    .transition(DialogueStage::AskingStance, SubState::Clarify)?;
                let reply = ctx.generate(PromptKind::StanceOpening, &next).await?;
                Ok(ctx.finish(reply.message(), next, false))
            }
            Trigger::V1Established => {
                let (position, reason) = ctx.stance_or_fallback(&decision);
                let next = ctx
                    .state()
                    .with_stance(position, reason)
                    .with_loop_count(0)
                    .transition(DialogueStage::CaseChallenge, SubState::Main)?;
                info!(topic = %next.topic(), "First stance established");

                let reply = ctx.generate(PromptKind::CaseOpening, &next).await?;
                let next = next.with_case(reply.response_message.clone());
                Ok(ctx.finish(reply.message(), next, false))
            }
            other => Err(ctx.unexpected_intent(other)),
        }
    }
}
