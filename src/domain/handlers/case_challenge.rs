//! Handler for the case-challenge stage.

use async_trait::async_trait;
use tracing::info;

use crate::domain::dialogue::{DialogueError, DialogueStage, SubState, Trigger};
use crate::domain::prompt::PromptKind;

use super::{HandlerContext, HandlerOutcome, StageHandler};

/// Tests the stance against a counter-case until the student answers it.
#[derive(Debug, Default, Clone, Copy)]
pub struct CaseChallengeHandler;

#[async_trait]
impl StageHandler for CaseChallengeHandler {
    fn stage(&self) -> DialogueStage {
        DialogueStage::CaseChallenge
    }

    async fn handle(&self, mut ctx: HandlerContext) -> Result<HandlerOutcome, DialogueError> {
        let decision = ctx.classify().await?;

        let (sub_state, kind) = match decision.detected_intent {
            Trigger::Clarify => (SubState::Clarify, PromptKind::CaseClarify),
            Trigger::Scaffold => (SubState::Scaffold, PromptKind::CaseScaffold),
            Trigger::CaseCompleted => {
                let mut next = ctx.state().clone();

                // Only a case that was scaffolded may revise the stance.
                if next.case_scaffolded() {
                    if let Some(position) = decision.stance() {
                        let changed = next
                            .current_stance()
                            .map_or(true, |current| current.position != position);
                        if changed {
                            let reason = decision
                                .reasoning()
                                .map(str::to_string)
                                .or_else(|| next.current_stance().map(|s| s.reason.clone()))
                                .unwrap_or_default();
                            next = next.with_stance(position, reason);
                            info!(
                                version = next.current_stance().map(|s| s.version),
                                "Stance revised after scaffolding"
                            );
                        }
                    }
                }

                let next = next.transition(DialogueStage::PrincipleReasoning, SubState::Main)?;
                let reply = ctx.generate(PromptKind::PrincipleOpening, &next).await?;
                return Ok(ctx.finish(reply.message(), next, false));
            }
            other => return Err(ctx.unexpected_intent(other)),
        };

        let next = ctx
            .state()
            .transition(DialogueStage::CaseChallenge, sub_state)?;
        let reply = ctx.generate(kind, &next).await?;
        Ok(ctx.finish(reply.message(), next, false))
    }
}
