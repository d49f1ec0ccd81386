//! Handler for the principle-reasoning stage.
//!
//! This is where the loop bounds are enforced. A `loop_to_stage2` decision
//! that would reach `max_loops` is turned into closure, and an early
//! `advance_to_closure` is downgraded to another loop.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::dialogue::{DialogueError, DialogueStage, DialogueState, SubState, Trigger};
use crate::domain::prompt::{ClassifierOutput, PromptKind};

use super::{HandlerContext, HandlerOutcome, StageHandler};

/// Extracts the principle behind the stance and decides whether to loop.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrincipleReasoningHandler;

/// Where a loop/advance decision actually leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopDecision {
    /// Back to a new case with the given loop count.
    NextCase(u32),
    /// Into closure with the given loop count.
    Close(u32),
}

impl PrincipleReasoningHandler {
    fn decide(
        intent: Trigger,
        loop_count: u32,
        max_loops: u32,
        min_for_closure: u32,
    ) -> LoopDecision {
        if intent == Trigger::AdvanceToClosure {
            if loop_count >= min_for_closure {
                return LoopDecision::Close(loop_count);
            }
            warn!(
                loop_count,
                min_loops_for_closure = min_for_closure,
                "Closure requested too early, continuing with another case"
            );
        }

        let next = loop_count.saturating_add(1).min(max_loops);
        if next >= max_loops {
            warn!(loop_count = next, max_loops, "Loop limit reached, forcing closure");
            LoopDecision::Close(next)
        } else {
            LoopDecision::NextCase(next)
        }
    }

    /// Appends principle and stance versions from the classifier output.
    ///
    /// Runs before any stage transition.
    fn record_versions(ctx: &HandlerContext, decision: &ClassifierOutput) -> DialogueState {
        let mut next = ctx.state().clone();

        let classification = decision.classification().map(str::to_string);
        match decision.principle() {
            Some(statement) => {
                let changed = next.current_principle().map_or(true, |current| {
                    current.statement != statement || current.classification != classification
                });
                if changed {
                    next = next.with_principle(statement, classification);
                }
            }
            None if next.current_principle().is_none() => {
                warn!("Falling back to raw input for first principle");
                next = next.with_principle(ctx.student_input(), classification);
            }
            None => {}
        }

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
            }
        }

        next
    }
}

#[async_trait]
impl StageHandler for PrincipleReasoningHandler {
    fn stage(&self) -> DialogueStage {
        DialogueStage::PrincipleReasoning
    }

    async fn handle(&self, mut ctx: HandlerContext) -> Result<HandlerOutcome, DialogueError> {
        let decision = ctx.classify().await?;

        let (sub_state, kind) = match decision.detected_intent {
            Trigger::Clarify => (SubState::Clarify, PromptKind::PrincipleClarify),
            Trigger::Scaffold => (SubState::Scaffold, PromptKind::PrincipleScaffold),
            intent @ (Trigger::LoopToStage2 | Trigger::AdvanceToClosure) => {
                let versioned = Self::record_versions(&ctx, &decision);
                let limits = ctx.limits();
                let route = Self::decide(
                    intent,
                    versioned.loop_count(),
                    limits.max_loops(),
                    limits.min_loops_for_closure(),
                );

                return match route {
                    LoopDecision::NextCase(loop_count) => {
                        let next = versioned
                            .with_loop_count(loop_count)
                            .transition(DialogueStage::CaseChallenge, SubState::Main)?;
                        info!(loop_count, "Starting another case challenge");
                        let reply = ctx.generate(PromptKind::CaseOpening, &next).await?;
                        let next = next.with_case(reply.response_message.clone());
                        Ok(ctx.finish(reply.message(), next, false))
                    }
                    LoopDecision::Close(loop_count) => {
                        let next = versioned
                            .with_loop_count(loop_count)
                            .transition(DialogueStage::Closure, SubState::Main)?;
                        let reply = ctx.generate(PromptKind::ClosureOpening, &next).await?;
                        Ok(ctx.finish(reply.message(), next, false))
                    }
                };
            }
            other => return Err(ctx.unexpected_intent(other)),
        };

        let next = ctx
            .state()
            .transition(DialogueStage::PrincipleReasoning, sub_state)?;
        let reply = ctx.generate(kind, &next).await?;
        Ok(ctx.finish(reply.message(), next, false))
    }
}
