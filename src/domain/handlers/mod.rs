//! Stage handlers.
//!
//! One handler per active stage. Each `handle` call runs one classifier
//! call, then at most one response-generator (or summary) call, and returns
//! the next state without touching the caller's copy.
//!
//! # Module Organization
//!
//! - `context` - `HandlerContext`, the handler's only route to the model
//! - `asking_stance`, `case_challenge`, `principle_reasoning`, `closure` -
//!   the four handlers
//! - `registry` - `HandlerRegistry`, stage → handler lookup

mod asking_stance;
mod case_challenge;
mod closure;
mod context;
mod principle_reasoning;
mod registry;

use async_trait::async_trait;

use crate::domain::dialogue::{DialogueError, DialogueStage};

pub use asking_stance::AskingStanceHandler;
pub use case_challenge::CaseChallengeHandler;
pub use closure::ClosureHandler;
pub use context::{HandlerContext, HandlerOutcome, MAX_MODEL_CALLS};
pub use principle_reasoning::PrincipleReasoningHandler;
pub use registry::HandlerRegistry;

/// Decides the response and next state for one stage.
#[async_trait]
pub trait StageHandler: Send + Sync {
    /// The stage this handler serves.
    fn stage(&self) -> DialogueStage;

    /// Handles one student turn.
    ///
    /// Must not perform I/O other than through `ctx`.
    async fn handle(&self, ctx: HandlerContext) -> Result<HandlerOutcome, DialogueError>;
}
