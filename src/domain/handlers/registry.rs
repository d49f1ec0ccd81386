//! Stage → handler lookup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::dialogue::{ConfigurationError, DialogueStage};

use super::{
    AskingStanceHandler, CaseChallengeHandler, ClosureHandler, PrincipleReasoningHandler,
    StageHandler,
};

/// Maps each active stage to its handler.
///
/// Handlers can be replaced at runtime with [`register`](Self::register),
/// e.g. to inject a custom closure flow.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<DialogueStage, Arc<dyn StageHandler>>,
}

impl HandlerRegistry {
    /// An empty registry. Every lookup fails until handlers are registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in handler for every active stage.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        for stage in DialogueStage::ALL {
            let handler: Option<Arc<dyn StageHandler>> = match stage {
                DialogueStage::AskingStance => Some(Arc::new(AskingStanceHandler)),
                DialogueStage::CaseChallenge => Some(Arc::new(CaseChallengeHandler)),
                DialogueStage::PrincipleReasoning => Some(Arc::new(PrincipleReasoningHandler)),
                DialogueStage::Closure => Some(Arc::new(ClosureHandler)),
                DialogueStage::AwaitingStart | DialogueStage::Ended | DialogueStage::Aborted => {
                    None
                }
            };
            if let Some(handler) = handler {
                registry.register(handler);
            }
        }
        registry
    }

    /// Registers `handler` for its stage, returning the one it replaces.
    pub fn register(&mut self, handler: Arc<dyn StageHandler>) -> Option<Arc<dyn StageHandler>> {
        self.handlers.insert(handler.stage(), handler)
    }

    /// Handler for `stage`.
    ///
    /// # Errors
    /// `ConfigurationError::UnregisteredStage` if nothing handles `stage`
    pub fn get(&self, stage: DialogueStage) -> Result<Arc<dyn StageHandler>, ConfigurationError> {
        self.handlers
            .get(&stage)
            .cloned()
            .ok_or(ConfigurationError::UnregisteredStage(stage))
    }

    pub fn contains(&self, stage: DialogueStage) -> bool {
        self.handlers.contains_key(&stage)
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut stages: Vec<_> = self.handlers.keys().collect();
        stages.sort();
        f.debug_struct("HandlerRegistry")
            .field("stages", &stages)
            .finish()
    }
}
