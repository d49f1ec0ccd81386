//! Dialogue loop configuration

use serde::Deserialize;

use crate::domain::dialogue::{DialogueLimits, DEFAULT_MAX_LOOPS, DEFAULT_MIN_LOOPS_FOR_CLOSURE};

use super::error::ValidationError;

/// Loop bounds consumed by the orchestrator
#[derive(Debug, Clone, Deserialize)]
pub struct DialogueConfig {
    /// Maximum case-challenge loops before closure is forced
    #[serde(default = "default_max_loops")]
    pub max_loops: u32,

    /// Loops required before the student may move to closure
    #[serde(default = "default_min_loops_for_closure")]
    pub min_loops_for_closure: u32,
}

impl DialogueConfig {
    /// Validate loop bounds
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.limits().map(|_| ())
    }

    /// Converts into the domain's validated limits.
    pub fn limits(&self) -> Result<DialogueLimits, ValidationError> {
        if self.max_loops == 0 {
            return Err(ValidationError::InvalidMaxLoops);
        }
        DialogueLimits::new(self.max_loops, self.min_loops_for_closure)
            .map_err(|_| ValidationError::MinLoopsExceedMax)
    }
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_loops: default_max_loops(),
            min_loops_for_closure: default_min_loops_for_closure(),
        }
    }
}

fn default_max_loops() -> u32 {
    DEFAULT_MAX_LOOPS
}

fn default_min_loops_for_closure() -> u32 {
    DEFAULT_MIN_LOOPS_FOR_CLOSURE
}
