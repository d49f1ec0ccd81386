//! Dialogue domain module.
//!
//! The stage machine, the immutable dialogue state with its stance and
//! principle version histories, classifier triggers, and token accounting.

mod errors;
mod limits;
mod result;
mod stage;
mod state;
mod trigger;
mod usage;
mod versioning;

pub use errors::{ConfigurationError, DialogueError};
pub use limits::{DialogueLimits, DEFAULT_MAX_LOOPS, DEFAULT_MIN_LOOPS_FOR_CLOSURE};
pub use result::StageResult;
pub use stage::{DialogueStage, SubState};
pub use state::{DialogueState, PrincipleVersion, StanceVersion, Turn, TurnRole};
pub use trigger::Trigger;
pub use usage::{
    TokenUsage, TokenUsageReport, FEATURE_CLASSIFICATION, FEATURE_RESPONSE_GENERATION,
};
