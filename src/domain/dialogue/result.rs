//! Result of one orchestrator step.

use serde::Serialize;

use super::state::DialogueState;
use super::usage::TokenUsageReport;

/// Outcome of `start_conversation` or `process_student_input`.
///
/// Transient: the host persists `new_state` and folds `usage` into its
/// running total; the result itself is never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageResult {
    /// Message to show the student (already appended to `new_state`'s history).
    pub message: String,
    pub new_state: DialogueState,
    /// True once the dialogue reached `Ended`.
    pub ended: bool,
    /// Merged usage of every model call made for this step.
    pub usage: TokenUsageReport,
}
