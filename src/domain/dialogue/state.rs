//! Dialogue state value types.
//!
//! `DialogueState` is an immutable value: every operation in
//! [`versioning`](super::versioning) returns a new instance and leaves the
//! input untouched. The host application owns persistence between calls.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{StateMachine, Timestamp};

use super::stage::{DialogueStage, SubState};

/// Who produced a turn in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// The student.
    User,
    /// The language model, speaking as the tutor.
    Model,
}

/// One message in the conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
}

impl Turn {
    /// Creates a student turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
        }
    }

    /// Creates a model turn.
    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Model,
            text: text.into(),
        }
    }
}

/// A version of the student's stated position.
///
/// Versions are never mutated; a revision appends a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StanceVersion {
    pub version: u32,
    pub position: String,
    pub reason: String,
    pub established_at: Timestamp,
}

/// A version of the principle the student believes underlies the stance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipleVersion {
    pub version: u32,
    pub statement: String,
    pub classification: Option<String>,
    pub established_at: Timestamp,
}

/// Complete state of one dialogue, threaded through every orchestrator call.
///
/// The current stance and principle are not stored separately: they are
/// always read from the tail of their history, so they cannot drift apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogueState {
    pub(super) topic: String,
    pub(super) stage: DialogueStage,
    pub(super) sub_state: SubState,
    pub(super) loop_count: u32,
    pub(super) stance_history: Vec<StanceVersion>,
    pub(super) principle_history: Vec<PrincipleVersion>,
    #[serde(default)]
    pub(super) current_case: Option<String>,
    #[serde(default)]
    pub(super) case_scaffolded: bool,
    pub(super) conversation_history: Vec<Turn>,
    pub(super) summary: Option<String>,
    pub(super) discussion_satisfied: bool,
}

impl DialogueState {
    /// Creates a fresh state for `topic`: awaiting start, every history empty.
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            stage: DialogueStage::AwaitingStart,
            sub_state: SubState::Main,
            loop_count: 0,
            stance_history: Vec::new(),
            principle_history: Vec::new(),
            current_case: None,
            case_scaffolded: false,
            conversation_history: Vec::new(),
            summary: None,
            discussion_satisfied: false,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn stage(&self) -> DialogueStage {
        self.stage
    }

    pub fn sub_state(&self) -> SubState {
        self.sub_state
    }

    /// Completed case-challenge ⇄ principle-reasoning cycles.
    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn stance_history(&self) -> &[StanceVersion] {
        &self.stance_history
    }

    /// The latest stance, if one has been established.
    pub fn current_stance(&self) -> Option<&StanceVersion> {
        self.stance_history.last()
    }

    pub fn principle_history(&self) -> &[PrincipleVersion] {
        &self.principle_history
    }

    /// The latest principle, if one has been articulated.
    pub fn current_principle(&self) -> Option<&PrincipleVersion> {
        self.principle_history.last()
    }

    /// Text of the counter-case currently put to the student.
    pub fn current_case(&self) -> Option<&str> {
        self.current_case.as_deref()
    }

    /// Returns true if the current counter-case has been scaffolded at
    /// least once. Cleared whenever the stage changes.
    pub fn case_scaffolded(&self) -> bool {
        self.case_scaffolded
    }

    pub fn conversation_history(&self) -> &[Turn] {
        &self.conversation_history
    }

    /// Role of the most recent turn, if any.
    pub fn last_turn_role(&self) -> Option<TurnRole> {
        self.conversation_history.last().map(|t| t.role)
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn discussion_satisfied(&self) -> bool {
        self.discussion_satisfied
    }

    /// Returns true once the dialogue has ended or been aborted.
    pub fn is_terminal(&self) -> bool {
        self.stage.is_terminal()
    }
}
