//! Dialogue stages and the sub-states used inside them.
//!
//! Stages flow in a fixed order with one loop:
//! `AwaitingStart` → `AskingStance` → `CaseChallenge` ⇄ `PrincipleReasoning`
//! → `Closure` → `Ended`. Any non-terminal stage may move to `Aborted`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// The stage of a Socratic dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DialogueStage {
    /// Session created, no model call made yet.
    AwaitingStart,
    /// Asking the student to state a position and a reason.
    AskingStance,
    /// Confronting the stance with a counter-case.
    CaseChallenge,
    /// Extracting the principle behind the student's answer.
    PrincipleReasoning,
    /// Summarising and asking whether the student is done.
    Closure,
    /// Normal end of the discussion.
    Ended,
    /// Explicitly stopped by an operator.
    Aborted,
}

impl DialogueStage {
    /// Every stage, in flow order.
    pub const ALL: [DialogueStage; 7] = [
        DialogueStage::AwaitingStart,
        DialogueStage::AskingStance,
        DialogueStage::CaseChallenge,
        DialogueStage::PrincipleReasoning,
        DialogueStage::Closure,
        DialogueStage::Ended,
        DialogueStage::Aborted,
    ];

    /// Wire name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingStart => "AWAITING_START",
            Self::AskingStance => "ASKING_STANCE",
            Self::CaseChallenge => "CASE_CHALLENGE",
            Self::PrincipleReasoning => "PRINCIPLE_REASONING",
            Self::Closure => "CLOSURE",
            Self::Ended => "ENDED",
            Self::Aborted => "ABORTED",
        }
    }

    /// Returns true for stages that consume student input through a handler.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            Self::AskingStance | Self::CaseChallenge | Self::PrincipleReasoning | Self::Closure
        )
    }
}

impl fmt::Display for DialogueStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StateMachine for DialogueStage {
    fn valid_transitions(&self) -> Vec<Self> {
        use DialogueStage::*;
        match self {
            AwaitingStart => vec![AskingStance, Aborted],
            AskingStance => vec![AskingStance, CaseChallenge, Aborted],
            CaseChallenge => vec![CaseChallenge, PrincipleReasoning, Aborted],
            PrincipleReasoning => vec![PrincipleReasoning, CaseChallenge, Closure, Aborted],
            Closure => vec![Closure, Ended, Aborted],
            Ended | Aborted => vec![],
        }
    }
}

impl Default for DialogueStage {
    fn default() -> Self {
        Self::AwaitingStart
    }
}

/// Orthogonal mode within an active stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubState {
    /// Normal progress through the stage.
    #[default]
    Main,
    /// The student asked for, or needed, clarification.
    Clarify,
    /// A contradiction was pointed out; the student is invited to revise.
    Scaffold,
}

impl fmt::Display for SubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Main => "MAIN",
            Self::Clarify => "CLARIFY",
            Self::Scaffold => "SCAFFOLD",
        })
    }
}
