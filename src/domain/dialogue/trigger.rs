//! Classifier triggers.
//!
//! A trigger is the enumerated outcome of a classifier call. Each active
//! stage accepts only its own subset; the decode step rejects anything else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::stage::DialogueStage;

/// Outcome of classifying a student turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trigger {
    #[serde(rename = "TR_CLARIFY")]
    Clarify,
    #[serde(rename = "TR_V1_ESTABLISHED")]
    V1Established,
    #[serde(rename = "TR_SCAFFOLD")]
    Scaffold,
    #[serde(rename = "TR_CASE_COMPLETED")]
    CaseCompleted,
    #[serde(rename = "loop_to_stage2")]
    LoopToStage2,
    #[serde(rename = "advance_to_closure")]
    AdvanceToClosure,
    #[serde(rename = "TR_CONFIRM_END")]
    ConfirmEnd,
}

const ASKING_STANCE_TRIGGERS: &[Trigger] = &[Trigger::Clarify, Trigger::V1Established];
const CASE_CHALLENGE_TRIGGERS: &[Trigger] =
    &[Trigger::Clarify, Trigger::Scaffold, Trigger::CaseCompleted];
const PRINCIPLE_REASONING_TRIGGERS: &[Trigger] = &[
    Trigger::Clarify,
    Trigger::Scaffold,
    Trigger::LoopToStage2,
    Trigger::AdvanceToClosure,
];
const CLOSURE_TRIGGERS: &[Trigger] = &[Trigger::Clarify, Trigger::ConfirmEnd];

impl Trigger {
    /// Wire name as it appears in the classifier schema.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Clarify => "TR_CLARIFY",
            Self::V1Established => "TR_V1_ESTABLISHED",
            Self::Scaffold => "TR_SCAFFOLD",
            Self::CaseCompleted => "TR_CASE_COMPLETED",
            Self::LoopToStage2 => "loop_to_stage2",
            Self::AdvanceToClosure => "advance_to_closure",
            Self::ConfirmEnd => "TR_CONFIRM_END",
        }
    }

    /// Triggers a classifier may return while the dialogue is in `stage`.
    ///
    /// Stages without a handler accept nothing.
    pub fn valid_for(stage: DialogueStage) -> &'static [Trigger] {
        match stage {
            DialogueStage::AskingStance => ASKING_STANCE_TRIGGERS,
            DialogueStage::CaseChallenge => CASE_CHALLENGE_TRIGGERS,
            DialogueStage::PrincipleReasoning => PRINCIPLE_REASONING_TRIGGERS,
            DialogueStage::Closure => CLOSURE_TRIGGERS,
            DialogueStage::AwaitingStart | DialogueStage::Ended | DialogueStage::Aborted => &[],
        }
    }

    /// Returns true if this trigger is part of `stage`'s vocabulary.
    pub fn is_valid_for(&self, stage: DialogueStage) -> bool {
        Self::valid_for(stage).contains(self)
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::Clarify,
            Self::V1Established,
            Self::Scaffold,
            Self::CaseCompleted,
            Self::LoopToStage2,
            Self::AdvanceToClosure,
            Self::ConfirmEnd,
        ]
        .into_iter()
        .find(|t| t.as_str() == s)
        .ok_or_else(|| format!("unknown trigger '{}'", s))
    }
}
