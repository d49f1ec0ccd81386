//! Instruction templates for every stage × role combination.
//!
//! Templates are static text. Stage-specific context (topic, stance, case,
//! principle, student input) is rendered by the builder and appended below
//! the template, so the same inputs always produce the same instruction.

use serde::Serialize;

use crate::domain::dialogue::{
    DialogueStage, FEATURE_CLASSIFICATION, FEATURE_RESPONSE_GENERATION,
};

use super::schema::OutputSchema;

/// Every prompt the dialogue can send.
///
/// Closed on purpose: a new stage adds variants here and the compiler points
/// at every match that needs a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Opening question asking for a stance. Also used to re-ask on clarify.
    StanceOpening,
    StanceClassifier,
    /// Presents a new counter-case against the current stance.
    CaseOpening,
    CaseClarify,
    CaseScaffold,
    CaseClassifier,
    /// Asks which principle underlies the student's answers.
    PrincipleOpening,
    PrincipleClarify,
    PrincipleScaffold,
    PrincipleClassifier,
    ClosureOpening,
    ClosureClarify,
    ClosureClassifier,
    /// Final free-text summary of the dialogue.
    Summary,
}

impl PromptKind {
    /// Classifier prompt for `stage`, if the stage classifies input.
    pub fn classifier_for(stage: DialogueStage) -> Option<PromptKind> {
        match stage {
            DialogueStage::AskingStance => Some(Self::StanceClassifier),
            DialogueStage::CaseChallenge => Some(Self::CaseClassifier),
            DialogueStage::PrincipleReasoning => Some(Self::PrincipleClassifier),
            DialogueStage::Closure => Some(Self::ClosureClassifier),
            DialogueStage::AwaitingStart | DialogueStage::Ended | DialogueStage::Aborted => None,
        }
    }

    /// Stage whose context this prompt is built for.
    pub fn stage(&self) -> DialogueStage {
        match self {
            Self::StanceOpening | Self::StanceClassifier => DialogueStage::AskingStance,
            Self::CaseOpening | Self::CaseClarify | Self::CaseScaffold | Self::CaseClassifier => {
                DialogueStage::CaseChallenge
            }
            Self::PrincipleOpening
            | Self::PrincipleClarify
            | Self::PrincipleScaffold
            | Self::PrincipleClassifier => DialogueStage::PrincipleReasoning,
            Self::ClosureOpening | Self::ClosureClarify | Self::ClosureClassifier | Self::Summary => {
                DialogueStage::Closure
            }
        }
    }

    pub fn is_classifier(&self) -> bool {
        matches!(
            self,
            Self::StanceClassifier
                | Self::CaseClassifier
                | Self::PrincipleClassifier
                | Self::ClosureClassifier
        )
    }

    /// Output shape the model must produce.
    pub fn schema(&self) -> OutputSchema {
        if self.is_classifier() {
            OutputSchema::classifier(self.stage())
        } else if *self == Self::Summary {
            OutputSchema::Text
        } else {
            OutputSchema::Generator
        }
    }

    /// Usage feature the call is billed under.
    pub fn feature(&self) -> &'static str {
        if self.is_classifier() {
            FEATURE_CLASSIFICATION
        } else {
            FEATURE_RESPONSE_GENERATION
        }
    }

    /// Static instruction text.
    pub fn instruction(&self) -> &'static str {
        match self {
            Self::StanceOpening => STANCE_OPENING,
            Self::StanceClassifier => STANCE_CLASSIFIER,
            Self::CaseOpening => CASE_OPENING,
            Self::CaseClarify => CASE_CLARIFY,
            Self::CaseScaffold => CASE_SCAFFOLD,
            Self::CaseClassifier => CASE_CLASSIFIER,
            Self::PrincipleOpening => PRINCIPLE_OPENING,
            Self::PrincipleClarify => PRINCIPLE_CLARIFY,
            Self::PrincipleScaffold => PRINCIPLE_SCAFFOLD,
            Self::PrincipleClassifier => PRINCIPLE_CLASSIFIER,
            Self::ClosureOpening => CLOSURE_OPENING,
            Self::ClosureClarify => CLOSURE_CLARIFY,
            Self::ClosureClassifier => CLOSURE_CLASSIFIER,
            Self::Summary => SUMMARY,
        }
    }
}

// ============================================================================
// Shared preamble
// ============================================================================

const TUTOR_PREAMBLE: &str = r#"You are a Socratic tutor guiding one student through a structured ethics dialogue.
Never lecture and never state your own opinion on the topic. Keep replies short and ask exactly one question at a time."#;

const CLASSIFIER_PREAMBLE: &str = r#"You are the intent classifier for a Socratic ethics dialogue.
Read the conversation and the student's latest message, then choose exactly one intent from the allowed list.
Return JSON only. Explain your choice in "rationale", give "confidence_score" between 0 and 1, and fill "extracted_data" with anything the student stated explicitly (leave fields null otherwise)."#;

// ============================================================================
// Asking stance
// ============================================================================

const STANCE_OPENING: &str = r#"Stage: asking for the student's stance.
Introduce the topic in one or two sentences and ask the student for their position and the main reason behind it.
If the student already tried to answer but was unclear, rephrase the question more simply."#;

const STANCE_CLASSIFIER: &str = r#"Stage: asking for the student's stance.
Choose TR_V1_ESTABLISHED when the student gave a position on the topic together with at least one reason; put the position in extracted_data.stance and the reason in extracted_data.reasoning.
Choose TR_CLARIFY when the student is confused, off topic, or gave no position."#;

// ============================================================================
// Case challenge
// ============================================================================

const CASE_OPENING: &str = r#"Stage: case challenge.
Present one short, concrete counter-case that puts pressure on the student's current stance. Do not reuse a case already discussed.
Ask whether their stance still holds for this case."#;

const CASE_CLARIFY: &str = r#"Stage: case challenge, clarification.
The student did not understand the case. Restate the same case in plainer words and ask again."#;

const CASE_SCAFFOLD: &str = r#"Stage: case challenge, scaffolding.
The student's answer to the case contradicts their stated stance. Point out the tension gently and invite them to revise or defend their position."#;

const CASE_CLASSIFIER: &str = r#"Stage: case challenge.
Choose TR_CASE_COMPLETED when the student gave a coherent answer to the case; if they revised their stance, put the revised position in extracted_data.stance and its reason in extracted_data.reasoning.
Choose TR_SCAFFOLD when their answer contradicts their stance without acknowledging it.
Choose TR_CLARIFY when they did not understand the case."#;

// ============================================================================
// Principle reasoning
// ============================================================================

const PRINCIPLE_OPENING: &str = r#"Stage: principle reasoning.
Ask the student which general principle explains both their stance and their answer to the case."#;

const PRINCIPLE_CLARIFY: &str = r#"Stage: principle reasoning, clarification.
The student is unsure what a principle is. Explain briefly with a neutral everyday example and ask again."#;

const PRINCIPLE_SCAFFOLD: &str = r#"Stage: principle reasoning, scaffolding.
The stated principle does not fit the student's own answers. Show the mismatch and ask them to refine the principle."#;

const PRINCIPLE_CLASSIFIER: &str = r#"Stage: principle reasoning.
Put the principle the student stated in extracted_data.principle and, if you can, its ethical family (for example consequentialist, deontological, virtue) in extracted_data.classification.
Choose loop_to_stage2 when the principle deserves testing against another case.
Choose advance_to_closure when the principle is stable and further cases would add little.
Choose TR_SCAFFOLD when the principle contradicts the student's answers, TR_CLARIFY when they are confused."#;

// ============================================================================
// Closure
// ============================================================================

const CLOSURE_OPENING: &str = r#"Stage: closure.
Briefly reflect back how the student's stance and principle developed during the dialogue and ask whether they are ready to finish."#;

const CLOSURE_CLARIFY: &str = r#"Stage: closure, clarification.
The student wants to add or ask something. Respond briefly and ask again whether they are ready to finish."#;

const CLOSURE_CLASSIFIER: &str = r#"Stage: closure.
Choose TR_CONFIRM_END when the student agrees to finish. Choose TR_CLARIFY otherwise."#;

const SUMMARY: &str = r#"Write a short closing summary of the dialogue for the student in plain prose (no JSON, no headings).
Mention their first stance, how it changed, and the principle they arrived at. Do not ask a question."#;

/// Preamble shared by every prompt of the given role.
pub(super) fn preamble(kind: PromptKind) -> &'static str {
    if kind.is_classifier() {
        CLASSIFIER_PREAMBLE
    } else {
        TUTOR_PREAMBLE
    }
}
