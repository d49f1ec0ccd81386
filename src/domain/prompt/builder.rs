//! Prompt construction.

use serde::Serialize;

use crate::domain::dialogue::{DialogueState, Turn, TurnRole};

use super::schema::OutputSchema;
use super::templates::{self, PromptKind};

/// Placeholder user turn appended when the history does not end with the
/// student. The chat protocol rejects requests whose last turn is not a user
/// turn.
pub const SYNTHETIC_USER_TURN: &str = "[continue]";

/// A structured request for one model call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Prompt {
    pub kind: PromptKind,
    pub system_instruction: String,
    /// Prior turns; the last one always has the user role.
    pub contents: Vec<Turn>,
    pub schema: OutputSchema,
}

impl Prompt {
    /// Usage feature this call is billed under.
    pub fn feature(&self) -> &'static str {
        self.kind.feature()
    }

    pub fn ends_with_user_turn(&self) -> bool {
        matches!(self.contents.last(), Some(turn) if turn.role == TurnRole::User)
    }
}

/// Stage context interpolated into an instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    pub topic: String,
    pub topic_context: Option<String>,
    pub stance: Option<String>,
    pub principle: Option<String>,
    pub current_case: Option<String>,
    pub student_input: Option<String>,
    pub loop_count: u32,
    pub max_loops: u32,
}

impl PromptContext {
    /// Captures what the templates need from `state`.
    pub fn from_state(state: &DialogueState, topic_context: Option<&str>, max_loops: u32) -> Self {
        Self {
            topic: state.topic().to_string(),
            topic_context: topic_context.map(str::to_string),
            stance: state
                .current_stance()
                .map(|s| format!("v{}: {} (because {})", s.version, s.position, s.reason)),
            principle: state.current_principle().map(|p| match &p.classification {
                Some(class) => format!("v{}: {} [{}]", p.version, p.statement, class),
                None => format!("v{}: {}", p.version, p.statement),
            }),
            current_case: state.current_case().map(str::to_string),
            student_input: None,
            loop_count: state.loop_count(),
            max_loops,
        }
    }

    pub fn with_student_input(mut self, text: impl Into<String>) -> Self {
        self.student_input = Some(text.into());
        self
    }

    fn render(&self) -> String {
        let mut lines = vec![format!("Topic: {}", self.topic)];
        if let Some(ctx) = &self.topic_context {
            lines.push(format!("Topic background: {}", ctx));
        }
        if let Some(stance) = &self.stance {
            lines.push(format!("Current stance: {}", stance));
        }
        if let Some(case) = &self.current_case {
            lines.push(format!("Current case: {}", case));
        }
        if let Some(principle) = &self.principle {
            lines.push(format!("Current principle: {}", principle));
        }
        lines.push(format!(
            "Completed case cycles: {} of at most {}",
            self.loop_count, self.max_loops
        ));
        if let Some(input) = &self.student_input {
            lines.push(format!("Student's latest message: {}", input));
        }
        lines.join("\n")
    }
}

/// Builds prompts for one stage × role combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    kind: PromptKind,
}

impl PromptBuilder {
    pub fn new(kind: PromptKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> PromptKind {
        self.kind
    }

    /// Builds a prompt from `history` and `input`.
    ///
    /// Deterministic and non-mutating: `history` is copied, and exactly one
    /// [`SYNTHETIC_USER_TURN`] is appended when it is empty or ends with a
    /// model turn.
    pub fn build(&self, history: &[Turn], input: &PromptContext) -> Prompt {
        let system_instruction = format!(
            "{}\n\n{}\n\n## Context\n{}",
            templates::preamble(self.kind),
            self.kind.instruction(),
            input.render()
        );

        let mut contents = history.to_vec();
        if !matches!(contents.last(), Some(turn) if turn.role == TurnRole::User) {
            contents.push(Turn::user(SYNTHETIC_USER_TURN));
        }

        Prompt {
            kind: self.kind,
            system_instruction,
            contents,
            schema: self.kind.schema(),
        }
    }
}
