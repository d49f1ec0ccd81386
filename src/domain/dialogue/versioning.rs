//! State and versioning utilities.
//!
//! Pure functions over [`DialogueState`]: each takes `&self` and returns a new
//! state. History vectors are only ever appended to, and version numbers are
//! derived from the current tail so they stay strictly increasing from 1.

use crate::domain::foundation::{StateMachine, Timestamp, ValidationError};

use super::stage::{DialogueStage, SubState};
use super::state::{DialogueState, PrincipleVersion, StanceVersion, Turn, TurnRole};

impl DialogueState {
    /// Appends one turn to the conversation history.
    pub fn with_turn(&self, role: TurnRole, text: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.conversation_history.push(Turn {
            role,
            text: text.into(),
        });
        next
    }

    /// Appends a new stance version; the first one is version 1.
    pub fn with_stance(&self, position: impl Into<String>, reason: impl Into<String>) -> Self {
        let version = self.current_stance().map_or(1, |s| s.version + 1);
        let mut next = self.clone();
        next.stance_history.push(StanceVersion {
            version,
            position: position.into(),
            reason: reason.into(),
            established_at: Timestamp::now(),
        });
        next
    }

    /// Appends a new principle version; the first one is version 1.
    pub fn with_principle(
        &self,
        statement: impl Into<String>,
        classification: Option<String>,
    ) -> Self {
        let version = self.current_principle().map_or(1, |p| p.version + 1);
        let mut next = self.clone();
        next.principle_history.push(PrincipleVersion {
            version,
            statement: statement.into(),
            classification,
            established_at: Timestamp::now(),
        });
        next
    }

    /// Records the counter-case currently put to the student.
    pub fn with_case(&self, case: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.current_case = Some(case.into());
        next
    }

    /// Sets the loop counter. Callers are responsible for the upper bound.
    pub fn with_loop_count(&self, loop_count: u32) -> Self {
        let mut next = self.clone();
        next.loop_count = loop_count;
        next
    }

    /// Moves to `stage`/`sub_state`, validating against the stage machine.
    ///
    /// Staying in the same stage is allowed wherever the stage lists itself
    /// as a target (the clarify and scaffold loops). Entering
    /// `CaseChallenge`/`Scaffold` marks the case as scaffolded until the
    /// stage changes.
    pub fn transition(
        &self,
        stage: DialogueStage,
        sub_state: SubState,
    ) -> Result<Self, ValidationError> {
        let stage = self.stage.transition_to(stage)?;
        let mut next = self.clone();
        if stage != self.stage {
            next.case_scaffolded = false;
        }
        if stage == DialogueStage::CaseChallenge && sub_state == SubState::Scaffold {
            next.case_scaffolded = true;
        }
        next.stage = stage;
        next.sub_state = sub_state;
        Ok(next)
    }

    /// Ends the dialogue with a summary, marking the discussion satisfied.
    pub fn concluded(&self, summary: impl Into<String>) -> Result<Self, ValidationError> {
        let mut next = self.transition(DialogueStage::Ended, SubState::Main)?;
        next.summary = Some(summary.into());
        next.discussion_satisfied = true;
        Ok(next)
    }

    /// Moves to `Aborted`. A terminal state is returned unchanged.
    pub fn aborted(&self) -> Self {
        if self.is_terminal() {
            return self.clone();
        }
        let mut next = self.clone();
        next.stage = DialogueStage::Aborted;
        next.sub_state = SubState::Main;
        next
    }

    /// Returns true if `earlier`'s conversation history is a prefix of this
    /// state's history.
    pub fn extends_history_of(&self, earlier: &DialogueState) -> bool {
        self.conversation_history
            .starts_with(&earlier.conversation_history)
    }
}
