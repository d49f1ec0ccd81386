//! Scenario tests for the dialogue orchestrator.
//!
//! Drives full conversations through `DialogueOrchestrator` with a scripted
//! `MockExecutionAdapter`. Each student turn consumes one classifier
//! response and then one generator (or summary) response.

use serde_json::{json, Value};
use std::sync::Arc;

use socratic_dialogue::adapters::ai::{MockExecutionAdapter, MOCK_USAGE};
use socratic_dialogue::application::DialogueOrchestrator;
use socratic_dialogue::domain::dialogue::{
    ConfigurationError, DialogueError, DialogueLimits, DialogueStage, DialogueState, SubState,
    TokenUsage, Trigger, TurnRole, FEATURE_CLASSIFICATION, FEATURE_RESPONSE_GENERATION,
};
use socratic_dialogue::domain::handlers::{HandlerRegistry, StageHandler};
use socratic_dialogue::domain::prompt::{PromptKind, SYNTHETIC_USER_TURN};
use socratic_dialogue::ports::{ExecutionError, ExecutionErrorKind};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Harness {
    mock: Arc<MockExecutionAdapter>,
    orchestrator: DialogueOrchestrator,
}

fn harness(mock: MockExecutionAdapter, limits: DialogueLimits) -> Harness {
    let mock = Arc::new(mock);
    Harness {
        orchestrator: DialogueOrchestrator::new(mock.clone(), limits),
        mock,
    }
}

fn opening(mock: MockExecutionAdapter) -> MockExecutionAdapter {
    mock.with_generation("Today we discuss X.", "What is your position on X?")
}

fn stance(position: &str, reasoning: &str) -> Value {
    json!({ "stance": position, "reasoning": reasoning })
}

fn principle(statement: &str) -> Value {
    json!({ "principle": statement, "classification": "deontological" })
}

/// Scripts one full case → principle → loop round.
fn loop_round(mock: MockExecutionAdapter, n: u32) -> MockExecutionAdapter {
    mock.with_classification(Trigger::CaseCompleted, Value::Null)
        .with_generation("What rule guided you?", "Which principle applies?")
        .with_classification(Trigger::LoopToStage2, principle(&format!("rule {}", n)))
        .with_generation(&format!("Consider case {}.", n + 1), "Does your view hold?")
}

async fn started(h: &Harness) -> DialogueState {
    let state = h.orchestrator.initialize_session("X");
    h.orchestrator
        .start_conversation(&state, Some("Background on X"))
        .await
        .unwrap()
        .new_state
}

async fn say(h: &Harness, state: &DialogueState, text: &str) -> DialogueState {
    let result = h
        .orchestrator
        .process_student_input(state, text, None)
        .await
        .unwrap();
    assert!(
        result.new_state.extends_history_of(state),
        "history must only grow"
    );
    assert_eq!(
        result.new_state.conversation_history().len(),
        state.conversation_history().len() + 2
    );
    result.new_state
}

fn assert_versions_consistent(state: &DialogueState) {
    for (i, v) in state.stance_history().iter().enumerate() {
        assert_eq!(v.version, i as u32 + 1);
    }
    for (i, v) in state.principle_history().iter().enumerate() {
        assert_eq!(v.version, i as u32 + 1);
    }
    assert_eq!(state.current_stance(), state.stance_history().last());
    assert_eq!(state.current_principle(), state.principle_history().last());
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn initialize_then_start_then_first_stance() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(
            Trigger::V1Established,
            stance("X is acceptable", "because Y"),
        )
        .with_generation("Imagine a case where Y fails.", "Is X still acceptable?");
    let h = harness(mock, DialogueLimits::default());

    let fresh = h.orchestrator.initialize_session("X");
    assert_eq!(fresh.stage(), DialogueStage::AwaitingStart);
    assert_eq!(fresh.loop_count(), 0);
    assert!(fresh.stance_history().is_empty());
    assert!(fresh.principle_history().is_empty());
    assert!(fresh.conversation_history().is_empty());

    let start = h.orchestrator.start_conversation(&fresh, None).await.unwrap();
    assert_eq!(start.new_state.stage(), DialogueStage::AskingStance);
    assert_eq!(start.new_state.conversation_history().len(), 1);
    assert_eq!(start.new_state.last_turn_role(), Some(TurnRole::Model));

    let result = h
        .orchestrator
        .process_student_input(&start.new_state, "I think X is acceptable because Y", None)
        .await
        .unwrap();
    let state = &result.new_state;

    assert_eq!(state.stage(), DialogueStage::CaseChallenge);
    assert_eq!(state.sub_state(), SubState::Main);
    assert_eq!(state.loop_count(), 0);
    assert_eq!(state.stance_history().len(), 1);
    let current = state.current_stance().unwrap();
    assert_eq!(current.version, 1);
    assert_eq!(current.position, "X is acceptable");
    assert_eq!(state.current_case(), Some("Imagine a case where Y fails."));
    assert!(!result.ended);

    assert_eq!(result.usage.get(FEATURE_CLASSIFICATION), Some(&MOCK_USAGE));
    assert_eq!(result.usage.get(FEATURE_RESPONSE_GENERATION), Some(&MOCK_USAGE));
    assert_eq!(h.mock.remaining(), 0);
}

#[tokio::test]
async fn start_issues_exactly_one_synthetic_user_turn() {
    let h = harness(opening(MockExecutionAdapter::new()), DialogueLimits::default());
    started(&h).await;

    let calls = h.mock.get_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].kind, PromptKind::StanceOpening);
    assert_eq!(calls[0].contents.len(), 1);
    assert_eq!(calls[0].contents[0].role, TurnRole::User);
    assert_eq!(calls[0].contents[0].text, SYNTHETIC_USER_TURN);
    assert!(calls[0].system_instruction.contains("Background on X"));
}

#[tokio::test]
async fn student_turn_is_visible_to_classifier_without_synthetic_turn() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::Clarify, Value::Null)
        .with_generation("Let me rephrase.", "What do you believe about X?");
    let h = harness(mock, DialogueLimits::default());
    let state = started(&h).await;

    let state = say(&h, &state, "What do you mean?").await;
    assert_eq!(state.stage(), DialogueStage::AskingStance);
    assert_eq!(state.sub_state(), SubState::Clarify);

    let classifier = &h.mock.get_calls()[1];
    assert_eq!(classifier.kind, PromptKind::StanceClassifier);
    let last = classifier.contents.last().unwrap();
    assert_eq!(last.role, TurnRole::User);
    assert_eq!(last.text, "What do you mean?");
    assert_eq!(classifier.contents.len(), 2);
}

#[tokio::test]
async fn five_loops_with_max_five_force_closure() {
    let mut mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, stance("X is fine", "Y"))
        .with_generation("Case 1.", "Still fine?");
    for n in 1..=5 {
        mock = loop_round(mock, n);
    }
    let h = harness(mock, DialogueLimits::new(5, 2).unwrap());

    let mut state = started(&h).await;
    state = say(&h, &state, "X is fine because Y").await;

    for n in 1..=5u32 {
        state = say(&h, &state, "It still holds").await;
        assert_eq!(state.stage(), DialogueStage::PrincipleReasoning);

        let before = state.loop_count();
        state = say(&h, &state, &format!("My rule is rule {}", n)).await;
        assert!(state.loop_count() >= before, "loop count never decreases");
        assert!(state.loop_count() <= 5);

        if n < 5 {
            assert_eq!(state.stage(), DialogueStage::CaseChallenge);
            assert_eq!(state.loop_count(), n);
        }
    }

    assert_eq!(state.stage(), DialogueStage::Closure);
    assert_eq!(state.loop_count(), 5);
    assert_versions_consistent(&state);

    // Forced closure uses the closure template, not another case.
    let last_generation = h.mock.get_calls().last().unwrap().kind;
    assert_eq!(last_generation, PromptKind::ClosureOpening);
}

#[tokio::test]
async fn early_advance_to_closure_is_downgraded() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, stance("X", "Y"))
        .with_generation("Case 1.", "Hold?")
        .with_classification(Trigger::CaseCompleted, Value::Null)
        .with_generation("Why?", "Which rule?")
        .with_classification(Trigger::AdvanceToClosure, principle("be fair"))
        .with_generation("Case 2.", "And now?");
    let h = harness(mock, DialogueLimits::new(5, 2).unwrap());

    let mut state = started(&h).await;
    state = say(&h, &state, "X because Y").await;
    state = say(&h, &state, "Still X").await;
    state = say(&h, &state, "Fairness, and I'm done").await;

    assert_eq!(state.stage(), DialogueStage::CaseChallenge);
    assert_eq!(state.loop_count(), 1);
    assert_eq!(state.current_principle().unwrap().statement, "be fair");
    assert_eq!(
        h.mock.get_calls().last().unwrap().kind,
        PromptKind::CaseOpening
    );
}

#[tokio::test]
async fn full_dialogue_reaches_ended_with_summary() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, stance("X", "Y"))
        .with_generation("Case 1.", "Hold?");
    let mock = loop_round(mock, 1);
    let mock = loop_round(mock, 2)
        .with_classification(Trigger::CaseCompleted, Value::Null)
        .with_generation("Why now?", "Which rule?")
        .with_classification(Trigger::AdvanceToClosure, principle("rule 3"))
        .with_generation("We covered a lot.", "Are you ready to finish?")
        .with_classification(Trigger::ConfirmEnd, Value::Null)
        .with_text("You held X, grounded in rule 3.");
    let h = harness(mock, DialogueLimits::new(5, 2).unwrap());

    let mut state = started(&h).await;
    for text in ["X because Y", "holds", "rule 1", "holds", "rule 2", "holds", "rule 3"] {
        state = say(&h, &state, text).await;
    }
    assert_eq!(state.stage(), DialogueStage::Closure);
    assert_eq!(state.loop_count(), 2);

    let result = h
        .orchestrator
        .process_student_input(&state, "Yes, I'm done", None)
        .await
        .unwrap();

    assert!(result.ended);
    assert_eq!(result.message, "You held X, grounded in rule 3.");
    assert_eq!(result.new_state.stage(), DialogueStage::Ended);
    assert_eq!(
        result.new_state.summary(),
        Some("You held X, grounded in rule 3.")
    );
    assert!(result.new_state.discussion_satisfied());
    assert_eq!(result.new_state.principle_history().len(), 3);
    assert_versions_consistent(&result.new_state);
    assert_eq!(h.mock.remaining(), 0);

    let err = h
        .orchestrator
        .process_student_input(&result.new_state, "one more thing", None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DialogueError::InvalidStage {
            stage: DialogueStage::Ended,
            operation: "process input",
        }
    );
}

#[tokio::test]
async fn scaffolded_case_revises_stance() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, stance("lying is always wrong", "trust"))
        .with_generation("A murderer asks where your friend hides.", "Would you lie?")
        .with_classification(Trigger::Scaffold, Value::Null)
        .with_generation("You said always, yet you would lie here.", "Which is it?")
        .with_classification(
            Trigger::CaseCompleted,
            stance("lying is usually wrong", "trust, except to prevent harm"),
        )
        .with_generation("What rule are you now using?", "Can you name it?");
    let h = harness(mock, DialogueLimits::default());

    let mut state = started(&h).await;
    state = say(&h, &state, "Lying is always wrong").await;
    state = say(&h, &state, "I would lie").await;
    assert_eq!(state.sub_state(), SubState::Scaffold);
    state = say(&h, &state, "Usually wrong then").await;

    assert_eq!(state.stage(), DialogueStage::PrincipleReasoning);
    assert_eq!(state.stance_history().len(), 2);
    assert_eq!(state.current_stance().unwrap().version, 2);
    assert_eq!(
        state.current_stance().unwrap().position,
        "lying is usually wrong"
    );
    assert_versions_consistent(&state);
}

#[tokio::test]
async fn scaffold_revision_survives_intervening_clarification() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, stance("lying is always wrong", "trust"))
        .with_generation("A murderer asks where your friend hides.", "Would you lie?")
        .with_classification(Trigger::Scaffold, Value::Null)
        .with_generation("You said always, yet you would lie here.", "Which is it?")
        .with_classification(Trigger::Clarify, Value::Null)
        .with_generation("I mean your earlier word, always.", "Does it still fit?")
        .with_classification(
            Trigger::CaseCompleted,
            stance("lying is usually wrong", "trust, except to prevent harm"),
        )
        .with_generation("What rule are you now using?", "Can you name it?");
    let h = harness(mock, DialogueLimits::default());

    let mut state = started(&h).await;
    state = say(&h, &state, "Lying is always wrong").await;
    state = say(&h, &state, "I would lie").await;
    state = say(&h, &state, "What do you mean?").await;
    assert_eq!(state.sub_state(), SubState::Clarify);
    assert!(state.case_scaffolded());
    state = say(&h, &state, "Usually wrong then").await;

    assert_eq!(state.stage(), DialogueStage::PrincipleReasoning);
    assert!(!state.case_scaffolded());
    assert_eq!(state.stance_history().len(), 2);
    assert_eq!(
        state.current_stance().unwrap().position,
        "lying is usually wrong"
    );
    assert_versions_consistent(&state);
}

#[tokio::test]
async fn unscaffolded_case_keeps_stance() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, stance("lying is always wrong", "trust"))
        .with_generation("A murderer asks where your friend hides.", "Would you lie?")
        .with_classification(Trigger::Clarify, Value::Null)
        .with_generation("Someone asks where your friend is.", "Would you lie?")
        .with_classification(
            Trigger::CaseCompleted,
            stance("lying is usually wrong", "ignored"),
        )
        .with_generation("What rule guided you?", "Can you name it?");
    let h = harness(mock, DialogueLimits::default());

    let mut state = started(&h).await;
    for text in ["Lying is always wrong", "Which friend?", "I would not lie"] {
        state = say(&h, &state, text).await;
    }

    assert_eq!(state.stage(), DialogueStage::PrincipleReasoning);
    assert_eq!(state.stance_history().len(), 1);
    assert_eq!(
        state.current_stance().unwrap().position,
        "lying is always wrong"
    );
}

/// Expected (stage, sub-state, generator prompt, ended) after `trigger` in `stage`,
/// with closure allowed from loop zero.
fn expected_transition(
    stage: DialogueStage,
    trigger: Trigger,
) -> (DialogueStage, SubState, PromptKind, bool) {
    use DialogueStage::*;
    use PromptKind as P;
    use SubState as S;
    use Trigger as T;

    match (stage, trigger) {
        (AskingStance, T::Clarify) => (AskingStance, S::Clarify, P::StanceOpening, false),
        (AskingStance, T::V1Established) => (CaseChallenge, S::Main, P::CaseOpening, false),
        (CaseChallenge, T::Clarify) => (CaseChallenge, S::Clarify, P::CaseClarify, false),
        (CaseChallenge, T::Scaffold) => (CaseChallenge, S::Scaffold, P::CaseScaffold, false),
        (CaseChallenge, T::CaseCompleted) => {
            (PrincipleReasoning, S::Main, P::PrincipleOpening, false)
        }
        (PrincipleReasoning, T::Clarify) => {
            (PrincipleReasoning, S::Clarify, P::PrincipleClarify, false)
        }
        (PrincipleReasoning, T::Scaffold) => {
            (PrincipleReasoning, S::Scaffold, P::PrincipleScaffold, false)
        }
        (PrincipleReasoning, T::LoopToStage2) => (CaseChallenge, S::Main, P::CaseOpening, false),
        (PrincipleReasoning, T::AdvanceToClosure) => (Closure, S::Main, P::ClosureOpening, false),
        (Closure, T::Clarify) => (Closure, S::Clarify, P::ClosureClarify, false),
        (Closure, T::ConfirmEnd) => (Ended, S::Main, P::Summary, true),
        other => panic!("no expected transition for {:?}", other),
    }
}

fn extracted_for(trigger: Trigger) -> Value {
    match trigger {
        Trigger::V1Established => stance("X", "Y"),
        Trigger::LoopToStage2 | Trigger::AdvanceToClosure => principle("p"),
        _ => Value::Null,
    }
}

/// Classifier decisions that lead from a fresh start into `stage`.
fn path_to(stage: DialogueStage) -> Vec<Trigger> {
    let full = [
        Trigger::V1Established,
        Trigger::CaseCompleted,
        Trigger::AdvanceToClosure,
    ];
    let depth = match stage {
        DialogueStage::AskingStance => 0,
        DialogueStage::CaseChallenge => 1,
        DialogueStage::PrincipleReasoning => 2,
        DialogueStage::Closure => 3,
        other => panic!("{} has no handler", other),
    };
    full[..depth].to_vec()
}

#[tokio::test]
async fn every_valid_trigger_follows_the_transition_table() {
    let active = DialogueStage::ALL.into_iter().filter(|s| s.is_active());
    for stage in active {
        for &trigger in Trigger::valid_for(stage) {
            let (to_stage, to_sub, prompt, ended) = expected_transition(stage, trigger);

            let mut mock = opening(MockExecutionAdapter::new());
            let path = path_to(stage);
            for &step in &path {
                mock = mock
                    .with_classification(step, extracted_for(step))
                    .with_generation("Next.", "Go on?");
            }
            mock = mock.with_classification(trigger, extracted_for(trigger));
            mock = if ended {
                mock.with_text("Summary.")
            } else {
                mock.with_generation("Reply.", "Well?")
            };
            let h = harness(mock, DialogueLimits::new(5, 0).unwrap());

            let mut state = started(&h).await;
            for _ in &path {
                state = say(&h, &state, "answer").await;
            }
            assert_eq!(state.stage(), stage);

            let result = h
                .orchestrator
                .process_student_input(&state, "answer", None)
                .await
                .unwrap();
            let label = format!("{} / {}", stage, trigger);
            assert_eq!(result.new_state.stage(), to_stage, "{}", label);
            assert_eq!(result.new_state.sub_state(), to_sub, "{}", label);
            assert_eq!(result.ended, ended, "{}", label);

            let calls = h.mock.get_calls();
            let [.., classifier, generator] = calls.as_slice() else {
                panic!("{}: expected at least two calls", label);
            };
            assert_eq!(Some(classifier.kind), PromptKind::classifier_for(stage), "{}", label);
            assert_eq!(generator.kind, prompt, "{}", label);
        }
    }
}

#[tokio::test]
async fn missing_stance_falls_back_to_raw_input() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, json!({}))
        .with_generation("Case 1.", "Hold?");
    let h = harness(mock, DialogueLimits::default());

    let state = started(&h).await;
    let state = say(&h, &state, "Honesty matters most").await;

    assert_eq!(
        state.current_stance().unwrap().position,
        "Honesty matters most"
    );
}

#[tokio::test]
async fn generator_timeout_after_classification_leaves_state_unchanged() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, stance("X", "Y"))
        .with_error(ExecutionError::timeout(30_000));
    let h = harness(mock, DialogueLimits::default());
    let state = started(&h).await;
    let snapshot = state.clone();

    let err = h
        .orchestrator
        .process_student_input(&state, "X because Y", None)
        .await
        .unwrap_err();

    assert_eq!(state, snapshot);
    assert!(err.is_retryable());
    match &err {
        DialogueError::Execution { source, usage } => {
            assert_eq!(source.kind(), ExecutionErrorKind::Timeout);
            // The classifier call was billed before the timeout.
            assert_eq!(usage.get(FEATURE_CLASSIFICATION), Some(&MOCK_USAGE));
            assert_eq!(usage.get(FEATURE_RESPONSE_GENERATION), None);
        }
        other => panic!("expected execution error, got {other:?}"),
    }
}

#[tokio::test]
async fn out_of_stage_intent_is_invalid_output() {
    let mock = opening(MockExecutionAdapter::new()).with_response_usage(
        json!({
            "rationale": "r",
            "detected_intent": "TR_CONFIRM_END",
            "confidence_score": 0.8
        })
        .to_string(),
        TokenUsage::new(12, 3),
    );
    let h = harness(mock, DialogueLimits::default());
    let state = started(&h).await;

    let err = h
        .orchestrator
        .process_student_input(&state, "bye", None)
        .await
        .unwrap_err();

    assert!(!err.is_retryable());
    match err {
        DialogueError::Execution { source, usage } => {
            assert_eq!(source.kind(), ExecutionErrorKind::InvalidOutput);
            assert_eq!(usage.total(), TokenUsage::new(12, 3));
        }
        other => panic!("expected execution error, got {other:?}"),
    }
}

#[tokio::test]
async fn generator_with_two_questions_is_rejected() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::Clarify, Value::Null)
        .with_generation("Fine.", "Why? And why not?");
    let h = harness(mock, DialogueLimits::default());
    let state = started(&h).await;

    let err = h
        .orchestrator
        .process_student_input(&state, "huh", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DialogueError::Execution { ref source, .. }
            if source.kind() == ExecutionErrorKind::InvalidOutput
    ));
}

#[tokio::test]
async fn abort_from_any_active_stage() {
    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, stance("X", "Y"))
        .with_generation("Case 1.", "Hold?");
    let h = harness(mock, DialogueLimits::default());
    let state = started(&h).await;
    let state = say(&h, &state, "X because Y").await;

    let aborted = h.orchestrator.abort(&state);
    assert_eq!(aborted.stage(), DialogueStage::Aborted);
    assert_eq!(aborted.conversation_history(), state.conversation_history());
    assert_eq!(h.mock.call_count(), 3);

    let err = h
        .orchestrator
        .process_student_input(&aborted, "wait", None)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DialogueError::InvalidStage {
            stage: DialogueStage::Aborted,
            ..
        }
    ));
    assert_eq!(h.mock.call_count(), 3);
}

#[tokio::test]
async fn unregistered_stage_is_a_configuration_error() {
    let standard = HandlerRegistry::standard();
    let mut registry = HandlerRegistry::new();
    for stage in [DialogueStage::AskingStance, DialogueStage::PrincipleReasoning] {
        let handler: Arc<dyn StageHandler> = standard.get(stage).unwrap();
        registry.register(handler);
    }

    let mock = opening(MockExecutionAdapter::new())
        .with_classification(Trigger::V1Established, stance("X", "Y"))
        .with_generation("Case 1.", "Hold?");
    let h = harness(mock, DialogueLimits::default());
    let orchestrator = h.orchestrator.clone().with_registry(registry);

    let state = orchestrator.initialize_session("X");
    let state = orchestrator
        .start_conversation(&state, None)
        .await
        .unwrap()
        .new_state;
    let state = orchestrator
        .process_student_input(&state, "X because Y", None)
        .await
        .unwrap()
        .new_state;
    assert_eq!(state.stage(), DialogueStage::CaseChallenge);

    let err = orchestrator
        .process_student_input(&state, "hmm", None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        DialogueError::Configuration(ConfigurationError::UnregisteredStage(
            DialogueStage::CaseChallenge
        ))
    );
}

#[tokio::test]
async fn identical_inputs_yield_identical_prompts() {
    let script = || {
        opening(MockExecutionAdapter::new())
            .with_classification(Trigger::Clarify, Value::Null)
            .with_generation("Rephrased.", "Your view?")
    };
    let a = harness(script(), DialogueLimits::default());
    let b = harness(script(), DialogueLimits::default());

    let state = DialogueState::new("X");
    for h in [&a, &b] {
        let started = h
            .orchestrator
            .start_conversation(&state, None)
            .await
            .unwrap()
            .new_state;
        h.orchestrator
            .process_student_input(&started, "?", None)
            .await
            .unwrap();
    }

    assert_eq!(a.mock.get_calls(), b.mock.get_calls());
}
