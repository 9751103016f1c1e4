//! End-to-end coordinator scenarios driven through the public API.

use std::sync::Arc;

use numquiz_core::coordinator::{CoordinatorConfig, QuizCoordinator, ScheduledStep};
use numquiz_core::evaluator::{AnswerEvaluator, EvaluationOutcome};
use numquiz_core::events::{EventLog, QuizEvent};
use numquiz_core::generator::QuestionGenerator;
use numquiz_core::lexicon::NumberLexicon;
use numquiz_core::model::QuizPhase;
use numquiz_core::score::ScoreState;

fn quiz(count: usize, seed: u64) -> (QuizCoordinator, Arc<EventLog>) {
    let log = Arc::new(EventLog::new());
    let coordinator = QuizCoordinator::new(
        QuestionGenerator::with_seed(count, seed).unwrap(),
        AnswerEvaluator::default(),
        log.clone(),
        CoordinatorConfig::default(),
    );
    (coordinator, log)
}

/// The spoken French word for `n`.
fn spoken(n: u32) -> String {
    NumberLexicon::french()
        .canonical_entries()
        .find(|(_, value)| *value == n)
        .map(|(word, _)| word.to_string())
        .unwrap()
}

fn spoken_answer(coordinator: &QuizCoordinator) -> String {
    spoken(coordinator.current_question().unwrap().correct_answer())
}

#[test]
fn three_correct_answers_pass() {
    let (mut coordinator, log) = quiz(3, 2024);
    coordinator.start().unwrap();
    assert_eq!(
        coordinator.fire_pending(),
        Some(ScheduledStep::AskQuestion)
    );

    for number in 1..=3 {
        assert_eq!(coordinator.phase(), QuizPhase::WaitingForAnswer);
        assert_eq!(coordinator.current_question_index(), number - 1);
        let answer = spoken_answer(&coordinator);
        let outcome = coordinator.submit_answer(&answer).unwrap();
        assert!(outcome.is_correct(), "{answer}: {outcome}");
        assert_eq!(
            coordinator.fire_pending(),
            Some(ScheduledStep::AdvanceAfterFeedback)
        );
    }

    assert_eq!(coordinator.phase(), QuizPhase::Finished);
    assert_eq!(
        log.last(),
        Some(QuizEvent::QuizFinished {
            score: ScoreState {
                correct_count: 3,
                questions_answered: 3,
                total_questions: 3,
            },
            passing: true,
        })
    );

    let names: Vec<_> = log.events().iter().map(|e| e.event_name()).collect();
    assert_eq!(
        names,
        vec![
            "quiz-started",
            "question-ready",
            "answer-processed",
            "question-ready",
            "answer-processed",
            "question-ready",
            "answer-processed",
            "quiz-finished",
        ]
    );
}

#[test]
fn hesitation_on_second_question_keeps_it_open() {
    let (mut coordinator, log) = quiz(3, 7);
    coordinator.start().unwrap();
    coordinator.fire_pending();

    let answer = spoken_answer(&coordinator);
    coordinator.submit_answer(&answer).unwrap();
    coordinator.fire_pending();
    assert_eq!(coordinator.current_question_index(), 1);
    let before = coordinator.score();

    let outcome = coordinator.submit_answer("euh").unwrap();
    assert_eq!(outcome, EvaluationOutcome::ParsingError);
    assert_eq!(coordinator.phase(), QuizPhase::WaitingForAnswer);
    assert_eq!(coordinator.current_question_index(), 1);
    assert_eq!(coordinator.score(), before);
    assert_eq!(coordinator.score().questions_answered, 1);
    assert!(coordinator.pending_timer().is_none());

    // The same question still accepts an answer.
    let answer = spoken_answer(&coordinator);
    assert!(coordinator.submit_answer(&answer).unwrap().is_correct());
    assert_eq!(coordinator.score().questions_answered, 2);
    assert_eq!(log.count("question-ready"), 2);
}

#[test]
fn wrong_answers_fail_the_quiz() {
    let (mut coordinator, log) = quiz(2, 99);
    coordinator.start().unwrap();
    coordinator.fire_pending();
    for _ in 0..2 {
        let wrong = (coordinator.current_question().unwrap().correct_answer() + 1) % 21;
        let outcome = coordinator.submit_answer(&spoken(wrong)).unwrap();
        assert!(matches!(outcome, EvaluationOutcome::Incorrect { .. }));
        coordinator.fire_pending();
    }
    assert_eq!(coordinator.phase(), QuizPhase::Finished);
    assert!(!coordinator.passing());
    assert!(matches!(
        log.last(),
        Some(QuizEvent::QuizFinished { passing: false, .. })
    ));
}

#[test]
fn digit_transcripts_score() {
    let (mut coordinator, _log) = quiz(1, 5);
    coordinator.start().unwrap();
    coordinator.fire_pending();
    let expected = coordinator.current_question().unwrap().correct_answer();
    let outcome = coordinator.submit_answer(&format!(" {expected} ")).unwrap();
    assert_eq!(outcome, EvaluationOutcome::Correct { value: expected });
}

#[test]
fn protocol_violations_leave_state_untouched() {
    let (mut coordinator, log) = quiz(2, 1);
    assert!(coordinator.finish().is_err());
    assert!(coordinator.retry_current_question().is_err());
    assert!(coordinator.ask_current_question().is_err());
    assert_eq!(coordinator.phase(), QuizPhase::NotStarted);
    assert_eq!(log.count("quiz-error"), 3);
    assert_eq!(log.count("quiz-started"), 0);

    coordinator.start().unwrap();
    coordinator.fire_pending();
    assert!(coordinator.start().is_err());
    assert!(coordinator.regenerate_questions().is_err());
    assert_eq!(coordinator.phase(), QuizPhase::WaitingForAnswer);
    assert_eq!(log.count("quiz-started"), 1);
    assert_eq!(log.count("question-ready"), 1);
}

#[test]
fn report_after_restart_describes_new_session() {
    let (mut coordinator, _log) = quiz(1, 8);
    coordinator.start().unwrap();
    coordinator.fire_pending();
    coordinator.submit_answer("zéro").unwrap();
    coordinator.finish().unwrap();
    let first = coordinator.report();
    assert!(first.is_finished());

    coordinator.start().unwrap();
    let second = coordinator.report();
    assert_ne!(first.id, second.id);
    assert!(second.answers.is_empty());
    assert_eq!(second.phase, QuizPhase::Running);
}
