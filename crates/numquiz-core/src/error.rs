//! Quiz error types.
//!
//! Ambiguous or unrecognized answers are not errors: they are ordinary
//! [`EvaluationOutcome`](crate::evaluator::EvaluationOutcome) values. The
//! variants here cover configuration mistakes and calls made in the wrong
//! quiz phase.

use thiserror::Error;

use crate::model::QuizPhase;

/// Errors reported by the quiz core.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QuizError {
    /// A quiz must have at least one question.
    #[error("question count must be at least 1, got {0}")]
    InvalidQuestionCount(usize),

    /// A transition was requested in a phase that does not allow it.
    #[error("cannot {operation} while the quiz is {phase}")]
    InvalidTransition {
        operation: &'static str,
        phase: QuizPhase,
    },

    /// The lexicon configuration is inconsistent.
    #[error("invalid lexicon: {0}")]
    Lexicon(String),

    /// The task driving the quiz has stopped.
    #[error("quiz runner has stopped")]
    RunnerStopped,
}

impl QuizError {
    /// Returns `true` for state-protocol violations, which are never fatal.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, QuizError::InvalidTransition { .. })
    }
}
