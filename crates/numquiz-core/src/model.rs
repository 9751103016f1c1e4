//! Core data model types for numquiz.
//!
//! Questions, transcripts and the quiz phase are shared by the generator,
//! the evaluator and the coordinator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Arithmetic operator used in a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    Addition,
    Subtraction,
}

impl Operator {
    /// Apply the operator. Subtraction saturates at zero.
    pub fn apply(self, left: u32, right: u32) -> u32 {
        match self {
            Operator::Addition => left + right,
            Operator::Subtraction => left.saturating_sub(right),
        }
    }

    /// The spoken French word for the operator.
    pub fn spoken(self) -> &'static str {
        match self {
            Operator::Addition => "plus",
            Operator::Subtraction => "moins",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Addition => write!(f, "+"),
            Operator::Subtraction => write!(f, "-"),
        }
    }
}

/// A single generated arithmetic question.
///
/// Immutable once generated: fields are private and only readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    prompt: String,
    correct_answer: u32,
    index: usize,
    left: u32,
    right: u32,
    operator: Operator,
}

impl Question {
    /// Build a question. For subtraction the operands are swapped when the
    /// first is smaller, so the answer is never negative.
    pub fn new(index: usize, left: u32, right: u32, operator: Operator) -> Self {
        let (left, right) = match operator {
            Operator::Subtraction if left < right => (right, left),
            _ => (left, right),
        };
        let prompt = format!("Combien font {left} {} {right} ?", operator.spoken());
        Self {
            prompt,
            correct_answer: operator.apply(left, right),
            index,
            left,
            right,
            operator,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn correct_answer(&self) -> u32 {
        self.correct_answer
    }

    /// 0-based position in the quiz.
    pub fn index(&self) -> usize {
        self.index
    }

    /// 1-based number, as announced to the player.
    pub fn number(&self) -> usize {
        self.index + 1
    }

    pub fn operands(&self) -> (u32, u32) {
        (self.left, self.right)
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }
}

/// One utterance returned by a speech-to-text collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    /// Raw recognized text.
    pub text: String,
    /// Recognizer confidence in `[0, 1]`, when the backend reports one.
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl Transcript {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            confidence: None,
        }
    }

    pub fn with_confidence(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence: Some(confidence),
        }
    }
}

/// Phase of the quiz state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum QuizPhase {
    NotStarted,
    Running,
    WaitingForAnswer,
    ProcessingAnswer,
    Finished,
}

impl QuizPhase {
    /// Whether a quiz is currently in progress.
    pub fn in_progress(self) -> bool {
        !matches!(self, QuizPhase::NotStarted | QuizPhase::Finished)
    }
}

impl fmt::Display for QuizPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuizPhase::NotStarted => write!(f, "not started"),
            QuizPhase::Running => write!(f, "running"),
            QuizPhase::WaitingForAnswer => write!(f, "waiting for an answer"),
            QuizPhase::ProcessingAnswer => write!(f, "processing an answer"),
            QuizPhase::Finished => write!(f, "finished"),
        }
    }
}

impl FromStr for Operator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "+" | "plus" | "addition" => Ok(Operator::Addition),
            "-" | "moins" | "subtraction" => Ok(Operator::Subtraction),
            other => Err(format!("unknown operator: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtraction_swaps_operands() {
        let q = Question::new(0, 3, 8, Operator::Subtraction);
        assert_eq!(q.operands(), (8, 3));
        assert_eq!(q.correct_answer(), 5);
        assert_eq!(q.prompt(), "Combien font 8 moins 3 ?");
    }

    #[test]
    fn addition_keeps_operand_order() {
        let q = Question::new(2, 3, 8, Operator::Addition);
        assert_eq!(q.operands(), (3, 8));
        assert_eq!(q.correct_answer(), 11);
        assert_eq!(q.number(), 3);
        assert_eq!(q.prompt(), "Combien font 3 plus 8 ?");
    }

    #[test]
    fn operator_display_and_parse() {
        assert_eq!(Operator::Addition.to_string(), "+");
        assert_eq!("moins".parse::<Operator>().unwrap(), Operator::Subtraction);
        assert_eq!("+".parse::<Operator>().unwrap(), Operator::Addition);
        assert!("fois".parse::<Operator>().is_err());
    }

    #[test]
    fn phase_in_progress() {
        assert!(!QuizPhase::NotStarted.in_progress());
        assert!(QuizPhase::WaitingForAnswer.in_progress());
        assert!(!QuizPhase::Finished.in_progress());
    }

    #[test]
    fn transcript_serde_defaults_confidence() {
        let t: Transcript = serde_json::from_str(r#"{"text":"cinq"}"#).unwrap();
        assert_eq!(t, Transcript::new("cinq"));
    }
}
