//! Answer evaluation: compares an extracted number with the expected answer.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extractor::{ExtractionResult, NumberExtractor};
use crate::lexicon::MAX_QUIZ_NUMBER;
use crate::model::Transcript;

/// Default minimum recognizer confidence for [`AnswerEvaluator::evaluate_transcript`].
pub const DEFAULT_MIN_CONFIDENCE: f32 = 0.5;

/// How a spoken answer was judged.
///
/// `Correct` and `Incorrect` are *valid*: a number was heard. The other two
/// are *invalid* and the same question must be asked again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum EvaluationOutcome {
    Correct { value: u32 },
    Incorrect { extracted: u32, expected: u32 },
    InvalidInput,
    ParsingError,
}

impl EvaluationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(
            self,
            EvaluationOutcome::Correct { .. } | EvaluationOutcome::Incorrect { .. }
        )
    }

    pub fn is_correct(&self) -> bool {
        matches!(self, EvaluationOutcome::Correct { .. })
    }

    /// The number heard, for valid outcomes.
    pub fn extracted(&self) -> Option<u32> {
        match self {
            EvaluationOutcome::Correct { value } => Some(*value),
            EvaluationOutcome::Incorrect { extracted, .. } => Some(*extracted),
            EvaluationOutcome::InvalidInput | EvaluationOutcome::ParsingError => None,
        }
    }
}

impl fmt::Display for EvaluationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvaluationOutcome::Correct { value } => write!(f, "correct ({value})"),
            EvaluationOutcome::Incorrect {
                extracted,
                expected,
            } => write!(f, "incorrect ({extracted}, expected {expected})"),
            EvaluationOutcome::InvalidInput => write!(f, "invalid input"),
            EvaluationOutcome::ParsingError => write!(f, "no number recognized"),
        }
    }
}

/// Judges transcripts against expected answers. Stateless.
#[derive(Debug, Clone, Default)]
pub struct AnswerEvaluator {
    extractor: NumberExtractor,
}

impl AnswerEvaluator {
    pub fn new(extractor: NumberExtractor) -> Self {
        Self { extractor }
    }

    pub fn extractor(&self) -> &NumberExtractor {
        &self.extractor
    }

    /// Judge a raw transcript.
    pub fn evaluate(&self, raw: &str, expected: u32) -> EvaluationOutcome {
        if raw.trim().is_empty() {
            tracing::debug!("empty transcript");
            return EvaluationOutcome::InvalidInput;
        }

        let outcome = match self.extractor.extract(raw) {
            ExtractionResult::NotFound => EvaluationOutcome::ParsingError,
            ExtractionResult::Number(value) if value == expected => {
                EvaluationOutcome::Correct { value }
            }
            ExtractionResult::Number(extracted) => EvaluationOutcome::Incorrect {
                extracted,
                expected,
            },
        };
        tracing::debug!(transcript = raw, expected, %outcome, "answer evaluated");
        outcome
    }

    /// Judge a transcript, treating one below `min_confidence` as unusable.
    pub fn evaluate_transcript(
        &self,
        transcript: &Transcript,
        expected: u32,
        min_confidence: f32,
    ) -> EvaluationOutcome {
        if let Some(confidence) = transcript.confidence {
            if !confidence.is_finite() || confidence < min_confidence {
                tracing::debug!(confidence, min_confidence, "transcript confidence too low");
                return EvaluationOutcome::InvalidInput;
            }
        }
        self.evaluate(&transcript.text, expected)
    }
}

/// Whether `n` is a possible answer to a generated question.
pub fn is_in_quiz_range(n: u32) -> bool {
    n <= MAX_QUIZ_NUMBER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_classifies_outcomes() {
        let evaluator = AnswerEvaluator::default();
        assert_eq!(
            evaluator.evaluate("cinq", 5),
            EvaluationOutcome::Correct { value: 5 }
        );
        assert_eq!(
            evaluator.evaluate("trois", 5),
            EvaluationOutcome::Incorrect {
                extracted: 3,
                expected: 5
            }
        );
        assert_eq!(evaluator.evaluate("blah", 5), EvaluationOutcome::ParsingError);
        assert_eq!(evaluator.evaluate("", 5), EvaluationOutcome::InvalidInput);
        assert_eq!(evaluator.evaluate(" \t", 5), EvaluationOutcome::InvalidInput);
    }

    #[test]
    fn hesitation_is_a_parsing_error() {
        let evaluator = AnswerEvaluator::default();
        assert_eq!(evaluator.evaluate("euh", 2), EvaluationOutcome::ParsingError);
    }

    #[test]
    fn validity_helpers() {
        assert!(EvaluationOutcome::Correct { value: 1 }.is_valid());
        assert!(EvaluationOutcome::Incorrect {
            extracted: 1,
            expected: 2
        }
        .is_valid());
        assert!(!EvaluationOutcome::InvalidInput.is_valid());
        assert!(!EvaluationOutcome::ParsingError.is_valid());
        assert_eq!(EvaluationOutcome::ParsingError.extracted(), None);
        assert_eq!(
            EvaluationOutcome::Incorrect {
                extracted: 4,
                expected: 2
            }
            .extracted(),
            Some(4)
        );
    }

    #[test]
    fn low_confidence_transcript_is_invalid() {
        let evaluator = AnswerEvaluator::default();
        let quiet = Transcript::with_confidence("sept", 0.2);
        assert_eq!(
            evaluator.evaluate_transcript(&quiet, 7, DEFAULT_MIN_CONFIDENCE),
            EvaluationOutcome::InvalidInput
        );
        let clear = Transcript::with_confidence("sept", 0.9);
        assert_eq!(
            evaluator.evaluate_transcript(&clear, 7, DEFAULT_MIN_CONFIDENCE),
            EvaluationOutcome::Correct { value: 7 }
        );
        let unscored = Transcript::new("sept");
        assert!(evaluator
            .evaluate_transcript(&unscored, 7, DEFAULT_MIN_CONFIDENCE)
            .is_correct());
    }

    #[test]
    fn non_finite_confidence_is_invalid() {
        let evaluator = AnswerEvaluator::default();
        for confidence in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            let transcript = Transcript::with_confidence("sept", confidence);
            assert_eq!(
                evaluator.evaluate_transcript(&transcript, 7, DEFAULT_MIN_CONFIDENCE),
                EvaluationOutcome::InvalidInput,
                "{confidence}"
            );
        }
    }

    #[test]
    fn outcome_serializes_with_kind_tag() {
        let json = serde_json::to_string(&EvaluationOutcome::Incorrect {
            extracted: 3,
            expected: 5,
        })
        .unwrap();
        assert_eq!(json, r#"{"kind":"incorrect","extracted":3,"expected":5}"#);
    }

    #[test]
    fn quiz_range() {
        assert!(is_in_quiz_range(0));
        assert!(is_in_quiz_range(20));
        assert!(!is_in_quiz_range(21));
    }
}
