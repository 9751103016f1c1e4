//! Arithmetic question generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::QuizError;
use crate::model::{Operator, Question};

/// Smallest operand drawn.
pub const MIN_OPERAND: u32 = 1;
/// Largest operand drawn.
pub const MAX_OPERAND: u32 = 10;

/// Produces a fixed-size sequence of addition and subtraction questions.
///
/// Operands are drawn uniformly from `1..=10` and the operator uniformly from
/// addition and subtraction. Seed the generator with
/// [`QuestionGenerator::with_seed`] for reproducible quizzes.
#[derive(Debug, Clone)]
pub struct QuestionGenerator {
    count: usize,
    rng: StdRng,
    questions: Vec<Question>,
}

impl QuestionGenerator {
    /// Create a generator seeded from the operating system.
    pub fn new(count: usize) -> Result<Self, QuizError> {
        Self::with_rng(count, StdRng::from_os_rng())
    }

    /// Create a generator with a fixed seed.
    pub fn with_seed(count: usize, seed: u64) -> Result<Self, QuizError> {
        Self::with_rng(count, StdRng::seed_from_u64(seed))
    }

    /// Create a generator around an existing random source.
    pub fn with_rng(count: usize, rng: StdRng) -> Result<Self, QuizError> {
        if count == 0 {
            return Err(QuizError::InvalidQuestionCount(count));
        }
        let mut generator = Self {
            count,
            rng,
            questions: Vec::new(),
        };
        generator.questions = generator.generate(count);
        tracing::info!(count, "question generator initialized");
        Ok(generator)
    }

    /// Draw `count` new questions. Does not touch the stored sequence.
    pub fn generate(&mut self, count: usize) -> Vec<Question> {
        (0..count).map(|index| self.draw(index)).collect()
    }

    fn draw(&mut self, index: usize) -> Question {
        let left = self.rng.random_range(MIN_OPERAND..=MAX_OPERAND);
        let right = self.rng.random_range(MIN_OPERAND..=MAX_OPERAND);
        let operator = if self.rng.random_bool(0.5) {
            Operator::Addition
        } else {
            Operator::Subtraction
        };
        let question = Question::new(index, left, right, operator);
        tracing::debug!(
            number = question.number(),
            prompt = question.prompt(),
            answer = question.correct_answer(),
            "question generated"
        );
        question
    }

    /// Replace the stored sequence with a fresh one of the same length.
    ///
    /// Only valid while no quiz is running; the coordinator enforces this.
    pub fn regenerate(&mut self) -> &[Question] {
        self.questions = self.generate(self.count);
        tracing::info!(count = self.count, "questions regenerated");
        &self.questions
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn total_questions(&self) -> usize {
        self.count
    }
}
