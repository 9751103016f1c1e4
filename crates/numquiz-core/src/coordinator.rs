//! Quiz dialogue state machine.
//!
//! The coordinator sequences a quiz through its phases:
//!
//! ```text
//! NotStarted ─start─▶ Running ─ask─▶ WaitingForAnswer ─submit─▶ ProcessingAnswer
//!                        ▲                  ▲                      │       │
//!                        │                  └──── invalid answer ──┘       │
//!                        └────────── feedback delay elapsed (valid) ───────┘
//! Running ─all questions answered─▶ Finished ─start─▶ Running
//! ```
//!
//! Every transition is a `&mut self` method, so a single owner drives the
//! machine. Pauses between steps (before the first question, after feedback)
//! are not slept here: the coordinator records one [`PendingTimer`] and the
//! host calls [`QuizCoordinator::fire_timer`] once the delay has elapsed.
//! Scheduling a new timer cancels the previous one, and firing a cancelled or
//! unknown timer does nothing.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::QuizError;
use crate::evaluator::{AnswerEvaluator, EvaluationOutcome, DEFAULT_MIN_CONFIDENCE};
use crate::events::{QuizEvent, QuizListener};
use crate::generator::QuestionGenerator;
use crate::model::{Question, QuizPhase, Transcript};
use crate::report::QuizReport;
use crate::score::{ScoreState, ScoreTracker, DEFAULT_PASSING_THRESHOLD};

/// Timing and policy knobs for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorConfig {
    /// Pause between `start` and the first question.
    pub initial_delay: Duration,
    /// Pause after a judged answer before the next question.
    pub feedback_delay: Duration,
    /// Pause before a question is repeated on request.
    pub retry_delay: Duration,
    /// Percentage needed to pass.
    pub passing_threshold: f64,
    /// Transcripts below this recognizer confidence are treated as unusable.
    pub min_confidence: f32,
    /// Draw new questions when restarting a finished quiz.
    pub regenerate_on_restart: bool,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_millis(2000),
            feedback_delay: Duration::from_millis(5000),
            retry_delay: Duration::from_millis(2000),
            passing_threshold: DEFAULT_PASSING_THRESHOLD,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            regenerate_on_restart: true,
        }
    }
}

impl CoordinatorConfig {
    /// Same policy with every delay set to zero.
    pub fn immediate() -> Self {
        Self {
            initial_delay: Duration::ZERO,
            feedback_delay: Duration::ZERO,
            retry_delay: Duration::ZERO,
            ..Self::default()
        }
    }
}

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What happens when a timer fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduledStep {
    /// Ask the current question (after `start`).
    AskQuestion,
    /// Leave the feedback pause and ask the next question.
    AdvanceAfterFeedback,
    /// Announce the current question again.
    RepeatQuestion,
}

/// The single timer the coordinator is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub delay: Duration,
    pub step: ScheduledStep,
}

/// One listening attempt and how it was judged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_number: usize,
    pub transcript: String,
    pub outcome: EvaluationOutcome,
    pub expected_answer: u32,
    pub at: DateTime<Utc>,
}

/// State of one quiz run.
#[derive(Debug, Clone)]
struct QuizSession {
    id: Uuid,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    phase: QuizPhase,
    current_question_index: usize,
    questions: Vec<Question>,
    score: ScoreTracker,
    answers: Vec<AnswerRecord>,
}

impl QuizSession {
    fn idle(questions: Vec<Question>) -> Self {
        let total = count_u32(questions.len());
        Self {
            id: Uuid::new_v4(),
            started_at: None,
            finished_at: None,
            phase: QuizPhase::NotStarted,
            current_question_index: 0,
            questions,
            score: ScoreTracker::new(total),
            answers: Vec::new(),
        }
    }

    fn total(&self) -> u32 {
        self.score.total_questions()
    }

    fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_question_index)
    }
}

fn count_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Orchestrates question generation, answer evaluation and scoring, and
/// reports progress to a [`QuizListener`].
pub struct QuizCoordinator {
    session: QuizSession,
    generator: QuestionGenerator,
    evaluator: AnswerEvaluator,
    listener: Arc<dyn QuizListener>,
    config: CoordinatorConfig,
    pending: Option<PendingTimer>,
    next_timer: u64,
}

impl QuizCoordinator {
    pub fn new(
        generator: QuestionGenerator,
        evaluator: AnswerEvaluator,
        listener: Arc<dyn QuizListener>,
        config: CoordinatorConfig,
    ) -> Self {
        let session = QuizSession::idle(generator.questions().to_vec());
        tracing::info!(
            total_questions = generator.total_questions(),
            "quiz coordinator initialized"
        );
        Self {
            session,
            generator,
            evaluator,
            listener,
            config,
            pending: None,
            next_timer: 0,
        }
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Begin a quiz. Valid from `NotStarted` or `Finished`.
    pub fn start(&mut self) -> Result<(), QuizError> {
        let restarting = match self.session.phase {
            QuizPhase::NotStarted => false,
            QuizPhase::Finished => true,
            _ => return Err(self.reject("start")),
        };
        if restarting && self.config.regenerate_on_restart {
            self.generator.regenerate();
        }

        self.pending = None;
        self.session = QuizSession::idle(self.generator.questions().to_vec());
        self.session.started_at = Some(Utc::now());
        self.session.phase = QuizPhase::Running;
        tracing::info!(
            session = %self.session.id,
            total_questions = self.session.total(),
            "quiz started"
        );

        self.emit(QuizEvent::QuizStarted {
            session_id: self.session.id,
        });
        self.schedule(self.config.initial_delay, ScheduledStep::AskQuestion);
        Ok(())
    }

    /// Announce the current question, or finish when all are answered.
    /// Valid in `Running`.
    pub fn ask_current_question(&mut self) -> Result<(), QuizError> {
        if self.session.phase != QuizPhase::Running {
            return Err(self.reject("ask a question"));
        }
        self.ask();
        Ok(())
    }

    fn ask(&mut self) {
        self.pending = None;
        if self.session.score.is_complete(self.session.total()) {
            self.complete();
            return;
        }
        let Some(question) = self.session.current_question().cloned() else {
            tracing::warn!(
                index = self.session.current_question_index,
                "no question at current index, finishing"
            );
            self.complete();
            return;
        };

        self.session.phase = QuizPhase::WaitingForAnswer;
        tracing::info!(
            session = %self.session.id,
            number = question.number(),
            prompt = question.prompt(),
            "asking question"
        );
        self.announce(&question);
    }

    fn announce(&self, question: &Question) {
        self.emit(QuizEvent::QuestionReady {
            prompt: question.prompt().to_string(),
            question_number: question.number(),
            total_questions: self.session.questions.len(),
        });
    }

    /// Judge one transcript for the current question. Valid in
    /// `WaitingForAnswer`.
    pub fn submit_answer(&mut self, transcript: &str) -> Result<EvaluationOutcome, QuizError> {
        let expected = self.expected_answer("submit an answer")?;
        let outcome = self.evaluator.evaluate(transcript, expected);
        Ok(self.process(transcript, outcome, expected))
    }

    /// Like [`submit_answer`](Self::submit_answer), rejecting transcripts
    /// whose confidence is below the configured minimum.
    pub fn submit_transcript(
        &mut self,
        transcript: &Transcript,
    ) -> Result<EvaluationOutcome, QuizError> {
        let expected = self.expected_answer("submit an answer")?;
        let outcome =
            self.evaluator
                .evaluate_transcript(transcript, expected, self.config.min_confidence);
        Ok(self.process(&transcript.text, outcome, expected))
    }

    fn expected_answer(&self, operation: &'static str) -> Result<u32, QuizError> {
        if self.session.phase != QuizPhase::WaitingForAnswer {
            return Err(self.reject(operation));
        }
        match self.session.current_question() {
            Some(question) => Ok(question.correct_answer()),
            None => Err(self.reject(operation)),
        }
    }

    fn process(
        &mut self,
        transcript: &str,
        outcome: EvaluationOutcome,
        expected: u32,
    ) -> EvaluationOutcome {
        self.session.phase = QuizPhase::ProcessingAnswer;
        self.pending = None;
        self.session.answers.push(AnswerRecord {
            question_number: self.session.current_question_index + 1,
            transcript: transcript.to_string(),
            outcome,
            expected_answer: expected,
            at: Utc::now(),
        });

        if outcome.is_valid() {
            self.session.score.record(outcome.is_correct());
            self.session.current_question_index += 1;
            tracing::info!(
                session = %self.session.id,
                %outcome,
                score = %self.session.score.score_string(),
                "answer accepted"
            );
            self.emit(QuizEvent::AnswerProcessed {
                outcome,
                expected_answer: expected,
            });
            self.schedule(
                self.config.feedback_delay,
                ScheduledStep::AdvanceAfterFeedback,
            );
        } else {
            self.session.phase = QuizPhase::WaitingForAnswer;
            tracing::info!(
                session = %self.session.id,
                transcript,
                %outcome,
                number = self.session.current_question_index + 1,
                "answer not understood, same question"
            );
            self.emit(QuizEvent::AnswerProcessed {
                outcome,
                expected_answer: expected,
            });
        }
        outcome
    }

    /// End the quiz once every question is answered. Valid in `Running` or
    /// `ProcessingAnswer`; the feedback pause is skipped.
    pub fn finish(&mut self) -> Result<(), QuizError> {
        let phase_allows = matches!(
            self.session.phase,
            QuizPhase::Running | QuizPhase::ProcessingAnswer
        );
        if !phase_allows || !self.session.score.is_complete(self.session.total()) {
            return Err(self.reject("finish"));
        }
        self.complete();
        Ok(())
    }

    fn complete(&mut self) {
        self.pending = None;
        self.session.phase = QuizPhase::Finished;
        self.session.finished_at = Some(Utc::now());

        let score = self.session.score.state();
        let passing = self.session.score.passing(self.config.passing_threshold);
        tracing::info!(
            session = %self.session.id,
            correct = score.correct_count,
            total = score.total_questions,
            percentage = self.session.score.percentage().round(),
            passing,
            message = self.session.score.final_message(),
            "quiz finished"
        );
        self.emit(QuizEvent::QuizFinished { score, passing });
    }

    /// Ask for the current question to be announced again after the retry
    /// delay. Valid in `WaitingForAnswer`.
    pub fn retry_current_question(&mut self) -> Result<(), QuizError> {
        if self.session.phase != QuizPhase::WaitingForAnswer {
            return Err(self.reject("repeat the question"));
        }
        tracing::debug!(
            number = self.session.current_question_index + 1,
            "repeating question"
        );
        self.schedule(self.config.retry_delay, ScheduledStep::RepeatQuestion);
        Ok(())
    }

    /// Draw a fresh question set. Only valid while no quiz is in progress.
    pub fn regenerate_questions(&mut self) -> Result<(), QuizError> {
        if self.session.phase.in_progress() {
            return Err(self.reject("regenerate questions"));
        }
        self.generator.regenerate();
        self.pending = None;
        self.session = QuizSession::idle(self.generator.questions().to_vec());
        Ok(())
    }

    /// Stop the current quiz and report `reason` as a quiz error.
    pub fn abort(&mut self, reason: &str) {
        tracing::error!(session = %self.session.id, reason, "quiz aborted");
        self.reset();
        self.emit(QuizEvent::QuizError {
            message: reason.to_string(),
        });
    }

    /// Return to `NotStarted` with the current questions, cancelling any
    /// pending timer.
    pub fn reset(&mut self) {
        self.pending = None;
        self.session = QuizSession::idle(std::mem::take(&mut self.session.questions));
    }

    // -----------------------------------------------------------------------
    // Timers
    // -----------------------------------------------------------------------

    fn schedule(&mut self, delay: Duration, step: ScheduledStep) {
        self.next_timer += 1;
        let timer = PendingTimer {
            id: TimerId(self.next_timer),
            delay,
            step,
        };
        if let Some(previous) = self.pending.replace(timer) {
            tracing::debug!(?previous, "timer replaced");
        }
        tracing::debug!(?timer, "timer scheduled");
    }

    /// The timer the coordinator is waiting on, if any.
    pub fn pending_timer(&self) -> Option<PendingTimer> {
        self.pending
    }

    /// Run the step of an elapsed timer. Stale ids are ignored.
    pub fn fire_timer(&mut self, id: TimerId) {
        match self.pending {
            Some(timer) if timer.id == id => {
                self.pending = None;
                self.run_step(timer.step);
            }
            _ => tracing::debug!(?id, "stale timer ignored"),
        }
    }

    /// Drop the pending timer without running it.
    pub fn cancel_timer(&mut self) -> Option<PendingTimer> {
        self.pending.take()
    }

    /// Run the pending step now, without waiting for its delay.
    pub fn fire_pending(&mut self) -> Option<ScheduledStep> {
        let timer = self.pending.take()?;
        self.run_step(timer.step);
        Some(timer.step)
    }

    fn run_step(&mut self, step: ScheduledStep) {
        let phase = self.session.phase;
        match (step, phase) {
            (ScheduledStep::AskQuestion, QuizPhase::Running) => self.ask(),
            (ScheduledStep::AdvanceAfterFeedback, QuizPhase::ProcessingAnswer) => {
                self.session.phase = QuizPhase::Running;
                self.ask();
            }
            (ScheduledStep::RepeatQuestion, QuizPhase::WaitingForAnswer) => {
                if let Some(question) = self.session.current_question().cloned() {
                    self.announce(&question);
                }
            }
            _ => tracing::debug!(?step, %phase, "timer step no longer applies"),
        }
    }

    // -----------------------------------------------------------------------
    // Events and errors
    // -----------------------------------------------------------------------

    fn emit(&self, event: QuizEvent) {
        tracing::debug!(event = event.event_name(), "emitting event");
        self.listener.on_event(&event);
    }

    fn reject(&self, operation: &'static str) -> QuizError {
        let err = QuizError::InvalidTransition {
            operation,
            phase: self.session.phase,
        };
        tracing::warn!(session = %self.session.id, "{err}");
        self.emit(QuizEvent::QuizError {
            message: err.to_string(),
        });
        err
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> QuizPhase {
        self.session.phase
    }

    pub fn current_question_index(&self) -> usize {
        self.session.current_question_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.current_question()
    }

    pub fn questions(&self) -> &[Question] {
        &self.session.questions
    }

    pub fn score(&self) -> ScoreState {
        self.session.score.state()
    }

    pub fn score_tracker(&self) -> &ScoreTracker {
        &self.session.score
    }

    pub fn passing(&self) -> bool {
        self.session.score.passing(self.config.passing_threshold)
    }

    pub fn session_id(&self) -> Uuid {
        self.session.id
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.session.answers
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn evaluator(&self) -> &AnswerEvaluator {
        &self.evaluator
    }

    /// Snapshot of the current session for export.
    pub fn report(&self) -> QuizReport {
        QuizReport {
            id: self.session.id,
            started_at: self.session.started_at,
            finished_at: self.session.finished_at,
            phase: self.session.phase,
            questions: self.session.questions.clone(),
            answers: self.session.answers.clone(),
            summary: self.session.score.summary(self.config.passing_threshold),
        }
    }
}
