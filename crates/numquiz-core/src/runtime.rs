//! Async driver for a [`QuizCoordinator`].
//!
//! One tokio task owns the coordinator. Commands arrive on an mpsc channel
//! and the coordinator's pending timer becomes a `sleep_until` deadline, so
//! every transition happens on the same task in arrival order.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::coordinator::{QuizCoordinator, TimerId};
use crate::error::QuizError;
use crate::evaluator::EvaluationOutcome;
use crate::model::{QuizPhase, Transcript};
use crate::report::QuizReport;

const COMMAND_BUFFER: usize = 32;

type Reply<T> = oneshot::Sender<T>;

enum Command {
    Start(Reply<Result<(), QuizError>>),
    Submit(String, Reply<Result<EvaluationOutcome, QuizError>>),
    SubmitTranscript(Transcript, Reply<Result<EvaluationOutcome, QuizError>>),
    Retry(Reply<Result<(), QuizError>>),
    Abort(String),
    Phase(Reply<QuizPhase>),
    Report(Reply<QuizReport>),
    Shutdown,
}

/// Spawns the task that drives a coordinator.
pub struct QuizRunner;

impl QuizRunner {
    /// Move `coordinator` onto a new task. The join handle yields it back
    /// once the task ends, either on [`QuizHandle::shutdown`] or when every
    /// handle has been dropped.
    pub fn spawn(coordinator: QuizCoordinator) -> (QuizHandle, JoinHandle<QuizCoordinator>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let task = tokio::spawn(run(coordinator, rx));
        (QuizHandle { tx }, task)
    }
}

/// Cloneable handle for sending commands to a running quiz.
#[derive(Clone)]
pub struct QuizHandle {
    tx: mpsc::Sender<Command>,
}

impl QuizHandle {
    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> Command) -> Result<T, QuizError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(command(reply))
            .await
            .map_err(|_| QuizError::RunnerStopped)?;
        response.await.map_err(|_| QuizError::RunnerStopped)
    }

    async fn send(&self, command: Command) -> Result<(), QuizError> {
        self.tx
            .send(command)
            .await
            .map_err(|_| QuizError::RunnerStopped)
    }

    pub async fn start(&self) -> Result<(), QuizError> {
        self.request(Command::Start).await?
    }

    pub async fn submit_answer(
        &self,
        transcript: impl Into<String>,
    ) -> Result<EvaluationOutcome, QuizError> {
        let transcript = transcript.into();
        self.request(|reply| Command::Submit(transcript, reply))
            .await?
    }

    pub async fn submit_transcript(
        &self,
        transcript: Transcript,
    ) -> Result<EvaluationOutcome, QuizError> {
        self.request(|reply| Command::SubmitTranscript(transcript, reply))
            .await?
    }

    pub async fn retry_current_question(&self) -> Result<(), QuizError> {
        self.request(Command::Retry).await?
    }

    pub async fn abort(&self, reason: impl Into<String>) -> Result<(), QuizError> {
        self.send(Command::Abort(reason.into())).await
    }

    pub async fn phase(&self) -> Result<QuizPhase, QuizError> {
        self.request(Command::Phase).await
    }

    pub async fn report(&self) -> Result<QuizReport, QuizError> {
        self.request(Command::Report).await
    }

    /// Stop the task. Any pending timer is cancelled.
    pub async fn shutdown(&self) -> Result<(), QuizError> {
        self.send(Command::Shutdown).await
    }
}

async fn run(mut coordinator: QuizCoordinator, mut rx: mpsc::Receiver<Command>) -> QuizCoordinator {
    let mut armed: Option<(TimerId, Instant)> = None;

    loop {
        armed = match (coordinator.pending_timer(), armed) {
            (Some(timer), Some((id, deadline))) if timer.id == id => Some((id, deadline)),
            (Some(timer), _) => {
                tracing::debug!(id = ?timer.id, step = ?timer.step, delay = ?timer.delay, "timer armed");
                Some((timer.id, Instant::now() + timer.delay))
            }
            (None, _) => None,
        };

        tokio::select! {
            command = rx.recv() => match command {
                Some(Command::Shutdown) | None => break,
                Some(command) => dispatch(&mut coordinator, command),
            },
            () = sleep_until(armed.map(|(_, deadline)| deadline)) => {
                if let Some((id, _)) = armed.take() {
                    coordinator.fire_timer(id);
                }
            }
        }
    }

    if let Some(timer) = coordinator.cancel_timer() {
        tracing::debug!(step = ?timer.step, "pending timer cancelled on shutdown");
    }
    tracing::info!(phase = %coordinator.phase(), "quiz runner stopped");
    coordinator
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn dispatch(coordinator: &mut QuizCoordinator, command: Command) {
    // A dropped reply receiver only means the caller stopped waiting.
    match command {
        Command::Start(reply) => {
            let _ = reply.send(coordinator.start());
        }
        Command::Submit(transcript, reply) => {
            let _ = reply.send(coordinator.submit_answer(&transcript));
        }
        Command::SubmitTranscript(transcript, reply) => {
            let _ = reply.send(coordinator.submit_transcript(&transcript));
        }
        Command::Retry(reply) => {
            let _ = reply.send(coordinator.retry_current_question());
        }
        Command::Abort(reason) => coordinator.abort(&reason),
        Command::Phase(reply) => {
            let _ = reply.send(coordinator.phase());
        }
        Command::Report(reply) => {
            let _ = reply.send(coordinator.report());
        }
        Command::Shutdown => {}
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use crate::coordinator::CoordinatorConfig;
    use crate::evaluator::AnswerEvaluator;
    use crate::events::{ChannelListener, QuizEvent};
    use crate::generator::QuestionGenerator;

    fn spawn(count: usize) -> (
        QuizHandle,
        JoinHandle<QuizCoordinator>,
        mpsc::UnboundedReceiver<QuizEvent>,
        Vec<u32>,
    ) {
        let (listener, events) = ChannelListener::new();
        let coordinator = QuizCoordinator::new(
            QuestionGenerator::with_seed(count, 21).unwrap(),
            AnswerEvaluator::default(),
            Arc::new(listener),
            CoordinatorConfig::default(),
        );
        let answers = coordinator
            .questions()
            .iter()
            .map(|q| q.correct_answer())
            .collect();
        let (handle, task) = QuizRunner::spawn(coordinator);
        (handle, task, events, answers)
    }

    #[tokio::test(start_paused = true)]
    async fn first_question_waits_for_initial_delay() {
        let (handle, _task, mut events, _) = spawn(2);
        let t0 = Instant::now();
        handle.start().await.unwrap();
        assert_eq!(events.recv().await.unwrap().event_name(), "quiz-started");

        let ready = events.recv().await.unwrap();
        assert_eq!(ready.event_name(), "question-ready");
        assert!(t0.elapsed() >= Duration::from_millis(2000));
        assert_eq!(handle.phase().await.unwrap(), QuizPhase::WaitingForAnswer);
    }

    #[tokio::test(start_paused = true)]
    async fn full_quiz_runs_to_completion() {
        let (handle, task, mut events, answers) = spawn(3);
        handle.start().await.unwrap();

        for answer in &answers {
            loop {
                if events.recv().await.unwrap().event_name() == "question-ready" {
                    break;
                }
            }
            let outcome = handle.submit_answer(answer.to_string()).await.unwrap();
            assert!(outcome.is_correct());
        }

        let finished = loop {
            let event = events.recv().await.unwrap();
            if let QuizEvent::QuizFinished { score, passing } = event {
                break (score, passing);
            }
        };
        assert_eq!(finished.0.correct_count, 3);
        assert!(finished.1);

        handle.shutdown().await.unwrap();
        let coordinator = task.await.unwrap();
        assert_eq!(coordinator.phase(), QuizPhase::Finished);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_repeats_after_delay() {
        let (handle, _task, mut events, _) = spawn(2);
        handle.start().await.unwrap();
        events.recv().await.unwrap();
        let first = events.recv().await.unwrap();

        let t0 = Instant::now();
        handle.retry_current_question().await.unwrap();
        let repeated = events.recv().await.unwrap();
        assert_eq!(repeated, first);
        assert!(t0.elapsed() >= Duration::from_millis(2000));
    }

    #[tokio::test(start_paused = true)]
    async fn abort_cancels_pending_question() {
        let (handle, _task, mut events, _) = spawn(2);
        handle.start().await.unwrap();
        handle.abort("stopped by user").await.unwrap();
        assert_eq!(handle.phase().await.unwrap(), QuizPhase::NotStarted);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(events.recv().await.unwrap().event_name(), "quiz-started");
        assert_eq!(events.recv().await.unwrap().event_name(), "quiz-error");
        assert!(events.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn wrong_phase_is_reported_not_fatal() {
        let (handle, _task, _events, _) = spawn(1);
        let err = handle.submit_answer("cinq").await.unwrap_err();
        assert!(err.is_protocol_violation());
        handle.start().await.unwrap();
        assert_eq!(handle.phase().await.unwrap(), QuizPhase::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn handle_fails_after_shutdown() {
        let (handle, task, _events, _) = spawn(1);
        handle.start().await.unwrap();
        handle.shutdown().await.unwrap();
        let coordinator = task.await.unwrap();
        assert!(coordinator.pending_timer().is_none());
        assert_eq!(handle.start().await, Err(QuizError::RunnerStopped));
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handles_stops_the_task() {
        let (handle, task, _events, _) = spawn(1);
        drop(handle);
        let coordinator = task.await.unwrap();
        assert_eq!(coordinator.phase(), QuizPhase::NotStarted);
    }
}
