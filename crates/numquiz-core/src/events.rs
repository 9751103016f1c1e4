//! Lifecycle events emitted by the quiz coordinator, and listeners for them.
//!
//! The core never speaks, moves or draws anything itself. A listener reacts
//! to these events by driving whatever speech, motion or display layer the
//! host has.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::evaluator::EvaluationOutcome;
use crate::score::ScoreState;

/// A notification from the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum QuizEvent {
    QuizStarted {
        session_id: Uuid,
    },
    QuestionReady {
        prompt: String,
        question_number: usize,
        total_questions: usize,
    },
    AnswerProcessed {
        outcome: EvaluationOutcome,
        expected_answer: u32,
    },
    QuizFinished {
        score: ScoreState,
        passing: bool,
    },
    QuizError {
        message: String,
    },
}

impl QuizEvent {
    pub fn event_name(&self) -> &'static str {
        match self {
            QuizEvent::QuizStarted { .. } => "quiz-started",
            QuizEvent::QuestionReady { .. } => "question-ready",
            QuizEvent::AnswerProcessed { .. } => "answer-processed",
            QuizEvent::QuizFinished { .. } => "quiz-finished",
            QuizEvent::QuizError { .. } => "quiz-error",
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Receives coordinator events.
pub trait QuizListener: Send + Sync {
    fn on_event(&self, event: &QuizEvent);
}

/// Listener that ignores everything.
pub struct NoopListener;

impl QuizListener for NoopListener {
    fn on_event(&self, _: &QuizEvent) {}
}

/// Listener that keeps every event in memory.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<QuizEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events received so far.
    pub fn events(&self) -> Vec<QuizEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<QuizEvent> {
        self.events().pop()
    }

    /// Number of events with the given name.
    pub fn count(&self, event_name: &str) -> usize {
        self.events()
            .iter()
            .filter(|e| e.event_name() == event_name)
            .count()
    }

    pub fn clear(&self) {
        if let Ok(mut events) = self.events.lock() {
            events.clear();
        }
    }
}

impl QuizListener for EventLog {
    fn on_event(&self, event: &QuizEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Listener that forwards events into a tokio channel.
pub struct ChannelListener {
    tx: mpsc::UnboundedSender<QuizEvent>,
}

impl ChannelListener {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<QuizEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl QuizListener for ChannelListener {
    fn on_event(&self, event: &QuizEvent) {
        if self.tx.send(event.clone()).is_err() {
            tracing::debug!(event = event.event_name(), "event receiver dropped");
        }
    }
}
