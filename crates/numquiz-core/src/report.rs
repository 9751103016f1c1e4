//! Session report with JSON persistence.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::coordinator::AnswerRecord;
use crate::model::{Question, QuizPhase};
use crate::score::ScoreSummary;

/// Everything that happened in one quiz session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizReport {
    /// Session identifier.
    pub id: Uuid,
    /// When `start` was called.
    pub started_at: Option<DateTime<Utc>>,
    /// When the quiz reached `Finished`.
    pub finished_at: Option<DateTime<Utc>>,
    /// Phase at the time of the snapshot.
    pub phase: QuizPhase,
    /// The question sequence.
    pub questions: Vec<Question>,
    /// Every listening attempt, including ones that were not understood.
    pub answers: Vec<AnswerRecord>,
    /// Final score.
    pub summary: ScoreSummary,
}

impl QuizReport {
    pub fn is_finished(&self) -> bool {
        self.phase == QuizPhase::Finished
    }

    /// Attempts that did not yield a usable number.
    pub fn retries(&self) -> usize {
        self.answers.iter().filter(|a| !a.outcome.is_valid()).count()
    }

    /// Wall-clock duration of a finished session in milliseconds.
    pub fn duration_ms(&self) -> Option<i64> {
        let started = self.started_at?;
        let finished = self.finished_at?;
        Some((finished - started).num_milliseconds())
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: QuizReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }
}
