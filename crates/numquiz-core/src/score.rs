//! Score tracking and pass/fail statistics.

use serde::{Deserialize, Serialize};

/// Score percentage needed for a passing grade.
pub const DEFAULT_PASSING_THRESHOLD: f64 = 50.0;

/// Snapshot of a quiz score.
///
/// Always satisfies `correct_count <= questions_answered <= total_questions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreState {
    pub correct_count: u32,
    pub questions_answered: u32,
    pub total_questions: u32,
}

/// Serializable summary of a score, including derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    #[serde(flatten)]
    pub state: ScoreState,
    pub percentage: f64,
    pub passing: bool,
    pub threshold: f64,
    pub message: String,
}

/// Accumulates correctness counts. Its methods are the only way to change a
/// [`ScoreState`].
#[derive(Debug, Clone)]
pub struct ScoreTracker {
    correct: u32,
    answered: u32,
    total: u32,
}

impl ScoreTracker {
    pub fn new(total_questions: u32) -> Self {
        Self {
            correct: 0,
            answered: 0,
            total: total_questions,
        }
    }

    pub fn reset(&mut self) {
        self.correct = 0;
        self.answered = 0;
        tracing::debug!(total = self.total, "score reset");
    }

    /// Record one answered question.
    ///
    /// Returns `false` and changes nothing once every question has been
    /// answered.
    pub fn record(&mut self, is_correct: bool) -> bool {
        if self.answered >= self.total {
            tracing::warn!(
                answered = self.answered,
                total = self.total,
                "score already complete, answer not recorded"
            );
            return false;
        }
        self.answered += 1;
        if is_correct {
            self.correct += 1;
        }
        tracing::debug!(score = %self.score_string(), "answer recorded");
        true
    }

    /// Whether at least `total` questions have been answered.
    pub fn is_complete(&self, total: u32) -> bool {
        self.answered >= total
    }

    /// Percentage of answered questions that were correct; 0 before any
    /// answer.
    pub fn percentage(&self) -> f64 {
        if self.answered == 0 {
            return 0.0;
        }
        f64::from(self.correct) / f64::from(self.answered) * 100.0
    }

    pub fn passing(&self, threshold: f64) -> bool {
        self.percentage() >= threshold
    }

    pub fn state(&self) -> ScoreState {
        ScoreState {
            correct_count: self.correct,
            questions_answered: self.answered,
            total_questions: self.total,
        }
    }

    pub fn total_questions(&self) -> u32 {
        self.total
    }

    /// Closing remark matching the score band.
    pub fn final_message(&self) -> &'static str {
        let percentage = self.percentage();
        if percentage >= 80.0 {
            "Excellent ! Tu maîtrises parfaitement !"
        } else if percentage >= 60.0 {
            "Très bien ! Tu as une bonne compréhension !"
        } else if percentage >= 50.0 {
            "Bien ! Tu as la moyenne, continue comme ça !"
        } else {
            "Continue tes efforts, tu vas y arriver !"
        }
    }

    /// Short form such as `3/4 (75%)`.
    pub fn score_string(&self) -> String {
        format!(
            "{}/{} ({}%)",
            self.correct,
            self.answered,
            self.percentage().round()
        )
    }

    pub fn summary(&self, threshold: f64) -> ScoreSummary {
        ScoreSummary {
            state: self.state(),
            percentage: self.percentage(),
            passing: self.passing(threshold),
            threshold,
            message: self.final_message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tracker() {
        let tracker = ScoreTracker::new(5);
        assert_eq!(tracker.percentage(), 0.0);
        assert!(!tracker.passing(DEFAULT_PASSING_THRESHOLD));
        assert!(!tracker.is_complete(5));
        assert!(tracker.is_complete(0));
    }

    #[test]
    fn record_counts_answers() {
        let mut tracker = ScoreTracker::new(4);
        assert!(tracker.record(true));
        assert!(tracker.record(false));
        assert!(tracker.record(true));
        let state = tracker.state();
        assert_eq!(state.correct_count, 2);
        assert_eq!(state.questions_answered, 3);
        assert_eq!(state.total_questions, 4);
        assert!((tracker.percentage() - 66.666).abs() < 0.01);
        assert!(tracker.passing(DEFAULT_PASSING_THRESHOLD));
        assert!(!tracker.passing(70.0));
    }

    #[test]
    fn percentage_is_idempotent() {
        let mut tracker = ScoreTracker::new(3);
        tracker.record(true);
        tracker.record(false);
        let first = tracker.percentage();
        assert_eq!(first, tracker.percentage());
        assert_eq!(first, 50.0);
        assert!(tracker.passing(50.0));
    }

    #[test]
    fn record_refused_once_complete() {
        let mut tracker = ScoreTracker::new(1);
        assert!(tracker.record(true));
        assert!(tracker.is_complete(1));
        assert!(!tracker.record(true));
        assert_eq!(tracker.state().questions_answered, 1);
        assert_eq!(tracker.state().correct_count, 1);
    }

    #[test]
    fn reset_clears_counts() {
        let mut tracker = ScoreTracker::new(2);
        tracker.record(true);
        tracker.reset();
        assert_eq!(tracker.state().questions_answered, 0);
        assert_eq!(tracker.state().correct_count, 0);
        assert_eq!(tracker.total_questions(), 2);
    }

    #[test]
    fn final_message_bands() {
        let mut tracker = ScoreTracker::new(5);
        for correct in [true, true, true, true, false] {
            tracker.record(correct);
        }
        assert_eq!(tracker.final_message(), "Excellent ! Tu maîtrises parfaitement !");
        assert_eq!(tracker.score_string(), "4/5 (80%)");

        let mut low = ScoreTracker::new(2);
        low.record(false);
        assert_eq!(low.final_message(), "Continue tes efforts, tu vas y arriver !");
    }

    #[test]
    fn summary_serializes_flat() {
        let mut tracker = ScoreTracker::new(2);
        tracker.record(true);
        tracker.record(true);
        let json = serde_json::to_value(tracker.summary(50.0)).unwrap();
        assert_eq!(json["correct_count"], 2);
        assert_eq!(json["passing"], true);
        assert_eq!(json["percentage"], 100.0);
    }
}
