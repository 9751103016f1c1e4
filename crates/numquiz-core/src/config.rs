//! Quiz configuration loaded from TOML.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::coordinator::{CoordinatorConfig, QuizCoordinator};
use crate::error::QuizError;
use crate::evaluator::{AnswerEvaluator, DEFAULT_MIN_CONFIDENCE};
use crate::events::QuizListener;
use crate::extractor::NumberExtractor;
use crate::generator::QuestionGenerator;
use crate::lexicon::NumberLexicon;
use crate::score::DEFAULT_PASSING_THRESHOLD;

/// Top-level numquiz configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizConfig {
    /// Questions per quiz.
    #[serde(default = "default_total_questions")]
    pub total_questions: usize,
    /// Pause before the first question, in milliseconds.
    #[serde(default = "default_initial_delay")]
    pub initial_delay_ms: u64,
    /// Pause after feedback, in milliseconds.
    #[serde(default = "default_feedback_delay")]
    pub feedback_delay_ms: u64,
    /// Pause before repeating a question, in milliseconds.
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
    /// Percentage needed to pass (0 to 100).
    #[serde(default = "default_passing_threshold")]
    pub passing_threshold: f64,
    /// Minimum recognizer confidence (0 to 1).
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    #[serde(default = "default_true")]
    pub regenerate_on_restart: bool,
    /// Fixed seed for reproducible question sets.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub lexicon: LexiconConfig,
}

/// Customizations of the number lexicon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LexiconConfig {
    /// Use only the corrections listed here, dropping the built-in ones.
    #[serde(default)]
    pub replace_corrections: bool,
    /// Replacement hesitation fillers.
    #[serde(default)]
    pub fillers: Option<Vec<String>>,
    /// Extra mis-transcriptions, surface form to number.
    #[serde(default)]
    pub corrections: BTreeMap<String, u32>,
}

impl LexiconConfig {
    fn is_default(&self) -> bool {
        !self.replace_corrections && self.fillers.is_none() && self.corrections.is_empty()
    }
}

fn default_total_questions() -> usize {
    5
}
fn default_initial_delay() -> u64 {
    2000
}
fn default_feedback_delay() -> u64 {
    5000
}
fn default_retry_delay() -> u64 {
    2000
}
fn default_passing_threshold() -> f64 {
    DEFAULT_PASSING_THRESHOLD
}
fn default_min_confidence() -> f32 {
    DEFAULT_MIN_CONFIDENCE
}
fn default_true() -> bool {
    true
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            total_questions: default_total_questions(),
            initial_delay_ms: default_initial_delay(),
            feedback_delay_ms: default_feedback_delay(),
            retry_delay_ms: default_retry_delay(),
            passing_threshold: default_passing_threshold(),
            min_confidence: default_min_confidence(),
            regenerate_on_restart: true,
            seed: None,
            lexicon: LexiconConfig::default(),
        }
    }
}

impl QuizConfig {
    /// Every problem with the configuration, empty when valid.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.total_questions == 0 {
            problems.push("total_questions must be at least 1".to_string());
        }
        if !(0.0..=100.0).contains(&self.passing_threshold) {
            problems.push(format!(
                "passing_threshold must be between 0 and 100, got {}",
                self.passing_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.min_confidence) {
            problems.push(format!(
                "min_confidence must be between 0 and 1, got {}",
                self.min_confidence
            ));
        }
        if let Err(e) = self.build_lexicon() {
            problems.push(e.to_string());
        }
        problems
    }

    pub fn validate(&self) -> Result<()> {
        let problems = self.problems();
        if !problems.is_empty() {
            anyhow::bail!("invalid configuration: {}", problems.join("; "));
        }
        Ok(())
    }

    pub fn coordinator_config(&self) -> CoordinatorConfig {
        CoordinatorConfig {
            initial_delay: Duration::from_millis(self.initial_delay_ms),
            feedback_delay: Duration::from_millis(self.feedback_delay_ms),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            passing_threshold: self.passing_threshold,
            min_confidence: self.min_confidence,
            regenerate_on_restart: self.regenerate_on_restart,
        }
    }

    /// The lexicon described by the `[lexicon]` section. Shares the built-in
    /// French lexicon when nothing is customized.
    pub fn build_lexicon(&self) -> Result<Arc<NumberLexicon>, QuizError> {
        if self.lexicon.is_default() {
            return Ok(NumberLexicon::french());
        }
        let mut builder = NumberLexicon::builder();
        if self.lexicon.replace_corrections {
            builder = builder.clear_corrections();
        }
        for (surface, value) in &self.lexicon.corrections {
            builder = builder.correction(surface, *value);
        }
        if let Some(fillers) = &self.lexicon.fillers {
            builder = builder.fillers(fillers);
        }
        builder.build().map(Arc::new)
    }

    pub fn build_generator(&self) -> Result<QuestionGenerator, QuizError> {
        match self.seed {
            Some(seed) => QuestionGenerator::with_seed(self.total_questions, seed),
            None => QuestionGenerator::new(self.total_questions),
        }
    }

    /// Validate and assemble a coordinator reporting to `listener`.
    pub fn build_coordinator(&self, listener: Arc<dyn QuizListener>) -> Result<QuizCoordinator> {
        self.validate()?;
        let evaluator = AnswerEvaluator::new(NumberExtractor::new(self.build_lexicon()?));
        Ok(QuizCoordinator::new(
            self.build_generator()?,
            evaluator,
            listener,
            self.coordinator_config(),
        ))
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(questions) = var("NUMQUIZ_QUESTIONS") {
            self.total_questions = questions
                .trim()
                .parse()
                .with_context(|| format!("invalid NUMQUIZ_QUESTIONS: {questions}"))?;
        }
        if let Some(seed) = var("NUMQUIZ_SEED") {
            let seed = seed
                .trim()
                .parse()
                .with_context(|| format!("invalid NUMQUIZ_SEED: {seed}"))?;
            self.seed = Some(seed);
        }
        Ok(())
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `numquiz.toml` in the current directory
/// 2. `~/.config/numquiz/config.toml`
///
/// Environment variable overrides: `NUMQUIZ_QUESTIONS`, `NUMQUIZ_SEED`.
pub fn load_config() -> Result<QuizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => {
            let local = PathBuf::from("numquiz.toml");
            if local.exists() {
                Some(local)
            } else {
                dirs_path()
                    .map(|home| home.join("config.toml"))
                    .filter(|global| global.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let config = toml::from_str::<QuizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            tracing::debug!(path = %path.display(), "config loaded");
            config
        }
        None => QuizConfig::default(),
    };

    config.apply_overrides(|name| std::env::var(name).ok())?;
    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("numquiz"))
}
