//! Numeric answer extraction from speech-to-text transcripts.
//!
//! Strategies run in a fixed priority order and the first hit wins:
//!
//! 1. normalization (lowercase, trim); empty or hesitation-only input yields
//!    nothing
//! 2. exact canonical word
//! 3. exact correction
//! 4. canonical word contained in the transcript
//! 5. correction contained in the transcript
//! 6. plain digits
//! 7. closest canonical word within an edit distance of
//!    [`MAX_FUZZY_DISTANCE`]
//!
//! Substring scans visit the longest surface forms first so that a compound
//! such as "dix-sept" is not read as "dix". Among forms of equal length the
//! declared table order decides; callers should not rely on which of two
//! equally long matches is picked.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::lexicon::NumberLexicon;

/// Largest edit distance accepted by the fuzzy fallback.
pub const MAX_FUZZY_DISTANCE: usize = 2;

/// Result of reading a number out of a transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum ExtractionResult {
    Number(u32),
    NotFound,
}

impl ExtractionResult {
    pub fn value(self) -> Option<u32> {
        match self {
            ExtractionResult::Number(n) => Some(n),
            ExtractionResult::NotFound => None,
        }
    }
}

impl From<Option<u32>> for ExtractionResult {
    fn from(value: Option<u32>) -> Self {
        value.map_or(ExtractionResult::NotFound, ExtractionResult::Number)
    }
}

/// Which strategy produced a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchStrategy {
    ExactCanonical,
    ExactCorrection,
    CanonicalSubstring,
    CorrectionSubstring,
    Digits,
    Fuzzy { distance: usize },
}

impl fmt::Display for MatchStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchStrategy::ExactCanonical => write!(f, "exact canonical"),
            MatchStrategy::ExactCorrection => write!(f, "exact correction"),
            MatchStrategy::CanonicalSubstring => write!(f, "canonical substring"),
            MatchStrategy::CorrectionSubstring => write!(f, "correction substring"),
            MatchStrategy::Digits => write!(f, "digits"),
            MatchStrategy::Fuzzy { distance } => write!(f, "fuzzy (distance {distance})"),
        }
    }
}

/// Turns raw transcripts into numbers. Stateless apart from the shared,
/// read-only lexicon, so it can be cloned and used from any thread.
#[derive(Debug, Clone)]
pub struct NumberExtractor {
    lexicon: Arc<NumberLexicon>,
}

impl Default for NumberExtractor {
    fn default() -> Self {
        Self::new(NumberLexicon::french())
    }
}

impl NumberExtractor {
    pub fn new(lexicon: Arc<NumberLexicon>) -> Self {
        Self { lexicon }
    }

    pub fn lexicon(&self) -> &NumberLexicon {
        &self.lexicon
    }

    /// Extract a number from a raw transcript.
    pub fn extract(&self, raw: &str) -> ExtractionResult {
        self.extract_with_trace(raw).0
    }

    /// Extract a number and report which strategy matched.
    pub fn extract_with_trace(&self, raw: &str) -> (ExtractionResult, Option<MatchStrategy>) {
        let text = raw.trim().to_lowercase();
        if text.is_empty() || self.is_hesitation(&text) {
            return (ExtractionResult::NotFound, None);
        }

        let found = self.find(&text);
        match found {
            Some((value, strategy)) => {
                tracing::debug!(transcript = %text, value, %strategy, "number extracted");
                (ExtractionResult::Number(value), Some(strategy))
            }
            None => {
                tracing::debug!(transcript = %text, "no number found");
                (ExtractionResult::NotFound, None)
            }
        }
    }

    fn find(&self, text: &str) -> Option<(u32, MatchStrategy)> {
        let lexicon = &self.lexicon;

        if let Some(n) = lexicon.lookup_canonical(text) {
            return Some((n, MatchStrategy::ExactCanonical));
        }
        if let Some(n) = lexicon.lookup_correction(text) {
            return Some((n, MatchStrategy::ExactCorrection));
        }
        if let Some((_, n)) = lexicon.canonical_scan_order().find(|(s, _)| text.contains(s)) {
            return Some((n, MatchStrategy::CanonicalSubstring));
        }
        if let Some((_, n)) = lexicon.correction_scan_order().find(|(s, _)| text.contains(s)) {
            return Some((n, MatchStrategy::CorrectionSubstring));
        }
        if let Ok(n) = text.parse::<u32>() {
            return Some((n, MatchStrategy::Digits));
        }
        self.closest_canonical(text)
            .map(|(n, distance)| (n, MatchStrategy::Fuzzy { distance }))
    }

    /// The canonical word nearest to `text`, if within the fuzzy ceiling.
    /// Ties go to the entry declared first.
    fn closest_canonical(&self, text: &str) -> Option<(u32, usize)> {
        let mut best: Option<(u32, usize)> = None;
        for (surface, value) in self.lexicon.canonical_entries() {
            let distance = levenshtein(text, surface);
            if distance <= MAX_FUZZY_DISTANCE && best.is_none_or(|(_, d)| distance < d) {
                best = Some((value, distance));
            }
        }
        best
    }

    fn is_hesitation(&self, text: &str) -> bool {
        text.split_whitespace().all(|token| self.lexicon.is_filler(token))
    }
}

/// Levenshtein edit distance between two strings, counted in chars.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}
