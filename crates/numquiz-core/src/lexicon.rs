//! Number-word tables used to read spoken answers.
//!
//! The lexicon holds three disjoint tables:
//!
//! - **canonical** spellings of the numbers 0 to 20, with both hyphenated and
//!   spaced forms of the compounds ("dix-sept" and "dix sept"),
//! - **corrections**: words a French recognizer is known to produce when it
//!   mishears a number ("c'est" for "sept", "oui" for "huit"),
//! - **fillers**: hesitations such as "euh" that never carry a number.
//!
//! The built-in French lexicon is created once and shared. Extra corrections
//! come from configuration through [`LexiconBuilder`].

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use crate::error::QuizError;

/// Largest number a quiz answer can take.
pub const MAX_QUIZ_NUMBER: u32 = 20;

const CANONICAL: &[(&str, u32)] = &[
    ("zéro", 0),
    ("zero", 0),
    ("un", 1),
    ("deux", 2),
    ("trois", 3),
    ("quatre", 4),
    ("cinq", 5),
    ("six", 6),
    ("sept", 7),
    ("huit", 8),
    ("neuf", 9),
    ("dix", 10),
    ("onze", 11),
    ("douze", 12),
    ("treize", 13),
    ("quatorze", 14),
    ("quinze", 15),
    ("seize", 16),
    ("dix-sept", 17),
    ("dix sept", 17),
    ("dix-huit", 18),
    ("dix huit", 18),
    ("dix-neuf", 19),
    ("dix neuf", 19),
    ("vingt", 20),
];

const CORRECTIONS: &[(&str, u32)] = &[
    ("c'est", 7),
    ("sait", 7),
    ("set", 7),
    ("cette", 7),
    ("ses", 7),
    ("hein", 1),
    ("an", 1),
    ("en", 1),
    ("han", 1),
    ("de", 2),
    ("d'eux", 2),
    ("du", 2),
    ("toi", 3),
    ("toit", 3),
    ("troie", 3),
    ("troit", 3),
    ("cat", 4),
    ("cat'", 4),
    ("catre", 4),
    ("carte", 4),
    ("saint", 5),
    ("sain", 5),
    ("sein", 5),
    ("seing", 5),
    ("sis", 6),
    ("cis", 6),
    ("si", 6),
    ("wi", 8),
    ("oui", 8),
    ("wii", 8),
    ("ouïe", 8),
    ("nerf", 9),
    ("nerve", 9),
    ("neu", 9),
    ("dis", 10),
    ("dit", 10),
    ("die", 10),
];

const FILLERS: &[&str] = &["euh", "heu", "hum", "hmm", "bah", "ben"];

static FRENCH: LazyLock<Arc<NumberLexicon>> = LazyLock::new(|| {
    Arc::new(NumberLexicon::from_tables(
        owned(CANONICAL),
        owned(CORRECTIONS),
        FILLERS.iter().map(|f| f.to_string()).collect(),
    ))
});

fn owned(table: &[(&str, u32)]) -> Vec<(String, u32)> {
    table.iter().map(|(s, n)| (s.to_string(), *n)).collect()
}

/// Read-only number-word tables.
#[derive(Debug, Clone)]
pub struct NumberLexicon {
    canonical: Vec<(String, u32)>,
    corrections: Vec<(String, u32)>,
    fillers: Vec<String>,
    canonical_index: HashMap<String, u32>,
    correction_index: HashMap<String, u32>,
    canonical_scan: Vec<usize>,
    correction_scan: Vec<usize>,
}

impl NumberLexicon {
    /// The shared built-in French lexicon.
    pub fn french() -> Arc<NumberLexicon> {
        Arc::clone(&FRENCH)
    }

    /// Start building a lexicon from the French tables.
    pub fn builder() -> LexiconBuilder {
        LexiconBuilder::default()
    }

    fn from_tables(
        canonical: Vec<(String, u32)>,
        corrections: Vec<(String, u32)>,
        fillers: Vec<String>,
    ) -> Self {
        let canonical_index = canonical.iter().cloned().collect();
        let correction_index = corrections.iter().cloned().collect();
        let canonical_scan = longest_first(&canonical);
        let correction_scan = longest_first(&corrections);
        Self {
            canonical,
            corrections,
            fillers,
            canonical_index,
            correction_index,
            canonical_scan,
            correction_scan,
        }
    }

    /// Exact lookup of a standard spelling.
    pub fn lookup_canonical(&self, text: &str) -> Option<u32> {
        self.canonical_index.get(text).copied()
    }

    /// Exact lookup of a known mis-transcription.
    pub fn lookup_correction(&self, text: &str) -> Option<u32> {
        self.correction_index.get(text).copied()
    }

    /// Whether `token` is a hesitation filler.
    pub fn is_filler(&self, token: &str) -> bool {
        self.fillers.iter().any(|f| f == token)
    }

    /// Canonical entries in declared order.
    pub fn canonical_entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.canonical.iter().map(|(s, n)| (s.as_str(), *n))
    }

    /// Correction entries in declared order.
    pub fn correction_entries(&self) -> impl Iterator<Item = (&str, u32)> {
        self.corrections.iter().map(|(s, n)| (s.as_str(), *n))
    }

    pub fn fillers(&self) -> impl Iterator<Item = &str> {
        self.fillers.iter().map(String::as_str)
    }

    /// Canonical entries in substring-scan order: longest surface form
    /// first, ties in declared order.
    pub fn canonical_scan_order(&self) -> impl Iterator<Item = (&str, u32)> {
        scan(&self.canonical, &self.canonical_scan)
    }

    /// Correction entries in substring-scan order.
    pub fn correction_scan_order(&self) -> impl Iterator<Item = (&str, u32)> {
        scan(&self.corrections, &self.correction_scan)
    }
}

fn longest_first(table: &[(String, u32)]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..table.len()).collect();
    // sort_by_key is stable, so equal lengths keep their declared order
    order.sort_by_key(|&i| std::cmp::Reverse(table[i].0.chars().count()));
    order
}

fn scan<'a>(
    table: &'a [(String, u32)],
    order: &'a [usize],
) -> impl Iterator<Item = (&'a str, u32)> {
    order.iter().map(move |&i| (table[i].0.as_str(), table[i].1))
}

/// Builder for a customized lexicon.
///
/// Canonical forms are fixed; corrections and fillers can be extended or
/// replaced.
#[derive(Debug, Clone)]
pub struct LexiconBuilder {
    corrections: Vec<(String, u32)>,
    fillers: Vec<String>,
}

impl Default for LexiconBuilder {
    fn default() -> Self {
        Self {
            corrections: owned(CORRECTIONS),
            fillers: FILLERS.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl LexiconBuilder {
    /// Drop the built-in corrections.
    pub fn clear_corrections(mut self) -> Self {
        self.corrections.clear();
        self
    }

    /// Add a correction, or change the value of an existing one.
    pub fn correction(mut self, surface: &str, value: u32) -> Self {
        let surface = normalize(surface);
        match self.corrections.iter_mut().find(|(s, _)| *s == surface) {
            Some(entry) => entry.1 = value,
            None => self.corrections.push((surface, value)),
        }
        self
    }

    /// Replace the filler list.
    pub fn fillers<I, S>(mut self, fillers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fillers = fillers.into_iter().map(|f| normalize(f.as_ref())).collect();
        self
    }

    /// Validate the tables and build the lexicon.
    pub fn build(self) -> Result<NumberLexicon, QuizError> {
        let canonical = owned(CANONICAL);

        for (surface, value) in &self.corrections {
            if surface.is_empty() {
                return Err(QuizError::Lexicon("empty correction surface form".into()));
            }
            if *value > MAX_QUIZ_NUMBER {
                return Err(QuizError::Lexicon(format!(
                    "correction '{surface}' maps to {value}, above {MAX_QUIZ_NUMBER}"
                )));
            }
            if canonical.iter().any(|(c, _)| c == surface) {
                return Err(QuizError::Lexicon(format!(
                    "correction '{surface}' shadows a canonical number word"
                )));
            }
        }

        for filler in &self.fillers {
            if filler.is_empty() {
                return Err(QuizError::Lexicon("empty filler".into()));
            }
            let collides = canonical.iter().any(|(c, _)| c == filler)
                || self.corrections.iter().any(|(c, _)| c == filler);
            if collides {
                return Err(QuizError::Lexicon(format!(
                    "filler '{filler}' is also a number word"
                )));
            }
        }

        Ok(NumberLexicon::from_tables(
            canonical,
            self.corrections,
            self.fillers,
        ))
    }
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
