//! numquiz-core: voice arithmetic quiz engine.
//!
//! This crate turns speech-recognition transcripts into numbers, judges them
//! against generated addition and subtraction questions, keeps score, and
//! sequences the whole dialogue as a state machine. Speaking, listening and
//! display are left to the host, which reacts to [`events::QuizEvent`]s.

pub mod config;
pub mod coordinator;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod extractor;
pub mod feedback;
pub mod generator;
pub mod lexicon;
pub mod model;
pub mod report;
pub mod runtime;
pub mod score;
