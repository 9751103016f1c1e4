//! The `numquiz extract` command.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use numquiz_core::config::load_config_from;
use numquiz_core::extractor::{ExtractionResult, MatchStrategy, NumberExtractor};

#[derive(Serialize)]
struct Extraction<'a> {
    transcript: &'a str,
    number: Option<u32>,
    strategy: Option<MatchStrategy>,
}

pub fn execute(
    transcripts: Vec<String>,
    explain: bool,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let extractor = NumberExtractor::new(config.build_lexicon()?);

    for transcript in &transcripts {
        let (result, strategy) = extractor.extract_with_trace(transcript);
        if json {
            let line = serde_json::to_string(&Extraction {
                transcript,
                number: result.value(),
                strategy,
            })?;
            println!("{line}");
            continue;
        }

        let shown = match result {
            ExtractionResult::Number(n) => n.to_string(),
            ExtractionResult::NotFound => "not found".to_string(),
        };
        match strategy {
            Some(strategy) if explain => println!("{transcript:?} -> {shown} ({strategy})"),
            _ => println!("{transcript:?} -> {shown}"),
        }
    }

    Ok(())
}
