//! The `numquiz validate` command.

use std::path::PathBuf;

use anyhow::Result;

use numquiz_core::config::load_config_from;

pub fn execute(config_path: PathBuf) -> Result<()> {
    let config = load_config_from(Some(&config_path))?;
    println!(
        "Config: {} ({} questions, pass at {}%)",
        config_path.display(),
        config.total_questions,
        config.passing_threshold
    );

    let problems = config.problems();
    for problem in &problems {
        println!("  ERROR: {problem}");
    }

    if problems.is_empty() {
        let lexicon = config.build_lexicon()?;
        println!(
            "Lexicon: {} number words, {} corrections, {} fillers",
            lexicon.canonical_entries().count(),
            lexicon.correction_entries().count(),
            lexicon.fillers().count()
        );
        println!("Config valid.");
        Ok(())
    } else {
        anyhow::bail!("{} problem(s) found", problems.len())
    }
}
