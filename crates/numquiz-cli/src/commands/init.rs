//! The `numquiz init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("numquiz.toml").exists() {
        println!("numquiz.toml already exists, skipping.");
    } else {
        std::fs::write("numquiz.toml", SAMPLE_CONFIG)?;
        println!("Created numquiz.toml");
    }

    println!("\nNext steps:");
    println!("  1. Edit numquiz.toml to taste");
    println!("  2. Run: numquiz validate --config numquiz.toml");
    println!("  3. Run: numquiz run");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# numquiz configuration

total_questions = 5
initial_delay_ms = 2000
feedback_delay_ms = 5000
retry_delay_ms = 2000
passing_threshold = 50.0
min_confidence = 0.5
regenerate_on_restart = true
# seed = 42

[lexicon]
replace_corrections = false
fillers = ["euh", "heu", "hum", "hmm", "bah", "ben"]

# Extra words the recognizer tends to hear instead of a number.
[lexicon.corrections]
"sète" = 7
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use numquiz_core::config::load_config_from;

    #[test]
    fn sample_config_is_valid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("numquiz.toml");
        std::fs::write(&path, SAMPLE_CONFIG).unwrap();
        let config = load_config_from(Some(&path)).unwrap();
        config.validate().unwrap();
        assert_eq!(config.lexicon.corrections.get("sète"), Some(&7));
    }
}
