//! numquiz CLI: play the quiz from a terminal and inspect the interpreter.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "numquiz", version, about = "Voice-driven arithmetic quiz")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a quiz, one transcript per line on stdin
    Run {
        /// Number of questions (overrides the config)
        #[arg(long)]
        questions: Option<usize>,

        /// Seed for reproducible questions
        #[arg(long)]
        seed: Option<u64>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip all pauses between steps
        #[arg(long)]
        fast: bool,

        /// Save the session report as JSON
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Extract numbers from transcripts
    Extract {
        /// Show which strategy matched
        #[arg(long)]
        explain: bool,

        /// Print one JSON object per transcript
        #[arg(long)]
        json: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Transcripts to interpret
        #[arg(required = true)]
        transcripts: Vec<String>,
    },

    /// Validate a config file
    Validate {
        /// Path to the config file
        #[arg(long)]
        config: PathBuf,
    },

    /// Print a saved session report
    Report {
        /// Report JSON written by `run --output`
        #[arg(long)]
        input: PathBuf,
    },

    /// Create a starter config
    Init,
}

#[tokio::main]
async fn main() {
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Ok(directive) = "numquiz=info".parse() {
        filter = filter.add_directive(directive);
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            questions,
            seed,
            config,
            fast,
            output,
        } => commands::run::execute(questions, seed, config, fast, output).await,
        Commands::Extract {
            explain,
            json,
            config,
            transcripts,
        } => commands::extract::execute(transcripts, explain, json, config),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Report { input } => commands::report::execute(input),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
