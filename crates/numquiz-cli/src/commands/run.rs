//! The `numquiz run` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use numquiz_core::config::load_config_from;
use numquiz_core::events::{ChannelListener, QuizEvent};
use numquiz_core::feedback;
use numquiz_core::runtime::{QuizHandle, QuizRunner};

use super::report::print_summary;

/// Typed at the prompt to hear the question again.
const REPEAT: &str = "?";

pub async fn execute(
    questions: Option<usize>,
    seed: Option<u64>,
    config_path: Option<PathBuf>,
    fast: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config_from(config_path.as_deref())?;
    if let Some(questions) = questions {
        config.total_questions = questions;
    }
    if seed.is_some() {
        config.seed = seed;
    }
    if fast {
        config.initial_delay_ms = 0;
        config.feedback_delay_ms = 0;
        config.retry_delay_ms = 0;
    }

    let (listener, mut events) = ChannelListener::new();
    let coordinator = config.build_coordinator(Arc::new(listener))?;
    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let (handle, task) = QuizRunner::spawn(coordinator);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut last_transcript = String::new();

    println!(
        "numquiz: {} questions. Answer in words or digits, '{REPEAT}' to repeat.",
        config.total_questions
    );
    handle.start().await?;

    while let Some(event) = events.recv().await {
        match event {
            QuizEvent::QuizStarted { .. } => {}
            QuizEvent::QuestionReady {
                prompt,
                question_number,
                total_questions,
            } => {
                println!("\nQuestion {question_number}/{total_questions}: {prompt}");
                if !answer(&handle, &mut lines, &mut last_transcript).await? {
                    break;
                }
            }
            QuizEvent::AnswerProcessed { outcome, .. } => {
                println!("{}", feedback::phrase(&outcome, &mut rng));
                if !outcome.is_valid() {
                    println!("{}", feedback::improvement_suggestion(&last_transcript));
                    if !answer(&handle, &mut lines, &mut last_transcript).await? {
                        break;
                    }
                }
            }
            QuizEvent::QuizFinished { .. } => break,
            QuizEvent::QuizError { message } => eprintln!("Quiz error: {message}"),
        }
    }

    let report = handle.report().await?;
    handle.shutdown().await?;
    task.await.context("quiz task failed")?;

    print_summary(&report);
    if let Some(path) = output {
        report.save_json(&path)?;
        eprintln!("Report saved to: {}", path.display());
    }

    Ok(())
}

/// Read one transcript and hand it to the quiz, keeping it in `last`.
/// Returns `false` once stdin is closed, after aborting the quiz.
async fn answer(
    handle: &QuizHandle,
    lines: &mut Lines<BufReader<Stdin>>,
    last: &mut String,
) -> Result<bool> {
    let Some(line) = lines.next_line().await.context("failed to read stdin")? else {
        handle.abort("input closed before the quiz finished").await?;
        println!("\nQuiz aborted.");
        return Ok(false);
    };

    if line.trim() == REPEAT {
        handle.retry_current_question().await?;
    } else {
        last.clone_from(&line);
        handle.submit_answer(line).await?;
    }
    Ok(true)
}
