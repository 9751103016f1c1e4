//! The `numquiz report` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use numquiz_core::report::QuizReport;

pub fn execute(input: PathBuf) -> Result<()> {
    let report = QuizReport::load_json(&input)?;
    print_report(&report);
    Ok(())
}

/// Print the attempts table followed by the score table.
pub fn print_report(report: &QuizReport) {
    println!("Session {} ({})", report.id, report.phase);

    let mut answers = Table::new();
    answers.set_header(vec!["#", "Question", "Heard", "Outcome"]);
    for answer in &report.answers {
        let prompt = report
            .questions
            .get(answer.question_number.saturating_sub(1))
            .map(|q| q.prompt())
            .unwrap_or("?");
        answers.add_row(vec![
            Cell::new(answer.question_number),
            Cell::new(prompt),
            Cell::new(&answer.transcript),
            Cell::new(answer.outcome),
        ]);
    }
    println!("\n{answers}");
    print_summary(report);
}

/// Print the score table.
pub fn print_summary(report: &QuizReport) {
    let summary = &report.summary;
    let mut table = Table::new();
    table.set_header(vec!["Correct", "Answered", "Total", "Score", "Retries", "Result"]);
    table.add_row(vec![
        Cell::new(summary.state.correct_count),
        Cell::new(summary.state.questions_answered),
        Cell::new(summary.state.total_questions),
        Cell::new(format!("{:.0}%", summary.percentage)),
        Cell::new(report.retries()),
        Cell::new(if summary.passing { "PASS" } else { "FAIL" }),
    ]);
    println!("\n{table}");
    println!("{}", summary.message);
}
