//! The `ielts-grade report` command, plus rendering shared with `grade`.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use ielts_grade_core::report::BatchReport;

pub fn execute(input: PathBuf, format: String) -> Result<()> {
    let report = BatchReport::load_json(&input)?;
    render(&report, &format)
}

pub const FORMATS: &[&str] = &["text", "json", "markdown", "md"];

/// Print a report to stdout in the given format.
pub fn render(report: &BatchReport, format: &str) -> Result<()> {
    match format {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        "text" => print_text(report),
        other => anyhow::bail!("unknown format: {other} (expected text, json or markdown)"),
    }
    Ok(())
}

fn print_text(report: &BatchReport) {
    let summary = &report.summary;
    println!(
        "{}: {} graded, {} failed, mean {:.1}%, pass rate {:.1}%",
        report.quiz.title,
        summary.attempts,
        summary.failures,
        summary.mean_percentage,
        summary.pass_rate * 100.0
    );
    if let Some(band) = summary.mean_band {
        println!("Mean band: {band:.1}");
    }

    if !report.attempts.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Attempt", "Learner", "Score", "Result", "Passed"]);
        for a in &report.attempts {
            table.add_row(vec![
                Cell::new(&a.attempt_id),
                Cell::new(a.learner.as_deref().unwrap_or("-")),
                Cell::new(format!("{}/{}", a.score, a.max_score)),
                Cell::new(a.display),
                Cell::new(if a.passed { "yes" } else { "no" }),
            ]);
        }
        println!("\n{table}");
    }

    if !summary.questions.is_empty() {
        let mut table = Table::new();
        table.set_header(vec![
            "Question",
            "Type",
            "Correct",
            "Incorrect",
            "Unanswered",
            "Correct %",
        ]);
        for q in &summary.questions {
            table.add_row(vec![
                Cell::new(&q.question_id),
                Cell::new(q.question_type),
                Cell::new(q.correct),
                Cell::new(q.incorrect),
                Cell::new(q.unanswered),
                Cell::new(format!("{:.1}%", q.correct_rate() * 100.0)),
            ]);
        }
        println!("\n{table}");
    }

    if !report.failures.is_empty() {
        println!("\nFailures:");
        for f in &report.failures {
            let kind = if f.configuration { "quiz" } else { "attempt" };
            println!("  {} ({kind}): {}", f.attempt_id, f.error);
        }
    }
}
