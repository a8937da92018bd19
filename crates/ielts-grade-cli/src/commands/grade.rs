//! The `ielts-grade grade` command.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;

use ielts_grade_core::engine::{BatchGrader, BatchGraderConfig, ProgressReporter};
use ielts_grade_core::parser;
use ielts_grade_core::quiz::AttemptResult;

use crate::config::load_config_from;

/// Console progress reporter.
struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn on_attempt_start(&self, attempt_id: &str) {
        eprintln!("  Grading: {attempt_id}");
    }

    fn on_attempt_complete(&self, result: &AttemptResult) {
        eprintln!(
            "  Done: {} {}/{} ({})",
            result.attempt_id, result.score, result.max_score, result.display
        );
    }

    fn on_attempt_error(&self, attempt_id: &str, error: &str) {
        eprintln!("  ERROR: {attempt_id}: {error}");
    }

    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration) {
        eprintln!(
            "\nComplete: {completed}/{total} graded, {failed} failed ({:.1}s)",
            elapsed.as_secs_f64()
        );
    }
}

pub async fn execute(
    quiz_path: PathBuf,
    attempts_path: PathBuf,
    parallelism: Option<usize>,
    format: Option<String>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;

    let parallelism = parallelism.unwrap_or(config.parallelism);
    anyhow::ensure!(parallelism >= 1, "parallelism must be at least 1");
    let format = format.unwrap_or(config.default_format);
    anyhow::ensure!(
        super::report::FORMATS.contains(&format.as_str()),
        "unknown format: {format} (expected text, json or markdown)"
    );
    let output = output.unwrap_or(config.output_dir);
    tracing::debug!(parallelism, format = %format, output = %output.display(), "grade settings");

    let mut quiz = parser::parse_quiz(&quiz_path)?;
    if let Some(pass) = config.pass_percentage {
        quiz.pass_percentage = pass;
    }
    let attempts = parser::load_attempts(&attempts_path)?;

    eprintln!(
        "ielts-grade v{}: grading {} attempts against {} ({} questions)",
        env!("CARGO_PKG_VERSION"),
        attempts.len(),
        quiz.id,
        quiz.items.len()
    );
    eprintln!();

    let grader = BatchGrader::new(BatchGraderConfig { parallelism });
    let report = grader.run(&quiz, attempts, &ConsoleReporter).await?;

    super::report::render(&report, &format)?;

    let path = output.join(report.file_name());
    report.save_json(&path)?;
    eprintln!("Report saved to: {}", path.display());

    Ok(())
}
