//! Batch grading engine.
//!
//! Grades many attempts against one quiz with bounded parallelism. Each
//! attempt is one independent grading call on a blocking worker; nothing is
//! shared between calls except the read-only quiz.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::quiz::{grade_attempt, Attempt, AttemptError, AttemptResult, Quiz};
use crate::report::{AttemptFailure, BatchReport, QuizSummary};
use crate::statistics::summarize;

/// Configuration for the batch grader.
#[derive(Debug, Clone)]
pub struct BatchGraderConfig {
    /// Maximum attempts graded at once.
    pub parallelism: usize,
}

impl Default for BatchGraderConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Progress reporting trait.
pub trait ProgressReporter: Send + Sync {
    fn on_attempt_start(&self, attempt_id: &str);
    fn on_attempt_complete(&self, result: &AttemptResult);
    fn on_attempt_error(&self, attempt_id: &str, error: &str);
    fn on_batch_complete(&self, total: usize, completed: usize, failed: usize, elapsed: Duration);
}

/// No-op progress reporter.
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {
    fn on_attempt_start(&self, _: &str) {}
    fn on_attempt_complete(&self, _: &AttemptResult) {}
    fn on_attempt_error(&self, _: &str, _: &str) {}
    fn on_batch_complete(&self, _: usize, _: usize, _: usize, _: Duration) {}
}

pub struct BatchGrader {
    config: BatchGraderConfig,
}

impl BatchGrader {
    pub fn new(config: BatchGraderConfig) -> Self {
        Self { config }
    }

    /// Grade every attempt and build a report.
    ///
    /// A failing attempt is recorded in the report and never aborts the
    /// batch.
    pub async fn run(
        &self,
        quiz: &Quiz,
        attempts: Vec<Attempt>,
        progress: &dyn ProgressReporter,
    ) -> Result<BatchReport> {
        let start = Instant::now();
        let shared = Arc::new(quiz.clone());
        let semaphore = Arc::new(Semaphore::new(self.config.parallelism.max(1)));

        let mut futures = FuturesUnordered::new();

        for attempt in attempts {
            let quiz = Arc::clone(&shared);
            let semaphore = Arc::clone(&semaphore);

            futures.push(async move {
                let attempt_id = attempt.id.clone();
                let inner = async move {
                    let _permit = semaphore
                        .acquire_owned()
                        .await
                        .map_err(|_| anyhow::anyhow!("semaphore closed"))?;

                    progress.on_attempt_start(&attempt.id);
                    let result = tokio::task::spawn_blocking(move || grade_attempt(&quiz, &attempt))
                        .await
                        .context("grading task failed")??;
                    Ok::<_, anyhow::Error>(result)
                };
                (attempt_id, inner.await)
            });
        }

        let mut results = Vec::new();
        let mut failures = Vec::new();
        let total = futures.len();

        while let Some((attempt_id, result)) = futures.next().await {
            match result {
                Ok(attempt_result) => {
                    progress.on_attempt_complete(&attempt_result);
                    results.push(attempt_result);
                }
                Err(e) => {
                    tracing::warn!("attempt {attempt_id} failed: {e:#}");
                    progress.on_attempt_error(&attempt_id, &format!("{e:#}"));
                    let configuration = e
                        .downcast_ref::<AttemptError>()
                        .is_some_and(AttemptError::is_configuration);
                    failures.push(AttemptFailure {
                        attempt_id,
                        error: format!("{e:#}"),
                        configuration,
                    });
                }
            }
        }

        results.sort_by(|a, b| a.attempt_id.cmp(&b.attempt_id));
        failures.sort_by(|a, b| a.attempt_id.cmp(&b.attempt_id));

        let configuration_failures = failures.iter().filter(|f| f.configuration).count();
        if configuration_failures > 0 {
            tracing::error!(
                "{configuration_failures} attempt(s) hit a quiz configuration error in {}",
                quiz.id
            );
        }

        let elapsed = start.elapsed();
        progress.on_batch_complete(total, results.len(), failures.len(), elapsed);

        let summary = summarize(quiz, &results, failures.len());

        Ok(BatchReport {
            id: Uuid::new_v4(),
            created_at: chrono::Utc::now(),
            quiz: QuizSummary::of(quiz),
            attempts: results,
            failures,
            summary,
            duration_ms: elapsed.as_millis() as u64,
        })
    }
}
