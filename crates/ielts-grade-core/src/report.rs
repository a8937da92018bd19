//! Batch report types with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::band::ScoringType;
use crate::quiz::{AttemptResult, Quiz};
use crate::statistics::BatchSummary;

/// A complete grading run over one quiz.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the report was created.
    pub created_at: DateTime<Utc>,
    pub quiz: QuizSummary,
    /// Graded attempts, ordered by attempt id.
    pub attempts: Vec<AttemptResult>,
    /// Attempts that could not be graded, ordered by attempt id.
    #[serde(default)]
    pub failures: Vec<AttemptFailure>,
    pub summary: BatchSummary,
    /// Total wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// Summary of a quiz (without the question definitions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub scoring_type: ScoringType,
    pub question_count: usize,
    pub max_score: u32,
    pub pass_percentage: f64,
}

impl QuizSummary {
    pub fn of(quiz: &Quiz) -> Self {
        Self {
            id: quiz.id.clone(),
            title: quiz.title.clone(),
            scoring_type: quiz.scoring_type,
            question_count: quiz.items.len(),
            max_score: quiz.max_score(),
            pass_percentage: quiz.pass_percentage,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttemptFailure {
    pub attempt_id: String,
    pub error: String,
    /// The quiz itself is at fault, not the learner's submission.
    #[serde(default)]
    pub configuration: bool,
}

impl BatchReport {
    /// Default file name inside an output directory.
    pub fn file_name(&self) -> String {
        format!(
            "{}-{}.json",
            self.quiz.id,
            self.created_at.format("%Y%m%d-%H%M%S")
        )
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: BatchReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        let summary = &self.summary;

        md.push_str(&format!("# {}\n\n", self.quiz.title));
        md.push_str(&format!(
            "**Attempts:** {} graded, {} failed\n",
            summary.attempts, summary.failures
        ));
        md.push_str(&format!(
            "**Mean score:** {:.1}% | **Pass rate:** {:.1}%",
            summary.mean_percentage,
            summary.pass_rate * 100.0
        ));
        if let Some(band) = summary.mean_band {
            md.push_str(&format!(" | **Mean band:** {band:.1}"));
        }
        md.push_str("\n\n");

        if !self.attempts.is_empty() {
            md.push_str("## Attempts\n\n");
            md.push_str("| Attempt | Learner | Score | Result | Passed |\n");
            md.push_str("|---------|---------|-------|--------|--------|\n");
            for a in &self.attempts {
                md.push_str(&format!(
                    "| {} | {} | {}/{} | {} | {} |\n",
                    cell(&a.attempt_id),
                    cell(a.learner.as_deref().unwrap_or("-")),
                    a.score,
                    a.max_score,
                    a.display,
                    if a.passed { "yes" } else { "no" }
                ));
            }
            md.push('\n');
        }

        if !summary.questions.is_empty() {
            md.push_str("## Questions\n\n");
            md.push_str("| Question | Type | Correct | Incorrect | Unanswered |\n");
            md.push_str("|----------|------|---------|-----------|------------|\n");
            for q in &summary.questions {
                md.push_str(&format!(
                    "| {} | {} | {} | {} | {} |\n",
                    cell(&q.question_id),
                    q.question_type,
                    q.correct,
                    q.incorrect,
                    q.unanswered
                ));
            }
            md.push('\n');
        }

        if !self.failures.is_empty() {
            md.push_str("## Failures\n\n");
            md.push_str("| Attempt | Error |\n");
            md.push_str("|---------|-------|\n");
            for f in &self.failures {
                md.push_str(&format!(
                    "| {} | {} |\n",
                    cell(&f.attempt_id),
                    cell(&f.error)
                ));
            }
        }

        md
    }
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::band::DisplayScore;
    use crate::model::QuestionType;
    use crate::statistics::QuestionStats;

    fn make_report() -> BatchReport {
        BatchReport {
            id: Uuid::nil(),
            created_at: Utc::now(),
            quiz: QuizSummary {
                id: "reading-1".into(),
                title: "Academic Reading 1".into(),
                scoring_type: ScoringType::IeltsAcademicReading,
                question_count: 1,
                max_score: 1,
                pass_percentage: 60.0,
            },
            attempts: vec![AttemptResult {
                attempt_id: "a1".into(),
                learner: Some("sam".into()),
                questions: vec![],
                score: 1,
                max_score: 1,
                percentage: 100.0,
                display: DisplayScore::Band(1.5),
                passed: true,
            }],
            failures: vec![AttemptFailure {
                attempt_id: "a2".into(),
                error: "question `q1`: invalid submission: unknown field 3 (a|b)".into(),
                configuration: false,
            }],
            summary: BatchSummary {
                attempts: 1,
                failures: 1,
                mean_percentage: 100.0,
                pass_rate: 1.0,
                mean_band: Some(1.5),
                questions: vec![QuestionStats {
                    question_id: "q1".into(),
                    question_type: QuestionType::OpenText,
                    correct: 1,
                    incorrect: 0,
                    unanswered: 0,
                }],
            },
            duration_ms: 3,
        }
    }

    #[test]
    fn json_roundtrip() {
        let report = make_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(report.file_name());

        report.save_json(&path).unwrap();
        let loaded = BatchReport::load_json(&path).unwrap();

        assert_eq!(loaded.quiz, report.quiz);
        assert_eq!(loaded.attempts, report.attempts);
        assert_eq!(loaded.failures, report.failures);
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = BatchReport::load_json(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read report"));
    }

    #[test]
    fn markdown_output() {
        let md = make_report().to_markdown();
        assert!(md.starts_with("# Academic Reading 1"));
        assert!(md.contains("**Mean band:** 1.5"));
        assert!(md.contains("| a1 | sam | 1/1 | Band 1.5 | yes |"));
        assert!(md.contains("| q1 | open_text | 1 | 0 | 0 |"));
        assert!(md.contains("(a\\|b)"));
    }

    #[test]
    fn file_name_uses_quiz_id() {
        let name = make_report().file_name();
        assert!(name.starts_with("reading-1-"));
        assert!(name.ends_with(".json"));
    }
}
