//! Aggregate statistics over a batch of graded attempts.

use serde::{Deserialize, Serialize};

use crate::model::QuestionType;
use crate::quiz::{AttemptResult, Quiz};
use crate::results::Outcome;

/// Outcome counts for one question across every attempt in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: String,
    pub question_type: QuestionType,
    pub correct: u32,
    pub incorrect: u32,
    pub unanswered: u32,
}

impl QuestionStats {
    fn new(question_id: &str, question_type: QuestionType) -> Self {
        Self {
            question_id: question_id.to_string(),
            question_type,
            correct: 0,
            incorrect: 0,
            unanswered: 0,
        }
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::Incorrect => self.incorrect += 1,
            Outcome::Unanswered => self.unanswered += 1,
        }
    }

    pub fn total(&self) -> u32 {
        self.correct + self.incorrect + self.unanswered
    }

    /// Share of attempts that got this question right, in `[0, 1]`.
    pub fn correct_rate(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.correct as f64 / total as f64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub attempts: usize,
    pub failures: usize,
    pub mean_percentage: f64,
    /// Share of graded attempts that passed, in `[0, 1]`.
    pub pass_rate: f64,
    /// Only present when the quiz reports bands.
    #[serde(default)]
    pub mean_band: Option<f64>,
    pub questions: Vec<QuestionStats>,
}

/// Summarize graded attempts. Questions keep quiz order.
///
/// Outcomes are matched to quiz items by position, so items sharing an id
/// are counted separately.
pub fn summarize(quiz: &Quiz, results: &[AttemptResult], failures: usize) -> BatchSummary {
    let mut questions: Vec<QuestionStats> = quiz
        .items
        .iter()
        .map(|item| QuestionStats::new(&item.id, item.question.question_type()))
        .collect();

    for result in results {
        for (stats, question) in questions.iter_mut().zip(&result.questions) {
            if stats.question_id == question.question_id {
                stats.record(question.result.outcome);
            }
        }
    }

    let graded = results.len();
    let mean_percentage = mean(results.iter().map(|r| r.percentage), graded);
    let pass_rate = mean(
        results.iter().map(|r| if r.passed { 1.0 } else { 0.0 }),
        graded,
    );
    let mean_band = (quiz.scoring_type.is_band() && graded > 0)
        .then(|| mean(results.iter().map(|r| r.display.value()), graded));

    BatchSummary {
        attempts: graded,
        failures,
        mean_percentage,
        pass_rate,
        mean_band,
        questions,
    }
}

fn mean(values: impl Iterator<Item = f64>, count: usize) -> f64 {
    if count == 0 {
        return 0.0;
    }
    values.sum::<f64>() / count as f64
}
