//! Quizzes, learner attempts, and attempt-level scoring.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::band::{DisplayScore, ScoringType};
use crate::error::GradeError;
use crate::grader::grade;
use crate::model::Question;
use crate::results::{GradeResult, Outcome};
use crate::submission::Submission;

pub const DEFAULT_PASS_PERCENTAGE: f64 = 60.0;

/// A question with its stable id inside a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizItem {
    pub id: String,
    pub question: Question,
}

/// An ordered list of questions graded together.
#[derive(Debug, Clone, PartialEq)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: String,
    pub scoring_type: ScoringType,
    pub pass_percentage: f64,
    pub items: Vec<QuizItem>,
}

impl Quiz {
    pub fn new(id: impl Into<String>, title: impl Into<String>, items: Vec<QuizItem>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            scoring_type: ScoringType::default(),
            pass_percentage: DEFAULT_PASS_PERCENTAGE,
            items,
        }
    }

    pub fn item(&self, id: &str) -> Option<&QuizItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Sum of every question's points.
    pub fn max_score(&self) -> u32 {
        self.items.iter().map(|item| item.question.points()).sum()
    }
}

/// One learner's answers to a quiz, keyed by question id.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attempt {
    pub id: String,
    pub learner: Option<String>,
    pub answers: BTreeMap<String, Submission>,
}

/// The graded result of one question inside an attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    #[serde(flatten)]
    pub result: GradeResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub attempt_id: String,
    #[serde(default)]
    pub learner: Option<String>,
    pub questions: Vec<QuestionOutcome>,
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub display: DisplayScore,
    pub passed: bool,
}

impl AttemptResult {
    pub fn count(&self, outcome: Outcome) -> usize {
        self.questions
            .iter()
            .filter(|q| q.result.outcome == outcome)
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("invalid submission: answer given for unknown question `{0}`")]
    UnknownQuestion(String),

    #[error("question `{question_id}`: {error}")]
    Question {
        question_id: String,
        error: GradeError,
    },
}

impl AttemptError {
    pub fn is_configuration(&self) -> bool {
        match self {
            AttemptError::UnknownQuestion(_) => false,
            AttemptError::Question { error, .. } => error.is_configuration(),
        }
    }
}

/// Grade every question of `quiz` against `attempt`.
///
/// A question without an answer is graded as blank. Any configuration or
/// submission error fails the whole attempt.
pub fn grade_attempt(quiz: &Quiz, attempt: &Attempt) -> Result<AttemptResult, AttemptError> {
    if let Some(unknown) = attempt.answers.keys().find(|id| quiz.item(id).is_none()) {
        return Err(AttemptError::UnknownQuestion(unknown.clone()));
    }

    let blank = Submission::Blank;
    let mut questions = Vec::with_capacity(quiz.items.len());
    let mut score = 0;
    let mut max_score = 0;

    for item in &quiz.items {
        let submission = attempt.answers.get(&item.id).unwrap_or(&blank);
        let result = grade(&item.question, submission).map_err(|error| AttemptError::Question {
            question_id: item.id.clone(),
            error,
        })?;
        score += result.points_awarded;
        max_score += result.max_points;
        questions.push(QuestionOutcome {
            question_id: item.id.clone(),
            result,
        });
    }

    let percentage = if max_score == 0 {
        0.0
    } else {
        score as f64 / max_score as f64 * 100.0
    };

    tracing::debug!(attempt = %attempt.id, score, max_score, "graded attempt");

    Ok(AttemptResult {
        attempt_id: attempt.id.clone(),
        learner: attempt.learner.clone(),
        questions,
        score,
        max_score,
        percentage,
        display: DisplayScore::new(quiz.scoring_type, score, percentage),
        passed: percentage >= quiz.pass_percentage,
    })
}
