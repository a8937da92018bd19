//! Grading outcomes and results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::QuestionType;

/// Three-way verdict for a question or a sub-field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Correct,
    Incorrect,
    Unanswered,
}

impl Outcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, Outcome::Correct)
    }

    /// Roll sub-field outcomes into one: all unanswered stays unanswered,
    /// all correct is correct, anything else is incorrect.
    pub fn combine<I>(outcomes: I) -> Outcome
    where
        I: IntoIterator<Item = Outcome>,
    {
        let mut all_correct = true;
        let mut all_unanswered = true;
        let mut any = false;
        for outcome in outcomes {
            any = true;
            all_correct &= outcome == Outcome::Correct;
            all_unanswered &= outcome == Outcome::Unanswered;
        }
        if !any || all_unanswered {
            Outcome::Unanswered
        } else if all_correct {
            Outcome::Correct
        } else {
            Outcome::Incorrect
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Correct => write!(f, "correct"),
            Outcome::Incorrect => write!(f, "incorrect"),
            Outcome::Unanswered => write!(f, "unanswered"),
        }
    }
}

/// Verdict for one sub-field of a composite question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldResult {
    /// 1-based position in the question text.
    pub position: usize,
    pub outcome: Outcome,
    /// The learner's response as submitted, if any.
    #[serde(default)]
    pub response: Option<String>,
    /// Resolved feedback for this field.
    #[serde(default)]
    pub feedback: String,
}

/// Result of grading one question. Built fresh per call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeResult {
    pub question_type: QuestionType,
    pub outcome: Outcome,
    /// Per-field verdicts; empty for single-field questions.
    #[serde(default)]
    pub fields: Vec<FieldResult>,
    /// Resolved question-level feedback.
    #[serde(default)]
    pub feedback: String,
    /// Feedback attached to the selected (or, if unanswered, correct) options.
    #[serde(default)]
    pub option_feedback: Vec<String>,
    pub points_awarded: u32,
    pub max_points: u32,
}

impl GradeResult {
    pub fn correct(&self) -> bool {
        self.outcome.is_correct()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_outcomes() {
        use Outcome::*;
        assert_eq!(Outcome::combine([Correct, Correct]), Correct);
        assert_eq!(Outcome::combine([Correct, Incorrect, Correct, Correct]), Incorrect);
        assert_eq!(Outcome::combine([Correct, Unanswered]), Incorrect);
        assert_eq!(Outcome::combine([Unanswered, Unanswered]), Unanswered);
        assert_eq!(Outcome::combine([]), Unanswered);
    }

    #[test]
    fn outcome_serde() {
        assert_eq!(serde_json::to_string(&Outcome::Unanswered).unwrap(), "\"unanswered\"");
        assert_eq!(Outcome::Incorrect.to_string(), "incorrect");
    }
}
