//! Feedback selection.

use crate::model::Feedback;
use crate::results::Outcome;

/// Shown when a learner leaves something blank and the author wrote nothing.
pub const DEFAULT_NO_ANSWER_FEEDBACK: &str =
    "In the IELTS test, you should always take a guess. You don't lose points for a wrong answer.";

/// Pick the feedback text for an outcome.
///
/// Missing correct or incorrect feedback renders empty. Missing no-answer
/// feedback renders [`DEFAULT_NO_ANSWER_FEEDBACK`], never empty.
pub fn resolve_feedback(outcome: Outcome, feedback: &Feedback) -> String {
    match outcome {
        Outcome::Correct => feedback.correct().unwrap_or_default().to_string(),
        Outcome::Incorrect => feedback.incorrect().unwrap_or_default().to_string(),
        Outcome::Unanswered => feedback
            .no_answer()
            .unwrap_or(DEFAULT_NO_ANSWER_FEEDBACK)
            .to_string(),
    }
}
