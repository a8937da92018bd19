//! Open-text field evaluation.

use crate::alternatives::{parse_alternatives, AcceptedAnswerSet};
use crate::error::ConfigurationError;
use crate::normalize::normalize;
use crate::results::Outcome;

/// Grade one open-text response against its accepted set.
///
/// A response that is empty after trimming is `Unanswered`, not `Incorrect`.
pub fn evaluate_open(raw_submission: &str, accepted: &AcceptedAnswerSet) -> Outcome {
    if raw_submission.trim().is_empty() {
        return Outcome::Unanswered;
    }
    if accepted.contains_normalized(&normalize(raw_submission)) {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    }
}

/// Like [`evaluate_open`], parsing the raw pipe-delimited accepted string first.
pub fn evaluate_open_str(
    raw_submission: &str,
    accepted_raw: &str,
) -> Result<Outcome, ConfigurationError> {
    let accepted = parse_alternatives(accepted_raw)?;
    Ok(evaluate_open(raw_submission, &accepted))
}
