//! Grading error types.
//!
//! Configuration errors belong to the content author: the question itself is
//! broken. Submission errors belong to the caller: the learner input does not
//! fit the question's shape. Neither is ever turned into a verdict.

use thiserror::Error;

/// The question definition is invalid and cannot be graded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// The accepted-answer string was empty or had only empty alternatives.
    #[error("no valid accepted answer configured")]
    EmptyAcceptedAnswers,

    /// A numbered answer string had an alternative before the first `N:` part.
    #[error("alternative '{0}' appears before any numbered field")]
    OrphanAlternative(String),

    /// A choice question has no options at all.
    #[error("question has no options")]
    NoOptions,

    /// A choice question has no option marked correct.
    #[error("no option is marked correct")]
    NoCorrectOption,

    /// A single-choice question has more than one correct option.
    #[error("single-choice question has {0} correct options, expected exactly 1")]
    MultipleCorrectOptions(usize),

    /// `max_selections` disagrees with the number of correct options.
    #[error("max_selections is {max_selections} but {correct} options are correct")]
    MaxSelectionsMismatch { max_selections: usize, correct: usize },

    /// A correct-option index or letter points past the option list.
    #[error("correct option {index} is out of range for {len} options")]
    CorrectOptionOutOfRange { index: usize, len: usize },

    /// A composite question was configured with zero sub-fields.
    #[error("composite question has no sub-fields")]
    NoSubFields,

    /// Sub-field positions are not exactly 1..=N.
    #[error("sub-field positions must be contiguous from 1, found {found:?}")]
    NonContiguousFields { found: Vec<usize> },

    /// Placeholder markers in the question text name different positions.
    #[error("placeholders {markers:?} do not match configured fields {fields:?}")]
    PlaceholderMismatch {
        markers: Vec<usize>,
        fields: Vec<usize>,
    },

    /// A field key in the source record is not a positive integer.
    #[error("invalid field position '{0}'")]
    InvalidFieldPosition(String),

    /// A true/false/not-given question stores something else.
    #[error("invalid true/false/not given answer '{0}'")]
    InvalidTrueFalseAnswer(String),

    /// The question type string is not one the engine knows.
    #[error("unknown question type '{0}'")]
    UnknownQuestionType(String),

    /// A numeric attribute could not be read.
    #[error("invalid value for {field}: '{value}'")]
    InvalidValue { field: &'static str, value: String },

    /// Points must be a positive integer.
    #[error("points must be at least 1")]
    ZeroPoints,
}

/// The submission violates a structural constraint and was not graded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSubmission {
    /// More options selected than the question allows.
    #[error("{selected} options selected but at most {max_selections} allowed")]
    TooManySelections {
        selected: usize,
        max_selections: usize,
    },

    /// A selected index does not name an option.
    #[error("option {index} does not exist ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },

    /// A response targets a field position the question does not have.
    #[error("no field at position {0}")]
    UnknownField(usize),

    /// A field key in the submission is not a positive integer.
    #[error("invalid field position '{0}'")]
    InvalidFieldPosition(String),

    /// A textual choice did not match any letter, index or option text.
    #[error("'{0}' does not name an option")]
    UnrecognizedChoice(String),

    /// A true/false/not-given response had some other value.
    #[error("'{0}' is not true, false or not given")]
    UnrecognizedTrueFalse(String),

    /// The submission shape does not fit the question type.
    #[error("expected {expected} submission, got {found}")]
    WrongShape {
        expected: &'static str,
        found: &'static str,
    },
}

/// Any failure that stops a question from being graded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GradeError {
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("invalid submission: {0}")]
    InvalidSubmission(#[from] InvalidSubmission),
}

impl GradeError {
    /// Returns `true` if the content author, not the learner, must act.
    pub fn is_configuration(&self) -> bool {
        matches!(self, GradeError::Configuration(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let err = InvalidSubmission::TooManySelections {
            selected: 3,
            max_selections: 2,
        };
        assert_eq!(err.to_string(), "3 options selected but at most 2 allowed");

        let err: GradeError = ConfigurationError::NoSubFields.into();
        assert!(err.is_configuration());
        assert_eq!(
            err.to_string(),
            "configuration error: composite question has no sub-fields"
        );
    }
}
