//! Learner submissions.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

/// What a learner handed in for one question.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Submission {
    /// Nothing was submitted.
    #[default]
    Blank,
    /// Free text, or a textual choice label such as `"B"` or `"not given"`.
    Text(String),
    /// One selected option index.
    Choice(usize),
    /// A set of selected option indices.
    Choices(BTreeSet<usize>),
    /// Per-field responses keyed by 1-based position.
    Fields(BTreeMap<usize, FieldResponse>),
}

/// A response to one sub-field of a composite question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResponse {
    Text(String),
    Choice(usize),
}

impl Submission {
    pub fn text(text: impl Into<String>) -> Self {
        Submission::Text(text.into())
    }

    pub fn choices(indices: impl IntoIterator<Item = usize>) -> Self {
        Submission::Choices(indices.into_iter().collect())
    }

    /// Text responses keyed by position.
    pub fn fields<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = (usize, S)>,
        S: Into<String>,
    {
        Submission::Fields(
            responses
                .into_iter()
                .map(|(position, text)| (position, FieldResponse::Text(text.into())))
                .collect(),
        )
    }

    /// Short name of the shape, for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            Submission::Blank => "blank",
            Submission::Text(_) => "text",
            Submission::Choice(_) => "choice",
            Submission::Choices(_) => "choices",
            Submission::Fields(_) => "fields",
        }
    }
}

impl FieldResponse {
    /// The response as text; numeric responses such as `80` become `"80"`.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldResponse::Text(text) => Cow::Borrowed(text),
            FieldResponse::Choice(n) => Cow::Owned(n.to_string()),
        }
    }
}
