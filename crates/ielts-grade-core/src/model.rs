//! Typed question model.
//!
//! Every invariant a question must satisfy is checked when it is built, so
//! the grader never sees a half-configured question.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::alternatives::AcceptedAnswerSet;
use crate::error::ConfigurationError;

/// The question shapes the engine can grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    OpenText,
    SingleChoice,
    MultiSelect,
    MultiFieldSummary,
    DropdownParagraph,
    TableCompletion,
    TrueFalseNotGiven,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::OpenText => "open_text",
            QuestionType::SingleChoice => "single_choice",
            QuestionType::MultiSelect => "multi_select",
            QuestionType::MultiFieldSummary => "multi_field_summary",
            QuestionType::DropdownParagraph => "dropdown_paragraph",
            QuestionType::TableCompletion => "table_completion",
            QuestionType::TrueFalseNotGiven => "true_false_not_given",
        }
    }

    /// Composite types grade several sub-fields inside one prompt.
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            QuestionType::MultiFieldSummary
                | QuestionType::DropdownParagraph
                | QuestionType::TableCompletion
        )
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open_text" => Ok(QuestionType::OpenText),
            "single_choice" => Ok(QuestionType::SingleChoice),
            "multi_select" => Ok(QuestionType::MultiSelect),
            "multi_field_summary" => Ok(QuestionType::MultiFieldSummary),
            "dropdown_paragraph" => Ok(QuestionType::DropdownParagraph),
            "table_completion" => Ok(QuestionType::TableCompletion),
            "true_false_not_given" => Ok(QuestionType::TrueFalseNotGiven),
            other => Err(format!("unknown question type: {other}")),
        }
    }
}

/// Correct / incorrect / no-answer feedback for a question or a sub-field.
///
/// Blank strings are stored as `None`; the feedback resolver decides what a
/// missing entry renders as.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Feedback {
    correct: Option<String>,
    incorrect: Option<String>,
    no_answer: Option<String>,
}

impl Feedback {
    pub fn new(
        correct: Option<String>,
        incorrect: Option<String>,
        no_answer: Option<String>,
    ) -> Self {
        Self {
            correct: non_blank(correct),
            incorrect: non_blank(incorrect),
            no_answer: non_blank(no_answer),
        }
    }

    pub fn correct(&self) -> Option<&str> {
        self.correct.as_deref()
    }

    pub fn incorrect(&self) -> Option<&str> {
        self.incorrect.as_deref()
    }

    pub fn no_answer(&self) -> Option<&str> {
        self.no_answer.as_deref()
    }
}

pub(crate) fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}

/// One selectable option of a closed question or dropdown gap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceOption {
    pub text: String,
    pub is_correct: bool,
    pub feedback: Option<String>,
}

impl ChoiceOption {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
            feedback: None,
        }
    }

    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = non_blank(Some(feedback.into()));
        self
    }
}

/// Canonical answer of a true / false / not given statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrueFalseAnswer {
    True,
    False,
    NotGiven,
}

impl fmt::Display for TrueFalseAnswer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrueFalseAnswer::True => write!(f, "true"),
            TrueFalseAnswer::False => write!(f, "false"),
            TrueFalseAnswer::NotGiven => write!(f, "not_given"),
        }
    }
}

impl FromStr for TrueFalseAnswer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match key.as_str() {
            "true" => Ok(TrueFalseAnswer::True),
            "false" => Ok(TrueFalseAnswer::False),
            "not_given" => Ok(TrueFalseAnswer::NotGiven),
            _ => Err(s.to_string()),
        }
    }
}

/// Closed question with exactly one correct option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SingleChoice {
    options: Vec<ChoiceOption>,
    correct: usize,
}

impl SingleChoice {
    pub fn new(options: Vec<ChoiceOption>) -> Result<Self, ConfigurationError> {
        if options.is_empty() {
            return Err(ConfigurationError::NoOptions);
        }
        let correct: Vec<usize> = correct_positions(&options);
        match correct.as_slice() {
            [] => Err(ConfigurationError::NoCorrectOption),
            [index] => Ok(Self {
                correct: *index,
                options,
            }),
            many => Err(ConfigurationError::MultipleCorrectOptions(many.len())),
        }
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    /// Index of the one correct option.
    pub fn correct_index(&self) -> usize {
        self.correct
    }
}

/// Closed question where the exact set of correct options must be chosen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiSelect {
    options: Vec<ChoiceOption>,
    max_selections: usize,
}

impl MultiSelect {
    /// `max_selections` defaults to the number of correct options and must
    /// equal it when given.
    pub fn new(
        options: Vec<ChoiceOption>,
        max_selections: Option<usize>,
    ) -> Result<Self, ConfigurationError> {
        if options.is_empty() {
            return Err(ConfigurationError::NoOptions);
        }
        let correct = options.iter().filter(|o| o.is_correct).count();
        if correct == 0 {
            return Err(ConfigurationError::NoCorrectOption);
        }
        let max_selections = max_selections.unwrap_or(correct);
        if max_selections != correct {
            return Err(ConfigurationError::MaxSelectionsMismatch {
                max_selections,
                correct,
            });
        }
        Ok(Self {
            options,
            max_selections,
        })
    }

    pub fn options(&self) -> &[ChoiceOption] {
        &self.options
    }

    pub fn max_selections(&self) -> usize {
        self.max_selections
    }

    pub fn correct_indices(&self) -> BTreeSet<usize> {
        correct_positions(&self.options).into_iter().collect()
    }
}

fn correct_positions(options: &[ChoiceOption]) -> Vec<usize> {
    options
        .iter()
        .enumerate()
        .filter(|(_, o)| o.is_correct)
        .map(|(i, _)| i)
        .collect()
}

/// One open blank of a summary or table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub position: usize,
    pub accepted: AcceptedAnswerSet,
    pub feedback: Feedback,
}

impl TextField {
    pub fn new(position: usize, accepted: AcceptedAnswerSet) -> Self {
        Self {
            position,
            accepted,
            feedback: Feedback::default(),
        }
    }

    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// One dropdown gap in a paragraph, graded as its own single choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropdownGap {
    pub position: usize,
    pub choice: SingleChoice,
    pub feedback: Feedback,
}

impl DropdownGap {
    pub fn new(position: usize, choice: SingleChoice) -> Self {
        Self {
            position,
            choice,
            feedback: Feedback::default(),
        }
    }

    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }
}

/// Sub-fields keyed 1..=N, sorted by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubFields<T> {
    items: Vec<T>,
}

impl<T: Positioned> SubFields<T> {
    pub fn new(mut items: Vec<T>) -> Result<Self, ConfigurationError> {
        if items.is_empty() {
            return Err(ConfigurationError::NoSubFields);
        }
        items.sort_by_key(|f| f.position());
        let contiguous = items
            .iter()
            .enumerate()
            .all(|(i, f)| f.position() == i + 1);
        if !contiguous {
            return Err(ConfigurationError::NonContiguousFields {
                found: items.iter().map(|f| f.position()).collect(),
            });
        }
        Ok(Self { items })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always `false`; construction rejects empty lists.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Field at a 1-based position.
    pub fn get(&self, position: usize) -> Option<&T> {
        position.checked_sub(1).and_then(|i| self.items.get(i))
    }

    pub fn positions(&self) -> Vec<usize> {
        self.items.iter().map(|f| f.position()).collect()
    }
}

/// Anything addressed by a 1-based position in the question text.
pub trait Positioned {
    fn position(&self) -> usize;
}

impl Positioned for TextField {
    fn position(&self) -> usize {
        self.position
    }
}

impl Positioned for DropdownGap {
    fn position(&self) -> usize {
        self.position
    }
}

/// The gradable part of a question, one variant per question type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestionKind {
    OpenText(AcceptedAnswerSet),
    SingleChoice(SingleChoice),
    MultiSelect(MultiSelect),
    TrueFalseNotGiven(TrueFalseAnswer),
    MultiFieldSummary(SubFields<TextField>),
    TableCompletion(SubFields<TextField>),
    DropdownParagraph(SubFields<DropdownGap>),
}

impl QuestionKind {
    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionKind::OpenText(_) => QuestionType::OpenText,
            QuestionKind::SingleChoice(_) => QuestionType::SingleChoice,
            QuestionKind::MultiSelect(_) => QuestionType::MultiSelect,
            QuestionKind::TrueFalseNotGiven(_) => QuestionType::TrueFalseNotGiven,
            QuestionKind::MultiFieldSummary(_) => QuestionType::MultiFieldSummary,
            QuestionKind::TableCompletion(_) => QuestionType::TableCompletion,
            QuestionKind::DropdownParagraph(_) => QuestionType::DropdownParagraph,
        }
    }

    fn field_positions(&self) -> Option<(Vec<usize>, PlaceholderStyle)> {
        match self {
            QuestionKind::MultiFieldSummary(fields) | QuestionKind::TableCompletion(fields) => {
                Some((fields.positions(), PlaceholderStyle::Field))
            }
            QuestionKind::DropdownParagraph(gaps) => {
                Some((gaps.positions(), PlaceholderStyle::Gap))
            }
            _ => None,
        }
    }
}

/// One gradable unit. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    kind: QuestionKind,
    points: u32,
    instructions: String,
    prompt: String,
    feedback: Feedback,
}

impl Question {
    /// A one-point question with no text or feedback.
    pub fn new(kind: QuestionKind) -> Self {
        Self {
            kind,
            points: 1,
            instructions: String::new(),
            prompt: String::new(),
            feedback: Feedback::default(),
        }
    }

    pub fn with_points(mut self, points: u32) -> Result<Self, ConfigurationError> {
        if points == 0 {
            return Err(ConfigurationError::ZeroPoints);
        }
        self.points = points;
        Ok(self)
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = instructions.into();
        self
    }

    pub fn with_feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = feedback;
        self
    }

    pub fn kind(&self) -> &QuestionKind {
        &self.kind
    }

    pub fn question_type(&self) -> QuestionType {
        self.kind.question_type()
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn feedback(&self) -> &Feedback {
        &self.feedback
    }

    /// Placeholder positions written into the prompt and instructions.
    ///
    /// Empty for non-composite questions.
    pub fn placeholder_positions(&self) -> BTreeSet<usize> {
        match self.kind.field_positions() {
            Some((_, style)) => {
                let mut found = placeholder_positions(&self.prompt, style);
                found.extend(placeholder_positions(&self.instructions, style));
                found
            }
            None => BTreeSet::new(),
        }
    }

    /// Check that placeholder markers, when present, name exactly the
    /// configured sub-field positions.
    pub fn check_placeholders(&self) -> Result<(), ConfigurationError> {
        let Some((fields, _)) = self.kind.field_positions() else {
            return Ok(());
        };
        let markers = self.placeholder_positions();
        if markers.is_empty() {
            return Ok(());
        }
        let markers: Vec<usize> = markers.into_iter().collect();
        if markers != fields {
            return Err(ConfigurationError::PlaceholderMismatch { markers, fields });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PlaceholderStyle {
    /// `[field 3]`
    Field,
    /// `___3___`
    Gap,
}

fn placeholder_positions(text: &str, style: PlaceholderStyle) -> BTreeSet<usize> {
    match style {
        PlaceholderStyle::Field => field_markers(text),
        PlaceholderStyle::Gap => gap_markers(text),
    }
}

fn field_markers(text: &str) -> BTreeSet<usize> {
    let lowered = text.to_lowercase();
    let mut found = BTreeSet::new();
    let mut rest = lowered.as_str();
    while let Some(start) = rest.find("[field") {
        rest = &rest[start + "[field".len()..];
        let inner = rest.trim_start();
        let digits: String = inner.chars().take_while(|c| c.is_ascii_digit()).collect();
        if digits.is_empty() {
            continue;
        }
        if inner[digits.len()..].trim_start().starts_with(']') {
            if let Ok(position) = digits.parse::<usize>() {
                found.insert(position);
            }
        }
    }
    found
}

fn gap_markers(text: &str) -> BTreeSet<usize> {
    let chars: Vec<char> = text.chars().collect();
    let mut found = BTreeSet::new();
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let underscored_before = start > 0 && chars[start - 1] == '_';
        let underscored_after = chars.get(i) == Some(&'_');
        if underscored_before && underscored_after {
            let digits: String = chars[start..i].iter().collect();
            if let Ok(position) = digits.parse::<usize>() {
                found.insert(position);
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alternatives::parse_alternatives;

    fn field(position: usize, answer: &str) -> TextField {
        TextField::new(position, parse_alternatives(answer).unwrap())
    }

    #[test]
    fn question_type_display_and_parse() {
        assert_eq!(QuestionType::MultiFieldSummary.to_string(), "multi_field_summary");
        assert_eq!(
            "TABLE_COMPLETION".parse::<QuestionType>().unwrap(),
            QuestionType::TableCompletion
        );
        assert!("essay".parse::<QuestionType>().is_err());
        assert!(QuestionType::DropdownParagraph.is_composite());
        assert!(!QuestionType::MultiSelect.is_composite());
    }

    #[test]
    fn true_false_answer_parse() {
        assert_eq!("TRUE".parse::<TrueFalseAnswer>().unwrap(), TrueFalseAnswer::True);
        assert_eq!(
            "Not Given".parse::<TrueFalseAnswer>().unwrap(),
            TrueFalseAnswer::NotGiven
        );
        assert_eq!(
            "not-given".parse::<TrueFalseAnswer>().unwrap(),
            TrueFalseAnswer::NotGiven
        );
        assert!("maybe".parse::<TrueFalseAnswer>().is_err());
        assert_eq!(TrueFalseAnswer::NotGiven.to_string(), "not_given");
    }

    #[test]
    fn feedback_blank_is_none() {
        let fb = Feedback::new(Some("  ".into()), Some("Wrong.".into()), None);
        assert_eq!(fb.correct(), None);
        assert_eq!(fb.incorrect(), Some("Wrong."));
        assert_eq!(fb.no_answer(), None);
    }

    #[test]
    fn single_choice_needs_exactly_one_correct() {
        let options = vec![ChoiceOption::new("London", false), ChoiceOption::new("Paris", true)];
        assert_eq!(SingleChoice::new(options).unwrap().correct_index(), 1);

        assert_eq!(
            SingleChoice::new(vec![ChoiceOption::new("A", false)]),
            Err(ConfigurationError::NoCorrectOption)
        );
        assert_eq!(
            SingleChoice::new(vec![ChoiceOption::new("A", true), ChoiceOption::new("B", true)]),
            Err(ConfigurationError::MultipleCorrectOptions(2))
        );
        assert_eq!(SingleChoice::new(vec![]), Err(ConfigurationError::NoOptions));
    }

    #[test]
    fn multi_select_max_must_match_correct_count() {
        let options = || {
            vec![
                ChoiceOption::new("A", false),
                ChoiceOption::new("B", true),
                ChoiceOption::new("C", false),
                ChoiceOption::new("D", true),
            ]
        };
        let ms = MultiSelect::new(options(), None).unwrap();
        assert_eq!(ms.max_selections(), 2);
        assert_eq!(ms.correct_indices(), BTreeSet::from([1, 3]));
        assert!(MultiSelect::new(options(), Some(2)).is_ok());
        assert_eq!(
            MultiSelect::new(options(), Some(3)),
            Err(ConfigurationError::MaxSelectionsMismatch {
                max_selections: 3,
                correct: 2
            })
        );
    }

    #[test]
    fn sub_fields_must_be_contiguous() {
        let fields = SubFields::new(vec![field(2, "b"), field(1, "a")]).unwrap();
        assert_eq!(fields.positions(), vec![1, 2]);
        assert_eq!(fields.get(2).unwrap().position, 2);
        assert!(fields.get(0).is_none());

        assert_eq!(
            SubFields::<TextField>::new(vec![]),
            Err(ConfigurationError::NoSubFields)
        );
        assert_eq!(
            SubFields::new(vec![field(1, "a"), field(3, "c")]),
            Err(ConfigurationError::NonContiguousFields { found: vec![1, 3] })
        );
    }

    #[test]
    fn zero_points_rejected() {
        let q = Question::new(QuestionKind::TrueFalseNotGiven(TrueFalseAnswer::True));
        assert_eq!(q.points(), 1);
        assert_eq!(q.clone().with_points(0), Err(ConfigurationError::ZeroPoints));
        assert_eq!(q.with_points(3).unwrap().points(), 3);
    }

    #[test]
    fn field_placeholders_match() {
        let fields = SubFields::new(vec![field(1, "a"), field(2, "b")]).unwrap();
        let q = Question::new(QuestionKind::TableCompletion(fields.clone()))
            .with_prompt("World population in 1950: [field 1] Africa: [Field 2]");
        assert_eq!(q.placeholder_positions(), BTreeSet::from([1, 2]));
        assert!(q.check_placeholders().is_ok());

        let q = Question::new(QuestionKind::TableCompletion(fields))
            .with_prompt("Only one blank: [field 1] and [field 3]");
        assert_eq!(
            q.check_placeholders(),
            Err(ConfigurationError::PlaceholderMismatch {
                markers: vec![1, 3],
                fields: vec![1, 2]
            })
        );
    }

    #[test]
    fn gap_placeholders_match() {
        let gap = |p| {
            DropdownGap::new(
                p,
                SingleChoice::new(vec![ChoiceOption::new("x", true), ChoiceOption::new("y", false)])
                    .unwrap(),
            )
        };
        let q = Question::new(QuestionKind::DropdownParagraph(
            SubFields::new(vec![gap(1), gap(2)]).unwrap(),
        ))
        .with_prompt("Water ___1___ from oceans and ___2___ into clouds. In 2010 it rained.");
        assert_eq!(q.placeholder_positions(), BTreeSet::from([1, 2]));
        assert!(q.check_placeholders().is_ok());
    }

    #[test]
    fn no_markers_is_not_checked() {
        let fields = SubFields::new(vec![field(1, "a")]).unwrap();
        let q = Question::new(QuestionKind::MultiFieldSummary(fields)).with_prompt("No markers.");
        assert!(q.check_placeholders().is_ok());
    }
}
