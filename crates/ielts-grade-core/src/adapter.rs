//! Input adapter for externally authored question records.
//!
//! Records arrive as loosely typed maps that use the authoring tool's field
//! names (`correct_answer`, `mc_options`, `summary_fields`, ...). They are
//! converted here into the typed model, and no other module sees those names.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::alternatives::{parse_alternatives, parse_numbered_alternatives, AcceptedAnswerSet};
use crate::error::{ConfigurationError, GradeError, InvalidSubmission};
use crate::grader::grade;
use crate::model::{
    non_blank, ChoiceOption, DropdownGap, Feedback, MultiSelect, Question, QuestionKind,
    QuestionType, SingleChoice, SubFields, TextField, TrueFalseAnswer,
};
use crate::results::GradeResult;
use crate::submission::{FieldResponse, Submission};

/// A loosely typed scalar: authoring data mixes `"2"`, `2` and `true`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn to_text(&self) -> String {
        match self {
            Scalar::Bool(b) => b.to_string(),
            Scalar::Int(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s.clone(),
        }
    }

    /// Loose truthiness: `true`, non-zero numbers, and any text other than
    /// `""`, `"0"` and `"false"`.
    pub fn truthy(&self) -> bool {
        match self {
            Scalar::Bool(b) => *b,
            Scalar::Int(n) => *n != 0,
            Scalar::Float(f) => *f != 0.0,
            Scalar::Text(s) => {
                let s = s.trim();
                !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false"))
            }
        }
    }

    /// A non-negative whole number.
    fn as_count(&self, field: &'static str) -> Result<usize, ConfigurationError> {
        let invalid = || ConfigurationError::InvalidValue {
            field,
            value: self.to_text(),
        };
        match self {
            Scalar::Int(n) => usize::try_from(*n).map_err(|_| invalid()),
            Scalar::Float(f) if *f >= 0.0 && f.fract() == 0.0 => Ok(*f as usize),
            Scalar::Text(s) => s.trim().parse::<usize>().map_err(|_| invalid()),
            _ => Err(invalid()),
        }
    }

    fn as_position(&self) -> Result<usize, ConfigurationError> {
        parse_position(&self.to_text())
    }
}

fn parse_position(key: &str) -> Result<usize, ConfigurationError> {
    key.trim()
        .parse::<usize>()
        .ok()
        .filter(|p| *p > 0)
        .ok_or_else(|| ConfigurationError::InvalidFieldPosition(key.to_string()))
}

/// A per-field collection written either as a list (positions 1..N in
/// order) or as a map keyed by position.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Keyed<T> {
    List(Vec<T>),
    Map(BTreeMap<String, T>),
}

impl<T> Keyed<T> {
    pub fn len(&self) -> usize {
        match self {
            Keyed::List(items) => items.len(),
            Keyed::Map(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn values(&self) -> Vec<&T> {
        match self {
            Keyed::List(items) => items.iter().collect(),
            Keyed::Map(items) => items.values().collect(),
        }
    }

    fn into_positions(self) -> Result<Vec<(usize, T)>, ConfigurationError> {
        match self {
            Keyed::List(items) => Ok(items
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i + 1, item))
                .collect()),
            Keyed::Map(items) => items
                .into_iter()
                .map(|(key, item)| Ok((parse_position(&key)?, item)))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawOption {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: Option<Scalar>,
    #[serde(default)]
    pub feedback: Option<String>,
}

impl RawOption {
    fn into_option(self, fallback_feedback: Option<&String>) -> ChoiceOption {
        let correct = self.is_correct.as_ref().is_some_and(Scalar::truthy);
        let option = ChoiceOption::new(self.text, correct);
        match non_blank(self.feedback).or_else(|| fallback_feedback.cloned()) {
            Some(feedback) => option.with_feedback(feedback),
            None => option,
        }
    }
}

/// A dropdown option: bare text, or a full option record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawGapOption {
    Text(String),
    Option(RawOption),
}

impl RawGapOption {
    fn into_option(self) -> ChoiceOption {
        match self {
            RawGapOption::Text(text) => ChoiceOption::new(text, false),
            RawGapOption::Option(option) => option.into_option(None),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDropdownGap {
    #[serde(default)]
    pub position: Option<Scalar>,
    pub options: Vec<RawGapOption>,
    /// Index of the correct option, when options carry no `is_correct`.
    #[serde(default)]
    pub correct: Option<Scalar>,
    #[serde(default)]
    pub correct_feedback: Option<String>,
    #[serde(default)]
    pub incorrect_feedback: Option<String>,
    #[serde(default)]
    pub no_answer_feedback: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawDropdown {
    Gap(RawDropdownGap),
    Options(Vec<RawGapOption>),
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawSummaryField {
    pub answer: Scalar,
    #[serde(default)]
    pub correct_feedback: Option<String>,
    #[serde(default)]
    pub incorrect_feedback: Option<String>,
    #[serde(default)]
    pub no_answer_feedback: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawFieldFeedback {
    #[serde(default)]
    pub correct: Option<String>,
    #[serde(default)]
    pub incorrect: Option<String>,
    #[serde(default)]
    pub no_answer: Option<String>,
}

impl From<RawFieldFeedback> for Feedback {
    fn from(raw: RawFieldFeedback) -> Self {
        Feedback::new(raw.correct, raw.incorrect, raw.no_answer)
    }
}

/// One question record with the authoring tool's field names.
#[derive(Debug, Clone, Deserialize)]
pub struct RawQuestion {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub question_type: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub points: Option<Scalar>,
    #[serde(default)]
    pub correct_answer: Option<Scalar>,
    #[serde(default)]
    pub mc_options: Vec<RawOption>,
    /// Legacy newline-separated option list.
    #[serde(default)]
    pub options: Option<String>,
    #[serde(default)]
    pub option_feedback: Vec<String>,
    #[serde(default)]
    pub correct_answer_count: Option<Scalar>,
    #[serde(default)]
    pub max_selections: Option<Scalar>,
    #[serde(default)]
    pub summary_fields: Option<Keyed<RawSummaryField>>,
    #[serde(default)]
    pub dropdown_options: Option<Keyed<RawDropdown>>,
    #[serde(default)]
    pub field_count: Option<Scalar>,
    #[serde(default)]
    pub field_answers: Option<Keyed<Scalar>>,
    #[serde(default)]
    pub field_feedback: Option<Keyed<RawFieldFeedback>>,
    #[serde(default)]
    pub correct_feedback: Option<String>,
    #[serde(default)]
    pub incorrect_feedback: Option<String>,
    #[serde(default)]
    pub no_answer_feedback: Option<String>,
}

impl RawQuestion {
    /// Validate the record and build the typed question.
    pub fn into_question(self) -> Result<Question, ConfigurationError> {
        let question_type = self.resolve_type()?;
        let kind = match question_type {
            QuestionType::OpenText => QuestionKind::OpenText(self.open_accepted()?),
            QuestionType::SingleChoice => {
                QuestionKind::SingleChoice(SingleChoice::new(self.choice_options()?)?)
            }
            QuestionType::MultiSelect => QuestionKind::MultiSelect(MultiSelect::new(
                self.choice_options()?,
                self.declared_max_selections()?,
            )?),
            QuestionType::TrueFalseNotGiven => {
                QuestionKind::TrueFalseNotGiven(self.true_false_answer()?)
            }
            QuestionType::MultiFieldSummary => QuestionKind::MultiFieldSummary(self.text_fields()?),
            QuestionType::TableCompletion => QuestionKind::TableCompletion(self.text_fields()?),
            QuestionType::DropdownParagraph => {
                QuestionKind::DropdownParagraph(self.dropdown_gaps()?)
            }
        };

        let mut feedback = Feedback::new(
            self.correct_feedback.clone(),
            self.incorrect_feedback.clone(),
            self.no_answer_feedback.clone(),
        );
        // A one-field open question keeps its feedback on field 1.
        if question_type == QuestionType::OpenText && feedback == Feedback::default() {
            if let Some(field) = self.field_feedback()?.remove(&1) {
                feedback = field;
            }
        }

        let points = match &self.points {
            Some(points) => {
                let n = points.as_count("points")?;
                u32::try_from(n).map_err(|_| ConfigurationError::InvalidValue {
                    field: "points",
                    value: n.to_string(),
                })?
            }
            None => self.default_points()?,
        };

        let question = Question::new(kind)
            .with_points(points)?
            .with_prompt(self.question)
            .with_instructions(self.instructions)
            .with_feedback(feedback);
        question.check_placeholders()?;
        Ok(question)
    }

    /// Map the external type name, including legacy aliases, onto a
    /// question type.
    pub fn resolve_type(&self) -> Result<QuestionType, ConfigurationError> {
        let name = self.question_type.trim().to_lowercase();
        if let Ok(question_type) = name.parse::<QuestionType>() {
            return Ok(question_type);
        }
        let question_type = match name.as_str() {
            "short_answer" | "sentence_completion" | "labelling" => QuestionType::OpenText,
            "multiple_choice" | "headings" | "matching" | "matching_classifying"
            | "locating_information" => QuestionType::SingleChoice,
            "closed_question" => {
                if self.correct_count()? > 1 {
                    QuestionType::MultiSelect
                } else {
                    QuestionType::SingleChoice
                }
            }
            "open_question" => {
                if self.declared_field_count()? > 1 {
                    QuestionType::MultiFieldSummary
                } else {
                    QuestionType::OpenText
                }
            }
            "summary_completion" => QuestionType::MultiFieldSummary,
            "true_false" => QuestionType::TrueFalseNotGiven,
            _ => {
                return Err(ConfigurationError::UnknownQuestionType(
                    self.question_type.clone(),
                ))
            }
        };
        Ok(question_type)
    }

    fn correct_count(&self) -> Result<usize, ConfigurationError> {
        match &self.correct_answer_count {
            Some(count) => count.as_count("correct_answer_count"),
            None => Ok(self
                .mc_options
                .iter()
                .filter(|o| o.is_correct.as_ref().is_some_and(Scalar::truthy))
                .count()),
        }
    }

    /// Points when the record has none: one per correct option or field
    /// for the legacy `closed_question` and `open_question` types.
    fn default_points(&self) -> Result<u32, ConfigurationError> {
        let count = match self.question_type.trim().to_lowercase().as_str() {
            "closed_question" => self.correct_count()?,
            "open_question" => self.declared_field_count()?,
            _ => 1,
        };
        u32::try_from(count.max(1)).map_err(|_| ConfigurationError::InvalidValue {
            field: "points",
            value: count.to_string(),
        })
    }

    fn declared_field_count(&self) -> Result<usize, ConfigurationError> {
        if let Some(count) = &self.field_count {
            return count.as_count("field_count");
        }
        let listed = self
            .field_answers
            .as_ref()
            .map(Keyed::len)
            .or_else(|| self.summary_fields.as_ref().map(Keyed::len))
            .unwrap_or(1);
        Ok(listed.max(1))
    }

    fn declared_max_selections(&self) -> Result<Option<usize>, ConfigurationError> {
        self.max_selections
            .as_ref()
            .map(|m| m.as_count("max_selections"))
            .or_else(|| {
                self.correct_answer_count
                    .as_ref()
                    .map(|c| c.as_count("correct_answer_count"))
            })
            .transpose()
    }

    fn open_accepted(&self) -> Result<AcceptedAnswerSet, ConfigurationError> {
        if let Some(answers) = &self.field_answers {
            let first = answers
                .clone()
                .into_positions()?
                .into_iter()
                .find(|(position, _)| *position == 1);
            if let Some((_, answer)) = first {
                return parse_alternatives(&answer.to_text());
            }
        }
        match &self.correct_answer {
            Some(answer) => parse_alternatives(&answer.to_text()),
            None => Err(ConfigurationError::EmptyAcceptedAnswers),
        }
    }

    fn choice_options(&self) -> Result<Vec<ChoiceOption>, ConfigurationError> {
        let mut options: Vec<ChoiceOption> = if !self.mc_options.is_empty() {
            self.mc_options
                .iter()
                .cloned()
                .enumerate()
                .map(|(i, o)| o.into_option(self.option_feedback.get(i)))
                .collect()
        } else {
            self.options
                .as_deref()
                .unwrap_or_default()
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .enumerate()
                .map(|(i, line)| {
                    RawOption {
                        text: line.to_string(),
                        is_correct: None,
                        feedback: None,
                    }
                    .into_option(self.option_feedback.get(i))
                })
                .collect()
        };

        if !options.iter().any(|o| o.is_correct) {
            if let Some(answer) = &self.correct_answer {
                for index in answer_indices(answer, options.len())? {
                    options[index].is_correct = true;
                }
            }
        }
        Ok(options)
    }

    fn true_false_answer(&self) -> Result<TrueFalseAnswer, ConfigurationError> {
        let raw = self
            .correct_answer
            .as_ref()
            .map(Scalar::to_text)
            .unwrap_or_default();
        raw.parse().map_err(ConfigurationError::InvalidTrueFalseAnswer)
    }

    fn field_feedback(&self) -> Result<BTreeMap<usize, Feedback>, ConfigurationError> {
        match &self.field_feedback {
            Some(feedback) => Ok(feedback
                .clone()
                .into_positions()?
                .into_iter()
                .map(|(position, raw)| (position, raw.into()))
                .collect()),
            None => Ok(BTreeMap::new()),
        }
    }

    fn text_fields(&self) -> Result<SubFields<TextField>, ConfigurationError> {
        let mut feedback = self.field_feedback()?;
        let mut fields = Vec::new();

        if let Some(summary) = &self.summary_fields {
            for (position, raw) in summary.clone().into_positions()? {
                let accepted = parse_alternatives(&raw.answer.to_text())?;
                fields.push(TextField::new(position, accepted).with_feedback(Feedback::new(
                    raw.correct_feedback,
                    raw.incorrect_feedback,
                    raw.no_answer_feedback,
                )));
            }
        } else if let Some(answers) = &self.field_answers {
            for (position, answer) in answers.clone().into_positions()? {
                let accepted = parse_alternatives(&answer.to_text())?;
                fields.push(
                    TextField::new(position, accepted)
                        .with_feedback(feedback.remove(&position).unwrap_or_default()),
                );
            }
        } else if let Some(answer) = &self.correct_answer {
            for (position, accepted) in parse_numbered_alternatives(&answer.to_text())? {
                fields.push(
                    TextField::new(position, accepted)
                        .with_feedback(feedback.remove(&position).unwrap_or_default()),
                );
            }
        }

        if let Some(count) = &self.field_count {
            let count = count.as_count("field_count")?;
            if !fields.is_empty() && count != fields.len() {
                return Err(ConfigurationError::InvalidValue {
                    field: "field_count",
                    value: count.to_string(),
                });
            }
        }
        SubFields::new(fields)
    }

    fn dropdown_gaps(&self) -> Result<SubFields<DropdownGap>, ConfigurationError> {
        let Some(dropdowns) = &self.dropdown_options else {
            // Older records hold one gap in `mc_options`.
            if self.mc_options.is_empty() && self.options.is_none() {
                return Err(ConfigurationError::NoSubFields);
            }
            let choice = SingleChoice::new(self.choice_options()?)?;
            return SubFields::new(vec![DropdownGap::new(1, choice)]);
        };

        let letters = match &self.correct_answer {
            Some(answer) => numbered_letters(&answer.to_text())?,
            None => BTreeMap::new(),
        };

        let mut gaps = Vec::new();
        for (key, raw) in dropdowns.clone().into_positions()? {
            let gap = match raw {
                RawDropdown::Gap(gap) => gap,
                RawDropdown::Options(options) => RawDropdownGap {
                    options,
                    ..RawDropdownGap::default()
                },
            };
            let position = match &gap.position {
                Some(position) => position.as_position()?,
                None => key,
            };

            let mut options: Vec<ChoiceOption> =
                gap.options.into_iter().map(RawGapOption::into_option).collect();
            if !options.iter().any(|o| o.is_correct) {
                let correct = match &gap.correct {
                    Some(correct) => Some(correct.as_count("correct")?),
                    None => letters.get(&position).copied(),
                };
                if let Some(index) = correct {
                    let len = options.len();
                    options
                        .get_mut(index)
                        .ok_or(ConfigurationError::CorrectOptionOutOfRange { index, len })?
                        .is_correct = true;
                }
            }

            let feedback = Feedback::new(
                gap.correct_feedback,
                gap.incorrect_feedback,
                gap.no_answer_feedback,
            );
            gaps.push(DropdownGap::new(position, SingleChoice::new(options)?).with_feedback(feedback));
        }
        SubFields::new(gaps)
    }
}

/// Letter (`B`) or 0-based digit (`1`) label to an index.
fn label_index(label: &str) -> Option<usize> {
    let label = label.trim();
    if !label.is_empty() && label.bytes().all(|b| b.is_ascii_digit()) {
        return label.parse().ok();
    }
    let mut chars = label.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), None) if letter.is_ascii_alphabetic() => {
            Some((letter.to_ascii_uppercase() as u8 - b'A') as usize)
        }
        _ => None,
    }
}

/// Correct option indices given as `correct_answer` on a closed question.
fn answer_indices(answer: &Scalar, len: usize) -> Result<Vec<usize>, ConfigurationError> {
    let text = answer.to_text();
    let mut indices = Vec::new();
    for label in text.split(['|', ',']).filter(|l| !l.trim().is_empty()) {
        let index = label_index(label).ok_or_else(|| ConfigurationError::InvalidValue {
            field: "correct_answer",
            value: text.clone(),
        })?;
        if index >= len {
            return Err(ConfigurationError::CorrectOptionOutOfRange { index, len });
        }
        indices.push(index);
    }
    Ok(indices)
}

/// Legacy dropdown answers in the form `1:A|2:C`.
fn numbered_letters(raw: &str) -> Result<BTreeMap<usize, usize>, ConfigurationError> {
    let invalid = || ConfigurationError::InvalidValue {
        field: "correct_answer",
        value: raw.to_string(),
    };
    let mut letters = BTreeMap::new();
    for part in raw.split('|').map(str::trim).filter(|p| !p.is_empty()) {
        let (position, letter) = part.split_once(':').ok_or_else(invalid)?;
        let index = label_index(letter).ok_or_else(invalid)?;
        letters.insert(parse_position(position)?, index);
    }
    Ok(letters)
}

/// A learner response as it arrives from a form or an attempt file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawSubmission {
    Index(usize),
    Number(f64),
    Text(String),
    Indices(Vec<usize>),
    Labels(Vec<String>),
    Fields(BTreeMap<String, Option<RawFieldResponse>>),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawFieldResponse {
    Index(usize),
    Number(f64),
    Text(String),
}

impl From<RawFieldResponse> for FieldResponse {
    fn from(raw: RawFieldResponse) -> Self {
        match raw {
            RawFieldResponse::Index(n) => FieldResponse::Choice(n),
            RawFieldResponse::Number(f) => FieldResponse::Text(f.to_string()),
            RawFieldResponse::Text(text) => FieldResponse::Text(text),
        }
    }
}

impl RawSubmission {
    pub fn into_submission(self) -> Result<Submission, InvalidSubmission> {
        let submission = match self {
            RawSubmission::Index(index) => Submission::Choice(index),
            RawSubmission::Number(n) => Submission::Text(n.to_string()),
            RawSubmission::Text(text) => Submission::Text(text),
            RawSubmission::Indices(indices) => Submission::choices(indices),
            RawSubmission::Labels(labels) => Submission::Text(labels.join("|")),
            RawSubmission::Fields(raw) => {
                let mut fields = BTreeMap::new();
                for (key, value) in raw {
                    let position = key
                        .trim()
                        .parse::<usize>()
                        .ok()
                        .filter(|p| *p > 0)
                        .ok_or_else(|| InvalidSubmission::InvalidFieldPosition(key.clone()))?;
                    if let Some(value) = value {
                        fields.insert(position, value.into());
                    }
                }
                Submission::Fields(fields)
            }
        };
        Ok(submission)
    }
}

/// `None` (or JSON `null`) is a blank submission.
pub fn submission_from_raw(raw: Option<RawSubmission>) -> Result<Submission, InvalidSubmission> {
    raw.map_or(Ok(Submission::Blank), RawSubmission::into_submission)
}

/// Convert both external records and grade them.
pub fn grade_raw(
    question: RawQuestion,
    submission: Option<RawSubmission>,
) -> Result<GradeResult, GradeError> {
    let question = question.into_question()?;
    let submission = submission_from_raw(submission)?;
    grade(&question, &submission)
}
