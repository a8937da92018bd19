//! Quiz and attempt file loading.
//!
//! Quizzes are TOML (a `[quiz]` table plus `[[questions]]`) or JSON with the
//! same shape. Questions use the external record names understood by
//! [`crate::adapter`]. Attempts are JSON: one attempt object or an array.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::adapter::{submission_from_raw, RawQuestion, RawSubmission};
use crate::band::ScoringType;
use crate::model::{QuestionKind, QuestionType};
use crate::normalize::normalize;
use crate::quiz::{Attempt, Quiz, QuizItem, DEFAULT_PASS_PERCENTAGE};

/// Raw quiz file structure.
#[derive(Debug, Deserialize)]
struct QuizFile {
    quiz: QuizHeader,
    #[serde(default)]
    questions: Vec<RawQuestion>,
}

#[derive(Debug, Deserialize)]
struct QuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    scoring_type: String,
    #[serde(default = "default_pass_percentage")]
    pass_percentage: f64,
}

fn default_pass_percentage() -> f64 {
    DEFAULT_PASS_PERCENTAGE
}

/// Serialization of a quiz file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizFormat {
    Toml,
    Json,
}

impl QuizFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "toml" => Some(QuizFormat::Toml),
            "json" => Some(QuizFormat::Json),
            _ => None,
        }
    }
}

/// Parse a quiz from a TOML or JSON file.
pub fn parse_quiz(path: &Path) -> Result<Quiz> {
    parse_quiz_with_warnings(path).map(|(quiz, _)| quiz)
}

/// Parse a quiz file and collect its validation warnings.
pub fn parse_quiz_with_warnings(path: &Path) -> Result<(Quiz, Vec<ValidationWarning>)> {
    let format = QuizFormat::from_path(path)
        .with_context(|| format!("unsupported quiz file extension: {}", path.display()))?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;
    load_quiz(&content, format, path)
}

/// Parse a quiz from a string.
pub fn parse_quiz_str(content: &str, format: QuizFormat, source: &Path) -> Result<Quiz> {
    load_quiz(content, format, source).map(|(quiz, _)| quiz)
}

fn load_quiz(
    content: &str,
    format: QuizFormat,
    source: &Path,
) -> Result<(Quiz, Vec<ValidationWarning>)> {
    let parsed: QuizFile = match format {
        QuizFormat::Toml => toml::from_str(content)
            .with_context(|| format!("failed to parse TOML: {}", source.display()))?,
        QuizFormat::Json => serde_json::from_str(content)
            .with_context(|| format!("failed to parse JSON: {}", source.display()))?,
    };

    let scoring_type: ScoringType = parsed
        .quiz
        .scoring_type
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{e}"))
        .with_context(|| format!("invalid quiz header in {}", source.display()))?;
    anyhow::ensure!(
        (0.0..=100.0).contains(&parsed.quiz.pass_percentage),
        "pass_percentage must be between 0 and 100 in {}",
        source.display()
    );

    let mut warnings = Vec::new();
    let items = parsed
        .questions
        .into_iter()
        .enumerate()
        .map(|(i, raw)| {
            let id = raw
                .id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| format!("q{}", i + 1));

            for duplicate in collapsed_alternatives(&raw) {
                warnings.push(ValidationWarning {
                    question_id: Some(id.clone()),
                    message: format!("alternatives collapse to the same answer: {duplicate}"),
                });
            }

            let question = raw
                .into_question()
                .with_context(|| format!("question {id} in {}", source.display()))?;
            Ok(QuizItem { id, question })
        })
        .collect::<Result<Vec<_>>>()?;

    let quiz = Quiz {
        id: parsed.quiz.id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        scoring_type,
        pass_percentage: parsed.quiz.pass_percentage,
        items,
    };
    tracing::debug!(quiz = %quiz.id, questions = quiz.items.len(), "loaded quiz");

    warnings.extend(validate_quiz(&quiz));
    Ok((quiz, warnings))
}

/// Recursively load every `.toml` and `.json` quiz file from a directory.
///
/// Files are visited in path order and any file that fails to load fails
/// the whole directory.
pub fn load_quiz_directory(dir: &Path) -> Result<Vec<Quiz>> {
    let mut quizzes = Vec::new();
    for path in quiz_files(dir)? {
        quizzes.push(parse_quiz(&path)?);
    }
    Ok(quizzes)
}

/// Every quiz file under `dir`, recursively, in path order.
pub fn quiz_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut files = Vec::new();
    for path in sorted_entries(dir)? {
        if path.is_dir() {
            files.extend(quiz_files(&path)?);
        } else if QuizFormat::from_path(&path).is_some() {
            files.push(path);
        } else {
            tracing::debug!("ignoring {}", path.display());
        }
    }
    Ok(files)
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
    {
        paths.push(entry?.path());
    }
    paths.sort();
    Ok(paths)
}

#[derive(Debug, Deserialize)]
struct AttemptRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    learner: Option<String>,
    #[serde(default)]
    answers: BTreeMap<String, Option<RawSubmission>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AttemptFile {
    Many(Vec<AttemptRecord>),
    One(AttemptRecord),
}

/// Parse attempts from a JSON file.
pub fn parse_attempts(path: &Path) -> Result<Vec<Attempt>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read attempt file: {}", path.display()))?;
    parse_attempts_str(&content, path)
}

/// Parse attempts from a JSON string.
///
/// Attempts without an id are named after the source file: the file stem
/// for a single attempt, `<stem>-<n>` inside an array.
pub fn parse_attempts_str(content: &str, source: &Path) -> Result<Vec<Attempt>> {
    let parsed: AttemptFile = serde_json::from_str(content)
        .with_context(|| format!("failed to parse attempts: {}", source.display()))?;

    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("attempt")
        .to_string();

    let records = match parsed {
        AttemptFile::One(record) => vec![(stem, record)],
        AttemptFile::Many(records) => records
            .into_iter()
            .enumerate()
            .map(|(i, record)| (format!("{stem}-{}", i + 1), record))
            .collect(),
    };

    records
        .into_iter()
        .map(|(fallback_id, record)| {
            let id = record
                .id
                .filter(|id| !id.trim().is_empty())
                .unwrap_or(fallback_id);
            let answers = record
                .answers
                .into_iter()
                .map(|(question_id, raw)| {
                    let submission = submission_from_raw(raw).with_context(|| {
                        format!("attempt {id}, question {question_id} in {}", source.display())
                    })?;
                    Ok((question_id, submission))
                })
                .collect::<Result<BTreeMap<_, _>>>()?;
            Ok(Attempt {
                id,
                learner: record.learner,
                answers,
            })
        })
        .collect()
}

/// Load attempts from a JSON file, or from every `.json` file in a
/// directory in path order.
pub fn load_attempts(path: &Path) -> Result<Vec<Attempt>> {
    if !path.is_dir() {
        return parse_attempts(path);
    }

    let mut attempts = Vec::new();
    let mut seen = HashSet::new();
    for file in sorted_entries(path)? {
        if file.is_dir() {
            continue;
        }
        if file.extension().is_some_and(|ext| ext == "json") {
            for attempt in parse_attempts(&file)? {
                if !seen.insert(attempt.id.clone()) {
                    tracing::warn!("duplicate attempt id {} in {}", attempt.id, file.display());
                }
                attempts.push(attempt);
            }
        } else {
            tracing::warn!("skipping {}: not a JSON attempt file", file.display());
        }
    }
    Ok(attempts)
}

/// A non-fatal issue found in a quiz.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.question_id {
            Some(id) => write!(f, "[{id}] {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Validate a quiz for common authoring issues.
pub fn validate_quiz(quiz: &Quiz) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    if quiz.items.is_empty() {
        warnings.push(ValidationWarning {
            question_id: None,
            message: "quiz has no questions".into(),
        });
    }

    let mut seen_ids = HashSet::new();
    for item in &quiz.items {
        if !seen_ids.insert(&item.id) {
            warnings.push(ValidationWarning {
                question_id: Some(item.id.clone()),
                message: format!("duplicate question ID: {}", item.id),
            });
        }
    }

    for item in &quiz.items {
        let question = &item.question;
        if question.question_type().is_composite() && question.placeholder_positions().is_empty() {
            warnings.push(ValidationWarning {
                question_id: Some(item.id.clone()),
                message: format!(
                    "{} has no placeholder markers in its text",
                    question.question_type()
                ),
            });
        }
    }

    for item in &quiz.items {
        if let QuestionKind::MultiSelect(multi) = item.question.kind() {
            if multi.correct_indices().len() < 2 {
                warnings.push(ValidationWarning {
                    question_id: Some(item.id.clone()),
                    message: "multi_select has fewer than two correct options".into(),
                });
            }
        }
    }

    warnings
}

/// Normalized answers that appear more than once among one field's
/// alternatives.
fn collapsed_alternatives(raw: &RawQuestion) -> Vec<String> {
    let Ok(question_type) = raw.resolve_type() else {
        return Vec::new();
    };
    if !matches!(
        question_type,
        QuestionType::OpenText | QuestionType::MultiFieldSummary | QuestionType::TableCompletion
    ) {
        return Vec::new();
    }

    let mut sources: Vec<String> = Vec::new();
    if let Some(answer) = &raw.correct_answer {
        sources.push(answer.to_text());
    }
    if let Some(fields) = &raw.summary_fields {
        sources.extend(fields.values().into_iter().map(|f| f.answer.to_text()));
    }
    if let Some(answers) = &raw.field_answers {
        sources.extend(answers.values().into_iter().map(|a| a.to_text()));
    }

    let mut collapsed = Vec::new();
    for source in &sources {
        let mut group: Vec<String> = Vec::new();
        for part in source.split('|') {
            let part = match numbered_part(part) {
                Some(answer) => {
                    group.clear();
                    answer
                }
                None => part,
            };
            let normalized = normalize(part);
            if normalized.is_empty() {
                continue;
            }
            if group.contains(&normalized) {
                if !collapsed.contains(&normalized) {
                    collapsed.push(normalized);
                }
            } else {
                group.push(normalized);
            }
        }
    }
    collapsed
}

/// The answer part of a `N:answer` alternative.
fn numbered_part(part: &str) -> Option<&str> {
    let (prefix, rest) = part.split_once(':')?;
    let prefix = prefix.trim();
    (!prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit())).then_some(rest)
}
