//! Question grading: dispatch by question type and composite aggregation.

use std::collections::{BTreeMap, BTreeSet};

use crate::choice::{
    evaluate_multi, evaluate_single, evaluate_true_false, parse_choice_label, parse_choice_labels,
};
use crate::error::{GradeError, InvalidSubmission};
use crate::feedback::resolve_feedback;
use crate::field::evaluate_open;
use crate::model::{
    ChoiceOption, DropdownGap, MultiSelect, Positioned, Question, QuestionKind, SingleChoice,
    SubFields, TextField,
};
use crate::results::{FieldResult, GradeResult, Outcome};
use crate::submission::{FieldResponse, Submission};

/// Grade one submission against one question.
///
/// Pure: the same inputs always give the same result, and nothing is shared
/// between calls.
pub fn grade(question: &Question, submission: &Submission) -> Result<GradeResult, GradeError> {
    let graded = match question.kind() {
        QuestionKind::OpenText(accepted) => {
            let text = text_of(submission, "text")?;
            Graded::simple(evaluate_open(&text, accepted))
        }
        QuestionKind::SingleChoice(choice) => grade_single(choice, submission)?,
        QuestionKind::MultiSelect(multi) => grade_multi(multi, submission)?,
        QuestionKind::TrueFalseNotGiven(answer) => {
            let text = text_of(submission, "true/false/not given")?;
            Graded::simple(evaluate_true_false(&text, *answer)?)
        }
        QuestionKind::MultiFieldSummary(fields) | QuestionKind::TableCompletion(fields) => {
            grade_text_fields(fields, submission)?
        }
        QuestionKind::DropdownParagraph(gaps) => grade_dropdowns(gaps, submission)?,
    };

    let outcome = graded.outcome;
    let points_awarded = if outcome.is_correct() {
        question.points()
    } else {
        0
    };

    tracing::debug!(
        question_type = %question.question_type(),
        %outcome,
        fields = graded.fields.len(),
        "graded question"
    );

    Ok(GradeResult {
        question_type: question.question_type(),
        outcome,
        fields: graded.fields,
        feedback: resolve_feedback(outcome, question.feedback()),
        option_feedback: graded.option_feedback,
        points_awarded,
        max_points: question.points(),
    })
}

/// Intermediate verdict before points and question feedback are attached.
struct Graded {
    outcome: Outcome,
    fields: Vec<FieldResult>,
    option_feedback: Vec<String>,
}

impl Graded {
    fn simple(outcome: Outcome) -> Self {
        Self {
            outcome,
            fields: Vec::new(),
            option_feedback: Vec::new(),
        }
    }
}

fn text_of(submission: &Submission, expected: &'static str) -> Result<String, InvalidSubmission> {
    match submission {
        Submission::Blank => Ok(String::new()),
        Submission::Text(text) => Ok(text.clone()),
        Submission::Choice(n) => Ok(n.to_string()),
        other => Err(InvalidSubmission::WrongShape {
            expected,
            found: other.shape(),
        }),
    }
}

fn grade_single(choice: &SingleChoice, submission: &Submission) -> Result<Graded, InvalidSubmission> {
    let options = choice.options();
    let selected = match submission {
        Submission::Blank => None,
        Submission::Choice(index) => Some(*index),
        Submission::Text(label) => parse_choice_label(label, options)?,
        Submission::Choices(set) if set.is_empty() => None,
        other => {
            return Err(InvalidSubmission::WrongShape {
                expected: "single choice",
                found: other.shape(),
            })
        }
    };

    let outcome = evaluate_single(selected, options)?;
    let option_feedback = selected
        .into_iter()
        .filter_map(|i| option_feedback(options, i))
        .collect();

    Ok(Graded {
        outcome,
        fields: Vec::new(),
        option_feedback,
    })
}

fn grade_multi(multi: &MultiSelect, submission: &Submission) -> Result<Graded, InvalidSubmission> {
    let options = multi.options();
    let selected: BTreeSet<usize> = match submission {
        Submission::Blank => BTreeSet::new(),
        Submission::Choice(index) => BTreeSet::from([*index]),
        Submission::Choices(set) => set.clone(),
        Submission::Text(labels) => parse_choice_labels(labels, options)?,
        other => {
            return Err(InvalidSubmission::WrongShape {
                expected: "multiple choice",
                found: other.shape(),
            })
        }
    };

    let outcome = evaluate_multi(&selected, options, multi.max_selections())?;

    // Unanswered learners are shown why the correct options are correct.
    let shown = if outcome == Outcome::Unanswered {
        multi.correct_indices()
    } else {
        selected
    };
    let option_feedback = shown
        .into_iter()
        .filter_map(|i| option_feedback(options, i))
        .collect();

    Ok(Graded {
        outcome,
        fields: Vec::new(),
        option_feedback,
    })
}

fn option_feedback(options: &[ChoiceOption], index: usize) -> Option<String> {
    options.get(index).and_then(|o| o.feedback.clone())
}

/// Per-field responses, rejecting any position the question does not have.
fn field_responses<'a, T: Positioned>(
    fields: &SubFields<T>,
    submission: &'a Submission,
) -> Result<Option<&'a BTreeMap<usize, FieldResponse>>, InvalidSubmission> {
    let responses = match submission {
        Submission::Blank => return Ok(None),
        Submission::Fields(responses) => responses,
        other => {
            return Err(InvalidSubmission::WrongShape {
                expected: "per-field",
                found: other.shape(),
            })
        }
    };
    if let Some(&position) = responses.keys().find(|&&p| fields.get(p).is_none()) {
        return Err(InvalidSubmission::UnknownField(position));
    }
    Ok(Some(responses))
}

fn grade_text_fields(
    fields: &SubFields<TextField>,
    submission: &Submission,
) -> Result<Graded, InvalidSubmission> {
    let responses = field_responses(fields, submission)?;

    let results: Vec<FieldResult> = fields
        .iter()
        .map(|field| {
            let response = responses
                .and_then(|r| r.get(&field.position))
                .map(|r| r.as_text().into_owned());
            let outcome = evaluate_open(response.as_deref().unwrap_or_default(), &field.accepted);
            FieldResult {
                position: field.position,
                outcome,
                feedback: resolve_feedback(outcome, &field.feedback),
                response,
            }
        })
        .collect();

    Ok(Graded {
        outcome: Outcome::combine(results.iter().map(|r| r.outcome)),
        fields: results,
        option_feedback: Vec::new(),
    })
}

fn grade_dropdowns(
    gaps: &SubFields<DropdownGap>,
    submission: &Submission,
) -> Result<Graded, InvalidSubmission> {
    let responses = field_responses(gaps, submission)?;

    let mut results = Vec::with_capacity(gaps.len());
    for gap in gaps.iter() {
        let response = responses.and_then(|r| r.get(&gap.position));
        let options = gap.choice.options();
        let selected = match response {
            None => None,
            Some(FieldResponse::Choice(index)) => Some(*index),
            Some(FieldResponse::Text(label)) => parse_choice_label(label, options)?,
        };
        let outcome = evaluate_single(selected, options)?;
        results.push(FieldResult {
            position: gap.position,
            outcome,
            feedback: resolve_feedback(outcome, &gap.feedback),
            response: response.map(|r| r.as_text().into_owned()),
        });
    }

    Ok(Graded {
        outcome: Outcome::combine(results.iter().map(|r| r.outcome)),
        fields: results,
        option_feedback: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alternatives::parse_alternatives;
    use crate::error::ConfigurationError;
    use crate::feedback::DEFAULT_NO_ANSWER_FEEDBACK;
    use crate::model::{Feedback, TrueFalseAnswer};

    fn open(accepted: &str) -> Question {
        Question::new(QuestionKind::OpenText(parse_alternatives(accepted).unwrap()))
    }

    fn table(answers: &[&str]) -> Question {
        let fields = answers
            .iter()
            .enumerate()
            .map(|(i, a)| TextField::new(i + 1, parse_alternatives(a).unwrap()))
            .collect();
        Question::new(QuestionKind::TableCompletion(SubFields::new(fields).unwrap()))
    }

    fn countries() -> Question {
        let options = ["A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(i, t)| {
                ChoiceOption::new(*t, i == 1 || i == 3).with_feedback(format!("about {t}"))
            })
            .collect();
        Question::new(QuestionKind::MultiSelect(MultiSelect::new(options, Some(2)).unwrap()))
    }

    #[test]
    fn open_text_scenario() {
        let q = open("his daughter|daughter").with_feedback(Feedback::new(
            Some("Correct!".into()),
            Some("Listen again.".into()),
            None,
        ));

        let r = grade(&q, &Submission::text("Daughter")).unwrap();
        assert_eq!(r.outcome, Outcome::Correct);
        assert!(r.correct());
        assert_eq!(r.points_awarded, 1);
        assert_eq!(r.feedback, "Correct!");

        let r = grade(&q, &Submission::text("")).unwrap();
        assert_eq!(r.outcome, Outcome::Unanswered);
        assert_eq!(r.points_awarded, 0);
        assert_eq!(r.feedback, DEFAULT_NO_ANSWER_FEEDBACK);

        let r = grade(&q, &Submission::Blank).unwrap();
        assert_eq!(r.outcome, Outcome::Unanswered);

        let r = grade(&q, &Submission::text("his son")).unwrap();
        assert_eq!(r.outcome, Outcome::Incorrect);
        assert_eq!(r.feedback, "Listen again.");
    }

    #[test]
    fn open_text_accepts_numeric_choice() {
        let q = open("80");
        assert_eq!(grade(&q, &Submission::Choice(80)).unwrap().outcome, Outcome::Correct);
        assert!(matches!(
            grade(&q, &Submission::choices([1])),
            Err(GradeError::InvalidSubmission(InvalidSubmission::WrongShape { .. }))
        ));
    }

    #[test]
    fn single_choice_scenario() {
        let options = vec![
            ChoiceOption::new("London", false).with_feedback("London is in England."),
            ChoiceOption::new("Paris", true).with_feedback("Yes, Paris."),
        ];
        let q = Question::new(QuestionKind::SingleChoice(SingleChoice::new(options).unwrap()))
            .with_points(2)
            .unwrap();

        let r = grade(&q, &Submission::Choice(1)).unwrap();
        assert_eq!(r.outcome, Outcome::Correct);
        assert_eq!(r.points_awarded, 2);
        assert_eq!(r.option_feedback, vec!["Yes, Paris."]);

        let r = grade(&q, &Submission::text("A")).unwrap();
        assert_eq!(r.outcome, Outcome::Incorrect);
        assert_eq!(r.option_feedback, vec!["London is in England."]);

        let r = grade(&q, &Submission::Blank).unwrap();
        assert_eq!(r.outcome, Outcome::Unanswered);
        assert!(r.option_feedback.is_empty());
    }

    #[test]
    fn multi_select_scenario() {
        let q = countries();

        let r = grade(&q, &Submission::choices([1, 3])).unwrap();
        assert_eq!(r.outcome, Outcome::Correct);
        assert_eq!(r.option_feedback, vec!["about B", "about D"]);

        for wrong in [vec![1], vec![0, 1], vec![0, 3]] {
            let r = grade(&q, &Submission::choices(wrong)).unwrap();
            assert_eq!(r.outcome, Outcome::Incorrect);
            assert_eq!(r.points_awarded, 0);
        }

        assert_eq!(
            grade(&q, &Submission::choices([1, 2, 3])),
            Err(GradeError::InvalidSubmission(
                InvalidSubmission::TooManySelections {
                    selected: 3,
                    max_selections: 2
                }
            ))
        );
    }

    #[test]
    fn multi_select_unanswered_shows_correct_option_feedback() {
        let r = grade(&countries(), &Submission::choices([])).unwrap();
        assert_eq!(r.outcome, Outcome::Unanswered);
        assert_eq!(r.option_feedback, vec!["about B", "about D"]);
        assert_eq!(r.feedback, DEFAULT_NO_ANSWER_FEEDBACK);
    }

    #[test]
    fn multi_select_text_labels() {
        let r = grade(&countries(), &Submission::text("D|B")).unwrap();
        assert_eq!(r.outcome, Outcome::Correct);
    }

    #[test]
    fn true_false_not_given_question() {
        let q = Question::new(QuestionKind::TrueFalseNotGiven(TrueFalseAnswer::False));
        assert_eq!(grade(&q, &Submission::text("FALSE")).unwrap().outcome, Outcome::Correct);
        assert_eq!(grade(&q, &Submission::text("true")).unwrap().outcome, Outcome::Incorrect);
        assert_eq!(grade(&q, &Submission::Blank).unwrap().outcome, Outcome::Unanswered);
        assert!(grade(&q, &Submission::text("yes")).is_err());
    }

    #[test]
    fn table_completion_scenario() {
        let q = table(&["2.5 BILLION", "1.4 BILLION"]);
        let r = grade(&q, &Submission::fields([(1, "2.5 billion"), (2, "1.3 billion")])).unwrap();

        assert_eq!(r.outcome, Outcome::Incorrect);
        assert_eq!(r.points_awarded, 0);
        assert_eq!(r.fields.len(), 2);
        assert_eq!(r.fields[0].outcome, Outcome::Correct);
        assert_eq!(r.fields[1].outcome, Outcome::Incorrect);
        assert_eq!(r.fields[1].response.as_deref(), Some("1.3 billion"));
    }

    #[test]
    fn composite_is_conjunction() {
        let q = table(&["a", "b", "c", "d"]);
        let r = grade(&q, &Submission::fields([(1, "a"), (2, "b"), (3, "c"), (4, "x")])).unwrap();
        assert_eq!(r.outcome, Outcome::Incorrect);
        let correct: Vec<bool> = r.fields.iter().map(|f| f.outcome.is_correct()).collect();
        assert_eq!(correct, vec![true, true, true, false]);

        let r = grade(&q, &Submission::fields([(1, "A"), (2, "B"), (3, "C"), (4, "D")])).unwrap();
        assert_eq!(r.outcome, Outcome::Correct);
        assert_eq!(r.points_awarded, 1);
    }

    #[test]
    fn composite_blank_fields() {
        let q = table(&["a", "b"]);
        let r = grade(&q, &Submission::Blank).unwrap();
        assert_eq!(r.outcome, Outcome::Unanswered);
        assert!(r.fields.iter().all(|f| f.feedback == DEFAULT_NO_ANSWER_FEEDBACK));

        let r = grade(&q, &Submission::fields([(1, "a")])).unwrap();
        assert_eq!(r.outcome, Outcome::Incorrect);
        assert_eq!(r.fields[1].outcome, Outcome::Unanswered);
        assert_eq!(r.fields[1].response, None);
    }

    #[test]
    fn composite_rejects_unknown_field() {
        let q = table(&["a", "b"]);
        assert_eq!(
            grade(&q, &Submission::fields([(1, "a"), (3, "c")])),
            Err(GradeError::InvalidSubmission(InvalidSubmission::UnknownField(3)))
        );
    }

    #[test]
    fn field_feedback_is_per_field() {
        let fields = vec![
            TextField::new(1, parse_alternatives("jupiter").unwrap()).with_feedback(Feedback::new(
                Some("Yes, Jupiter.".into()),
                Some("It is Jupiter.".into()),
                Some("Name the largest planet.".into()),
            )),
            TextField::new(2, parse_alternatives("one|1").unwrap()),
        ];
        let q = Question::new(QuestionKind::MultiFieldSummary(SubFields::new(fields).unwrap()));

        let r = grade(&q, &Submission::fields([(1, "Saturn")])).unwrap();
        assert_eq!(r.fields[0].feedback, "It is Jupiter.");
        assert_eq!(r.fields[1].feedback, DEFAULT_NO_ANSWER_FEEDBACK);
    }

    #[test]
    fn dropdown_paragraph() {
        let gap = |correct: usize| {
            let options = ["evaporating", "freezing", "flowing"]
                .iter()
                .enumerate()
                .map(|(i, t)| ChoiceOption::new(*t, i == correct))
                .collect();
            SingleChoice::new(options).unwrap()
        };
        let gaps = SubFields::new(vec![DropdownGap::new(1, gap(0)), DropdownGap::new(2, gap(2))])
            .unwrap();
        let q = Question::new(QuestionKind::DropdownParagraph(gaps));

        let mut responses = BTreeMap::new();
        responses.insert(1, FieldResponse::Text("A".into()));
        responses.insert(2, FieldResponse::Choice(2));
        let r = grade(&q, &Submission::Fields(responses)).unwrap();
        assert_eq!(r.outcome, Outcome::Correct);

        let r = grade(&q, &Submission::fields([(1, "evaporating"), (2, "freezing")])).unwrap();
        assert_eq!(r.outcome, Outcome::Incorrect);
        assert_eq!(r.fields[0].outcome, Outcome::Correct);
        assert_eq!(r.fields[1].outcome, Outcome::Incorrect);

        assert!(matches!(
            grade(&q, &Submission::fields([(1, "boiling")])),
            Err(GradeError::InvalidSubmission(InvalidSubmission::UnrecognizedChoice(_)))
        ));
    }

    #[test]
    fn zero_sub_fields_never_grades() {
        assert_eq!(
            SubFields::<TextField>::new(Vec::new()).map(|_| ()),
            Err(ConfigurationError::NoSubFields)
        );
    }
}
