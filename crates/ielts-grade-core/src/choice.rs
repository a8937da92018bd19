//! Closed-question evaluation: single choice, multi-select, true/false/not given.

use std::collections::BTreeSet;

use crate::error::InvalidSubmission;
use crate::model::{ChoiceOption, TrueFalseAnswer};
use crate::normalize::normalize;
use crate::results::Outcome;

/// Grade a single selected index. `None` is `Unanswered`.
pub fn evaluate_single(
    selected: Option<usize>,
    options: &[ChoiceOption],
) -> Result<Outcome, InvalidSubmission> {
    let Some(index) = selected else {
        return Ok(Outcome::Unanswered);
    };
    let option = options.get(index).ok_or(InvalidSubmission::OptionOutOfRange {
        index,
        len: options.len(),
    })?;
    Ok(if option.is_correct {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    })
}

/// Grade a set of selected indices by exact set equality with the correct set.
///
/// No partial credit: a subset or a superset is `Incorrect`. An empty
/// selection is `Unanswered`. Selecting more than `max_selections` options
/// is rejected before grading.
pub fn evaluate_multi(
    selected: &BTreeSet<usize>,
    options: &[ChoiceOption],
    max_selections: usize,
) -> Result<Outcome, InvalidSubmission> {
    if selected.len() > max_selections {
        return Err(InvalidSubmission::TooManySelections {
            selected: selected.len(),
            max_selections,
        });
    }
    if let Some(&index) = selected.iter().find(|&&i| i >= options.len()) {
        return Err(InvalidSubmission::OptionOutOfRange {
            index,
            len: options.len(),
        });
    }
    if selected.is_empty() {
        return Ok(Outcome::Unanswered);
    }

    let correct: BTreeSet<usize> = options
        .iter()
        .enumerate()
        .filter(|(_, o)| o.is_correct)
        .map(|(i, _)| i)
        .collect();

    Ok(if *selected == correct {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    })
}

/// Grade a true / false / not given response against the canonical answer.
pub fn evaluate_true_false(
    response: &str,
    answer: TrueFalseAnswer,
) -> Result<Outcome, InvalidSubmission> {
    if response.trim().is_empty() {
        return Ok(Outcome::Unanswered);
    }
    let given: TrueFalseAnswer = response
        .parse()
        .map_err(InvalidSubmission::UnrecognizedTrueFalse)?;
    Ok(if given == answer {
        Outcome::Correct
    } else {
        Outcome::Incorrect
    })
}

/// Resolve a textual choice to an option index.
///
/// The option's own text wins, so options labelled `i`..`v` or `1`..`3`
/// select by their text. Otherwise a letter (`B` is index 1) or a 0-based
/// decimal index. Blank text is no selection.
pub fn parse_choice_label(
    label: &str,
    options: &[ChoiceOption],
) -> Result<Option<usize>, InvalidSubmission> {
    let label = label.trim();
    if label.is_empty() {
        return Ok(None);
    }

    if let Some(index) = match_option_text(label, options) {
        return Ok(Some(index));
    }

    let mut chars = label.chars();
    if let (Some(letter), None) = (chars.next(), chars.next()) {
        if letter.is_ascii_alphabetic() {
            let index = (letter.to_ascii_uppercase() as u8 - b'A') as usize;
            if index < options.len() {
                return Ok(Some(index));
            }
            return Err(InvalidSubmission::OptionOutOfRange {
                index,
                len: options.len(),
            });
        }
    }

    if label.bytes().all(|b| b.is_ascii_digit()) {
        return label
            .parse::<usize>()
            .map(Some)
            .map_err(|_| InvalidSubmission::UnrecognizedChoice(label.to_string()));
    }

    Err(InvalidSubmission::UnrecognizedChoice(label.to_string()))
}

fn match_option_text(label: &str, options: &[ChoiceOption]) -> Option<usize> {
    let wanted = normalize(label);
    if wanted.is_empty() {
        return None;
    }
    options.iter().position(|o| normalize(&o.text) == wanted)
}

/// Resolve a list of choice labels.
///
/// Labels are split on `|` when the input has one, otherwise on `,`. An
/// input that is itself an option's text selects that option alone.
pub fn parse_choice_labels(
    labels: &str,
    options: &[ChoiceOption],
) -> Result<BTreeSet<usize>, InvalidSubmission> {
    let mut selected = BTreeSet::new();
    let delimiter = if labels.contains('|') {
        '|'
    } else if let Some(index) = match_option_text(labels, options) {
        selected.insert(index);
        return Ok(selected);
    } else {
        ','
    };

    for label in labels.split(delimiter) {
        if let Some(index) = parse_choice_label(label, options)? {
            selected.insert(index);
        }
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn five_options() -> Vec<ChoiceOption> {
        vec![
            ChoiceOption::new("Japan", false),
            ChoiceOption::new("Germany", true),
            ChoiceOption::new("Brazil", false),
            ChoiceOption::new("Italy", true),
            ChoiceOption::new("Australia", false),
        ]
    }

    fn set(items: &[usize]) -> BTreeSet<usize> {
        items.iter().copied().collect()
    }

    #[test]
    fn single_choice() {
        let options = vec![
            ChoiceOption::new("London", false),
            ChoiceOption::new("Berlin", false),
            ChoiceOption::new("Paris", true),
        ];
        assert_eq!(evaluate_single(Some(2), &options), Ok(Outcome::Correct));
        assert_eq!(evaluate_single(Some(0), &options), Ok(Outcome::Incorrect));
        assert_eq!(evaluate_single(Some(1), &options), Ok(Outcome::Incorrect));
        assert_eq!(evaluate_single(None, &options), Ok(Outcome::Unanswered));
        assert_eq!(
            evaluate_single(Some(3), &options),
            Err(InvalidSubmission::OptionOutOfRange { index: 3, len: 3 })
        );
    }

    #[test]
    fn multi_select_is_exact_set() {
        let options = five_options();
        assert_eq!(evaluate_multi(&set(&[1, 3]), &options, 2), Ok(Outcome::Correct));
        assert_eq!(evaluate_multi(&set(&[3, 1]), &options, 2), Ok(Outcome::Correct));
        assert_eq!(evaluate_multi(&set(&[1]), &options, 2), Ok(Outcome::Incorrect));
        assert_eq!(evaluate_multi(&set(&[0, 1]), &options, 2), Ok(Outcome::Incorrect));
        assert_eq!(evaluate_multi(&set(&[]), &options, 2), Ok(Outcome::Unanswered));
    }

    #[test]
    fn multi_select_superset_is_incorrect_when_allowed() {
        let options = five_options();
        assert_eq!(
            evaluate_multi(&set(&[1, 2, 3]), &options, 5),
            Ok(Outcome::Incorrect)
        );
        assert_eq!(
            evaluate_multi(&set(&[0, 1, 3]), &options, 5),
            Ok(Outcome::Incorrect)
        );
    }

    #[test]
    fn multi_select_rejects_too_many() {
        let options = five_options();
        assert_eq!(
            evaluate_multi(&set(&[1, 2, 3]), &options, 2),
            Err(InvalidSubmission::TooManySelections {
                selected: 3,
                max_selections: 2
            })
        );
        assert_eq!(
            evaluate_multi(&set(&[1, 9]), &options, 2),
            Err(InvalidSubmission::OptionOutOfRange { index: 9, len: 5 })
        );
    }

    #[test]
    fn true_false_not_given() {
        let answer = TrueFalseAnswer::NotGiven;
        assert_eq!(evaluate_true_false("NOT GIVEN", answer), Ok(Outcome::Correct));
        assert_eq!(evaluate_true_false("not_given", answer), Ok(Outcome::Correct));
        assert_eq!(evaluate_true_false("false", answer), Ok(Outcome::Incorrect));
        assert_eq!(evaluate_true_false(" ", answer), Ok(Outcome::Unanswered));
        assert_eq!(
            evaluate_true_false("perhaps", answer),
            Err(InvalidSubmission::UnrecognizedTrueFalse("perhaps".into()))
        );
    }

    #[test]
    fn choice_labels() {
        let options = five_options();
        assert_eq!(parse_choice_label("b", &options), Ok(Some(1)));
        assert_eq!(parse_choice_label("D", &options), Ok(Some(3)));
        assert_eq!(parse_choice_label("2", &options), Ok(Some(2)));
        assert_eq!(parse_choice_label(" italy ", &options), Ok(Some(3)));
        assert_eq!(parse_choice_label("", &options), Ok(None));
        assert_eq!(
            parse_choice_label("Z", &options),
            Err(InvalidSubmission::OptionOutOfRange { index: 25, len: 5 })
        );
        assert_eq!(
            parse_choice_label("France", &options),
            Err(InvalidSubmission::UnrecognizedChoice("France".into()))
        );
    }

    #[test]
    fn choice_label_lists() {
        let options = five_options();
        assert_eq!(parse_choice_labels("B|D", &options), Ok(set(&[1, 3])));
        assert_eq!(parse_choice_labels("1, 3", &options), Ok(set(&[1, 3])));
        assert_eq!(parse_choice_labels("", &options), Ok(set(&[])));
    }

    #[test]
    fn option_text_wins_over_letter_and_index() {
        let numerals: Vec<ChoiceOption> = ["i", "ii", "iii", "iv", "v"]
            .iter()
            .map(|t| ChoiceOption::new(*t, false))
            .collect();
        assert_eq!(parse_choice_label("v", &numerals), Ok(Some(4)));
        assert_eq!(parse_choice_label("I", &numerals), Ok(Some(0)));
        assert_eq!(parse_choice_label("iv", &numerals), Ok(Some(3)));
        assert_eq!(parse_choice_label("B", &numerals), Ok(Some(1)));

        let digits: Vec<ChoiceOption> = ["1", "2", "3"]
            .iter()
            .map(|t| ChoiceOption::new(*t, false))
            .collect();
        assert_eq!(parse_choice_label("3", &digits), Ok(Some(2)));
        assert_eq!(parse_choice_label("1", &digits), Ok(Some(0)));
        assert_eq!(parse_choice_labels("1, 3", &digits), Ok(set(&[0, 2])));
    }

    #[test]
    fn option_text_with_comma() {
        let options = vec![
            ChoiceOption::new("Japan, Korea", true),
            ChoiceOption::new("China", false),
            ChoiceOption::new("India", true),
        ];
        assert_eq!(parse_choice_labels("Japan, Korea", &options), Ok(set(&[0])));
        assert_eq!(
            parse_choice_labels("japan, korea|india", &options),
            Ok(set(&[0, 2]))
        );
        assert_eq!(parse_choice_labels("A, C", &options), Ok(set(&[0, 2])));
    }
}
