//! Accepted-answer sets parsed from pipe-delimited strings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::normalize::normalize;

/// Ordered, de-duplicated set of normalized alternatives for one open field.
///
/// Never empty: construction fails with
/// [`ConfigurationError::EmptyAcceptedAnswers`] instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AcceptedAnswerSet {
    alternatives: Vec<String>,
}

impl AcceptedAnswerSet {
    /// Build a set from already-split alternatives.
    pub fn from_alternatives<I, S>(parts: I) -> Result<Self, ConfigurationError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut alternatives: Vec<String> = Vec::new();
        for part in parts {
            let normalized = normalize(part.as_ref());
            if !normalized.is_empty() && !alternatives.contains(&normalized) {
                alternatives.push(normalized);
            }
        }
        if alternatives.is_empty() {
            return Err(ConfigurationError::EmptyAcceptedAnswers);
        }
        Ok(Self { alternatives })
    }

    /// Whether `raw` (not yet normalized) matches any alternative.
    pub fn accepts(&self, raw: &str) -> bool {
        self.contains_normalized(&normalize(raw))
    }

    /// Whether an already-normalized answer is in the set.
    pub fn contains_normalized(&self, normalized: &str) -> bool {
        self.alternatives.iter().any(|a| a == normalized)
    }

    /// The normalized alternatives in authoring order.
    pub fn alternatives(&self) -> &[String] {
        &self.alternatives
    }

    pub fn len(&self) -> usize {
        self.alternatives.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }
}

impl fmt::Display for AcceptedAnswerSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.alternatives.join("|"))
    }
}

impl TryFrom<String> for AcceptedAnswerSet {
    type Error = ConfigurationError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        parse_alternatives(&raw)
    }
}

impl From<AcceptedAnswerSet> for String {
    fn from(set: AcceptedAnswerSet) -> Self {
        set.to_string()
    }
}

/// Split `raw` on `|`, normalize each part and discard empties.
pub fn parse_alternatives(raw: &str) -> Result<AcceptedAnswerSet, ConfigurationError> {
    AcceptedAnswerSet::from_alternatives(raw.split('|'))
}

/// Parse the numbered composite form `1:paris|france|2:london|uk`.
///
/// A part with a numeric `N:` prefix opens field `N`; a part without one is a
/// further alternative for the field opened last.
pub fn parse_numbered_alternatives(
    raw: &str,
) -> Result<BTreeMap<usize, AcceptedAnswerSet>, ConfigurationError> {
    let mut groups: BTreeMap<usize, Vec<&str>> = BTreeMap::new();
    let mut current: Option<usize> = None;

    for part in raw.split('|') {
        let part = part.trim();
        if part.is_empty() {
            continue;
        }
        match split_position(part) {
            Some((position, answer)) => {
                groups.entry(position).or_default().push(answer);
                current = Some(position);
            }
            None => match current {
                Some(position) => groups.entry(position).or_default().push(part),
                None => return Err(ConfigurationError::OrphanAlternative(part.to_string())),
            },
        }
    }

    if groups.is_empty() {
        return Err(ConfigurationError::EmptyAcceptedAnswers);
    }

    groups
        .into_iter()
        .map(|(position, parts)| Ok((position, AcceptedAnswerSet::from_alternatives(parts)?)))
        .collect()
}

fn split_position(part: &str) -> Option<(usize, &str)> {
    let (prefix, rest) = part.split_once(':')?;
    let prefix = prefix.trim();
    if prefix.is_empty() || !prefix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let position = prefix.parse::<usize>().ok().filter(|p| *p > 0)?;
    Some((position, rest.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_alternatives() {
        let set = parse_alternatives("in one week|1 week").unwrap();
        assert_eq!(set.alternatives(), &["in one week", "1 week"]);
        assert!(set.accepts("1 Week"));
        assert!(set.accepts("  IN ONE   week"));
        assert!(!set.accepts("one week"));
        assert!(!set.accepts("a week"));

        let set = parse_alternatives("in one week|one week|1 week").unwrap();
        assert!(set.accepts(" one week "));
        assert!(!set.accepts("a week"));
    }

    #[test]
    fn discards_empty_and_duplicate_parts() {
        let set = parse_alternatives("Daughter| |daughter.||his daughter").unwrap();
        assert_eq!(set.alternatives(), &["daughter", "his daughter"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn empty_is_configuration_error() {
        assert_eq!(
            parse_alternatives(""),
            Err(ConfigurationError::EmptyAcceptedAnswers)
        );
        assert_eq!(
            parse_alternatives(" | |?"),
            Err(ConfigurationError::EmptyAcceptedAnswers)
        );
    }

    #[test]
    fn display_joins_with_pipe() {
        let set = parse_alternatives("A|B").unwrap();
        assert_eq!(set.to_string(), "a|b");
    }

    #[test]
    fn serde_uses_raw_string() {
        let set: AcceptedAnswerSet = serde_json::from_str("\"Paris|FRANCE\"").unwrap();
        assert!(set.accepts("france"));
        assert_eq!(serde_json::to_string(&set).unwrap(), "\"paris|france\"");
        assert!(serde_json::from_str::<AcceptedAnswerSet>("\"|\"").is_err());
    }

    #[test]
    fn numbered_alternatives() {
        let groups = parse_numbered_alternatives("1:paris|france|2:london|uk").unwrap();
        assert_eq!(groups.len(), 2);
        assert!(groups[&1].accepts("France"));
        assert!(groups[&2].accepts("UK"));
        assert!(!groups[&1].accepts("london"));
    }

    #[test]
    fn numbered_orphan_is_error() {
        assert_eq!(
            parse_numbered_alternatives("paris|1:france"),
            Err(ConfigurationError::OrphanAlternative("paris".into()))
        );
        assert_eq!(
            parse_numbered_alternatives(""),
            Err(ConfigurationError::EmptyAcceptedAnswers)
        );
    }

    #[test]
    fn numbered_group_with_only_blank_answer_is_error() {
        assert_eq!(
            parse_numbered_alternatives("1:paris|2:"),
            Err(ConfigurationError::EmptyAcceptedAnswers)
        );
    }
}
