//! IELTS band conversion and score display.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How a quiz score is reported to the learner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringType {
    #[default]
    Percentage,
    IeltsAcademicReading,
    IeltsGeneralReading,
    IeltsListening,
}

impl ScoringType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScoringType::Percentage => "percentage",
            ScoringType::IeltsAcademicReading => "ielts_academic_reading",
            ScoringType::IeltsGeneralReading => "ielts_general_reading",
            ScoringType::IeltsListening => "ielts_listening",
        }
    }

    pub fn is_band(&self) -> bool {
        !matches!(self, ScoringType::Percentage)
    }

    /// Band per raw score, indexed by raw score. The last entry is the
    /// table's maximum.
    fn table(&self) -> Option<&'static [f64]> {
        match self {
            ScoringType::Percentage => None,
            ScoringType::IeltsAcademicReading => Some(&ACADEMIC_READING),
            ScoringType::IeltsGeneralReading => Some(&GENERAL_READING),
            ScoringType::IeltsListening => Some(&LISTENING),
        }
    }

    /// Highest raw score the conversion table distinguishes.
    pub fn max_raw_score(&self) -> Option<u32> {
        self.table().map(|t| t.len() as u32 - 1)
    }
}

impl fmt::Display for ScoringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScoringType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "" | "percentage" => Ok(ScoringType::Percentage),
            "ielts_academic_reading" | "academic_reading" => Ok(ScoringType::IeltsAcademicReading),
            "ielts_general_reading" | "general_reading" => Ok(ScoringType::IeltsGeneralReading),
            "ielts_listening" | "listening" => Ok(ScoringType::IeltsListening),
            other => Err(format!("unknown scoring type: {other}")),
        }
    }
}

#[rustfmt::skip]
const ACADEMIC_READING: [f64; 40] = [
    1.0, 1.5, 2.0, 2.0, 2.5, 2.5, 3.0, 3.0, 3.5, 3.5,
    4.0, 4.0, 4.0, 4.5, 4.5, 5.0, 5.0, 5.0, 5.0, 5.5,
    5.5, 5.5, 5.5, 6.0, 6.0, 6.0, 6.0, 6.5, 6.5, 6.5,
    7.0, 7.0, 7.0, 7.5, 7.5, 8.0, 8.0, 8.5, 8.5, 9.0,
];

#[rustfmt::skip]
const GENERAL_READING: [f64; 41] = [
    1.0, 1.5, 1.5, 2.0, 2.0, 2.0, 2.5, 2.5, 2.5, 3.0,
    3.0, 3.0, 3.5, 3.5, 3.5, 4.0, 4.0, 4.0, 4.0, 4.5,
    4.5, 4.5, 4.5, 5.0, 5.0, 5.0, 5.5, 5.5, 5.5, 6.0,
    6.0, 6.5, 6.5, 7.0, 7.0, 7.5, 7.5, 8.0, 8.0, 8.5,
    9.0,
];

#[rustfmt::skip]
const LISTENING: [f64; 40] = [
    1.0, 1.5, 2.0, 2.0, 2.5, 2.5, 3.0, 3.0, 3.5, 3.5,
    4.0, 4.0, 4.0, 4.5, 4.5, 4.5, 5.0, 5.0, 5.5, 5.5,
    5.5, 5.5, 5.5, 6.0, 6.0, 6.0, 6.5, 6.5, 6.5, 6.5,
    7.0, 7.0, 7.5, 7.5, 7.5, 8.0, 8.0, 8.5, 8.5, 9.0,
];

/// Convert a raw score to a band. `None` for percentage scoring.
///
/// Scores above the table's maximum get the maximum band.
pub fn band_score(raw_score: u32, scoring: ScoringType) -> Option<f64> {
    let table = scoring.table()?;
    table
        .get(raw_score as usize)
        .or_else(|| table.last())
        .copied()
}

/// The learner-facing score: a band or a percentage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum DisplayScore {
    Band(f64),
    Percentage(f64),
}

impl DisplayScore {
    pub fn new(scoring: ScoringType, raw_score: u32, percentage: f64) -> Self {
        match band_score(raw_score, scoring) {
            Some(band) => DisplayScore::Band(band),
            None => DisplayScore::Percentage(percentage),
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            DisplayScore::Band(v) | DisplayScore::Percentage(v) => *v,
        }
    }

    pub fn is_band(&self) -> bool {
        matches!(self, DisplayScore::Band(_))
    }
}

impl fmt::Display for DisplayScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayScore::Band(band) => write!(f, "Band {band:.1}"),
            DisplayScore::Percentage(p) => write!(f, "{}%", (p * 10.0).round() / 10.0),
        }
    }
}
