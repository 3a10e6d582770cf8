//! Quiz percentages and the course letter-grade standard.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Course letter grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LetterGrade {
    A,
    B,
    C,
    D,
    E,
    F,
}

/// The grading standard, best grade first. Bands are inclusive and cover 0..=100.
pub const GRADING_STANDARD: [(LetterGrade, RangeInclusive<u32>); 6] = [
    (LetterGrade::A, 80..=100),
    (LetterGrade::B, 70..=79),
    (LetterGrade::C, 60..=69),
    (LetterGrade::D, 50..=59),
    (LetterGrade::E, 40..=49),
    (LetterGrade::F, 0..=39),
];

impl LetterGrade {
    /// Map a whole-number score to its letter. Scores above 100 have none.
    pub fn from_score(score: u32) -> Option<LetterGrade> {
        GRADING_STANDARD
            .iter()
            .find(|(_, band)| band.contains(&score))
            .map(|(grade, _)| *grade)
    }

    /// Inclusive score band for this letter.
    pub fn band(&self) -> RangeInclusive<u32> {
        match self {
            LetterGrade::A => 80..=100,
            LetterGrade::B => 70..=79,
            LetterGrade::C => 60..=69,
            LetterGrade::D => 50..=59,
            LetterGrade::E => 40..=49,
            LetterGrade::F => 0..=39,
        }
    }
}

impl fmt::Display for LetterGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            LetterGrade::A => "A",
            LetterGrade::B => "B",
            LetterGrade::C => "C",
            LetterGrade::D => "D",
            LetterGrade::E => "E",
            LetterGrade::F => "F",
        };
        f.write_str(letter)
    }
}

impl FromStr for LetterGrade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A" => Ok(LetterGrade::A),
            "B" => Ok(LetterGrade::B),
            "C" => Ok(LetterGrade::C),
            "D" => Ok(LetterGrade::D),
            "E" => Ok(LetterGrade::E),
            "F" => Ok(LetterGrade::F),
            other => Err(format!("unknown letter grade: {other}")),
        }
    }
}

/// Truncated percentage of correct answers: `floor(correct * 100 / total)`.
///
/// Integer arithmetic keeps e.g. 29/100 at exactly 29.
pub fn quiz_percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (correct * 100 / total) as u32
}

/// Truncated mean of `grades`, or `None` when there is nothing to average.
pub fn truncated_mean(grades: &[u32]) -> Option<u32> {
    if grades.is_empty() {
        return None;
    }
    let sum: u64 = grades.iter().map(|&g| u64::from(g)).sum();
    Some((sum / grades.len() as u64) as u32)
}
