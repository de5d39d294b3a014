use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::Topic;

/// Store cell text for a subject that was never attempted.
pub const NOT_ATTEMPTED_CELL: &str = "N/A";

//
// ─── TEST RESULT ───────────────────────────────────────────────────────────────
//

/// Outcome of scoring one topic within a session.
///
/// Invariant: `score <= total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    pub topic: Topic,
    pub score: u32,
    pub total: u32,
}

impl TestResult {
    /// Build a result, enforcing `score <= total`.
    ///
    /// # Errors
    ///
    /// Returns `TestResultError` if the score exceeds the total.
    pub fn new(topic: Topic, score: u32, total: u32) -> Result<Self, TestResultError> {
        if score > total {
            return Err(TestResultError { score, total });
        }
        Ok(Self {
            topic,
            score,
            total,
        })
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("score {score} exceeds total {total}")]
pub struct TestResultError {
    score: u32,
    total: u32,
}

//
// ─── SUBJECT MARKS ─────────────────────────────────────────────────────────────
//

/// Score and total for one subject column pair, or the `N/A` marker.
///
/// "Not attempted" is distinct from "attempted and scored zero": a session
/// that never took a topic produces `NotAttempted`, never `0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectMarks {
    Attempted { score: u32, total: u32 },
    NotAttempted,
}

impl SubjectMarks {
    #[must_use]
    pub fn is_attempted(&self) -> bool {
        matches!(self, SubjectMarks::Attempted { .. })
    }

    /// Store cell text for the score column.
    #[must_use]
    pub fn score_cell(&self) -> String {
        match self {
            SubjectMarks::Attempted { score, .. } => score.to_string(),
            SubjectMarks::NotAttempted => NOT_ATTEMPTED_CELL.to_string(),
        }
    }

    /// Store cell text for the total column.
    #[must_use]
    pub fn total_cell(&self) -> String {
        match self {
            SubjectMarks::Attempted { total, .. } => total.to_string(),
            SubjectMarks::NotAttempted => NOT_ATTEMPTED_CELL.to_string(),
        }
    }

    /// Rebuild marks from a score cell and a total cell.
    ///
    /// Either cell reading `N/A` marks the whole subject as not attempted.
    ///
    /// # Errors
    ///
    /// Returns `SubjectMarksParseError` if an attempted cell is not an
    /// unsigned integer.
    pub fn from_cells(score: &str, total: &str) -> Result<Self, SubjectMarksParseError> {
        let score = score.trim();
        let total = total.trim();
        if score == NOT_ATTEMPTED_CELL || total == NOT_ATTEMPTED_CELL {
            return Ok(SubjectMarks::NotAttempted);
        }
        let parse = |cell: &str| {
            cell.parse::<u32>().map_err(|_| SubjectMarksParseError {
                cell: cell.to_string(),
            })
        };
        Ok(SubjectMarks::Attempted {
            score: parse(score)?,
            total: parse(total)?,
        })
    }
}

impl From<TestResult> for SubjectMarks {
    fn from(result: TestResult) -> Self {
        SubjectMarks::Attempted {
            score: result.score,
            total: result.total,
        }
    }
}

impl fmt::Display for SubjectMarks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubjectMarks::Attempted { score, total } => write!(f, "{score}/{total}"),
            SubjectMarks::NotAttempted => f.write_str(NOT_ATTEMPTED_CELL),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("subject cell is neither an integer nor N/A: {cell}")]
pub struct SubjectMarksParseError {
    cell: String,
}

impl FromStr for SubjectMarks {
    type Err = SubjectMarksParseError;

    /// Parse a single cell as either `N/A` or a score with an unknown total.
    ///
    /// Mostly useful in tests; store decoding goes through `from_cells`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s == NOT_ATTEMPTED_CELL {
            return Ok(SubjectMarks::NotAttempted);
        }
        let (score, total) = s.split_once('/').ok_or_else(|| SubjectMarksParseError {
            cell: s.to_string(),
        })?;
        SubjectMarks::from_cells(score, total)
    }
}

//
// ─── RESULT ROW ────────────────────────────────────────────────────────────────
//

/// The flattened per-session record appended to the persistent store.
///
/// One row per completed submission; rows are never mutated or deleted. On
/// the analysis side the same shape doubles as the student record: the
/// derived `percentage` drives ranking and the raw scores drive charts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRow {
    pub name: String,
    pub arithmetic: SubjectMarks,
    pub algebra: SubjectMarks,
    pub geometry: SubjectMarks,
    pub feedback: String,
}

impl ResultRow {
    /// Flatten a session's per-topic results into one row.
    ///
    /// Topics absent from `results` are recorded as `N/A`, not zero.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        results: &BTreeMap<Topic, TestResult>,
        feedback: impl Into<String>,
    ) -> Self {
        let marks = |topic: Topic| {
            results
                .get(&topic)
                .map_or(SubjectMarks::NotAttempted, |r| SubjectMarks::from(*r))
        };
        Self {
            name: name.into(),
            arithmetic: marks(Topic::Arithmetic),
            algebra: marks(Topic::Algebra),
            geometry: marks(Topic::Geometry),
            feedback: feedback.into(),
        }
    }

    /// Marks for the given subject.
    #[must_use]
    pub fn marks(&self, topic: Topic) -> SubjectMarks {
        match topic {
            Topic::Arithmetic => self.arithmetic,
            Topic::Algebra => self.algebra,
            Topic::Geometry => self.geometry,
        }
    }

    /// Derived percentage for a subject: score / total × 100.
    ///
    /// `None` when the subject was not attempted or its total is zero, so
    /// callers never divide by zero.
    #[must_use]
    pub fn percentage(&self, topic: Topic) -> Option<f64> {
        match self.marks(topic) {
            SubjectMarks::Attempted { score, total } if total > 0 => {
                Some(f64::from(score) / f64::from(total) * 100.0)
            }
            _ => None,
        }
    }

    /// Raw score for a subject, if attempted. Chart radii use this value.
    #[must_use]
    pub fn raw_score(&self, topic: Topic) -> Option<u32> {
        match self.marks(topic) {
            SubjectMarks::Attempted { score, .. } => Some(score),
            SubjectMarks::NotAttempted => None,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
