//! Answer-sheet scoring against a topic's answer key.

use std::collections::BTreeMap;

use crate::model::{TestResult, Topic};

//
// ─── ANSWER SHEET ──────────────────────────────────────────────────────────────
//

/// Submitted answers keyed by explicit 1-based question ordinal.
///
/// Carrying the ordinal as an integer (rather than deriving it from a label
/// suffix) keeps scoring correct past nine questions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnswerSheet {
    entries: BTreeMap<u32, String>,
}

impl AnswerSheet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the answer for a question ordinal, replacing any earlier entry.
    pub fn insert(&mut self, ordinal: u32, answer: impl Into<String>) {
        self.entries.insert(ordinal, answer.into());
    }

    #[must_use]
    pub fn get(&self, ordinal: u32) -> Option<&str> {
        self.entries.get(&ordinal).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in ascending ordinal order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl FromIterator<(u32, String)> for AnswerSheet {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

//
// ─── SCORING ───────────────────────────────────────────────────────────────────
//

/// Canonical form used for answer comparison.
#[must_use]
pub fn normalize(answer: &str) -> String {
    answer.trim().to_lowercase()
}

/// Score a sheet against the answer key for a topic.
///
/// Each submitted answer whose normalized text equals the key entry at the
/// same ordinal adds one point. The total is always the key length: missing
/// positions count as incorrect, and ordinals outside `1..=key.len()` score
/// nothing. Resubmitting the same sheet yields the same result.
#[must_use]
pub fn score_sheet(topic: Topic, key: &[String], sheet: &AnswerSheet) -> TestResult {
    let total = u32::try_from(key.len()).unwrap_or(u32::MAX);
    let mut score = 0;

    for (ordinal, submitted) in sheet.entries() {
        if ordinal == 0 {
            continue;
        }
        let Some(expected) = key.get(ordinal as usize - 1) else {
            continue;
        };
        if normalize(submitted) == normalize(expected) {
            score += 1;
        }
    }

    TestResult {
        topic,
        score,
        total,
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
