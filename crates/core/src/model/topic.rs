use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A subject covered by the aptitude test.
///
/// The set is closed: every store column, answer key, and report is keyed by
/// one of these three subjects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topic {
    Arithmetic,
    Algebra,
    Geometry,
}

impl Topic {
    /// All topics, in store-column order.
    pub const ALL: [Topic; 3] = [Topic::Arithmetic, Topic::Algebra, Topic::Geometry];

    /// Lowercase identifier used in requests and store columns.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Topic::Arithmetic => "arithmetic",
            Topic::Algebra => "algebra",
            Topic::Geometry => "geometry",
        }
    }

    /// Capitalized label used on chart axes and in reports.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Topic::Arithmetic => "Arithmetic",
            Topic::Algebra => "Algebra",
            Topic::Geometry => "Geometry",
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing a topic from a request string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown topic: {raw}")]
pub struct TopicParseError {
    raw: String,
}

impl FromStr for Topic {
    type Err = TopicParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "arithmetic" => Ok(Topic::Arithmetic),
            "algebra" => Ok(Topic::Algebra),
            "geometry" => Ok(Topic::Geometry),
            _ => Err(TopicParseError { raw: s.to_string() }),
        }
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────
