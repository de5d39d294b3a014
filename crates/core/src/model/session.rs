use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::model::{TestResult, Topic};
use crate::scoring::{self, AnswerSheet};

//
// ─── SESSION ID ────────────────────────────────────────────────────────────────
//

/// Opaque token identifying one live exam session.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a fresh random session id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error type for parsing a session id from a token string.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("malformed session token")]
pub struct SessionIdParseError;

impl FromStr for SessionId {
    type Err = SessionIdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(SessionId)
            .map_err(|_| SessionIdParseError)
    }
}

//
// ─── EXAM SESSION ──────────────────────────────────────────────────────────────
//

/// The answer key currently under test, scoped to one topic.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ActiveKey {
    topic: Topic,
    answers: Vec<String>,
}

/// Per-identity exam state, created at login and destroyed at expiry/logout.
///
/// Holds at most one active answer key (the topic currently being taken) and
/// the running map of completed-topic results. The session is an explicit
/// value passed into each operation, never ambient process state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamSession {
    id: SessionId,
    identity: String,
    active_key: Option<ActiveKey>,
    results: BTreeMap<Topic, TestResult>,
    started_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl ExamSession {
    #[must_use]
    pub fn new(id: SessionId, identity: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id,
            identity: identity.into(),
            active_key: None,
            results: BTreeMap::new(),
            started_at: now,
            last_active_at: now,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// The stable per-session identity string (the student's name).
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }

    /// Completed-topic results recorded so far.
    #[must_use]
    pub fn results(&self) -> &BTreeMap<Topic, TestResult> {
        &self.results
    }

    /// Answer key for the topic currently under test, if it matches `topic`.
    #[must_use]
    pub fn active_key_for(&self, topic: Topic) -> Option<&[String]> {
        match &self.active_key {
            Some(key) if key.topic == topic => Some(&key.answers),
            _ => None,
        }
    }

    /// Install the answer key for a freshly generated topic, replacing any
    /// prior active key.
    pub fn begin_topic(&mut self, topic: Topic, answers: Vec<String>) {
        self.active_key = Some(ActiveKey { topic, answers });
    }

    /// Score a submitted sheet against the active key for `topic`.
    ///
    /// The result is stored into the per-topic map, overwriting any earlier
    /// result for the same topic, so resubmission is idempotent.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NoActiveKey` when no key for `topic` has
    /// been installed via `begin_topic`.
    pub fn score_submission(
        &mut self,
        topic: Topic,
        sheet: &AnswerSheet,
    ) -> Result<TestResult, SessionStateError> {
        let key = self
            .active_key_for(topic)
            .ok_or(SessionStateError::NoActiveKey { topic })?;
        let result = scoring::score_sheet(topic, key, sheet);
        self.results.insert(topic, result);
        Ok(result)
    }

    /// Record an externally computed result, overwriting any prior entry.
    pub fn record_result(&mut self, result: TestResult) {
        self.results.insert(result.topic, result);
    }

    /// Drain the completed results, leaving the session empty.
    ///
    /// The aggregator calls this once a row has been persisted.
    pub fn take_results(&mut self) -> BTreeMap<Topic, TestResult> {
        std::mem::take(&mut self.results)
    }

    /// Mark activity at `now`, deferring expiry.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active_at = now;
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_active_at > ttl
    }
}

/// Errors for session-state transitions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionStateError {
    #[error("no active answer key for topic {topic}")]
    NoActiveKey { topic: Topic },
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
