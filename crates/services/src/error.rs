//! Shared error types for the services crate.

use thiserror::Error;

use exam_core::model::{SessionStateError, Topic};
use storage::repository::StorageError;

use crate::analysis::ChartError;
use crate::generator::{ModelError, ParseReplyError};

/// Errors emitted by `QuestionService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GeneratorError {
    #[error("model rate limit still exceeded after {attempts} attempts")]
    RateLimitExhausted { attempts: u32 },
    #[error("malformed model reply: {0}")]
    Malformed(#[from] ParseReplyError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Errors emitted by session operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("identity must not be blank")]
    BlankIdentity,
    #[error("no session for the given token")]
    UnknownSession,
    #[error("no active answer key for topic {topic}")]
    NoActiveKey { topic: Topic },
    #[error(transparent)]
    Generator(#[from] GeneratorError),
}

impl From<SessionStateError> for SessionError {
    fn from(err: SessionStateError) -> Self {
        match err {
            SessionStateError::NoActiveKey { topic } => SessionError::NoActiveKey { topic },
        }
    }
}

/// Errors emitted by `ResultsService` and the finalize flow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ResultsError {
    #[error("no test results to submit")]
    NoResults,
    #[error("feedback must not be blank")]
    EmptyFeedback,
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Errors emitted by `AnalysisService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AnalysisError {
    #[error(transparent)]
    Dataset(#[from] StorageError),
    #[error(transparent)]
    Chart(#[from] ChartError),
}
