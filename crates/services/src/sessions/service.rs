use std::sync::Arc;

use exam_core::model::{ResultRow, SessionId, TestResult, Topic};
use exam_core::scoring::AnswerSheet;

use super::registry::SessionRegistry;
use crate::error::{ResultsError, SessionError};
use crate::generator::QuestionService;
use crate::results_service::ResultsService;

/// Orchestrates the per-session exam flow: generate questions for a topic,
/// score submitted answers, and finalize into one persisted row.
///
/// Each operation resolves the caller's session token through the registry,
/// so all state lives in an explicit session object. A generation call
/// blocks the calling task for the full model round trip.
#[derive(Clone)]
pub struct ExamService {
    questions: Arc<QuestionService>,
    registry: Arc<SessionRegistry>,
    results: Arc<ResultsService>,
}

impl ExamService {
    #[must_use]
    pub fn new(
        questions: Arc<QuestionService>,
        registry: Arc<SessionRegistry>,
        results: Arc<ResultsService>,
    ) -> Self {
        Self {
            questions,
            registry,
            results,
        }
    }

    /// Generate a topic's questions, install the answer key in the session,
    /// and return the question texts for display.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::UnknownSession` for a dead token and
    /// propagates generator failures via `SessionError::Generator`.
    pub async fn generate_questions(
        &self,
        id: SessionId,
        topic: Topic,
    ) -> Result<Vec<String>, SessionError> {
        let set = self.questions.generate(topic).await?;
        let (questions, answers) = set.into_parts();
        self.registry
            .with_session(id, |session| session.begin_topic(topic, answers))
            .await?;
        Ok(questions)
    }

    /// Score a submitted answer sheet for a topic and record the result.
    ///
    /// Resubmitting the same sheet yields the same result; the per-topic
    /// entry is overwritten, never duplicated.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoActiveKey` when the topic was never
    /// generated for this session, and `SessionError::UnknownSession` for a
    /// dead token.
    pub async fn submit_answers(
        &self,
        id: SessionId,
        topic: Topic,
        sheet: &AnswerSheet,
    ) -> Result<TestResult, SessionError> {
        self.registry
            .with_session(id, |session| session.score_submission(topic, sheet))
            .await?
            .map_err(SessionError::from)
    }

    /// Flatten the session's results plus feedback into one row and append
    /// it to the persistent store.
    ///
    /// The session is checked out of the registry for the duration, so a
    /// concurrent finalize for the same token cannot double-append.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::NoResults` or `ResultsError::EmptyFeedback`
    /// for client mistakes, storage errors if the append fails, and
    /// `ResultsError::Session` for a dead token.
    pub async fn finalize(
        &self,
        id: SessionId,
        feedback: &str,
    ) -> Result<ResultRow, ResultsError> {
        let mut session = self.registry.take(id).await?;
        let outcome = self.results.finalize(&mut session, feedback).await;
        self.registry.restore(session).await;
        outcome
    }
}
