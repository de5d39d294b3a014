use std::sync::Arc;

use exam_core::model::{ExamSession, ResultRow};
use storage::repository::ResultsRepository;

use crate::error::ResultsError;

/// Flattens a completed session into one result row and persists it.
#[derive(Clone)]
pub struct ResultsService {
    results: Arc<dyn ResultsRepository>,
}

impl ResultsService {
    #[must_use]
    pub fn new(results: Arc<dyn ResultsRepository>) -> Self {
        Self { results }
    }

    /// Build the session's result row and append it to the store.
    ///
    /// Topics the session never took are recorded as `N/A`, distinct from a
    /// zero score. On success the session's per-topic results are drained:
    /// the row is the one durable record of the submission.
    ///
    /// # Errors
    ///
    /// Returns `ResultsError::NoResults` when the session holds no scored
    /// topics, `ResultsError::EmptyFeedback` when the feedback is blank, and
    /// `ResultsError::Storage` when the append fails (results are kept in
    /// the session so the caller can retry).
    pub async fn finalize(
        &self,
        session: &mut ExamSession,
        feedback: &str,
    ) -> Result<ResultRow, ResultsError> {
        let feedback = feedback.trim();
        if feedback.is_empty() {
            return Err(ResultsError::EmptyFeedback);
        }
        if session.results().is_empty() {
            return Err(ResultsError::NoResults);
        }

        let row = ResultRow::new(session.identity(), session.results(), feedback);
        self.results.append_row(&row).await?;
        session.take_results();
        Ok(row)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use exam_core::model::{SessionId, SubjectMarks, TestResult, Topic};
    use exam_core::time::fixed_now;
    use storage::repository::InMemoryRepository;

    fn build_session(results: &[(Topic, u32, u32)]) -> ExamSession {
        let mut session = ExamSession::new(SessionId::generate(), "Ada", fixed_now());
        for (topic, score, total) in results {
            session.record_result(TestResult::new(*topic, *score, *total).unwrap());
        }
        session
    }

    #[tokio::test]
    async fn finalize_appends_exactly_one_row() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ResultsService::new(repo.clone());
        let mut session = build_session(&[(Topic::Arithmetic, 4, 5), (Topic::Geometry, 2, 5)]);

        let row = service.finalize(&mut session, "good test").await.unwrap();
        assert_eq!(row.name, "Ada");
        assert_eq!(row.arithmetic, SubjectMarks::Attempted { score: 4, total: 5 });
        assert_eq!(row.algebra, SubjectMarks::NotAttempted);
        assert_eq!(row.feedback, "good test");

        let rows = repo.load_rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0], row);
    }

    #[tokio::test]
    async fn finalize_drains_the_session() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ResultsService::new(repo.clone());
        let mut session = build_session(&[(Topic::Algebra, 5, 5)]);

        service.finalize(&mut session, "done").await.unwrap();
        assert!(session.results().is_empty());

        let err = service.finalize(&mut session, "again").await.unwrap_err();
        assert!(matches!(err, ResultsError::NoResults));
        assert_eq!(repo.load_rows().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn blank_feedback_is_rejected_before_any_write() {
        let repo = Arc::new(InMemoryRepository::new());
        let service = ResultsService::new(repo.clone());
        let mut session = build_session(&[(Topic::Arithmetic, 1, 5)]);

        let err = service.finalize(&mut session, "  ").await.unwrap_err();
        assert!(matches!(err, ResultsError::EmptyFeedback));
        assert!(repo.load_rows().await.unwrap().is_empty());
        assert_eq!(session.results().len(), 1);
    }

    #[tokio::test]
    async fn empty_results_are_rejected() {
        let service = ResultsService::new(Arc::new(InMemoryRepository::new()));
        let mut session = build_session(&[]);

        let err = service.finalize(&mut session, "fine").await.unwrap_err();
        assert!(matches!(err, ResultsError::NoResults));
    }
}
