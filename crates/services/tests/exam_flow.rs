use std::sync::Arc;

use async_trait::async_trait;
use exam_core::model::{SubjectMarks, Topic};
use exam_core::scoring::AnswerSheet;
use exam_core::time::fixed_clock;
use services::generator::ModelError;
use services::{AppServices, QuestionModel, ResultsError, SentimentTally, SessionError};
use storage::repository::{ResultsRepository, Storage};

/// Deterministic stand-in for the language-model collaborator.
struct CannedModel;

#[async_trait]
impl QuestionModel for CannedModel {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, ModelError> {
        // The user prompt names the topic; vary the key per topic so the
        // test can tell the answer sets apart.
        let prefix = if user.contains("arithmetic") {
            "sum"
        } else if user.contains("algebra") {
            "x"
        } else {
            "angle"
        };
        let reply = (1..=5)
            .map(|i| format!("Question {i}: placeholder {i}?\nAnswer: {prefix}{i}\n"))
            .collect::<String>();
        Ok(reply)
    }
}

fn sheet(entries: &[(u32, &str)]) -> AnswerSheet {
    entries
        .iter()
        .map(|(i, a)| (*i, (*a).to_string()))
        .collect()
}

fn build_services(storage: &Storage, chart_dir: &std::path::Path) -> AppServices {
    AppServices::new(
        Arc::new(CannedModel),
        storage.clone(),
        fixed_clock(),
        chart_dir,
    )
}

#[tokio::test]
async fn full_exam_flow_persists_one_row() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::in_memory();
    let services = build_services(&storage, dir.path());
    let exam = services.exam();

    let id = services.registry().login("Ada").await.unwrap();

    let questions = exam
        .generate_questions(id, Topic::Arithmetic)
        .await
        .unwrap();
    assert_eq!(questions.len(), 5);

    // Three of five correct; comparison is trimmed and case-folded.
    let result = exam
        .submit_answers(
            id,
            Topic::Arithmetic,
            &sheet(&[(1, " SUM1 "), (2, "sum2"), (3, "sum3"), (4, "wrong"), (5, "")]),
        )
        .await
        .unwrap();
    assert_eq!(result.score, 3);
    assert_eq!(result.total, 5);

    // Resubmission overwrites rather than accumulates.
    let again = exam
        .submit_answers(id, Topic::Arithmetic, &sheet(&[(1, "sum1")]))
        .await
        .unwrap();
    assert_eq!(again.score, 1);

    exam.generate_questions(id, Topic::Algebra).await.unwrap();
    let algebra = exam
        .submit_answers(id, Topic::Algebra, &sheet(&[(1, "x1"), (2, "x2")]))
        .await
        .unwrap();
    assert_eq!(algebra.score, 2);

    let row = exam.finalize(id, "great set of questions").await.unwrap();
    assert_eq!(row.name, "Ada");
    assert_eq!(row.arithmetic, SubjectMarks::Attempted { score: 1, total: 5 });
    assert_eq!(row.algebra, SubjectMarks::Attempted { score: 2, total: 5 });
    assert_eq!(row.geometry, SubjectMarks::NotAttempted);

    let rows = storage.results.load_rows().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0], row);

    // The finalize drained the session, so there is nothing left to submit.
    let err = exam.finalize(id, "again").await.unwrap_err();
    assert!(matches!(err, ResultsError::NoResults));
    assert_eq!(storage.results.load_rows().await.unwrap().len(), 1);
}

#[tokio::test]
async fn submitting_without_generating_is_a_client_error() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::in_memory();
    let services = build_services(&storage, dir.path());

    let id = services.registry().login("Grace").await.unwrap();
    let err = services
        .exam()
        .submit_answers(id, Topic::Geometry, &sheet(&[(1, "angle1")]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        SessionError::NoActiveKey {
            topic: Topic::Geometry
        }
    ));
}

#[tokio::test]
async fn finalize_requires_feedback() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::in_memory();
    let services = build_services(&storage, dir.path());
    let exam = services.exam();

    let id = services.registry().login("Edsger").await.unwrap();
    exam.generate_questions(id, Topic::Geometry).await.unwrap();
    exam.submit_answers(id, Topic::Geometry, &sheet(&[(1, "angle1")]))
        .await
        .unwrap();

    let err = exam.finalize(id, "   ").await.unwrap_err();
    assert!(matches!(err, ResultsError::EmptyFeedback));

    // The session still holds its results after the rejected finalize.
    let row = exam.finalize(id, "all good").await.unwrap();
    assert_eq!(row.geometry, SubjectMarks::Attempted { score: 1, total: 5 });
}

#[tokio::test]
async fn produced_rows_feed_the_analysis_stage() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Storage::in_memory();
    let services = build_services(&storage, dir.path());
    let exam = services.exam();

    for (name, correct, feedback) in [
        ("Alice", 4, "great job, really enjoyable"),
        ("Bob", 2, "terrible experience, hated it"),
    ] {
        let id = services.registry().login(name).await.unwrap();
        exam.generate_questions(id, Topic::Arithmetic).await.unwrap();
        let answers: Vec<(u32, String)> = (1..=correct).map(|i| (i, format!("sum{i}"))).collect();
        exam.submit_answers(id, Topic::Arithmetic, &answers.into_iter().collect())
            .await
            .unwrap();
        exam.finalize(id, feedback).await.unwrap();
    }

    let rows = storage.results.load_rows().await.unwrap();
    let report = services
        .analysis()
        .subject_report(&rows, Topic::Arithmetic)
        .unwrap();

    let names: Vec<&str> = report.standings.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["Alice", "Bob"]);
    assert_eq!(report.standings[0].percentage, 80.0);
    assert_eq!(report.sentiment, SentimentTally { positive: 1, negative: 1 });
    assert!(report.standings[0].chart.exists());
}
