use std::collections::BTreeMap;
use std::fs;

use exam_core::model::{ResultRow, SubjectMarks, TestResult, Topic};
use storage::repository::{ResultsRepository, Storage, StorageError};
use storage::tabular::{CsvResultsStore, XlsxResultsStore, read_dataset};

fn build_row(name: &str, arithmetic: Option<(u32, u32)>, feedback: &str) -> ResultRow {
    let mut results = BTreeMap::new();
    if let Some((score, total)) = arithmetic {
        results.insert(
            Topic::Arithmetic,
            TestResult::new(Topic::Arithmetic, score, total).unwrap(),
        );
    }
    results.insert(Topic::Algebra, TestResult::new(Topic::Algebra, 2, 5).unwrap());
    ResultRow::new(name, &results, feedback)
}

#[tokio::test]
async fn csv_append_preserves_prior_rows_verbatim() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.csv");
    let store = CsvResultsStore::new(&path);

    store
        .append_row(&build_row("Ada", Some((8, 10)), "great"))
        .await
        .unwrap();
    let before = fs::read_to_string(&path).unwrap();
    let rows_before = store.load_rows().await.unwrap();
    assert_eq!(rows_before.len(), 1);

    store
        .append_row(&build_row("Grace", Some((6, 10)), "it was ok"))
        .await
        .unwrap();
    let after = fs::read_to_string(&path).unwrap();
    let rows_after = store.load_rows().await.unwrap();

    assert_eq!(rows_after.len(), rows_before.len() + 1);
    assert!(after.starts_with(&before), "prior content must be untouched");
    assert_eq!(rows_after[0], rows_before[0]);
    assert_eq!(rows_after[1].name, "Grace");
}

#[tokio::test]
async fn csv_store_reads_as_empty_before_first_append() {
    let dir = tempfile::tempdir().unwrap();
    let store = CsvResultsStore::new(dir.path().join("missing.csv"));
    assert!(store.load_rows().await.unwrap().is_empty());
}

#[tokio::test]
async fn csv_round_trips_not_attempted_cells() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.csv");
    let store = CsvResultsStore::new(&path);

    store
        .append_row(&build_row("Ada", None, "skipped arithmetic"))
        .await
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.lines().next().unwrap().starts_with("name,arithmetic_score"));
    assert!(content.contains("N/A"));

    let rows = store.load_rows().await.unwrap();
    assert_eq!(rows[0].arithmetic, SubjectMarks::NotAttempted);
    assert_eq!(rows[0].algebra, SubjectMarks::Attempted { score: 2, total: 5 });
}

#[tokio::test]
async fn xlsx_round_trips_rows_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("results.xlsx");
    let store = XlsxResultsStore::new(&path);

    store
        .append_row(&build_row("Ada", Some((8, 10)), "great"))
        .await
        .unwrap();
    store
        .append_row(&build_row("Grace", None, "hard to say"))
        .await
        .unwrap();

    let rows = store.load_rows().await.unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].name, "Ada");
    assert_eq!(rows[0].arithmetic, SubjectMarks::Attempted { score: 8, total: 10 });
    assert_eq!(rows[1].arithmetic, SubjectMarks::NotAttempted);
    assert_eq!(rows[1].feedback, "hard to say");
}

#[tokio::test]
async fn dataset_reader_accepts_both_formats() {
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("upload.csv");
    Storage::csv(&csv_path)
        .results
        .append_row(&build_row("Ada", Some((8, 10)), "great"))
        .await
        .unwrap();
    assert_eq!(read_dataset(&csv_path).unwrap().len(), 1);

    let xlsx_path = dir.path().join("upload.xlsx");
    Storage::xlsx(&xlsx_path)
        .results
        .append_row(&build_row("Grace", Some((6, 10)), "fine"))
        .await
        .unwrap();
    assert_eq!(read_dataset(&xlsx_path).unwrap().len(), 1);
}

#[tokio::test]
async fn dataset_reader_rejects_other_extensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("upload.txt");
    fs::write(&path, "name,feedback\n").unwrap();

    let err = read_dataset(&path).unwrap_err();
    assert!(matches!(
        err,
        StorageError::UnsupportedFormat { extension } if extension == "txt"
    ));
}

#[test]
fn malformed_cells_surface_row_numbers() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.csv");
    fs::write(
        &path,
        "name,arithmetic_score,arithmetic_total,algebra_score,algebra_total,geometry_score,geometry_total,feedback\n\
         Ada,eight,10,2,5,1,5,hm\n",
    )
    .unwrap();

    let err = read_dataset(&path).unwrap_err();
    assert!(matches!(err, StorageError::MalformedRow { row: 1, .. }));
}
