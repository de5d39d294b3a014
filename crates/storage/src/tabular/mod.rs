//! Tabular file backends for the results store.
//!
//! The store is a headered table (`name`, three score/total column pairs,
//! `feedback`), readable both as the platform's own persistent store and as
//! an uploaded dataset for analysis. Appends are implemented as load-all,
//! concatenate, atomic rewrite (temp file + rename) under a per-store lock.

mod csv_store;
mod mapping;
mod xlsx_store;

pub use csv_store::CsvResultsStore;
pub use xlsx_store::XlsxResultsStore;

use exam_core::model::ResultRow;
use std::path::Path;

use crate::repository::StorageError;

/// Worksheet holding the results table in an XLSX store.
pub const RESULTS_SHEET: &str = "Results";

/// Lowercased extension of a dataset path.
///
/// # Errors
///
/// Returns `StorageError::UnsupportedFormat` when the path has no extension.
pub fn dataset_extension(path: &Path) -> Result<String, StorageError> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| StorageError::UnsupportedFormat {
            extension: String::new(),
        })
}

/// Read a results dataset (the store itself, or an upload) by extension.
///
/// Only `.csv` and `.xlsx` are accepted; anything else is a client error,
/// not a crash.
///
/// # Errors
///
/// Returns `StorageError::UnsupportedFormat` for unknown extensions, and
/// decode errors for files that do not match the results schema.
pub fn read_dataset(path: &Path) -> Result<Vec<ResultRow>, StorageError> {
    match dataset_extension(path)?.as_str() {
        "csv" => csv_store::read_rows(path),
        "xlsx" => xlsx_store::read_rows(path),
        other => Err(StorageError::UnsupportedFormat {
            extension: other.to_string(),
        }),
    }
}
