use async_trait::async_trait;
use exam_core::model::ResultRow;
use std::path::Path;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use crate::tabular::{CsvResultsStore, XlsxResultsStore, dataset_extension};

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("unsupported dataset format: .{extension}")]
    UnsupportedFormat { extension: String },

    #[error("malformed store row {row}: {reason}")]
    MalformedRow { row: usize, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),
}

/// Repository contract for the append-only results store.
#[async_trait]
pub trait ResultsRepository: Send + Sync {
    /// Append one row to the end of the store, preserving every prior row
    /// and their order. Appends are serialized per store.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the row cannot be persisted.
    async fn append_row(&self, row: &ResultRow) -> Result<(), StorageError>;

    /// Load the full store contents in append order.
    ///
    /// A store that does not exist yet reads as empty.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the store exists but cannot be decoded.
    async fn load_rows(&self) -> Result<Vec<ResultRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    rows: Arc<Mutex<Vec<ResultRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ResultsRepository for InMemoryRepository {
    async fn append_row(&self, row: &ResultRow) -> Result<(), StorageError> {
        let mut guard = self
            .rows
            .lock()
            .map_err(|e| StorageError::Encode(e.to_string()))?;
        guard.push(row.clone());
        Ok(())
    }

    async fn load_rows(&self) -> Result<Vec<ResultRow>, StorageError> {
        let guard = self
            .rows
            .lock()
            .map_err(|e| StorageError::Decode(e.to_string()))?;
        Ok(guard.clone())
    }
}

/// Aggregates the results repository behind a trait object for easy backend
/// swapping.
#[derive(Clone)]
pub struct Storage {
    pub results: Arc<dyn ResultsRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            results: Arc::new(InMemoryRepository::new()),
        }
    }

    /// Build a `Storage` backed by a CSV file.
    #[must_use]
    pub fn csv(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            results: Arc::new(CsvResultsStore::new(path)),
        }
    }

    /// Build a `Storage` backed by an XLSX workbook.
    #[must_use]
    pub fn xlsx(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            results: Arc::new(XlsxResultsStore::new(path)),
        }
    }

    /// Pick the backend from the store path's extension.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::UnsupportedFormat` for anything other than
    /// `.csv` or `.xlsx`.
    pub fn open(path: &Path) -> Result<Self, StorageError> {
        match dataset_extension(path)?.as_str() {
            "csv" => Ok(Self::csv(path)),
            "xlsx" => Ok(Self::xlsx(path)),
            other => Err(StorageError::UnsupportedFormat {
                extension: other.to_string(),
            }),
        }
    }
}
