use async_trait::async_trait;
use csv::{ReaderBuilder, WriterBuilder};
use exam_core::model::ResultRow;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use super::mapping::{HEADER, cells_to_row, row_to_cells};
use crate::repository::{ResultsRepository, StorageError};

/// Results store backed by a headered CSV file.
///
/// The file is rewritten wholesale on every append: prior rows are loaded,
/// the new row is concatenated, and the combined table is committed by
/// writing a sibling temp file and renaming it over the store. The rename is
/// the atomic step; a crash mid-write leaves the previous store intact. The
/// per-store mutex serializes concurrent appends.
pub struct CsvResultsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CsvResultsStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub(crate) fn read_rows(path: &Path) -> Result<Vec<ResultRow>, StorageError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(|e| StorageError::Decode(e.to_string()))?;

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record.map_err(|e| StorageError::Decode(e.to_string()))?;
        let cells: Vec<String> = record.iter().map(str::to_string).collect();
        rows.push(cells_to_row(&cells, i + 1)?);
    }
    Ok(rows)
}

fn write_rows_atomic(path: &Path, rows: &[ResultRow]) -> Result<(), StorageError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let tmp = NamedTempFile::new_in(dir)?;
    let mut writer = WriterBuilder::new().from_writer(tmp);
    writer
        .write_record(HEADER)
        .map_err(|e| StorageError::Encode(e.to_string()))?;
    for row in rows {
        writer
            .write_record(row_to_cells(row))
            .map_err(|e| StorageError::Encode(e.to_string()))?;
    }

    let tmp = writer
        .into_inner()
        .map_err(|e| StorageError::Encode(e.to_string()))?;
    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl ResultsRepository for CsvResultsStore {
    async fn append_row(&self, row: &ResultRow) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;
        let mut rows = if self.path.exists() {
            read_rows(&self.path)?
        } else {
            Vec::new()
        };
        rows.push(row.clone());
        write_rows_atomic(&self.path, &rows)
    }

    async fn load_rows(&self) -> Result<Vec<ResultRow>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        read_rows(&self.path)
    }
}
