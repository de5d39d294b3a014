use async_trait::async_trait;
use calamine::{Data, Reader, Xlsx, XlsxError, open_workbook};
use exam_core::model::ResultRow;
use rust_xlsxwriter::Workbook;
use std::fs;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use super::RESULTS_SHEET;
use super::mapping::{HEADER, cells_to_row, row_to_cells};
use crate::repository::{ResultsRepository, StorageError};

/// Results store backed by an XLSX workbook with a single `Results` sheet.
///
/// Same commit discipline as the CSV backend: full rewrite into a sibling
/// temp file, then an atomic rename, serialized by a per-store mutex.
pub struct XlsxResultsStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl XlsxResultsStore {
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
    let mut workbook: Xlsx<BufReader<fs::File>> =
        open_workbook(path).map_err(|e: XlsxError| StorageError::Decode(e.to_string()))?;

    // Our own store always carries the `Results` sheet; uploads may use any
    // sheet name, so fall back to the first one.
    let range = match workbook.worksheet_range(RESULTS_SHEET) {
        Ok(range) => range,
        Err(_) => {
            let first = workbook
                .sheet_names()
                .first()
                .cloned()
                .ok_or_else(|| StorageError::Decode("workbook has no sheets".to_string()))?;
            workbook
                .worksheet_range(&first)
                .map_err(|e| StorageError::Decode(e.to_string()))?
        }
    };

    let mut rows = Vec::new();
    for (i, record) in range.rows().skip(1).enumerate() {
        let cells: Vec<String> = record.iter().map(cell_text).collect();
        if cells.iter().all(String::is_empty) {
            continue;
        }
        rows.push(cells_to_row(&cells, i + 1)?);
    }
    Ok(rows)
}

/// Flatten a spreadsheet cell to the text form the row mapping expects.
/// Whole-number floats (how xlsx readers surface integers) lose the `.0`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn write_rows_atomic(path: &Path, rows: &[ResultRow]) -> Result<(), StorageError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir)?;

    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet
        .set_name(RESULTS_SHEET)
        .map_err(|e| StorageError::Encode(e.to_string()))?;

    for (col, title) in HEADER.iter().enumerate() {
        sheet
            .write_string(0, col as u16, *title)
            .map_err(|e| StorageError::Encode(e.to_string()))?;
    }
    for (r, row) in rows.iter().enumerate() {
        let cells = row_to_cells(row);
        for (c, cell) in cells.iter().enumerate() {
            let row_idx = (r + 1) as u32;
            let col_idx = c as u16;
            match cell.parse::<i64>() {
                Ok(n) => sheet
                    .write_number(row_idx, col_idx, n as f64)
                    .map_err(|e| StorageError::Encode(e.to_string()))?,
                Err(_) => sheet
                    .write_string(row_idx, col_idx, cell)
                    .map_err(|e| StorageError::Encode(e.to_string()))?,
            };
        }
    }

    let tmp = NamedTempFile::new_in(dir)?;
    workbook
        .save(tmp.path())
        .map_err(|e| StorageError::Encode(e.to_string()))?;
    tmp.persist(path).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl ResultsRepository for XlsxResultsStore {
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
