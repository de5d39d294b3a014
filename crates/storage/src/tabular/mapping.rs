//! Conversion between `ResultRow` and raw table cells.

use exam_core::model::{ResultRow, SubjectMarks};

use crate::repository::StorageError;

/// Store header, in column order.
pub(crate) const HEADER: [&str; 8] = [
    "name",
    "arithmetic_score",
    "arithmetic_total",
    "algebra_score",
    "algebra_total",
    "geometry_score",
    "geometry_total",
    "feedback",
];

pub(crate) fn row_to_cells(row: &ResultRow) -> [String; 8] {
    [
        row.name.clone(),
        row.arithmetic.score_cell(),
        row.arithmetic.total_cell(),
        row.algebra.score_cell(),
        row.algebra.total_cell(),
        row.geometry.score_cell(),
        row.geometry.total_cell(),
        row.feedback.clone(),
    ]
}

/// Rebuild a row from raw cells. `index` is the 1-based data-row position,
/// used only for error reporting.
pub(crate) fn cells_to_row(cells: &[String], index: usize) -> Result<ResultRow, StorageError> {
    if cells.len() < HEADER.len() {
        return Err(StorageError::MalformedRow {
            row: index,
            reason: format!("expected {} columns, found {}", HEADER.len(), cells.len()),
        });
    }

    let marks = |score: &String, total: &String| {
        SubjectMarks::from_cells(score, total).map_err(|e| StorageError::MalformedRow {
            row: index,
            reason: e.to_string(),
        })
    };

    Ok(ResultRow {
        name: cells[0].trim().to_string(),
        arithmetic: marks(&cells[1], &cells[2])?,
        algebra: marks(&cells[3], &cells[4])?,
        geometry: marks(&cells[5], &cells[6])?,
        feedback: cells[7].clone(),
    })
}
