//! Spreadsheet parsing with calamine.
//!
//! Only the first worksheet is read. Its first row is the header; the
//! remaining rows are data. Each column keeps the native kind of its cells
//! when they agree (all numbers, all booleans, all dates) and falls back to
//! text otherwise.

use crate::error::LoadError;
use crate::utils::millis_to_datetime_series;
use calamine::{Data, DataType as _, Reader, open_workbook_auto_from_rs};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use tracing::debug;

/// Storage chosen for one spreadsheet column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Empty,
    Int64,
    Float64,
    Boolean,
    Datetime,
    Text,
}

pub(crate) fn read_spreadsheet(bytes: &[u8], filename: &str) -> Result<DataFrame, LoadError> {
    let spreadsheet_error = |reason: String| LoadError::Spreadsheet {
        file: filename.to_string(),
        reason,
    };

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LoadError::EmptyWorkbook(filename.to_string()))?
        .map_err(|e| spreadsheet_error(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        debug!("Worksheet in '{}' is empty", filename);
        return Ok(DataFrame::empty());
    };
    let headers = header_names(header_row)?;
    let body: Vec<&[Data]> = rows.collect();

    let mut columns = Vec::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        let cells: Vec<&Data> = body
            .iter()
            .map(|row| row.get(idx).unwrap_or(&Data::Empty))
            .collect();
        let series = column_from_cells(name, &cells).map_err(|e| spreadsheet_error(e.to_string()))?;
        columns.push(series.into_column());
    }

    debug!(
        "Parsed worksheet in '{}': {} rows, {} columns",
        filename,
        body.len(),
        columns.len()
    );
    DataFrame::new(columns).map_err(|e| spreadsheet_error(e.to_string()))
}

/// Header cells as column names; blanks become `column_<n>` (1-based).
fn header_names(row: &[Data]) -> Result<Vec<String>, LoadError> {
    let mut seen = HashSet::with_capacity(row.len());
    let mut names = Vec::with_capacity(row.len());

    for (idx, cell) in row.iter().enumerate() {
        let raw = cell.as_string().unwrap_or_else(|| cell.to_string());
        let name = if raw.trim().is_empty() {
            format!("column_{}", idx + 1)
        } else {
            raw
        };
        if !seen.insert(name.clone()) {
            return Err(LoadError::DuplicateColumn(name));
        }
        names.push(name);
    }

    Ok(names)
}

fn is_missing_cell(cell: &Data) -> bool {
    matches!(cell, Data::Empty | Data::Error(_))
}

fn classify_cells(cells: &[&Data]) -> CellKind {
    let present: Vec<&Data> = cells.iter().copied().filter(|c| !is_missing_cell(c)).collect();
    if present.is_empty() {
        return CellKind::Empty;
    }

    if present.iter().all(|c| matches!(c, Data::Int(_) | Data::Float(_))) {
        let all_whole = present.iter().all(|c| match c {
            Data::Float(f) => f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64,
            _ => true,
        });
        return if all_whole {
            CellKind::Int64
        } else {
            CellKind::Float64
        };
    }

    if present.iter().all(|c| matches!(c, Data::Bool(_))) {
        return CellKind::Boolean;
    }

    if present
        .iter()
        .all(|c| matches!(c, Data::DateTime(_) | Data::DateTimeIso(_)) && c.as_datetime().is_some())
    {
        return CellKind::Datetime;
    }

    CellKind::Text
}

/// Build one column from its cells (header excluded).
fn column_from_cells(name: &str, cells: &[&Data]) -> PolarsResult<Series> {
    let name: PlSmallStr = name.into();
    let kind = classify_cells(cells);

    let series = match kind {
        CellKind::Empty => Series::full_null(name, cells.len(), &DataType::Float64),
        CellKind::Int64 => {
            let values: Vec<Option<i64>> = cells.iter().map(|c| c.as_i64()).collect();
            Series::new(name, values)
        }
        CellKind::Float64 => {
            let values: Vec<Option<f64>> = cells.iter().map(|c| c.as_f64()).collect();
            Series::new(name, values)
        }
        CellKind::Boolean => {
            let values: Vec<Option<bool>> = cells.iter().map(|c| c.get_bool()).collect();
            Series::new(name, values)
        }
        CellKind::Datetime => {
            let values: Vec<Option<i64>> = cells
                .iter()
                .map(|c| c.as_datetime().map(|dt| dt.and_utc().timestamp_millis()))
                .collect();
            millis_to_datetime_series(name, values)?
        }
        CellKind::Text => {
            let values: Vec<Option<String>> = cells
                .iter()
                .map(|c| match c {
                    cell if is_missing_cell(cell) => None,
                    Data::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect();
            Series::new(name, values)
        }
    };

    Ok(series)
}
