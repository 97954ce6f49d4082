//! CSV parsing.

use crate::error::LoadError;
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::collections::HashSet;
use std::io::Cursor;
use tracing::debug;

/// Parse CSV bytes with a header row.
///
/// Every column is read as text; typing happens afterwards in
/// [`apply_reader_semantics`](super::apply_reader_semantics) so a stray value
/// deep in the file can never abort the read.
pub(crate) fn read_csv(bytes: &[u8], filename: &str) -> Result<DataFrame, LoadError> {
    check_header_unique(bytes, filename)?;

    let cursor = Cursor::new(bytes.to_vec());

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .into_reader_with_file_handle(cursor)
        .finish()
        .map_err(|e| LoadError::Csv {
            file: filename.to_string(),
            reason: e.to_string(),
        })?;

    debug!("Parsed CSV '{}' with {} columns", filename, df.width());
    Ok(df)
}

/// Reject a header row that repeats a name.
///
/// The reader itself renames repeats (`a`, `a_duplicated_0`), so the raw
/// first record is read on its own and checked here.
fn check_header_unique(bytes: &[u8], filename: &str) -> Result<(), LoadError> {
    let csv_error = |e: PolarsError| LoadError::Csv {
        file: filename.to_string(),
        reason: e.to_string(),
    };

    let header = CsvReadOptions::default()
        .with_has_header(false)
        .with_n_rows(Some(1))
        .with_infer_schema_length(Some(0))
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(csv_error)?;

    if header.height() == 0 {
        return Ok(());
    }

    let mut seen = HashSet::with_capacity(header.width());
    for column in header.get_columns() {
        let cells = column.as_materialized_series().str().map_err(csv_error)?;
        if let Some(name) = cells.get(0) {
            if !seen.insert(name.to_string()) {
                return Err(LoadError::DuplicateColumn(name.to_string()));
            }
        }
    }
    Ok(())
}
