//! Reading uploaded files into raw tables.
//!
//! The loader is the only place the pipeline touches file formats. It picks a
//! parser from the file extension, then applies reader-level semantics (NA
//! tokens become missing, all-numeric text becomes numbers) so the normalizer
//! sees the same raw storage types regardless of the source format.

mod csv;
mod schema;
mod spreadsheet;

pub use schema::apply_reader_semantics;

use crate::error::LoadError;
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Parser chosen for an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    /// xlsx, xlsm, xlsb, xls or ods.
    Spreadsheet,
}

impl SourceFormat {
    /// `.csv` selects the CSV parser; every other name goes to the spreadsheet parser.
    pub fn from_filename(filename: &str) -> Self {
        let is_csv = Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv {
            SourceFormat::Csv
        } else {
            SourceFormat::Spreadsheet
        }
    }
}

/// Parse an uploaded byte stream into a raw table.
///
/// # Errors
///
/// Returns a [`LoadError`] if the bytes cannot be parsed as tabular data in
/// the format implied by `filename`.
pub fn load_table(bytes: &[u8], filename: &str) -> Result<DataFrame, LoadError> {
    let format = SourceFormat::from_filename(filename);
    debug!("Loading '{}' as {:?} ({} bytes)", filename, format, bytes.len());

    let df = match format {
        SourceFormat::Csv => csv::read_csv(bytes, filename)?,
        SourceFormat::Spreadsheet => spreadsheet::read_spreadsheet(bytes, filename)?,
    };

    let df = apply_reader_semantics(df).map_err(|e| {
        let file = filename.to_string();
        let reason = e.to_string();
        match format {
            SourceFormat::Csv => LoadError::Csv { file, reason },
            SourceFormat::Spreadsheet => LoadError::Spreadsheet { file, reason },
        }
    })?;

    info!("Loaded '{}': {:?}", filename, df.shape());
    Ok(df)
}

/// Read a file from disk and parse it with [`load_table`].
pub fn load_path(path: impl AsRef<Path>) -> Result<DataFrame, LoadError> {
    let path = path.as_ref();
    let display = path.display().to_string();
    let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
        file: display.clone(),
        source,
    })?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(display.as_str());
    load_table(&bytes, filename)
}
