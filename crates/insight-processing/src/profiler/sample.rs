//! Fixed-layout text rendering of the first rows of a table.

use crate::utils::{
    datetime_millis, format_timestamp_millis, is_midnight_millis, timestamp_dtype, truncate_str,
};
use polars::prelude::*;

const COLUMN_SEPARATOR: &str = "  ";
const MISSING: &str = "null";

/// Render the first `rows` rows of `df` as right-aligned text columns.
///
/// The first line holds the column names. Every cell is cut to
/// `max_cell_width` characters. A table with no rows renders as an empty
/// string.
pub(crate) fn render_sample(df: &DataFrame, rows: usize, max_cell_width: usize) -> PolarsResult<String> {
    let head = df.head(Some(rows));
    if head.height() == 0 || head.width() == 0 {
        return Ok(String::new());
    }

    let mut columns: Vec<Vec<String>> = Vec::with_capacity(head.width());
    for column in head.get_columns() {
        let series = column.as_materialized_series();
        let mut cells = Vec::with_capacity(head.height() + 1);
        cells.push(truncate_str(series.name().as_str(), max_cell_width));
        cells.extend(
            column_cells(series)?
                .iter()
                .map(|cell| truncate_str(cell, max_cell_width)),
        );
        columns.push(cells);
    }

    let widths: Vec<usize> = columns
        .iter()
        .map(|cells| cells.iter().map(|c| c.chars().count()).max().unwrap_or(0))
        .collect();

    let lines: Vec<String> = (0..=head.height())
        .map(|row| {
            columns
                .iter()
                .zip(&widths)
                .map(|(cells, width)| format!("{:>width$}", cells[row], width = *width))
                .collect::<Vec<_>>()
                .join(COLUMN_SEPARATOR)
        })
        .collect();

    Ok(lines.join("\n"))
}

/// Text form of every cell in a column.
fn column_cells(series: &Series) -> PolarsResult<Vec<String>> {
    let render = |v: Option<String>| v.unwrap_or_else(|| MISSING.to_string());

    let cells = match series.dtype() {
        DataType::String => series
            .str()?
            .into_iter()
            .map(|v| render(v.map(str::to_string)))
            .collect(),
        DataType::Float64 => series
            .f64()?
            .into_iter()
            .map(|v| render(v.map(|f| f.to_string())))
            .collect(),
        DataType::Boolean => series
            .bool()?
            .into_iter()
            .map(|v| render(v.map(|b| b.to_string())))
            .collect(),
        DataType::Datetime(_, _) | DataType::Date => {
            let millis = datetime_millis(&series.cast(&timestamp_dtype())?)?;
            let date_only = millis.iter().flatten().all(|ms| is_midnight_millis(*ms));
            millis
                .into_iter()
                .map(|v| render(v.map(|ms| format_timestamp_millis(ms, date_only))))
                .collect()
        }
        _ => match series.cast(&DataType::String) {
            Ok(text) => text
                .str()?
                .into_iter()
                .map(|v| render(v.map(str::to_string)))
                .collect(),
            Err(_) => series.iter().map(|v| v.to_string()).collect(),
        },
    };

    Ok(cells)
}
