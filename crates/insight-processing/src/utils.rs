//! Shared utilities for the insight pipeline.
//!
//! Dtype predicates, cell-level parsing helpers and null-filling routines used
//! by the loader, the normalizer and the imputers.

use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType stores calendar timestamps (date or datetime).
#[inline]
pub fn is_temporal_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Datetime(_, _) | DataType::Date)
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

/// Check if a DataType stores text (plain strings or dictionary-encoded strings).
#[inline]
pub fn is_textual_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::String | DataType::Categorical(_, _))
}

/// The `Datetime` storage every normalized datetime column uses.
pub fn timestamp_dtype() -> DataType {
    DataType::Datetime(TimeUnit::Milliseconds, None)
}

// =============================================================================
// String Parsing Utilities
// =============================================================================

/// Cell contents a table reader treats as "no value".
pub const NA_TOKENS: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Check if a raw cell is a missing-value token. Matching is exact, as in
/// common CSV readers; `"na"` or `" NA "` are kept as data.
pub fn is_na_token(s: &str) -> bool {
    NA_TOKENS.contains(&s)
}

/// Try to parse a string as a number, ignoring surrounding whitespace.
pub fn parse_numeric_string(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok()
}

/// Try to parse a string as an integer, ignoring surrounding whitespace.
pub fn parse_integer_string(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<i64>().ok()
}

/// Parse `true`/`false` in any letter case.
pub fn parse_bool_literal(s: &str) -> Option<bool> {
    let trimmed = s.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

/// Truncate a string to `max_chars` characters, marking the cut with `...`.
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(3);
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

/// Render a millisecond timestamp, dropping the time part at midnight.
pub fn format_timestamp_millis(ms: i64, date_only: bool) -> String {
    match chrono::DateTime::from_timestamp_millis(ms) {
        Some(dt) if date_only => dt.naive_utc().format("%Y-%m-%d").to_string(),
        Some(dt) => dt.naive_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ms.to_string(),
    }
}

/// True if a millisecond timestamp falls exactly on midnight.
pub fn is_midnight_millis(ms: i64) -> bool {
    ms.rem_euclid(86_400_000) == 0
}

// =============================================================================
// Series Utilities
// =============================================================================

/// Number of distinct non-missing values in a Series.
pub fn distinct_non_missing(series: &Series) -> PolarsResult<usize> {
    let non_null = series.drop_nulls();
    if non_null.is_empty() {
        return Ok(0);
    }
    non_null.n_unique()
}

/// Physical millisecond values of a datetime Series.
pub fn datetime_millis(series: &Series) -> PolarsResult<Vec<Option<i64>>> {
    let divisor = match series.dtype() {
        DataType::Datetime(TimeUnit::Nanoseconds, _) => 1_000_000,
        DataType::Datetime(TimeUnit::Microseconds, _) => 1_000,
        _ => 1,
    };
    let physical = series.cast(&DataType::Int64)?;
    Ok(physical
        .i64()?
        .into_iter()
        .map(|v| v.map(|raw| raw.div_euclid(divisor)))
        .collect())
}

/// Build a millisecond datetime Series from physical values.
pub fn millis_to_datetime_series(name: PlSmallStr, values: Vec<Option<i64>>) -> PolarsResult<Series> {
    Series::new(name, values).cast(&timestamp_dtype())
}

/// Fill null values in a Float64 Series with a specific value.
pub fn fill_numeric_nulls(series: &Series, fill_value: f64) -> PolarsResult<Series> {
    let values: Vec<Option<f64>> = series
        .f64()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a String Series with a specific value.
pub fn fill_string_nulls(series: &Series, fill_value: &str) -> PolarsResult<Series> {
    let values: Vec<Option<String>> = series
        .str()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value).to_string()))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a Boolean Series with a specific value.
pub fn fill_boolean_nulls(series: &Series, fill_value: bool) -> PolarsResult<Series> {
    let values: Vec<Option<bool>> = series
        .bool()?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_value)))
        .collect();
    Ok(Series::new(series.name().clone(), values))
}

/// Fill null values in a datetime Series with a millisecond timestamp.
pub fn fill_datetime_nulls(series: &Series, fill_millis: i64) -> PolarsResult<Series> {
    let values = datetime_millis(series)?
        .into_iter()
        .map(|v| Some(v.unwrap_or(fill_millis)))
        .collect();
    millis_to_datetime_series(series.name().clone(), values)
}

// =============================================================================
// Tests
// =============================================================================
