//! Per-type coercion of raw columns.
//!
//! Cells that cannot be represented in the target type become missing; the
//! converters report how many non-missing cells were lost that way.

use crate::error::{InsightError, Result};
use crate::utils::{
    is_numeric_dtype, is_temporal_dtype, is_textual_dtype, millis_to_datetime_series,
    parse_numeric_string, timestamp_dtype,
};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;

/// Datetime formats tried in order after RFC 3339.
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only formats, read as midnight.
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %b %Y",
    "%b %d, %Y",
];

static YEAR_MONTH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})[-/](\d{1,2})$").expect("Invalid regex: YYYY-MM"));

fn non_missing(series: &Series) -> usize {
    series.len() - series.null_count()
}

/// Coerce a column to `Float64`. Uncastable storage becomes all missing.
pub(crate) fn to_numeric(series: &Series) -> PolarsResult<(Series, usize)> {
    let before = non_missing(series);

    let numeric = if is_textual_dtype(series.dtype()) {
        let values: Vec<Option<f64>> = text_values(series)?
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_numeric_string))
            .collect();
        Series::new(series.name().clone(), values)
    } else {
        match series.cast(&DataType::Float64) {
            Ok(cast) => cast,
            Err(_) => Series::full_null(series.name().clone(), series.len(), &DataType::Float64),
        }
    };

    let lost = before.saturating_sub(non_missing(&numeric));
    Ok((numeric, lost))
}

/// Plain `String` storage for a textual column.
pub(crate) fn text_values(series: &Series) -> PolarsResult<Series> {
    if series.dtype() == &DataType::String {
        Ok(series.clone())
    } else {
        series.cast(&DataType::String)
    }
}

/// Coerce a column to millisecond timestamps.
///
/// Numbers always have a timestamp reading (see [`numeric_to_timestamp`]), so
/// a numeric column named like a date becomes a datetime column even when
/// the name misleads.
///
/// # Errors
///
/// [`InsightError::TypeConversion`] when the storage cannot hold timestamps
/// at all (booleans, nested values), or when a text column has values and
/// none of them parse.
pub(crate) fn to_datetime(series: &Series, column: &str) -> Result<(Series, usize)> {
    let conversion_error = |reason: String| InsightError::TypeConversion {
        column: column.to_string(),
        target_type: "datetime".to_string(),
        reason,
    };

    let dtype = series.dtype();
    let before = non_missing(series);

    let converted = if is_temporal_dtype(dtype) {
        series
            .cast(&timestamp_dtype())
            .map_err(|e| conversion_error(e.to_string()))?
    } else if is_textual_dtype(dtype) {
        let millis: Vec<Option<i64>> = text_values(series)?
            .str()?
            .into_iter()
            .map(|v| v.and_then(parse_timestamp_str))
            .collect();
        millis_to_datetime_series(series.name().clone(), millis)?
    } else if is_numeric_dtype(dtype) {
        let millis: Vec<Option<i64>> = series
            .cast(&DataType::Float64)?
            .f64()?
            .into_iter()
            .map(|v| v.and_then(numeric_to_timestamp))
            .collect();
        millis_to_datetime_series(series.name().clone(), millis)?
    } else {
        return Err(conversion_error(format!("{} values are not timestamps", dtype)));
    };

    let after = non_missing(&converted);
    if is_textual_dtype(dtype) && before > 0 && after == 0 {
        return Err(conversion_error(format!(
            "none of {} values parse as a date or time",
            before
        )));
    }

    Ok((converted, before.saturating_sub(after)))
}

/// Parse one text cell as a timestamp in epoch milliseconds.
pub fn parse_timestamp_str(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(number) = parse_numeric_string(s) {
        return numeric_to_millis(number);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }

    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return date_millis(date);
        }
    }

    let caps = YEAR_MONTH.captures(s)?;
    let year = caps[1].parse::<i32>().ok()?;
    let month = caps[2].parse::<u32>().ok()?;
    NaiveDate::from_ymd_opt(year, month, 1).and_then(date_millis)
}

/// Interpret a number as a timestamp.
///
/// Whole numbers in 1000..=9999 are calendar years. Values in the 10-digit
/// range are epoch seconds, in the 13-digit range epoch milliseconds.
/// Anything else has no timestamp reading.
pub fn numeric_to_millis(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }

    if value.fract() == 0.0 && (1000.0..=9999.0).contains(&value) {
        return NaiveDate::from_ymd_opt(value as i32, 1, 1).and_then(date_millis);
    }

    if value > 1_000_000_000.0 && value < 2_000_000_000.0 {
        Some((value * 1000.0) as i64)
    } else if value > 1_000_000_000_000.0 && value < 2_000_000_000_000.0 {
        Some(value as i64)
    } else {
        None
    }
}

/// Timestamp reading of a numeric cell.
///
/// Calendar readings from [`numeric_to_millis`] come first; any other finite
/// number is an offset in milliseconds from the Unix epoch, truncated toward
/// zero.
pub fn numeric_to_timestamp(value: f64) -> Option<i64> {
    if !value.is_finite() {
        return None;
    }
    numeric_to_millis(value).or(Some(value.trunc() as i64))
}

fn date_millis(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::datetime_millis;

    const JAN_1_2021: i64 = 1_609_459_200_000;
    const JAN_1_2022: i64 = 1_640_995_200_000;

    // ========================================================================
    // to_numeric() tests
    // ========================================================================

    #[test]
    fn test_to_numeric_from_integers() {
        let series = Series::new("n".into(), &[Some(1i64), None, Some(7)]);
        let (numeric, lost) = to_numeric(&series).unwrap();

        assert_eq!(numeric.dtype(), &DataType::Float64);
        assert_eq!(numeric.null_count(), 1);
        assert_eq!(lost, 0);
    }

    #[test]
    fn test_to_numeric_from_text_counts_failures() {
        let series = Series::new("n".into(), &[Some("1.5"), Some("abc"), None]);
        let (numeric, lost) = to_numeric(&series).unwrap();

        assert_eq!(numeric.null_count(), 2);
        assert_eq!(lost, 1);
        assert_eq!(numeric.get(0).unwrap().try_extract::<f64>().unwrap(), 1.5);
    }

    // ========================================================================
    // to_datetime() tests
    // ========================================================================

    #[test]
    fn test_to_datetime_years() {
        let series = Series::new("Order_Date".into(), &[2021i64, 2022]);
        let (converted, lost) = to_datetime(&series, "Order_Date").unwrap();

        assert_eq!(converted.dtype(), &timestamp_dtype());
        assert_eq!(lost, 0);
        assert_eq!(
            datetime_millis(&converted).unwrap(),
            vec![Some(JAN_1_2021), Some(JAN_1_2022)]
        );
    }

    #[test]
    fn test_to_datetime_small_counts_are_epoch_offsets() {
        let series = Series::new("day_count".into(), &[3i64, 5, 7, 9]);
        let (converted, lost) = to_datetime(&series, "day_count").unwrap();

        assert_eq!(converted.dtype(), &timestamp_dtype());
        assert_eq!(lost, 0);
        assert_eq!(
            datetime_millis(&converted).unwrap(),
            vec![Some(3), Some(5), Some(7), Some(9)]
        );
    }

    #[test]
    fn test_to_datetime_non_finite_numbers_become_missing() {
        let series = Series::new("time_spent".into(), &[Some(1.5), Some(f64::NAN), None]);
        let (converted, lost) = to_datetime(&series, "time_spent").unwrap();

        assert_eq!(lost, 1);
        assert_eq!(
            datetime_millis(&converted).unwrap(),
            vec![Some(1), None, None]
        );
    }

    #[test]
    fn test_to_datetime_unparseable_strings_become_missing() {
        let series = Series::new(
            "date".into(),
            &[Some("2021-01-01"), Some("not a date"), None],
        );
        let (converted, lost) = to_datetime(&series, "date").unwrap();

        assert_eq!(lost, 1);
        assert_eq!(
            datetime_millis(&converted).unwrap(),
            vec![Some(JAN_1_2021), None, None]
        );
    }

    #[test]
    fn test_to_datetime_boolean_storage_fails() {
        let series = Series::new("is_today".into(), &[true, false]);
        let err = to_datetime(&series, "is_today").unwrap_err();
        assert_eq!(err.error_code(), "TYPE_CONVERSION_FAILED");
    }

    #[test]
    fn test_to_datetime_nothing_parses_fails() {
        let series = Series::new("day_of_week".into(), &["Monday", "Tuesday"]);
        assert!(to_datetime(&series, "day_of_week").is_err());
    }

    #[test]
    fn test_to_datetime_all_missing_is_not_a_failure() {
        let series = Series::new("date".into(), &[None::<&str>, None]);
        let (converted, lost) = to_datetime(&series, "date").unwrap();
        assert_eq!(converted.null_count(), 2);
        assert_eq!(lost, 0);
    }

    #[test]
    fn test_to_datetime_is_idempotent_on_timestamps() {
        let series =
            millis_to_datetime_series("ts".into(), vec![Some(JAN_1_2021), None]).unwrap();
        let (converted, _) = to_datetime(&series, "ts").unwrap();
        assert!(converted.equals_missing(&series));
    }

    // ========================================================================
    // parse_timestamp_str() / numeric_to_millis() tests
    // ========================================================================

    #[test]
    fn test_parse_timestamp_str_formats() {
        assert_eq!(parse_timestamp_str("2021-01-01"), Some(JAN_1_2021));
        assert_eq!(parse_timestamp_str("2021/01/01"), Some(JAN_1_2021));
        assert_eq!(parse_timestamp_str("01/01/2021"), Some(JAN_1_2021));
        assert_eq!(parse_timestamp_str("1 Jan 2021"), Some(JAN_1_2021));
        assert_eq!(parse_timestamp_str("2021-01"), Some(JAN_1_2021));
        assert_eq!(parse_timestamp_str(" 2021 "), Some(JAN_1_2021));
        assert_eq!(
            parse_timestamp_str("2021-01-01 01:00:00"),
            Some(JAN_1_2021 + 3_600_000)
        );
        assert_eq!(
            parse_timestamp_str("2021-01-01T01:00:00+01:00"),
            Some(JAN_1_2021)
        );
        assert_eq!(parse_timestamp_str("soon"), None);
        assert_eq!(parse_timestamp_str("2021-13"), None);
    }

    #[test]
    fn test_numeric_to_millis_ranges() {
        assert_eq!(numeric_to_millis(2021.0), Some(JAN_1_2021));
        assert_eq!(numeric_to_millis(1_609_459_200.0), Some(JAN_1_2021));
        assert_eq!(numeric_to_millis(1_609_459_200_000.0), Some(JAN_1_2021));
        assert_eq!(numeric_to_millis(2021.5), None);
        assert_eq!(numeric_to_millis(42.0), None);
        assert_eq!(numeric_to_millis(f64::NAN), None);
    }

    #[test]
    fn test_numeric_to_timestamp_falls_back_to_epoch_offset() {
        assert_eq!(numeric_to_timestamp(2021.0), Some(JAN_1_2021));
        assert_eq!(numeric_to_timestamp(42.0), Some(42));
        assert_eq!(numeric_to_timestamp(-2.9), Some(-2));
        assert_eq!(numeric_to_timestamp(f64::INFINITY), None);
    }
}
