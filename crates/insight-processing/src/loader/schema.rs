//! Reader-level typing of raw text columns.

use crate::utils::{is_na_token, parse_bool_literal, parse_integer_string, parse_numeric_string};
use polars::prelude::*;
use tracing::debug;

/// Storage a text column settles into after NA tokens are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderDtype {
    Int64,
    Float64,
    Boolean,
    String,
    /// Every cell is missing; read as a float column of nulls.
    AllMissing,
}

/// Apply the usual table-reader conventions to every `String` column.
///
/// Exact NA tokens become missing. A column whose remaining values all parse
/// as integers becomes `Int64`, as numbers `Float64`, as `true`/`false`
/// literals `Boolean`. A non-empty column with no values left becomes an
/// all-missing `Float64` column. Columns with any other storage are untouched.
pub fn apply_reader_semantics(df: DataFrame) -> PolarsResult<DataFrame> {
    let height = df.height();
    let mut columns = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let series = column.as_materialized_series();
        if series.dtype() != &DataType::String {
            columns.push(column.clone());
            continue;
        }

        let values: Vec<Option<&str>> = series
            .str()?
            .into_iter()
            .map(|v| v.filter(|s| !is_na_token(s)))
            .collect();

        let dtype = settle_dtype(&values, height);
        if dtype != ReaderDtype::String {
            debug!("Reader typed column '{}' as {:?}", series.name(), dtype);
        }

        let name = series.name().clone();
        let typed = match dtype {
            ReaderDtype::Int64 => {
                let parsed: Vec<Option<i64>> = values
                    .iter()
                    .map(|v| v.and_then(parse_integer_string))
                    .collect();
                Series::new(name, parsed)
            }
            ReaderDtype::Float64 => {
                let parsed: Vec<Option<f64>> = values
                    .iter()
                    .map(|v| v.and_then(parse_numeric_string))
                    .collect();
                Series::new(name, parsed)
            }
            ReaderDtype::Boolean => {
                let parsed: Vec<Option<bool>> = values
                    .iter()
                    .map(|v| v.and_then(parse_bool_literal))
                    .collect();
                Series::new(name, parsed)
            }
            ReaderDtype::AllMissing => Series::full_null(name, height, &DataType::Float64),
            ReaderDtype::String => Series::new(name, values),
        };
        columns.push(typed.into_column());
    }

    DataFrame::new(columns)
}

fn settle_dtype(values: &[Option<&str>], height: usize) -> ReaderDtype {
    let present: Vec<&str> = values.iter().flatten().copied().collect();

    if present.is_empty() {
        return if height == 0 {
            ReaderDtype::String
        } else {
            ReaderDtype::AllMissing
        };
    }

    if present.iter().all(|s| parse_integer_string(s).is_some()) {
        ReaderDtype::Int64
    } else if present.iter().all(|s| parse_numeric_string(s).is_some()) {
        ReaderDtype::Float64
    } else if present.iter().all(|s| parse_bool_literal(s).is_some()) {
        ReaderDtype::Boolean
    } else {
        ReaderDtype::String
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integers_and_floats() {
        let df = df![
            "ints" => ["1", "2", "NA"],
            "floats" => ["1.5", "2", "3"],
        ]
        .unwrap();
        let typed = apply_reader_semantics(df).unwrap();

        assert_eq!(typed.column("ints").unwrap().dtype(), &DataType::Int64);
        assert_eq!(typed.column("ints").unwrap().null_count(), 1);
        assert_eq!(typed.column("floats").unwrap().dtype(), &DataType::Float64);
    }

    #[test]
    fn test_mixed_text_stays_string_with_na_removed() {
        let df = df!["code" => ["A1", "42", "N/A", "B7"]].unwrap();
        let typed = apply_reader_semantics(df).unwrap();

        let series = typed.column("code").unwrap().as_materialized_series();
        assert_eq!(series.dtype(), &DataType::String);
        let values: Vec<_> = series.str().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some("A1"), Some("42"), None, Some("B7")]);
    }

    #[test]
    fn test_boolean_literals_any_case() {
        let df = df!["flag" => ["True", "false", "FALSE", ""]].unwrap();
        let typed = apply_reader_semantics(df).unwrap();

        let flag = typed.column("flag").unwrap();
        assert_eq!(flag.dtype(), &DataType::Boolean);
        assert_eq!(flag.null_count(), 1);
    }

    #[test]
    fn test_all_missing_column_becomes_float_nulls() {
        let df = df!["empty" => ["", "NA", "null"]].unwrap();
        let typed = apply_reader_semantics(df).unwrap();

        let empty = typed.column("empty").unwrap();
        assert_eq!(empty.dtype(), &DataType::Float64);
        assert_eq!(empty.null_count(), 3);
    }

    #[test]
    fn test_zero_rows_stay_string() {
        let df = DataFrame::new(vec![
            Series::new_empty("a".into(), &DataType::String).into_column(),
        ])
        .unwrap();
        let typed = apply_reader_semantics(df).unwrap();
        assert_eq!(typed.column("a").unwrap().dtype(), &DataType::String);
        assert_eq!(typed.height(), 0);
    }

    #[test]
    fn test_non_string_columns_untouched() {
        let df = df![
            "x" => [1.0, 2.0],
            "y" => [true, false],
        ]
        .unwrap();
        let typed = apply_reader_semantics(df.clone()).unwrap();
        assert!(typed.equals_missing(&df));
    }

    #[test]
    fn test_lowercase_na_is_data() {
        let df = df!["v" => ["na", "b"]].unwrap();
        let typed = apply_reader_semantics(df).unwrap();
        assert_eq!(typed.column("v").unwrap().null_count(), 0);
    }
}
