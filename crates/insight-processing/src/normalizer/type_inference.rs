//! Semantic type inference for raw columns.

use crate::config::NormalizerConfig;
use crate::types::SemanticType;
use crate::utils::{distinct_non_missing, is_boolean_dtype, is_temporal_dtype, is_textual_dtype};
use polars::prelude::*;

/// Classification of one raw column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TypeInference {
    /// Type implied by the column's storage and values alone.
    pub value_shape: SemanticType,
    /// Distinct/total ratio; only computed for textual storage.
    pub unique_ratio: Option<f64>,
    /// The column name contains one of the datetime keywords.
    pub datetime_name: bool,
}

impl TypeInference {
    /// The type the column is coerced to. A datetime name wins over value shape.
    pub fn semantic_type(&self) -> SemanticType {
        if self.datetime_name {
            SemanticType::Datetime
        } else {
            self.value_shape
        }
    }
}

/// Classify a column from its storage, values and name.
///
/// `row_count` is the table height after deduplication. The storage branch
/// is evaluated once, in order: textual, boolean, temporal, then numeric.
///
/// The unknown-category label does not count towards the distinct ratio, so
/// a column filled by a previous pass classifies the same way again.
pub fn infer_type(
    series: &Series,
    column_name: &str,
    row_count: usize,
    config: &NormalizerConfig,
) -> PolarsResult<TypeInference> {
    let dtype = series.dtype();

    let (value_shape, ratio) = if is_textual_dtype(dtype) {
        let ratio = unique_ratio(series, row_count, Some(&config.unknown_category_label))?;
        let shape = if ratio < config.categorical_ratio_threshold {
            SemanticType::Categorical
        } else {
            SemanticType::Text
        };
        (shape, Some(ratio))
    } else if is_boolean_dtype(dtype) {
        (SemanticType::Boolean, None)
    } else if is_temporal_dtype(dtype) {
        (SemanticType::Datetime, None)
    } else {
        (SemanticType::Numeric, None)
    };

    Ok(TypeInference {
        value_shape,
        unique_ratio: ratio,
        datetime_name: config.is_datetime_name(column_name),
    })
}

/// Distinct non-missing values over `row_count`; 0.0 for an empty table.
///
/// A value equal to `placeholder` is left out of the distinct count.
pub fn unique_ratio(
    series: &Series,
    row_count: usize,
    placeholder: Option<&str>,
) -> PolarsResult<f64> {
    if row_count == 0 {
        return Ok(0.0);
    }
    let mut distinct = distinct_non_missing(series)?;
    if let Some(label) = placeholder {
        if contains_text(series, label)? {
            distinct -= 1;
        }
    }
    Ok(distinct as f64 / row_count as f64)
}

fn contains_text(series: &Series, value: &str) -> PolarsResult<bool> {
    let text = if series.dtype() == &DataType::String {
        series.clone()
    } else {
        series.cast(&DataType::String)?
    };
    Ok(text.str()?.into_iter().any(|v| v == Some(value)))
}
