//! Statistical imputation methods.
//!
//! One fill strategy per semantic type: median for numbers, a constant label
//! for categories, the mode for booleans and the earliest timestamp for
//! datetimes. Each method rewrites the column in place and records what it
//! did in the caller's action list.

use crate::config::{EmptyBooleanPolicy, NormalizerConfig};
use crate::error::{InsightError, Result};
use crate::types::SemanticType;
use crate::utils::{
    datetime_millis, fill_boolean_nulls, fill_datetime_nulls, fill_numeric_nulls,
    fill_string_nulls, format_timestamp_millis, is_midnight_millis,
};
use polars::prelude::*;
use tracing::{debug, warn};

/// Outcome of filling one column.
#[derive(Debug, Clone, PartialEq)]
pub struct Imputation {
    /// Missing cells that were filled.
    pub filled: usize,
    /// The fill value, rendered as text.
    pub fill_value: String,
}

/// Statistical imputation methods for filling missing values.
pub struct StatisticalImputer;

impl StatisticalImputer {
    /// Fill the missing cells of `col_name` with the strategy for `semantic_type`.
    ///
    /// Returns `None` when the column has nothing to fill or is
    /// [`SemanticType::Text`], which is never imputed.
    pub fn impute_column(
        df: &mut DataFrame,
        col_name: &str,
        semantic_type: SemanticType,
        config: &NormalizerConfig,
        actions: &mut Vec<String>,
    ) -> Result<Option<Imputation>> {
        match semantic_type {
            SemanticType::Numeric => Self::apply_numeric_median(df, col_name, actions),
            SemanticType::Categorical => Self::apply_constant_label(
                df,
                col_name,
                &config.unknown_category_label,
                actions,
            ),
            SemanticType::Boolean => {
                Self::apply_boolean_mode(df, col_name, config.empty_boolean_policy, actions)
            }
            SemanticType::Datetime => Self::apply_datetime_min(df, col_name, actions),
            SemanticType::Text => Ok(None),
        }
    }

    /// Apply median imputation for numeric columns.
    ///
    /// # Errors
    ///
    /// [`InsightError::Imputation`] if the column has missing cells but no
    /// values to take a median from.
    pub fn apply_numeric_median(
        df: &mut DataFrame,
        col_name: &str,
        actions: &mut Vec<String>,
    ) -> Result<Option<Imputation>> {
        let series = column_series(df, col_name)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        let median = series
            .median()
            .ok_or_else(|| InsightError::imputation(col_name, "no values to take a median from"))?;

        let filled = fill_numeric_nulls(&series, median)?;
        df.replace(col_name, filled)?;

        actions.push(format!(
            "Filled {} missing values in '{}' with median: {}",
            missing, col_name, median
        ));
        Ok(Some(Imputation {
            filled: missing,
            fill_value: median.to_string(),
        }))
    }

    /// Fill a categorical column with a constant label.
    pub fn apply_constant_label(
        df: &mut DataFrame,
        col_name: &str,
        label: &str,
        actions: &mut Vec<String>,
    ) -> Result<Option<Imputation>> {
        let series = column_series(df, col_name)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        let filled = fill_string_nulls(&series, label)?;
        df.replace(col_name, filled)?;

        actions.push(format!(
            "Filled {} missing values in '{}' with constant value: '{}'",
            missing, col_name, label
        ));
        Ok(Some(Imputation {
            filled: missing,
            fill_value: label.to_string(),
        }))
    }

    /// Fill a boolean column with its most frequent value. Ties go to `false`.
    ///
    /// # Errors
    ///
    /// [`InsightError::Imputation`] if the column has no observed values and
    /// `policy` is [`EmptyBooleanPolicy::Fail`].
    pub fn apply_boolean_mode(
        df: &mut DataFrame,
        col_name: &str,
        policy: EmptyBooleanPolicy,
        actions: &mut Vec<String>,
    ) -> Result<Option<Imputation>> {
        let series = column_series(df, col_name)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        let (trues, falses) = series
            .bool()?
            .into_iter()
            .flatten()
            .fold((0usize, 0usize), |(t, f), v| if v { (t + 1, f) } else { (t, f + 1) });

        let (mode, method) = if trues + falses > 0 {
            (trues > falses, "mode")
        } else {
            match policy {
                EmptyBooleanPolicy::FillFalse => {
                    warn!(
                        "Column '{}' has no observed boolean values, filling with false",
                        col_name
                    );
                    (false, "default")
                }
                EmptyBooleanPolicy::Fail => {
                    return Err(InsightError::imputation(
                        col_name,
                        "no values to take a mode from",
                    ));
                }
            }
        };

        let filled = fill_boolean_nulls(&series, mode)?;
        df.replace(col_name, filled)?;

        actions.push(format!(
            "Filled {} missing values in '{}' with {}: {}",
            missing, col_name, method, mode
        ));
        Ok(Some(Imputation {
            filled: missing,
            fill_value: mode.to_string(),
        }))
    }

    /// Fill a datetime column with its earliest timestamp.
    ///
    /// # Errors
    ///
    /// [`InsightError::Imputation`] if the column has missing cells but no
    /// timestamps to take a minimum from.
    pub fn apply_datetime_min(
        df: &mut DataFrame,
        col_name: &str,
        actions: &mut Vec<String>,
    ) -> Result<Option<Imputation>> {
        let series = column_series(df, col_name)?;
        let missing = series.null_count();
        if missing == 0 {
            return Ok(None);
        }

        let earliest = datetime_millis(&series)?
            .into_iter()
            .flatten()
            .min()
            .ok_or_else(|| {
                InsightError::imputation(col_name, "no timestamps to take a minimum from")
            })?;

        let filled = fill_datetime_nulls(&series, earliest)?;
        df.replace(col_name, filled)?;

        let rendered = format_timestamp_millis(earliest, is_midnight_millis(earliest));
        debug!("Earliest timestamp in '{}' is {}", col_name, rendered);
        actions.push(format!(
            "Filled {} missing values in '{}' with earliest timestamp: {}",
            missing, col_name, rendered
        ));
        Ok(Some(Imputation {
            filled: missing,
            fill_value: rendered,
        }))
    }
}

fn column_series(df: &DataFrame, col_name: &str) -> Result<Series> {
    df.column(col_name)
        .map(|c| c.as_materialized_series().clone())
        .map_err(|_| InsightError::ColumnNotFound(col_name.to_string()))
}
