//! Table normalization: deduplication, type inference, coercion and imputation.
//!
//! A raw table goes through five steps, always on a copy:
//! 1. Remove exact duplicate rows (first occurrence kept)
//! 2. Infer a semantic type per column and coerce its values
//! 3. Re-read columns with date-like names as timestamps
//! 4. Fill missing values per semantic type
//! 5. Remove rows that only became duplicates through steps 2-4

mod converters;
mod type_inference;

pub use converters::{numeric_to_millis, numeric_to_timestamp, parse_timestamp_str};
pub use type_inference::{TypeInference, infer_type, unique_ratio};

use crate::config::NormalizerConfig;
use crate::error::{Result, ResultExt};
use crate::imputers::StatisticalImputer;
use crate::types::{ColumnReport, ColumnSchema, NormalizationReport, NormalizedTable, SemanticType};
use converters::{text_values, to_datetime, to_numeric};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Turns raw tables into [`NormalizedTable`]s.
#[derive(Debug, Clone, Default)]
pub struct TableNormalizer {
    config: NormalizerConfig,
}

/// A column after steps 2 and 3.
struct CoercedColumn {
    series: Series,
    semantic_type: SemanticType,
    coerced_to_missing: usize,
    datetime_fallback: Option<String>,
}

impl TableNormalizer {
    /// Create a normalizer, validating the configuration.
    pub fn new(config: NormalizerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize a raw table. The input is not modified.
    ///
    /// # Errors
    ///
    /// [`InsightError::Imputation`](crate::InsightError::Imputation) if a
    /// column needs a statistic but has no values to compute it from.
    pub fn normalize(&self, raw: &DataFrame) -> Result<NormalizedTable> {
        self.normalize_with_report(raw).map(|(table, _)| table)
    }

    /// Normalize a raw table and report what changed.
    pub fn normalize_with_report(
        &self,
        raw: &DataFrame,
    ) -> Result<(NormalizedTable, NormalizationReport)> {
        let mut report = NormalizationReport {
            rows_before: raw.height(),
            ..Default::default()
        };

        info!("Normalizing table with shape {:?}", raw.shape());

        // 1. Remove duplicate rows
        let deduped = deduplicate(raw).context("Removing duplicate rows")?;
        report.duplicates_removed = raw.height() - deduped.height();
        if report.duplicates_removed > 0 {
            report.actions.push(format!(
                "Removed {} duplicate rows",
                report.duplicates_removed
            ));
            debug!("Removed {} duplicate rows", report.duplicates_removed);
        } else {
            report.actions.push("No duplicate rows found".to_string());
        }

        // 2-3. Classify and coerce each column
        let row_count = deduped.height();
        let mut columns = Vec::with_capacity(deduped.width());
        let mut schema = Vec::with_capacity(deduped.width());

        for column in deduped.get_columns() {
            let series = column.as_materialized_series();
            let name = series.name().to_string();

            let inference = infer_type(series, &name, row_count, &self.config)
                .context(format!("Inferring type of '{}'", name))?;
            let coerced = self.coerce_column(series, &name, &inference)?;

            debug!(
                "Column '{}': {} -> {} ({} values coerced to missing)",
                name,
                series.dtype(),
                coerced.semantic_type,
                coerced.coerced_to_missing
            );
            if coerced.coerced_to_missing > 0 {
                report.actions.push(format!(
                    "Converted '{}' to {}; {} values could not be parsed",
                    name, coerced.semantic_type, coerced.coerced_to_missing
                ));
            }
            if let Some(reason) = &coerced.datetime_fallback {
                report.actions.push(format!(
                    "Kept '{}' as {}: not readable as dates ({})",
                    name, coerced.semantic_type, reason
                ));
            }

            report.columns.push(ColumnReport {
                name: name.clone(),
                source_dtype: series.dtype().to_string(),
                semantic_type: coerced.semantic_type,
                unique_ratio: inference.unique_ratio,
                coerced_to_missing: coerced.coerced_to_missing,
                imputed: 0,
                fill_value: None,
                datetime_fallback: coerced.datetime_fallback,
            });
            schema.push(ColumnSchema {
                name,
                semantic_type: coerced.semantic_type,
            });
            columns.push(coerced.series.into_column());
        }

        let mut frame = DataFrame::new(columns)?;

        // 4. Impute missing values
        for (column, column_report) in schema.iter().zip(report.columns.iter_mut()) {
            let imputation = StatisticalImputer::impute_column(
                &mut frame,
                &column.name,
                column.semantic_type,
                &self.config,
                &mut report.actions,
            )?;
            if let Some(imputation) = imputation {
                column_report.imputed = imputation.filled;
                column_report.fill_value = Some(imputation.fill_value);
            }
        }

        // 5. Settle duplicates created by coercion and imputation
        let settled = deduplicate(&frame).context("Removing settled duplicate rows")?;
        report.settled_duplicates_removed = frame.height() - settled.height();
        if report.settled_duplicates_removed > 0 {
            report.actions.push(format!(
                "Removed {} rows that became duplicates after cleaning",
                report.settled_duplicates_removed
            ));
        }
        report.rows_after = settled.height();

        info!(
            "Normalization complete: {} -> {} rows, {} columns",
            report.rows_before,
            report.rows_after,
            settled.width()
        );

        Ok((NormalizedTable::new(settled, schema), report))
    }

    /// Coerce one column to its inferred type.
    ///
    /// Datetime coercion for date-like names is the only step allowed to fail
    /// softly: on error the column keeps its value-shape type.
    fn coerce_column(
        &self,
        series: &Series,
        name: &str,
        inference: &TypeInference,
    ) -> Result<CoercedColumn> {
        let mut datetime_fallback = None;

        if inference.semantic_type() == SemanticType::Datetime {
            match to_datetime(series, name) {
                Ok((converted, lost)) => {
                    return Ok(CoercedColumn {
                        series: converted,
                        semantic_type: SemanticType::Datetime,
                        coerced_to_missing: lost,
                        datetime_fallback: None,
                    });
                }
                Err(e) => {
                    warn!(
                        "Column '{}' could not be read as dates, keeping it as {}: {}",
                        name, inference.value_shape, e
                    );
                    datetime_fallback = Some(e.to_string());
                }
            }
        }

        let (series, semantic_type, coerced_to_missing) = match inference.value_shape {
            SemanticType::Numeric => {
                let (numeric, lost) = to_numeric(series)?;
                (numeric, SemanticType::Numeric, lost)
            }
            SemanticType::Categorical => (text_values(series)?, SemanticType::Categorical, 0),
            SemanticType::Boolean => (series.clone(), SemanticType::Boolean, 0),
            SemanticType::Text => (series.clone(), SemanticType::Text, 0),
            // Timestamp storage that failed to convert; read it as numbers.
            SemanticType::Datetime => {
                let (numeric, lost) = to_numeric(series)?;
                (numeric, SemanticType::Numeric, lost)
            }
        };

        Ok(CoercedColumn {
            series,
            semantic_type,
            coerced_to_missing,
            datetime_fallback,
        })
    }
}

/// Remove rows equal to an earlier row across all columns, keeping order.
pub(crate) fn deduplicate(df: &DataFrame) -> PolarsResult<DataFrame> {
    if df.width() == 0 || df.height() < 2 {
        return Ok(df.clone());
    }
    df.unique_stable(None, UniqueKeepStrategy::First, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmptyBooleanPolicy;
    use crate::error::InsightError;
    use crate::utils::datetime_millis;

    const JAN_1_2021: i64 = 1_609_459_200_000;

    fn normalize(df: &DataFrame) -> NormalizedTable {
        TableNormalizer::default().normalize(df).unwrap()
    }

    fn f64_values(table: &NormalizedTable, name: &str) -> Vec<Option<f64>> {
        table
            .frame()
            .column(name)
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    fn str_values(table: &NormalizedTable, name: &str) -> Vec<Option<String>> {
        table
            .frame()
            .column(name)
            .unwrap()
            .as_materialized_series()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    #[test]
    fn test_low_cardinality_status_is_categorical() {
        let ids: Vec<i64> = (0..100).collect();
        let status: Vec<&str> = (0..100)
            .map(|i| if i % 3 == 0 { "inactive" } else { "active" })
            .collect();
        let df = df!["row" => ids, "status" => status].unwrap();

        let table = normalize(&df);
        assert_eq!(
            table.semantic_type("status"),
            Some(SemanticType::Categorical)
        );
        assert_eq!(table.height(), 100);
    }

    #[test]
    fn test_unique_ids_stay_text() {
        let ids: Vec<String> = (0..100).map(|i| format!("C{i:03}")).collect();
        let df = df!["id" => ids.clone()].unwrap();

        let table = normalize(&df);
        assert_eq!(table.semantic_type("id"), Some(SemanticType::Text));
        assert_eq!(
            table.frame().column("id").unwrap().dtype(),
            &DataType::String
        );
    }

    #[test]
    fn test_order_date_years_become_datetime() {
        let df = df![
            "Order_Date" => [Some("2021"), Some("2022"), Some("someday"), None],
            "amount" => [1.0, 2.0, 3.0, 4.0],
        ]
        .unwrap();

        let (table, report) = TableNormalizer::default()
            .normalize_with_report(&df)
            .unwrap();

        assert_eq!(
            table.semantic_type("Order_Date"),
            Some(SemanticType::Datetime)
        );
        let order_date = table.frame().column("Order_Date").unwrap();
        assert_eq!(order_date.null_count(), 0);
        let millis = datetime_millis(order_date.as_materialized_series()).unwrap();
        // "someday" and the missing cell are filled with the earliest year
        assert_eq!(millis[2], Some(JAN_1_2021));
        assert_eq!(millis[3], Some(JAN_1_2021));

        let column = &report.columns[0];
        assert_eq!(column.coerced_to_missing, 1);
        assert_eq!(column.imputed, 2);
        assert_eq!(column.fill_value.as_deref(), Some("2021-01-01"));
    }

    #[test]
    fn test_numeric_year_column_named_date() {
        let df = df!["year" => [2021i64, 2022, 2023]].unwrap();
        let table = normalize(&df);
        assert_eq!(table.semantic_type("year"), Some(SemanticType::Datetime));
    }

    #[test]
    fn test_numeric_column_named_like_date_becomes_datetime() {
        let df = df!["day_count" => [3i64, 5, 7, 9]].unwrap();

        let (table, report) = TableNormalizer::default()
            .normalize_with_report(&df)
            .unwrap();

        assert_eq!(
            table.semantic_type("day_count"),
            Some(SemanticType::Datetime)
        );
        assert!(report.columns[0].datetime_fallback.is_none());
        let millis =
            datetime_millis(table.frame().column("day_count").unwrap().as_materialized_series())
                .unwrap();
        assert_eq!(millis, vec![Some(3), Some(5), Some(7), Some(9)]);
    }

    #[test]
    fn test_numeric_median_imputation() {
        let df = df!["value" => [Some(1.0), Some(3.0), None, Some(7.0)]].unwrap();
        let table = normalize(&df);

        assert_eq!(table.semantic_type("value"), Some(SemanticType::Numeric));
        assert_eq!(
            f64_values(&table, "value"),
            vec![Some(1.0), Some(3.0), Some(3.0), Some(7.0)]
        );
    }

    #[test]
    fn test_empty_table() {
        let df = DataFrame::new(vec![
            Series::new_empty("name".into(), &DataType::String).into_column(),
            Series::new_empty("price".into(), &DataType::Float64).into_column(),
            Series::new_empty("created_at".into(), &DataType::String).into_column(),
        ])
        .unwrap();

        let (table, report) = TableNormalizer::default()
            .normalize_with_report(&df)
            .unwrap();
        assert_eq!(table.height(), 0);
        assert_eq!(table.width(), 3);
        assert_eq!(report.columns[0].unique_ratio, Some(0.0));
        assert_eq!(table.semantic_type("name"), Some(SemanticType::Categorical));
    }

    // ========================================================================
    // Invariants
    // ========================================================================

    #[test]
    fn test_duplicates_removed_keeping_first() {
        let df = df![
            "a" => [1i64, 2, 1, 3, 2],
            "b" => ["x", "y", "x", "z", "y"],
        ]
        .unwrap();

        let (table, report) = TableNormalizer::default()
            .normalize_with_report(&df)
            .unwrap();
        assert_eq!(report.duplicates_removed, 2);
        assert_eq!(
            f64_values(&table, "a"),
            vec![Some(1.0), Some(2.0), Some(3.0)]
        );
    }

    #[test]
    fn test_imputation_created_duplicates_are_settled() {
        // Row 2 becomes (3.0, "a") after median imputation, equal to row 1
        let df = df![
            "value" => [Some(3.0), None, Some(1.0), Some(5.0)],
            "group" => ["a", "a", "b", "c"],
        ]
        .unwrap();

        let (table, report) = TableNormalizer::default()
            .normalize_with_report(&df)
            .unwrap();
        assert_eq!(report.settled_duplicates_removed, 1);
        assert_eq!(table.height(), 3);
        assert_eq!(deduplicate(table.frame()).unwrap().height(), table.height());
    }

    #[test]
    fn test_normalization_is_idempotent() {
        let df = df![
            "status" => [Some("on"), Some("off"), Some("on"), Some("on"), None, Some("on"), Some("off"), Some("on"), Some("off"), Some("on"), Some("on"), Some("off")],
            "score" => [Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0), Some(6.0), Some(7.0), Some(8.0), Some(9.0), Some(10.0), Some(11.0), None],
            "active" => [Some(true), None, Some(false), Some(true), Some(true), Some(false), Some(true), Some(true), Some(true), Some(false), Some(true), Some(false)],
            "signup_date" => [Some("2021-03-01"), Some("2021-01-15"), None, Some("2021-02-01"), Some("2021-02-02"), Some("2021-02-03"), Some("2021-02-04"), Some("2021-02-05"), Some("2021-02-06"), Some("2021-02-07"), Some("2021-02-08"), Some("2021-02-09")],
        ]
        .unwrap();

        let once = normalize(&df);
        let twice = normalize(once.frame());

        assert!(once.frame().equals_missing(twice.frame()));
        assert_eq!(once.columns(), twice.columns());
        assert_eq!(
            once.semantic_type("signup_date"),
            Some(SemanticType::Datetime)
        );
    }

    #[test]
    fn test_idempotent_when_unknown_reaches_threshold() {
        // 2 distinct + 1 missing over 10 rows: adding "Unknown" would make 3/10
        let status = [
            Some("open"), Some("closed"), None, Some("open"), Some("open"),
            Some("closed"), Some("open"), Some("open"), Some("closed"), Some("open"),
        ];
        let ids: Vec<i64> = (0..10).collect();
        let df = df!["ticket" => ids, "status" => status].unwrap();

        let once = normalize(&df);
        let twice = normalize(once.frame());

        assert_eq!(
            once.semantic_type("status"),
            Some(SemanticType::Categorical)
        );
        assert_eq!(once.columns(), twice.columns());
        assert!(once.frame().equals_missing(twice.frame()));
    }

    #[test]
    fn test_input_is_not_mutated() {
        let df = df!["v" => [Some(1.0), None, Some(1.0), Some(1.0)]].unwrap();
        let copy = df.clone();
        let _ = normalize(&df);
        assert!(df.equals_missing(&copy));
    }

    #[test]
    fn test_storage_matches_semantic_type() {
        let df = df![
            "count" => [Some(1i64), None, Some(3)],
            "flag" => [Some(true), Some(false), None],
            "notes" => [Some("first note"), None, Some("third note")],
        ]
        .unwrap();

        let table = normalize(&df);
        for column in table.columns() {
            let dtype = table.frame().column(&column.name).unwrap().dtype();
            assert!(column.semantic_type.accepts_dtype(dtype), "{}", column.name);
        }
        // Text is never imputed
        assert_eq!(table.frame().column("notes").unwrap().null_count(), 1);
        assert_eq!(table.frame().column("count").unwrap().null_count(), 0);
    }

    #[test]
    fn test_categorical_filled_with_unknown() {
        let mut status = vec![Some("open"); 9];
        status.push(None);
        let ids: Vec<i64> = (0..10).collect();
        let df = df!["ticket" => ids, "status" => status].unwrap();

        let table = normalize(&df);
        assert_eq!(
            table.semantic_type("status"),
            Some(SemanticType::Categorical)
        );
        let values = str_values(&table, "status");
        assert_eq!(values[0].as_deref(), Some("open"));
        assert_eq!(values[9].as_deref(), Some("Unknown"));
    }

    // ========================================================================
    // Failure handling
    // ========================================================================

    #[test]
    fn test_all_missing_numeric_column_fails() {
        let df = df![
            "id" => [1i64, 2],
            "empty" => [None::<f64>, None],
        ]
        .unwrap();

        let err = TableNormalizer::default().normalize(&df).unwrap_err();
        assert!(matches!(err, InsightError::Imputation { ref column, .. } if column == "empty"));
    }

    #[test]
    fn test_boolean_named_like_date_falls_back() {
        let df = df!["is_weekday" => [Some(true), None, Some(true)]].unwrap();

        let (table, report) = TableNormalizer::default()
            .normalize_with_report(&df)
            .unwrap();
        assert_eq!(
            table.semantic_type("is_weekday"),
            Some(SemanticType::Boolean)
        );
        assert!(report.columns[0].datetime_fallback.is_some());
        assert_eq!(table.frame().column("is_weekday").unwrap().null_count(), 0);
    }

    #[test]
    fn test_text_named_like_date_with_no_dates_falls_back() {
        let days: Vec<String> = (0..10).map(|i| format!("weekday {i}")).collect();
        let df = df!["day_name" => days].unwrap();

        let table = normalize(&df);
        assert_eq!(table.semantic_type("day_name"), Some(SemanticType::Text));
    }

    #[test]
    fn test_empty_boolean_policy_fail() {
        let config = NormalizerConfig::builder()
            .empty_boolean_policy(EmptyBooleanPolicy::Fail)
            .build()
            .unwrap();
        let df = df![
            "id" => [1i64, 2],
            "flag" => [None::<bool>, None],
        ]
        .unwrap();

        let result = TableNormalizer::new(config).unwrap().normalize(&df);
        assert!(matches!(result, Err(InsightError::Imputation { .. })));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = NormalizerConfig {
            categorical_ratio_threshold: 0.0,
            ..Default::default()
        };
        assert!(matches!(
            TableNormalizer::new(config),
            Err(InsightError::InvalidConfig(_))
        ));
    }
}
