//! Pipeline module.
//!
//! Ties the loader, normalizer, profiler and insight generator together.

mod builder;

pub use builder::{InsightPipeline, InsightPipelineBuilder};

use crate::profiler::ColumnGroups;
use crate::types::{ColumnSchema, NormalizationReport, NormalizedTable};
use polars::prelude::*;
use serde::Serialize;

/// Everything one pipeline run produces.
///
/// Serializes without the table itself; use [`preview`] or
/// [`NormalizedTable::frame`] for the values.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    #[serde(skip)]
    pub table: NormalizedTable,
    pub columns: Vec<ColumnSchema>,
    pub groups: ColumnGroups,
    pub report: NormalizationReport,
    pub summary: String,
    /// `None` when no generator was configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub insights: Option<String>,
    pub duration_ms: u64,
}

/// The first `rows` rows of a normalized table.
pub fn preview(table: &NormalizedTable, rows: usize) -> DataFrame {
    table.frame().head(Some(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::TableNormalizer;

    #[test]
    fn test_preview_is_bounded() {
        let df = df!["value" => (0..25).map(|i| i as f64).collect::<Vec<_>>()].unwrap();
        let table = TableNormalizer::default().normalize(&df).unwrap();

        assert_eq!(preview(&table, 10).height(), 10);
        assert_eq!(preview(&table, 100).height(), 25);
    }

    #[test]
    fn test_output_json_skips_table() {
        let pipeline = InsightPipeline::builder().build().unwrap();
        let output = pipeline
            .process_bytes(b"name,visits\nann,3\nbob,5\n", "visits.csv")
            .unwrap();

        let json = serde_json::to_value(&output).unwrap();
        assert!(json.get("table").is_none());
        assert!(json.get("insights").is_none());
        assert_eq!(json["groups"]["numeric"][0], "visits");
        assert_eq!(json["columns"].as_array().unwrap().len(), 2);
    }
}
