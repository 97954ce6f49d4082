//! Dataset profiling: a bounded text summary of a normalized table.
//!
//! The summary carries structure only (shape, column groups, a literal
//! sample), never statistics, and its size does not grow with the row count.

mod sample;

use crate::config::NormalizerConfig;
use crate::types::{NormalizedTable, SemanticType};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Rows shown in the summary's sample section.
pub const SAMPLE_ROWS: usize = 3;

/// Column names grouped the way the summary lists them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ColumnGroups {
    pub numeric: Vec<String>,
    /// Categorical and text columns together.
    pub categorical: Vec<String>,
    pub datetime: Vec<String>,
    pub boolean: Vec<String>,
}

/// Builds summaries of normalized tables.
#[derive(Debug, Clone)]
pub struct DatasetProfiler {
    max_cell_width: usize,
}

impl Default for DatasetProfiler {
    fn default() -> Self {
        Self::new(&NormalizerConfig::default())
    }
}

impl DatasetProfiler {
    pub fn new(config: &NormalizerConfig) -> Self {
        Self {
            max_cell_width: config.max_cell_width,
        }
    }

    /// Group column names by semantic type, in column order.
    pub fn column_groups(&self, table: &NormalizedTable) -> ColumnGroups {
        let mut groups = ColumnGroups::default();
        for column in table.columns() {
            let group = match column.semantic_type {
                SemanticType::Numeric => &mut groups.numeric,
                SemanticType::Categorical | SemanticType::Text => &mut groups.categorical,
                SemanticType::Datetime => &mut groups.datetime,
                SemanticType::Boolean => &mut groups.boolean,
            };
            group.push(column.name.clone());
        }
        groups
    }

    /// Produce the summary text for `table`.
    ///
    /// Never fails: if the sample cannot be rendered the section is left
    /// empty and a warning is logged.
    pub fn summarize(&self, table: &NormalizedTable) -> String {
        let groups = self.column_groups(table);

        let sample = match sample::render_sample(table.frame(), SAMPLE_ROWS, self.max_cell_width) {
            Ok(sample) => sample,
            Err(e) => {
                warn!("Could not render sample rows: {}", e);
                String::new()
            }
        };

        let mut lines = vec![
            "Dataset Overview:".to_string(),
            format!("- Total Rows: {}", table.height()),
            format!("- Total Columns: {}", table.width()),
            String::new(),
            "Column Categories:".to_string(),
            format!("- Numeric Columns: {:?}", groups.numeric),
            format!("- Categorical Columns: {:?}", groups.categorical),
            format!("- Date/Time Columns: {:?}", groups.datetime),
            format!("- Boolean Columns: {:?}", groups.boolean),
            String::new(),
            format!("Sample Data (First {} Rows):", SAMPLE_ROWS),
        ];
        if !sample.is_empty() {
            lines.push(sample);
        }

        let summary = lines.join("\n");
        debug!("Summary is {} characters", summary.len());
        summary
    }
}
