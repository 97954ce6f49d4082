use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The inferred logical kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Numeric,
    Categorical,
    Boolean,
    Datetime,
    /// High-cardinality text, kept as stored and never imputed.
    Text,
}

impl SemanticType {
    pub const ALL: [SemanticType; 5] = [
        SemanticType::Numeric,
        SemanticType::Categorical,
        SemanticType::Boolean,
        SemanticType::Datetime,
        SemanticType::Text,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticType::Numeric => "numeric",
            SemanticType::Categorical => "categorical",
            SemanticType::Boolean => "boolean",
            SemanticType::Datetime => "datetime",
            SemanticType::Text => "text",
        }
    }

    /// True if the normalizer fills missing cells for this type.
    pub fn is_imputed(&self) -> bool {
        !matches!(self, SemanticType::Text)
    }

    /// Check that a polars dtype is a valid storage for this semantic type.
    pub fn accepts_dtype(&self, dtype: &DataType) -> bool {
        match self {
            SemanticType::Numeric => matches!(dtype, DataType::Float64),
            SemanticType::Categorical => matches!(dtype, DataType::String),
            SemanticType::Boolean => matches!(dtype, DataType::Boolean),
            SemanticType::Datetime => {
                matches!(dtype, DataType::Datetime(TimeUnit::Milliseconds, None))
            }
            SemanticType::Text => true,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Name and semantic type of one normalized column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub semantic_type: SemanticType,
}

/// A deduplicated, type-coerced and imputed table.
///
/// The frame and the schema are kept in the same column order; the schema is
/// the source of truth for semantic types since categorical and text columns
/// share the `String` storage.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    frame: DataFrame,
    columns: Vec<ColumnSchema>,
}

static_assertions::assert_impl_all!(NormalizedTable: Send, Sync);

impl NormalizedTable {
    pub(crate) fn new(frame: DataFrame, columns: Vec<ColumnSchema>) -> Self {
        debug_assert_eq!(frame.width(), columns.len());
        Self { frame, columns }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    pub fn columns(&self) -> &[ColumnSchema] {
        &self.columns
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    /// Semantic type of a column by name.
    pub fn semantic_type(&self, column: &str) -> Option<SemanticType> {
        self.columns
            .iter()
            .find(|c| c.name == column)
            .map(|c| c.semantic_type)
    }

    /// Names of all columns with the given semantic type, in column order.
    pub fn columns_of(&self, semantic_type: SemanticType) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.semantic_type == semantic_type)
            .map(|c| c.name.as_str())
            .collect()
    }
}

/// Per-column record of what the normalizer did.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnReport {
    pub name: String,
    pub source_dtype: String,
    pub semantic_type: SemanticType,
    /// Distinct/total ratio, only computed for textual columns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique_ratio: Option<f64>,
    /// Non-missing source values that failed coercion and became missing.
    pub coerced_to_missing: usize,
    /// Missing cells filled during imputation.
    pub imputed: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<String>,
    /// Set when name-based datetime coercion failed and the value-shape type was kept.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub datetime_fallback: Option<String>,
}

/// Summary of one normalization pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub rows_before: usize,
    pub rows_after: usize,
    pub duplicates_removed: usize,
    /// Rows that only became duplicates after coercion and imputation.
    pub settled_duplicates_removed: usize,
    pub columns: Vec<ColumnReport>,
    pub actions: Vec<String>,
}
