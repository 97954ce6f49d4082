//! Dataset Insight Library
//!
//! Turns an arbitrary uploaded table (CSV or spreadsheet) into a cleaned,
//! typed table and a compact text summary fit for an external text generator.
//!
//! # Overview
//!
//! - **Loading**: CSV via Polars, spreadsheets (xlsx, xls, xlsb, ods) via calamine
//! - **Normalization**: duplicate removal, per-column semantic type inference,
//!   value coercion, datetime detection by column name, missing-value imputation
//! - **Profiling**: a bounded summary with shape, column groups and a sample
//! - **Insights**: an optional [`insights::InsightGenerator`] that writes prose
//!   from the summary, with a fixed fallback message when it fails
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use insight_processing::{InsightPipeline, NormalizerConfig};
//!
//! let bytes = std::fs::read("sales.csv")?;
//!
//! let output = InsightPipeline::builder()
//!     .config(NormalizerConfig::default())
//!     .build()?
//!     .process_bytes(&bytes, "sales.csv")?;
//!
//! println!("{}", output.summary);
//! for column in &output.columns {
//!     println!("{}: {}", column.name, column.semantic_type);
//! }
//! ```
//!
//! # Using the components directly
//!
//! ```rust,ignore
//! use insight_processing::{DatasetProfiler, TableNormalizer, loader};
//!
//! let raw = loader::load_path("survey.xlsx")?;
//! let table = TableNormalizer::default().normalize(&raw)?;
//! let summary = DatasetProfiler::default().summarize(&table);
//! ```
//!
//! # Configuration
//!
//! Use [`NormalizerConfig`] to tune the inference thresholds:
//!
//! ```rust,ignore
//! use insight_processing::config::*;
//!
//! let config = NormalizerConfig::builder()
//!     .categorical_ratio_threshold(0.2)     // Text below 20% distinct is categorical
//!     .unknown_category_label("N/A")
//!     .empty_boolean_policy(EmptyBooleanPolicy::Fail)
//!     .build()?;
//! ```

pub mod config;
pub mod error;
pub mod imputers;
pub mod insights;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod profiler;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{
    ConfigValidationError, EmptyBooleanPolicy, NormalizerConfig, NormalizerConfigBuilder,
};
pub use error::{GenerationError, InsightError, LoadError, Result as InsightResult, ResultExt};
pub use imputers::StatisticalImputer;
pub use insights::{FALLBACK_INSIGHT, InsightGenerator, generate_insights};
pub use loader::{load_path, load_table};
pub use normalizer::TableNormalizer;
pub use pipeline::{InsightPipeline, InsightPipelineBuilder, PipelineOutput};
pub use profiler::{ColumnGroups, DatasetProfiler};
pub use types::{
    ColumnReport, ColumnSchema, NormalizationReport, NormalizedTable, SemanticType,
};
