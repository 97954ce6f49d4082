//! Error types for the insight pipeline.
//!
//! Three failure kinds matter to callers: a file that cannot be read as a
//! table ([`LoadError`]), a column whose missing values have no statistic to
//! fill from ([`InsightError::Imputation`]) and an insight generator fault
//! ([`GenerationError`]). Everything else is plumbing.
//!
//! Errors serialize as `{ code, message }` so they can be emitted as JSON by
//! the CLI or handed to a frontend unchanged.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

use crate::config::ConfigValidationError;

/// The main error type for loading, normalizing and profiling a table.
#[derive(Error, Debug)]
pub enum InsightError {
    /// The uploaded file could not be parsed as tabular data.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// A column needs a statistic (median, minimum) but has no values to compute it from.
    #[error("Failed to impute missing values in column '{column}': {reason}")]
    Imputation { column: String, reason: String },

    /// The external insight generator failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// A column could not be coerced to the requested type.
    #[error("Failed to convert column '{column}' to {target_type}: {reason}")]
    TypeConversion {
        column: String,
        target_type: String,
        reason: String,
    },

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigValidationError),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<InsightError>,
    },
}

/// Failures while turning an uploaded byte stream into a table.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read '{file}': {source}")]
    Io {
        file: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse CSV '{file}': {reason}")]
    Csv { file: String, reason: String },

    #[error("Failed to read spreadsheet '{file}': {reason}")]
    Spreadsheet { file: String, reason: String },

    #[error("Spreadsheet '{0}' has no worksheets")]
    EmptyWorkbook(String),

    #[error("Column '{0}' appears more than once in the header")]
    DuplicateColumn(String),
}

/// Failures reported by an [`InsightGenerator`](crate::insights::InsightGenerator).
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Insight generator '{provider}' is unavailable: {reason}")]
    Unavailable { provider: String, reason: String },

    #[error("Insight generator '{provider}' returned an empty response")]
    EmptyResponse { provider: String },

    #[error("Insight generator '{provider}' failed: {reason}")]
    Failed { provider: String, reason: String },
}

impl InsightError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        InsightError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Shorthand for an imputation failure on `column`.
    pub fn imputation(column: impl Into<String>, reason: impl Into<String>) -> Self {
        InsightError::Imputation {
            column: column.into(),
            reason: reason.into(),
        }
    }

    /// Get error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Load(_) => "LOAD_ERROR",
            Self::Imputation { .. } => "IMPUTATION_ERROR",
            Self::Generation(_) => "GENERATION_ERROR",
            Self::TypeConversion { .. } => "TYPE_CONVERSION_FAILED",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True if the error came from reading the input file.
    pub fn is_load_error(&self) -> bool {
        match self {
            Self::Load(_) => true,
            Self::WithContext { source, .. } => source.is_load_error(),
            _ => false,
        }
    }
}

impl Serialize for InsightError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("InsightError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, InsightError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| InsightError::Polars(e).with_context(context))
    }
}
