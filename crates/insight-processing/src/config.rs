//! Configuration for table normalization and profiling.
//!
//! Defaults reproduce the stock behaviour; the builder exists so the CLI and
//! tests can tune thresholds without touching the algorithms.

use serde::{Deserialize, Serialize};

/// Substrings that mark a column as a date/time column by name.
pub const DEFAULT_DATETIME_KEYWORDS: [&str; 5] = ["date", "time", "year", "day", "month"];

/// What to do with a Boolean column that has missing cells and no observed values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmptyBooleanPolicy {
    /// Fill every missing cell with `false`.
    #[default]
    FillFalse,
    /// Fail the normalization with an imputation error.
    Fail,
}

/// Configuration for [`TableNormalizer`](crate::TableNormalizer) and
/// [`DatasetProfiler`](crate::DatasetProfiler).
///
/// # Example
///
/// ```rust,ignore
/// use insight_processing::config::{EmptyBooleanPolicy, NormalizerConfig};
///
/// let config = NormalizerConfig::builder()
///     .categorical_ratio_threshold(0.2)
///     .empty_boolean_policy(EmptyBooleanPolicy::Fail)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizerConfig {
    /// Text columns whose distinct/total ratio is below this become categorical.
    /// Default: 0.3
    pub categorical_ratio_threshold: f64,

    /// Lowercase substrings that send a column through datetime coercion.
    /// Default: date, time, year, day, month
    pub datetime_name_keywords: Vec<String>,

    /// Fill value for missing categorical cells.
    /// Default: "Unknown"
    pub unknown_category_label: String,

    /// Behaviour for Boolean columns with nothing to take a mode from.
    /// Default: FillFalse
    pub empty_boolean_policy: EmptyBooleanPolicy,

    /// Maximum characters per cell in the summary's sample table.
    /// Default: 32
    pub max_cell_width: usize,

    /// Rows shown by [`preview`](crate::pipeline::preview).
    /// Default: 10
    pub preview_rows: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            categorical_ratio_threshold: 0.3,
            datetime_name_keywords: DEFAULT_DATETIME_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            unknown_category_label: "Unknown".to_string(),
            empty_boolean_policy: EmptyBooleanPolicy::default(),
            max_cell_width: 32,
            preview_rows: 10,
        }
    }
}

impl NormalizerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> NormalizerConfigBuilder {
        NormalizerConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.categorical_ratio_threshold > 0.0 && self.categorical_ratio_threshold <= 1.0) {
            return Err(ConfigValidationError::InvalidThreshold {
                field: "categorical_ratio_threshold".to_string(),
                value: self.categorical_ratio_threshold,
            });
        }

        if self.datetime_name_keywords.is_empty()
            || self.datetime_name_keywords.iter().any(|k| k.trim().is_empty())
        {
            return Err(ConfigValidationError::EmptyKeywords);
        }

        if self.unknown_category_label.is_empty() {
            return Err(ConfigValidationError::EmptyLabel);
        }

        if self.max_cell_width < 4 {
            return Err(ConfigValidationError::InvalidWidth(self.max_cell_width));
        }

        if self.preview_rows == 0 {
            return Err(ConfigValidationError::InvalidPreviewRows(self.preview_rows));
        }

        Ok(())
    }

    /// True if `column_name` contains one of the datetime keywords (case-insensitive).
    pub fn is_datetime_name(&self, column_name: &str) -> bool {
        let lower = column_name.to_lowercase();
        self.datetime_name_keywords
            .iter()
            .any(|keyword| lower.contains(&keyword.to_lowercase()))
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be in (0.0, 1.0])")]
    InvalidThreshold { field: String, value: f64 },

    #[error("Datetime name keywords must be non-empty")]
    EmptyKeywords,

    #[error("Unknown category label must not be empty")]
    EmptyLabel,

    #[error("Invalid max cell width: {0} (must be at least 4)")]
    InvalidWidth(usize),

    #[error("Invalid preview rows: {0} (must be at least 1)")]
    InvalidPreviewRows(usize),
}

/// Builder for [`NormalizerConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct NormalizerConfigBuilder {
    categorical_ratio_threshold: Option<f64>,
    datetime_name_keywords: Option<Vec<String>>,
    unknown_category_label: Option<String>,
    empty_boolean_policy: Option<EmptyBooleanPolicy>,
    max_cell_width: Option<usize>,
    preview_rows: Option<usize>,
}

impl NormalizerConfigBuilder {
    /// Set the distinct-ratio threshold below which text becomes categorical.
    pub fn categorical_ratio_threshold(mut self, threshold: f64) -> Self {
        self.categorical_ratio_threshold = Some(threshold);
        self
    }

    /// Replace the datetime name keywords.
    pub fn datetime_name_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_name_keywords = Some(
            keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        );
        self
    }

    /// Set the fill value for missing categorical cells.
    pub fn unknown_category_label(mut self, label: impl Into<String>) -> Self {
        self.unknown_category_label = Some(label.into());
        self
    }

    /// Set the policy for Boolean columns with no observed values.
    pub fn empty_boolean_policy(mut self, policy: EmptyBooleanPolicy) -> Self {
        self.empty_boolean_policy = Some(policy);
        self
    }

    /// Set the maximum characters per sample cell.
    pub fn max_cell_width(mut self, width: usize) -> Self {
        self.max_cell_width = Some(width);
        self
    }

    /// Set the number of preview rows.
    pub fn preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = Some(rows);
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<NormalizerConfig, ConfigValidationError> {
        let defaults = NormalizerConfig::default();
        let config = NormalizerConfig {
            categorical_ratio_threshold: self
                .categorical_ratio_threshold
                .unwrap_or(defaults.categorical_ratio_threshold),
            datetime_name_keywords: self
                .datetime_name_keywords
                .unwrap_or(defaults.datetime_name_keywords),
            unknown_category_label: self
                .unknown_category_label
                .unwrap_or(defaults.unknown_category_label),
            empty_boolean_policy: self
                .empty_boolean_policy
                .unwrap_or(defaults.empty_boolean_policy),
            max_cell_width: self.max_cell_width.unwrap_or(defaults.max_cell_width),
            preview_rows: self.preview_rows.unwrap_or(defaults.preview_rows),
        };
        config.validate()?;
        Ok(config)
    }
}
