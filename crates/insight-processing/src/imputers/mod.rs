//! Imputation module for handling missing values.
//!
//! Statistical imputation only: every fill value is a property of the
//! column itself (median, mode, minimum) or a fixed label.

mod statistical;

pub use statistical::{Imputation, StatisticalImputer};
