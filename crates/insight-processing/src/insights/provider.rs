//! Insight generator trait for abstracting the prose-writing service.
//!
//! The pipeline hands the profiler's summary text to an [`InsightGenerator`]
//! and shows whatever prose comes back. The crate ships no concrete client;
//! callers plug in their own (an LLM API, a template engine, a test double).
//!
//! # Example
//!
//! ```rust,ignore
//! use insight_processing::insights::InsightGenerator;
//! use insight_processing::GenerationError;
//!
//! struct EchoGenerator;
//!
//! impl InsightGenerator for EchoGenerator {
//!     fn generate(&self, summary: &str) -> Result<String, GenerationError> {
//!         Ok(format!("The dataset looks like this:\n{summary}"))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "echo"
//!     }
//! }
//! ```

use crate::error::GenerationError;

/// A service that turns a dataset summary into prose.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a pipeline holding one can be
/// moved to a worker thread.
///
/// # Error Handling
///
/// Any fault (network, quota, empty reply) is reported as a
/// [`GenerationError`]. Callers normally go through
/// [`generate_insights`](super::generate_insights), which replaces failures
/// with a fixed fallback message.
pub trait InsightGenerator: Send + Sync {
    /// Write prose about the dataset described by `summary`.
    fn generate(&self, summary: &str) -> Result<String, GenerationError>;

    /// Get the generator name for logging and debugging.
    fn name(&self) -> &str;

    /// Get the model being used, if the generator exposes one.
    fn model(&self) -> Option<&str> {
        None
    }
}
