//! The boundary to the external insight generator.
//!
//! This is the only step in the pipeline that degrades gracefully: a failing
//! generator is logged and its output replaced with [`FALLBACK_INSIGHT`].

mod provider;

pub use provider::InsightGenerator;

use crate::error::GenerationError;
use tracing::{info, warn};

/// Shown instead of prose when the generator fails.
pub const FALLBACK_INSIGHT: &str = "AI could not generate insights. Please check your data.";

/// Ask `generator` for prose about `summary`, falling back on any failure.
///
/// An empty or whitespace-only reply counts as a failure.
pub fn generate_insights(generator: &dyn InsightGenerator, summary: &str) -> String {
    info!(
        "Requesting insights from '{}'{}",
        generator.name(),
        generator
            .model()
            .map(|m| format!(" ({m})"))
            .unwrap_or_default()
    );

    let result = generator.generate(summary).and_then(|prose| {
        if prose.trim().is_empty() {
            Err(GenerationError::EmptyResponse {
                provider: generator.name().to_string(),
            })
        } else {
            Ok(prose)
        }
    });

    match result {
        Ok(prose) => prose,
        Err(e) => {
            warn!("Insight generation failed, using fallback: {}", e);
            FALLBACK_INSIGHT.to_string()
        }
    }
}
