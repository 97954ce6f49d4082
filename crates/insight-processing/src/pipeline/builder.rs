//! The insight pipeline and its builder.
//!
//! Load, normalize, summarize and (optionally) ask a generator for prose,
//! in that order. The summary is always complete before the generator is
//! called.

use crate::config::NormalizerConfig;
use crate::error::Result;
use crate::insights::{InsightGenerator, generate_insights};
use crate::loader::{load_path, load_table};
use crate::normalizer::TableNormalizer;
use crate::pipeline::PipelineOutput;
use crate::profiler::DatasetProfiler;
use polars::prelude::*;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// The end-to-end pipeline.
///
/// Use [`InsightPipeline::builder()`] to create one.
///
/// # Example
///
/// ```rust,ignore
/// use insight_processing::{InsightPipeline, NormalizerConfig};
/// use std::sync::Arc;
///
/// let output = InsightPipeline::builder()
///     .config(NormalizerConfig::default())
///     .generator(Arc::new(my_generator))
///     .build()?
///     .process_bytes(&bytes, "sales.csv")?;
///
/// println!("{}", output.summary);
/// ```
pub struct InsightPipeline {
    config: NormalizerConfig,
    normalizer: TableNormalizer,
    profiler: DatasetProfiler,
    generator: Option<Arc<dyn InsightGenerator>>,
}

// Ensure InsightPipeline can be moved to a worker thread
static_assertions::assert_impl_all!(InsightPipeline: Send);

impl InsightPipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> InsightPipelineBuilder {
        InsightPipelineBuilder::default()
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Run the pipeline on an uploaded byte stream.
    ///
    /// # Errors
    ///
    /// [`InsightError::Load`](crate::InsightError::Load) if the bytes are not
    /// a readable table; normalization errors as for [`process`](Self::process).
    pub fn process_bytes(&self, bytes: &[u8], filename: &str) -> Result<PipelineOutput> {
        let raw = load_table(bytes, filename)?;
        self.process(&raw)
    }

    /// Run the pipeline on a file on disk.
    pub fn process_path(&self, path: impl AsRef<Path>) -> Result<PipelineOutput> {
        let raw = load_path(path)?;
        self.process(&raw)
    }

    /// Run the pipeline on an already-parsed raw table.
    pub fn process(&self, raw: &DataFrame) -> Result<PipelineOutput> {
        let start_time = Instant::now();
        info!("Starting insight pipeline...");

        let (table, report) = match self.normalizer.normalize_with_report(raw) {
            Ok(normalized) => normalized,
            Err(e) => {
                error!("Pipeline error: {}", e);
                return Err(e);
            }
        };

        let groups = self.profiler.column_groups(&table);
        let summary = self.profiler.summarize(&table);

        let insights = self
            .generator
            .as_ref()
            .map(|generator| generate_insights(generator.as_ref(), &summary));

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Pipeline completed in {} ms", duration_ms);

        Ok(PipelineOutput {
            columns: table.columns().to_vec(),
            table,
            groups,
            report,
            summary,
            insights,
            duration_ms,
        })
    }

    /// The first `preview_rows` rows of a pipeline result, for display.
    pub fn preview(&self, output: &PipelineOutput) -> DataFrame {
        super::preview(&output.table, self.config.preview_rows)
    }
}

/// Builder for [`InsightPipeline`].
#[derive(Default)]
pub struct InsightPipelineBuilder {
    config: Option<NormalizerConfig>,
    generator: Option<Arc<dyn InsightGenerator>>,
}

static_assertions::assert_impl_all!(InsightPipelineBuilder: Send);

impl InsightPipelineBuilder {
    /// Set the normalization and profiling configuration.
    pub fn config(mut self, config: NormalizerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the generator asked for prose after the summary is built.
    ///
    /// Without one, [`PipelineOutput::insights`] is `None`.
    pub fn generator(mut self, generator: Arc<dyn InsightGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns [`InsightError::InvalidConfig`](crate::InsightError::InvalidConfig)
    /// if the configuration is invalid.
    pub fn build(self) -> Result<InsightPipeline> {
        let config = self.config.unwrap_or_default();
        let normalizer = TableNormalizer::new(config.clone())?;

        Ok(InsightPipeline {
            normalizer,
            profiler: DatasetProfiler::new(&config),
            generator: self.generator,
            config,
        })
    }
}
