//! CLI entry point for the dataset insight pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use insight_processing::{
    EmptyBooleanPolicy, InsightPipeline, NormalizerConfig, PipelineOutput,
};
use std::path::Path;
use tracing::{error, info};

/// CLI-compatible policy for Boolean columns with no observed values
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEmptyBoolean {
    /// Fill every missing cell with false
    FillFalse,
    /// Stop with an imputation error
    Fail,
}

impl From<CliEmptyBoolean> for EmptyBooleanPolicy {
    fn from(cli: CliEmptyBoolean) -> Self {
        match cli {
            CliEmptyBoolean::FillFalse => EmptyBooleanPolicy::FillFalse,
            CliEmptyBoolean::Fail => EmptyBooleanPolicy::Fail,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Normalize an uploaded table and summarize it",
    long_about = "Cleans a CSV or spreadsheet (duplicates, types, missing values) and prints \
                  a typed preview plus a compact summary for text generation.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  INSIGHT_CATEGORICAL_THRESHOLD    Default for --categorical-threshold\n  \
                  RUST_LOG                         Overrides --log-level\n\n\
                  EXAMPLES:\n  \
                  insight-processing -i sales.csv\n  \
                  insight-processing -i survey.xlsx --preview-rows 5\n  \
                  insight-processing -i sales.csv --json | jq .groups"
)]
struct Args {
    /// Path to the CSV or spreadsheet file to process
    #[arg(short, long)]
    input: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings and errors)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the human-readable view
    ///
    /// Disables all logs; only the final JSON document is written.
    #[arg(long)]
    json: bool,

    /// Distinct/total ratio below which text columns are categorical (0.0 - 1.0]
    #[arg(long, env = "INSIGHT_CATEGORICAL_THRESHOLD", default_value = "0.3")]
    categorical_threshold: f64,

    /// Fill value for missing categorical cells
    #[arg(long, default_value = "Unknown")]
    unknown_label: String,

    /// What to do with Boolean columns that have no values at all
    #[arg(long, value_enum, default_value = "fill-false")]
    empty_boolean: CliEmptyBoolean,

    /// Maximum characters per cell in the summary sample
    #[arg(long, default_value = "32")]
    max_cell_width: usize,

    /// Rows of the normalized table to print
    #[arg(long, default_value = "10")]
    preview_rows: usize,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is disabled so stdout only holds JSON.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load .env before parsing so env-backed flags see it
    dotenv().ok();

    let args = Args::parse();
    init_logging(&args.log_level, args.quiet, args.json);

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let config = NormalizerConfig::builder()
        .categorical_ratio_threshold(args.categorical_threshold)
        .unknown_category_label(&args.unknown_label)
        .empty_boolean_policy(args.empty_boolean.into())
        .max_cell_width(args.max_cell_width)
        .preview_rows(args.preview_rows)
        .build()?;

    let pipeline = InsightPipeline::builder().config(config).build()?;

    info!("Processing {}", args.input);
    let output = match pipeline.process_path(&args.input) {
        Ok(output) => output,
        Err(e) => {
            error!("Pipeline failed [{}]: {}", e.error_code(), e);
            return Err(anyhow!("Pipeline failed: {}", e));
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_human_readable(&pipeline, &output, &args);
    Ok(())
}

/// Print the normalized preview, column types and summary.
///
/// Uses `println!` on purpose: this is the command's output, not a log.
fn print_human_readable(pipeline: &InsightPipeline, output: &PipelineOutput, args: &Args) {
    let report = &output.report;

    println!();
    println!("{}", "=".repeat(80));
    println!("NORMALIZATION COMPLETE");
    println!("{}", "=".repeat(80));
    println!();
    println!("Input: {}", args.input);
    println!(
        "Rows: {} -> {} ({} duplicates removed)",
        report.rows_before,
        report.rows_after,
        report.duplicates_removed + report.settled_duplicates_removed
    );
    println!("Duration: {}ms", output.duration_ms);
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!(
        "{:<24} {:<12} {:<12} {:<10} {:<10}",
        "Column", "Source", "Type", "Coerced", "Imputed"
    );
    println!("{}", "-".repeat(70));
    for column in &report.columns {
        println!(
            "{:<24} {:<12} {:<12} {:<10} {:<10}",
            insight_processing::utils::truncate_str(&column.name, 23),
            insight_processing::utils::truncate_str(&column.source_dtype, 11),
            column.semantic_type,
            column.coerced_to_missing,
            column.imputed
        );
    }
    println!();

    if !report.actions.is_empty() {
        println!("Actions Taken:");
        for action in &report.actions {
            println!("  - {}", action);
        }
        println!();
    }

    println!("PREVIEW");
    println!("{}", "-".repeat(40));
    println!("{}", pipeline.preview(output));
    println!();

    println!("SUMMARY");
    println!("{}", "-".repeat(40));
    println!("{}", output.summary);
    println!();

    println!("Use --json for machine-readable output");
    println!("{}", "=".repeat(80));
}
