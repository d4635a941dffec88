//! Command-line argument definitions using clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use super::labels::TargetMapping;
use super::loader::derive_output_path;

/// Prepkit - fit preprocessing pipelines and pick a stable train/test split seed
#[derive(Parser, Debug)]
#[command(name = "prepkit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log per-stage timings and search progress details
    #[arg(short, long, global = true, default_value = "false")]
    pub verbose: bool,
}

/// Which pipeline to run: a JSON description or a built-in preset
#[derive(Args, Debug, Clone)]
pub struct PipelineArgs {
    /// Pipeline configuration file (JSON)
    #[arg(short, long, conflicts_with = "preset", required_unless_present = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in pipeline: "titanic" or "customer"
    #[arg(short, long)]
    pub preset: Option<String>,
}

/// Target column and its optional event / non-event mapping
#[derive(Args, Debug, Clone)]
pub struct TargetArgs {
    /// Value in target column that represents EVENT (maps to 1).
    /// Required with --non-event-value when target is not binary 0/1.
    #[arg(long, requires = "non_event_value")]
    pub event_value: Option<String>,

    /// Value in target column that represents NON-EVENT (maps to 0).
    /// Required with --event-value when target is not binary 0/1.
    #[arg(long, requires = "event_value")]
    pub non_event_value: Option<String>,
}

impl TargetArgs {
    pub fn mapping(&self) -> Option<TargetMapping> {
        match (&self.event_value, &self.non_event_value) {
            (Some(event), Some(non_event)) => Some(TargetMapping::new(event, non_event)),
            _ => None,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fit a pipeline on a dataset and write the transformed result
    Transform {
        /// Input file path (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file path (CSV or Parquet, determined by extension).
        /// Defaults to input directory with '_transformed' suffix.
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Target column. Passed as labels to supervised stages and
        /// carried through to the output untouched.
        #[arg(short, long)]
        target: Option<String>,

        #[command(flatten)]
        target_mapping: TargetArgs,

        /// Write the fitted pipeline's configuration to this JSON file
        #[arg(long)]
        save_config: Option<PathBuf>,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },

    /// Search split seeds for the one with the most typical test/train F1 ratio
    FindSeed {
        /// Input file path (CSV or Parquet)
        #[arg(short, long)]
        input: PathBuf,

        #[command(flatten)]
        pipeline: PipelineArgs,

        /// Target column (binary 0/1 unless a mapping is given)
        #[arg(short, long)]
        target: String,

        #[command(flatten)]
        target_mapping: TargetArgs,

        /// Number of candidate seeds (0..n)
        #[arg(short = 'n', long, default_value = "200")]
        trials: usize,

        /// Fraction of rows held out for testing
        #[arg(long, default_value = "0.2", value_parser = validate_test_size)]
        test_size: f64,

        /// Neighbors used by the scoring classifier
        #[arg(long, default_value = "5")]
        n_neighbors: usize,

        /// Seeds whose training F1 is below this are skipped
        #[arg(long, default_value = "0.1")]
        min_train_f1: f64,

        /// Step between thresholds of the sweep run on the selected split
        #[arg(long, default_value = "0.1")]
        threshold_step: f64,

        /// Write the full search result to this JSON file
        #[arg(long)]
        json: Option<PathBuf>,

        /// Hide the progress bar
        #[arg(long, default_value = "false")]
        no_progress: bool,

        /// Number of rows to use for schema inference (CSV only).
        /// Use 0 for full table scan.
        #[arg(long, default_value = "10000")]
        infer_schema_length: usize,
    },
}

/// Output path for `transform`, deriving one from the input when not given
pub fn transform_output_path(input: &std::path::Path, output: Option<&PathBuf>) -> PathBuf {
    output
        .cloned()
        .unwrap_or_else(|| derive_output_path(input, "transformed"))
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!("test_size must be between 0 and 1, got {}", value))
    }
}
