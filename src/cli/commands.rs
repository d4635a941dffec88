//! Subcommand implementations

use anyhow::{Context, Result};
use console::style;
use polars::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use super::args::{transform_output_path, PipelineArgs, TargetArgs};
use super::labels::extract_labels;
use super::loader::{load_dataset, save_dataset};
use crate::diagnostics::Diagnostics;
use crate::pipeline::{load_pipeline_config, preset, Pipeline};
use crate::report::{display_seed_summary, display_threshold_table};
use crate::selection::{
    align_features, default_thresholds, feature_matrix, find_random_state_with, threshold_sweep,
    train_test_split, Classifier, KnnClassifier, SearchConfig,
};
use crate::transform::Transformer;
use crate::utils::{
    create_spinner, finish_with_success, print_completion, print_info, print_step_header,
    print_success,
};

/// Build the pipeline named on the command line
pub fn build_pipeline(args: &PipelineArgs, verbose: bool) -> Result<Pipeline> {
    let pipeline = match (&args.config, &args.preset) {
        (Some(path), _) => {
            let config = load_pipeline_config(path)
                .with_context(|| format!("Failed to load pipeline config: {}", path.display()))?;
            Pipeline::from_config(&config)?
        }
        (None, Some(name)) => preset(name)?,
        (None, None) => anyhow::bail!("Pass either --config <file> or --preset <name>"),
    };
    let verbose = verbose || pipeline.is_verbose();
    Ok(pipeline.verbose(verbose))
}

/// Separate the target column from the features and turn it into labels
fn split_target(df: &DataFrame, target: &str, mapping: &TargetArgs) -> Result<(DataFrame, Vec<i64>)> {
    let labels = extract_labels(df, target, mapping.mapping().as_ref())
        .with_context(|| format!("Invalid target column '{}'", target))?;
    Ok((df.drop(target)?, labels))
}

fn report_diagnostics(diag: &Diagnostics) {
    if !diag.is_empty() {
        print_info(&format!(
            "{} diagnostic(s) raised; see warnings above",
            style(diag.len()).yellow().bold()
        ));
    }
}

#[allow(clippy::too_many_arguments)]
pub fn run_transform(
    input: &Path,
    output: Option<&PathBuf>,
    pipeline_args: &PipelineArgs,
    target: Option<&str>,
    target_mapping: &TargetArgs,
    save_config: Option<&Path>,
    infer_schema_length: usize,
    verbose: bool,
) -> Result<()> {
    let output_path = transform_output_path(input, output);
    let mut pipeline = build_pipeline(pipeline_args, verbose)?;

    print_step_header(1, "Load Dataset");
    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(input, infer_schema_length)?;
    finish_with_success(
        &spinner,
        &format!("Loaded {} rows x {} columns", df.height(), df.width()),
    );

    print_step_header(2, "Fit and Transform");
    let step_start = Instant::now();
    let mut diag = Diagnostics::new();

    let mut transformed = match target {
        Some(target) => {
            let (features, labels) = split_target(&df, target, target_mapping)?;
            let mut out = pipeline.fit_transform(&features, Some(labels.as_slice()), &mut diag)?;
            out.with_column(df.column(target)?.clone())?;
            out
        }
        None => pipeline.fit_transform(&df, None, &mut diag)?,
    };
    print_success(&format!(
        "Ran {} stage(s) in {:.2}s, {} columns out",
        pipeline.len(),
        step_start.elapsed().as_secs_f64(),
        transformed.width()
    ));
    report_diagnostics(&diag);

    print_step_header(3, "Save Results");
    let spinner = create_spinner("Writing output file...");
    save_dataset(&mut transformed, &output_path)?;
    finish_with_success(&spinner, &format!("Saved to {}", output_path.display()));

    if let Some(path) = save_config {
        fs::write(path, pipeline.to_config().to_json()?)
            .with_context(|| format!("Failed to write pipeline config: {}", path.display()))?;
        print_success(&format!("Pipeline config written to {}", path.display()));
    }

    print_completion("Transform complete!");
    Ok(())
}

/// Options of the `find-seed` subcommand
#[derive(Debug, Clone)]
pub struct FindSeedOptions<'a> {
    pub input: &'a Path,
    pub pipeline: &'a PipelineArgs,
    pub target: &'a str,
    pub target_mapping: &'a TargetArgs,
    pub trials: usize,
    pub search: SearchConfig,
    pub threshold_step: f64,
    pub json: Option<&'a Path>,
    pub infer_schema_length: usize,
    pub verbose: bool,
}

pub fn run_find_seed(options: &FindSeedOptions) -> Result<()> {
    let pipeline = build_pipeline(options.pipeline, options.verbose)?;

    print_step_header(1, "Load Dataset");
    let spinner = create_spinner("Loading dataset...");
    let df = load_dataset(options.input, options.infer_schema_length)?;
    let (features, labels) = split_target(&df, options.target, options.target_mapping)?;
    let events = labels.iter().filter(|&&y| y == 1).count();
    finish_with_success(
        &spinner,
        &format!(
            "Loaded {} rows ({} events, {} non-events)",
            labels.len(),
            events,
            labels.len() - events
        ),
    );

    print_step_header(2, "Search Split Seeds");
    let mut diag = Diagnostics::new();
    let result = find_random_state_with(
        &features,
        &labels,
        &pipeline,
        options.trials,
        &options.search,
        &mut diag,
    )?;
    print_success(&format!("Selected seed {}", result.seed));
    report_diagnostics(&diag);
    display_seed_summary(&result);

    print_step_header(3, "Threshold Sweep on Selected Split");
    let split = train_test_split(&features, &labels, options.search.test_size, result.seed)?;
    let mut fitted = build_pipeline(options.pipeline, false)?;
    let mut sweep_diag = Diagnostics::new();
    let x_train = fitted.fit_transform(&split.x_train, Some(split.y_train.as_slice()), &mut sweep_diag)?;
    let x_test = fitted.transform(&split.x_test, &mut sweep_diag)?;

    let mut model = KnnClassifier::new(options.search.n_neighbors);
    model.fit(&feature_matrix(&x_train)?, &split.y_train)?;
    let scores = model.predict_scores(&feature_matrix(&align_features(&x_test, &x_train)?)?)?;
    let table = threshold_sweep(
        &split.y_test,
        &scores,
        &default_thresholds(options.threshold_step),
    )?;
    display_threshold_table(&table);

    if let Some(path) = options.json {
        let text = serde_json::to_string_pretty(&result)?;
        fs::write(path, text)
            .with_context(|| format!("Failed to write search result: {}", path.display()))?;
        print_success(&format!("Search result written to {}", path.display()));
    }

    print_completion("Seed search complete!");
    Ok(())
}
