//! Prepkit CLI
//!
//! Fits preprocessing pipelines on CSV/Parquet datasets and searches for a
//! stable train/test split seed.

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use prepkit::cli::{run_find_seed, run_transform, Cli, Commands, FindSeedOptions};
use prepkit::selection::SearchConfig;
use prepkit::utils::{init_logger, print_banner};

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logger(if cli.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    });
    print_banner(env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Transform {
            input,
            output,
            pipeline,
            target,
            target_mapping,
            save_config,
            infer_schema_length,
        } => run_transform(
            input,
            output.as_ref(),
            pipeline,
            target.as_deref(),
            target_mapping,
            save_config.as_deref(),
            *infer_schema_length,
            cli.verbose,
        ),
        Commands::FindSeed {
            input,
            pipeline,
            target,
            target_mapping,
            trials,
            test_size,
            n_neighbors,
            min_train_f1,
            threshold_step,
            json,
            no_progress,
            infer_schema_length,
        } => run_find_seed(&FindSeedOptions {
            input,
            pipeline,
            target,
            target_mapping,
            trials: *trials,
            search: SearchConfig {
                test_size: *test_size,
                n_neighbors: *n_neighbors,
                min_train_f1: *min_train_f1,
                show_progress: !*no_progress,
            },
            threshold_step: *threshold_step,
            json: json.as_deref(),
            infer_schema_length: *infer_schema_length,
            verbose: cli.verbose,
        }),
    }
}
