//! CLI module - argument parsing, dataset I/O and subcommands

pub mod args;
pub mod commands;
pub mod labels;
pub mod loader;

pub use args::{Cli, Commands, PipelineArgs, TargetArgs};
pub use commands::{build_pipeline, run_find_seed, run_transform, FindSeedOptions};
pub use labels::*;
pub use loader::*;
