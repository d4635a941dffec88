//! Prepkit: stateful preprocessing for tabular classification
//!
//! A library of column transformers sharing one fit/transform contract,
//! composable into named pipelines, plus model-selection helpers: a
//! stability search for a reproducible train/test split seed, a threshold
//! sweep and a successive-halving hyperparameter search.

pub mod cli;
pub mod diagnostics;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod selection;
pub mod transform;
pub mod utils;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::{PrepError, Result};
pub use pipeline::Pipeline;
pub use transform::{Transformer, TransformerConfig};
