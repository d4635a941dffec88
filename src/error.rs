//! Error types for transformer, pipeline and model-selection operations.
//!
//! Every variant is raised at the point of detection and propagates unchanged
//! through pipeline composition. Non-fatal situations are reported through
//! [`crate::diagnostics::Diagnostics`] instead.

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while fitting or applying transformers.
#[derive(Debug, Error)]
pub enum PrepError {
    /// One or more referenced columns are absent from the dataset.
    #[error("{transformer}: unknown column(s) {columns:?}")]
    Schema {
        /// Name of the transformer that required the columns
        transformer: &'static str,
        /// Columns that could not be found
        columns: Vec<String>,
    },

    /// A column expected to be numeric has another dtype.
    #[error("{transformer}: expected numeric dtype in '{column}', found {dtype}")]
    Type {
        transformer: &'static str,
        column: String,
        dtype: String,
    },

    /// `transform` was called on a stateful transformer before `fit`.
    #[error("{transformer}.transform called before fit")]
    State { transformer: &'static str },

    /// A required argument is missing or malformed.
    #[error("{0}")]
    Argument(String),

    /// Every candidate seed of the random-state search was skipped.
    #[error(
        "no valid split among {trials} candidate seed(s): training F1 never reached {min_train_f1}"
    )]
    NoValidSplit { trials: usize, min_train_f1: f64 },

    /// Pipeline configuration could not be parsed.
    #[error("invalid pipeline configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PrepError {
    /// Shorthand for a single missing column.
    pub fn missing_column(transformer: &'static str, column: impl Into<String>) -> Self {
        PrepError::Schema {
            transformer,
            columns: vec![column.into()],
        }
    }

    /// Shorthand for an `Argument` error built from any displayable message.
    pub fn argument(message: impl Into<String>) -> Self {
        PrepError::Argument(message.into())
    }
}

pub type Result<T> = std::result::Result<T, PrepError>;
