//! Transformer module - the fit/transform contract and its implementations
//!
//! Every transformer is constructed from configuration only. `fit` learns
//! state from training data (and labels, when supervised), `transform`
//! applies that state to new data without mutating it and always returns a
//! new frame.
//!
//! A single transformer instance is not synchronized: concurrent `fit` and
//! `transform` calls on the same instance are not supported. Use one
//! instance per thread, or fit first and share it read-only.

pub mod columns;
pub mod config;
pub mod impute;
pub mod mapping;
pub mod one_hot;
pub mod robust;
pub mod sigma;
pub mod stats;
pub mod target_encoder;
pub mod tukey;
pub mod values;

pub use columns::*;
pub use config::*;
pub use impute::*;
pub use mapping::*;
pub use one_hot::*;
pub use robust::*;
pub use sigma::*;
pub use target_encoder::*;
pub use tukey::*;
pub use values::{CellValue, ColumnRef};

use polars::prelude::DataFrame;
use std::fmt;

use crate::diagnostics::Diagnostics;
use crate::error::Result;

/// Shared lifecycle of every column transformer.
pub trait Transformer: fmt::Debug + Send + Sync {
    /// Type name used in errors and diagnostics
    fn name(&self) -> &'static str;

    /// Learn state from `df`. Labels are ignored by unsupervised transformers.
    fn fit(
        &mut self,
        df: &DataFrame,
        labels: Option<&[i64]>,
        diag: &mut Diagnostics,
    ) -> Result<()>;

    /// Apply learned state to `df`, returning a new frame.
    fn transform(&self, df: &DataFrame, diag: &mut Diagnostics) -> Result<DataFrame>;

    fn fit_transform(
        &mut self,
        df: &DataFrame,
        labels: Option<&[i64]>,
        diag: &mut Diagnostics,
    ) -> Result<DataFrame> {
        self.fit(df, labels, diag)?;
        self.transform(df, diag)
    }

    /// Constructor arguments that rebuild an unfitted copy of this transformer
    fn config(&self) -> TransformerConfig;
}
