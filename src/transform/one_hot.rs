//! One-hot expansion of a categorical column

use polars::prelude::*;
use std::collections::HashSet;

use super::values::{column_keys, require_column};
use super::{Transformer, TransformerConfig};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;

const NAME: &str = "OneHotTransformer";

/// Replaces a column with one 0/1 indicator per distinct observed value.
///
/// Indicators are named `<column>_<value>`, take the source column's place
/// and follow first-seen value order. Missing values get no indicator and
/// the first category is kept (no rank reduction).
#[derive(Debug, Clone)]
pub struct OneHotTransformer {
    column: String,
}

impl OneHotTransformer {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }
}

impl Transformer for OneHotTransformer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, _df: &DataFrame, _labels: Option<&[i64]>, diag: &mut Diagnostics) -> Result<()> {
        diag.warn(
            format!("{}[{}]", NAME, self.column),
            DiagnosticKind::FitIgnored,
            "fit does nothing",
        );
        Ok(())
    }

    fn transform(&self, df: &DataFrame, _diag: &mut Diagnostics) -> Result<DataFrame> {
        let keys = column_keys(require_column(df, &self.column, NAME)?)?;

        let mut seen: HashSet<&str> = HashSet::new();
        let mut categories: Vec<&str> = Vec::new();
        for key in keys.iter().flatten() {
            if seen.insert(key.as_str()) {
                categories.push(key.as_str());
            }
        }

        let indicators: Vec<Column> = categories
            .iter()
            .map(|category| {
                let flags: Vec<i64> = keys
                    .iter()
                    .map(|k| i64::from(k.as_deref() == Some(*category)))
                    .collect();
                Column::new(format!("{}_{}", self.column, category).into(), flags)
            })
            .collect();

        let mut columns: Vec<Column> = Vec::with_capacity(df.width() + indicators.len());
        let mut indicators = Some(indicators);
        for col in df.get_columns() {
            if col.name().as_str() == self.column {
                if let Some(ind) = indicators.take() {
                    columns.extend(ind);
                }
            } else {
                columns.push(col.clone());
            }
        }

        Ok(DataFrame::new(columns)?)
    }

    fn fit_transform(
        &mut self,
        df: &DataFrame,
        _labels: Option<&[i64]>,
        diag: &mut Diagnostics,
    ) -> Result<DataFrame> {
        self.transform(df, diag)
    }

    fn config(&self) -> TransformerConfig {
        TransformerConfig::OneHot {
            column: self.column.clone(),
        }
    }
}
