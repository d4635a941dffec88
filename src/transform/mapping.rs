//! Value mapping for a single column

use polars::prelude::*;
use std::collections::{BTreeSet, HashMap};

use super::values::{cells_to_column, column_cells, CellValue, ColumnRef};
use super::{Transformer, TransformerConfig};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::Result;

const NAME: &str = "MappingTransformer";

/// Substitutes values of one column through a fixed dictionary.
///
/// Values with no entry pass through unchanged and are reported as a
/// diagnostic, as are entries that never occur in the column.
#[derive(Debug, Clone)]
pub struct MappingTransformer {
    column: ColumnRef,
    mapping: Vec<(CellValue, CellValue)>,
}

impl MappingTransformer {
    pub fn new<I, K, V>(column: impl Into<ColumnRef>, mapping: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<CellValue>,
        V: Into<CellValue>,
    {
        Self {
            column: column.into(),
            mapping: mapping
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn column(&self) -> &ColumnRef {
        &self.column
    }

    pub fn mapping(&self) -> &[(CellValue, CellValue)] {
        &self.mapping
    }

    fn source(&self) -> String {
        format!("{}[{}]", NAME, self.column)
    }
}

impl Transformer for MappingTransformer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, _df: &DataFrame, _labels: Option<&[i64]>, diag: &mut Diagnostics) -> Result<()> {
        diag.warn(self.source(), DiagnosticKind::FitIgnored, "fit does nothing");
        Ok(())
    }

    fn transform(&self, df: &DataFrame, diag: &mut Diagnostics) -> Result<DataFrame> {
        let column = self.column.resolve(df, NAME)?;
        let col = df.column(&column)?;
        let cells = column_cells(col)?;

        // Later entries win on duplicate keys
        let lookup: HashMap<String, &CellValue> =
            self.mapping.iter().map(|(k, v)| (k.key(), v)).collect();

        let observed: BTreeSet<String> = cells.iter().flatten().map(|c| c.key()).collect();
        let keys: BTreeSet<String> = lookup.keys().cloned().collect();

        let unused: Vec<&String> = keys.difference(&observed).collect();
        if !unused.is_empty() {
            diag.warn(
                self.source(),
                DiagnosticKind::UnusedMappingKeys,
                format!("column does not contain these keys as values {:?}", unused),
            );
        }

        let unmapped: Vec<&String> = observed.difference(&keys).collect();
        if !unmapped.is_empty() {
            diag.warn(
                self.source(),
                DiagnosticKind::UnmappedValues,
                format!("mapping has no keys for these values {:?}", unmapped),
            );
        }

        let mapped: Vec<Option<CellValue>> = cells
            .into_iter()
            .map(|cell| {
                cell.map(|c| match lookup.get(&c.key()) {
                    Some(replacement) => (*replacement).clone(),
                    None => c,
                })
            })
            .collect();

        let mut out = df.clone();
        out.with_column(cells_to_column(col.name().clone(), mapped))?;
        Ok(out)
    }

    /// Stateless: skips `fit` so no diagnostic is raised.
    fn fit_transform(
        &mut self,
        df: &DataFrame,
        _labels: Option<&[i64]>,
        diag: &mut Diagnostics,
    ) -> Result<DataFrame> {
        self.transform(df, diag)
    }

    fn config(&self) -> TransformerConfig {
        TransformerConfig::Mapping {
            column: self.column.clone(),
            mapping: self.mapping.clone(),
        }
    }
}
