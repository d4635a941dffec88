//! Keep or drop a list of columns

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Transformer, TransformerConfig};
use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::error::{PrepError, Result};

const NAME: &str = "DropColumnsTransformer";

/// What to do with the listed columns
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnAction {
    /// Remove the listed columns; absent ones are skipped with a diagnostic
    #[default]
    Drop,
    /// Keep only the listed columns, in list order; all must be present
    Keep,
}

impl fmt::Display for ColumnAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnAction::Drop => write!(f, "drop"),
            ColumnAction::Keep => write!(f, "keep"),
        }
    }
}

impl std::str::FromStr for ColumnAction {
    type Err = PrepError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "drop" => Ok(ColumnAction::Drop),
            "keep" => Ok(ColumnAction::Keep),
            _ => Err(PrepError::argument(format!(
                "{} action '{}' not in [\"keep\", \"drop\"]",
                NAME, s
            ))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DropColumnsTransformer {
    columns: Vec<String>,
    action: ColumnAction,
}

impl DropColumnsTransformer {
    pub fn new<I, S>(columns: I, action: ColumnAction) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            action,
        }
    }

    pub fn drop<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns, ColumnAction::Drop)
    }

    pub fn keep<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(columns, ColumnAction::Keep)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn action(&self) -> ColumnAction {
        self.action
    }
}

impl Transformer for DropColumnsTransformer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn fit(&mut self, _df: &DataFrame, _labels: Option<&[i64]>, diag: &mut Diagnostics) -> Result<()> {
        diag.warn(NAME, DiagnosticKind::FitIgnored, "fit does nothing");
        Ok(())
    }

    fn transform(&self, df: &DataFrame, diag: &mut Diagnostics) -> Result<DataFrame> {
        let (present, missing): (Vec<&String>, Vec<&String>) = self
            .columns
            .iter()
            .partition(|name| df.column(name.as_str()).is_ok());

        match self.action {
            ColumnAction::Keep => {
                if !missing.is_empty() {
                    return Err(PrepError::Schema {
                        transformer: NAME,
                        columns: missing.into_iter().cloned().collect(),
                    });
                }
                Ok(df.select(self.columns.iter().map(String::as_str))?)
            }
            ColumnAction::Drop => {
                if !missing.is_empty() {
                    diag.warn(
                        NAME,
                        DiagnosticKind::MissingDropColumns,
                        format!("does not contain these columns to drop: {:?}", missing),
                    );
                }
                Ok(df.drop_many(present.into_iter().map(String::as_str)))
            }
        }
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
        TransformerConfig::DropColumns {
            columns: self.columns.clone(),
            action: self.action,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df! {
            "A" => [1i32, 2, 3],
            "B" => [4i32, 5, 6],
            "C" => [7i32, 8, 9],
        }
        .unwrap()
    }

    fn names(df: &DataFrame) -> Vec<String> {
        df.get_column_names().iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_drop_columns() {
        let out = DropColumnsTransformer::drop(["A", "B"])
            .transform(&sample(), &mut Diagnostics::new())
            .unwrap();
        assert_eq!(names(&out), vec!["C"]);
    }

    #[test]
    fn test_keep_columns_in_list_order() {
        let out = DropColumnsTransformer::keep(["C", "A"])
            .transform(&sample(), &mut Diagnostics::new())
            .unwrap();
        assert_eq!(names(&out), vec!["C", "A"]);
    }

    #[test]
    fn test_keep_missing_is_schema_error() {
        let result = DropColumnsTransformer::keep(["A", "X"]).transform(&sample(), &mut Diagnostics::new());
        match result {
            Err(PrepError::Schema { columns, .. }) => assert_eq!(columns, vec!["X".to_string()]),
            other => panic!("Expected Schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_drop_missing_is_diagnostic() {
        let mut diag = Diagnostics::new();
        let out = DropColumnsTransformer::drop(["X"])
            .transform(&sample(), &mut diag)
            .unwrap();
        assert_eq!(names(&out), vec!["A", "B", "C"]);
        assert!(diag.contains(DiagnosticKind::MissingDropColumns));
    }

    #[test]
    fn test_action_from_str() {
        assert_eq!("keep".parse::<ColumnAction>().unwrap(), ColumnAction::Keep);
        assert_eq!("DROP".parse::<ColumnAction>().unwrap(), ColumnAction::Drop);
        assert!(matches!(
            "rename".parse::<ColumnAction>(),
            Err(PrepError::Argument(_))
        ));
    }
}
