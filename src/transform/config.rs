//! Serializable constructor arguments for every transformer

use serde::{Deserialize, Serialize};

use super::values::{CellValue, ColumnRef};
use super::{
    ColumnAction, DropColumnsTransformer, Fence, KnnImputerTransformer, MappingTransformer,
    NeighborWeights, OneHotTransformer, RobustScalerTransformer, Sigma3Transformer,
    TargetEncoderTransformer, Transformer, TukeyTransformer,
};
use crate::error::Result;
use crate::pipeline::{Pipeline, PipelineConfig};

fn default_smoothing() -> f64 {
    10.0
}

fn default_neighbors() -> usize {
    5
}

/// Everything needed to rebuild an unfitted transformer.
///
/// Serialized with a `kind` tag, e.g.
/// `{"kind": "tukey", "column": "Fare", "fence": "outer"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TransformerConfig {
    Mapping {
        column: ColumnRef,
        /// `[from, to]` pairs
        mapping: Vec<(CellValue, CellValue)>,
    },
    OneHot {
        column: String,
    },
    DropColumns {
        columns: Vec<String>,
        #[serde(default)]
        action: ColumnAction,
    },
    Sigma3 {
        column: String,
    },
    Tukey {
        column: String,
        #[serde(default)]
        fence: Fence,
    },
    RobustScaler {
        column: String,
    },
    TargetEncoder {
        column: String,
        #[serde(default = "default_smoothing")]
        smoothing: f64,
    },
    KnnImputer {
        #[serde(default = "default_neighbors")]
        n_neighbors: usize,
        #[serde(default)]
        weights: NeighborWeights,
    },
    Pipeline(PipelineConfig),
}

impl TransformerConfig {
    /// Construct a fresh, unfitted transformer, validating arguments.
    pub fn build(&self) -> Result<Box<dyn Transformer>> {
        let transformer: Box<dyn Transformer> = match self {
            TransformerConfig::Mapping { column, mapping } => {
                Box::new(MappingTransformer::new(column.clone(), mapping.clone()))
            }
            TransformerConfig::OneHot { column } => Box::new(OneHotTransformer::new(column.clone())),
            TransformerConfig::DropColumns { columns, action } => {
                Box::new(DropColumnsTransformer::new(columns.clone(), *action))
            }
            TransformerConfig::Sigma3 { column } => Box::new(Sigma3Transformer::new(column.clone())),
            TransformerConfig::Tukey { column, fence } => {
                Box::new(TukeyTransformer::new(column.clone(), *fence))
            }
            TransformerConfig::RobustScaler { column } => {
                Box::new(RobustScalerTransformer::new(column.clone()))
            }
            TransformerConfig::TargetEncoder { column, smoothing } => {
                Box::new(TargetEncoderTransformer::new(column.clone(), *smoothing)?)
            }
            TransformerConfig::KnnImputer {
                n_neighbors,
                weights,
            } => Box::new(KnnImputerTransformer::new(*n_neighbors, *weights)?),
            TransformerConfig::Pipeline(config) => Box::new(Pipeline::from_config(config)?),
        };
        Ok(transformer)
    }
}
