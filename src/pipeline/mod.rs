//! Pipeline module - ordered composition of named transformer stages

pub mod config;
pub mod presets;

pub use config::*;
pub use presets::*;

use polars::prelude::DataFrame;
use std::time::Instant;

use crate::diagnostics::Diagnostics;
use crate::error::{PrepError, Result};
use crate::transform::{Transformer, TransformerConfig};

const NAME: &str = "Pipeline";

/// One named step of a pipeline
#[derive(Debug)]
pub struct Stage {
    pub name: String,
    pub transformer: Box<dyn Transformer>,
}

/// An ordered chain of transformers; each stage consumes the previous
/// stage's output.
///
/// The first failing stage aborts the whole run and its error is returned
/// unchanged. Stages already fitted keep their state.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<Stage>,
    verbose: bool,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Pipeline::push`]
    pub fn with_stage(
        mut self,
        name: impl Into<String>,
        transformer: impl Transformer + 'static,
    ) -> Result<Self> {
        self.push(name, Box::new(transformer))?;
        Ok(self)
    }

    /// Append a stage. Stage names must be unique within one pipeline.
    pub fn push(&mut self, name: impl Into<String>, transformer: Box<dyn Transformer>) -> Result<()> {
        let name = name.into();
        if self.stages.iter().any(|s| s.name == name) {
            return Err(PrepError::argument(format!(
                "duplicate pipeline stage name '{}'",
                name
            )));
        }
        self.stages.push(Stage { name, transformer });
        Ok(())
    }

    /// Log per-stage timing at info level while running
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn stage(&self, name: &str) -> Option<&dyn Transformer> {
        self.stages
            .iter()
            .find(|s| s.name == name)
            .map(|s| s.transformer.as_ref())
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Build a fresh, unfitted pipeline from its configuration
    pub fn from_config(config: &PipelineConfig) -> Result<Self> {
        let mut pipeline = Pipeline::new().verbose(config.verbose);
        for stage in &config.stages {
            pipeline.push(stage.name.clone(), stage.transformer.build()?)?;
        }
        Ok(pipeline)
    }

    pub fn to_config(&self) -> PipelineConfig {
        PipelineConfig {
            verbose: self.verbose,
            stages: self
                .stages
                .iter()
                .map(|s| StageConfig {
                    name: s.name.clone(),
                    transformer: s.transformer.config(),
                })
                .collect(),
        }
    }

    fn log_stage(&self, index: usize, name: &str, started: Instant) {
        if self.verbose {
            log::info!(
                "({} of {}) Processing {}, total={:.1}s",
                index + 1,
                self.stages.len(),
                name,
                started.elapsed().as_secs_f64()
            );
        }
    }
}

impl Transformer for Pipeline {
    fn name(&self) -> &'static str {
        NAME
    }

    /// Fits every stage on the output of the stages before it. The last
    /// stage is only fitted, never applied.
    fn fit(&mut self, df: &DataFrame, labels: Option<&[i64]>, diag: &mut Diagnostics) -> Result<()> {
        let started = Instant::now();
        let last = self.stages.len().saturating_sub(1);
        let mut current = df.clone();

        for index in 0..self.stages.len() {
            let stage = &mut self.stages[index];
            if index == last {
                stage.transformer.fit(&current, labels, diag)?;
            } else {
                current = stage.transformer.fit_transform(&current, labels, diag)?;
            }
            let name = self.stages[index].name.clone();
            self.log_stage(index, &name, started);
        }
        Ok(())
    }

    fn transform(&self, df: &DataFrame, diag: &mut Diagnostics) -> Result<DataFrame> {
        let started = Instant::now();
        let mut current = df.clone();
        for (index, stage) in self.stages.iter().enumerate() {
            current = stage.transformer.transform(&current, diag)?;
            self.log_stage(index, &stage.name, started);
        }
        Ok(current)
    }

    fn fit_transform(
        &mut self,
        df: &DataFrame,
        labels: Option<&[i64]>,
        diag: &mut Diagnostics,
    ) -> Result<DataFrame> {
        let started = Instant::now();
        let mut current = df.clone();
        for index in 0..self.stages.len() {
            current = self.stages[index]
                .transformer
                .fit_transform(&current, labels, diag)?;
            let name = self.stages[index].name.clone();
            self.log_stage(index, &name, started);
        }
        Ok(current)
    }

    fn config(&self) -> TransformerConfig {
        TransformerConfig::Pipeline(self.to_config())
    }
}
