//! JSON description of a pipeline

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::transform::TransformerConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub name: String,
    pub transformer: TransformerConfig,
}

/// Ordered stages plus the verbosity flag.
///
/// ```json
/// {
///   "verbose": false,
///   "stages": [
///     {"name": "gender", "transformer": {"kind": "mapping", "column": "Gender",
///                                        "mapping": [["Male", 0], ["Female", 1]]}},
///     {"name": "fare", "transformer": {"kind": "tukey", "column": "Fare", "fence": "outer"}}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub verbose: bool,
    pub stages: Vec<StageConfig>,
}

impl PipelineConfig {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Read a pipeline description from a JSON file
pub fn load_pipeline_config(path: &Path) -> Result<PipelineConfig> {
    let text = fs::read_to_string(path)?;
    PipelineConfig::from_json(&text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::Fence;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "stages": [
            {"name": "drop", "transformer": {"kind": "drop_columns", "columns": ["ID"]}},
            {"name": "fare", "transformer": {"kind": "tukey", "column": "Fare", "fence": "inner"}}
        ]
    }"#;

    #[test]
    fn test_parse_defaults() {
        let config = PipelineConfig::from_json(SAMPLE).unwrap();
        assert!(!config.verbose);
        assert_eq!(config.stages.len(), 2);
        assert_eq!(
            config.stages[1].transformer,
            TransformerConfig::Tukey {
                column: "Fare".to_string(),
                fence: Fence::Inner
            }
        );
    }

    #[test]
    fn test_json_round_trip() {
        let config = PipelineConfig::from_json(SAMPLE).unwrap();
        let back = PipelineConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let config = load_pipeline_config(file.path()).unwrap();
        assert_eq!(config.stages[0].name, "drop");
    }

    #[test]
    fn test_unknown_kind_is_config_error() {
        let result = PipelineConfig::from_json(
            r#"{"stages": [{"name": "x", "transformer": {"kind": "pca"}}]}"#,
        );
        assert!(matches!(result, Err(crate::error::PrepError::Config(_))));
    }
}
