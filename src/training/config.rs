//! Pipeline configuration

use crate::error::{HousingError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_PATH: &str = "clean_house_l5_dataset.csv";
pub const DEFAULT_TARGET_COLUMN: &str = "Price";
pub const DEFAULT_EXCLUDED_COLUMNS: [&str; 2] = ["Price", "LogPrice"];
pub const DEFAULT_TEST_SIZE: f64 = 0.2;
pub const DEFAULT_RANDOM_STATE: u64 = 42;
pub const DEFAULT_N_ESTIMATORS: usize = 100;
pub const DEFAULT_SANITY_ROW: usize = 3;
pub const DEFAULT_MODELS_DIR: &str = "models";
pub const LR_MODEL_FILENAME: &str = "lr_model.bin";
pub const RF_MODEL_FILENAME: &str = "rf_model.bin";

/// Configuration for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Cleaned CSV dataset
    pub data_path: PathBuf,

    /// Target column name
    pub target_column: String,

    /// Columns kept out of the feature matrix (target and its transforms)
    pub excluded_columns: Vec<String>,

    /// Fraction of rows held out for evaluation
    pub test_size: f64,

    /// Seed for the split and the forest
    pub random_state: u64,

    /// Number of trees in the forest
    pub n_estimators: usize,

    /// Maximum tree depth (None = grow until pure)
    pub max_depth: Option<usize>,

    /// Test-partition row used for the single-row check
    pub sanity_row: usize,

    /// Pre-existing directory receiving the model files
    pub models_dir: PathBuf,

    /// File name of the persisted linear model
    pub lr_filename: String,

    /// File name of the persisted forest
    pub rf_filename: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            excluded_columns: DEFAULT_EXCLUDED_COLUMNS.iter().map(|s| s.to_string()).collect(),
            test_size: DEFAULT_TEST_SIZE,
            random_state: DEFAULT_RANDOM_STATE,
            n_estimators: DEFAULT_N_ESTIMATORS,
            max_depth: None,
            sanity_row: DEFAULT_SANITY_ROW,
            models_dir: PathBuf::from(DEFAULT_MODELS_DIR),
            lr_filename: LR_MODEL_FILENAME.to_string(),
            rf_filename: RF_MODEL_FILENAME.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Create a configuration for the given dataset with default settings
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            ..Default::default()
        }
    }

    /// Load a JSON configuration; absent fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| HousingError::ConfigError(format!("{}: {}", path.display(), e)))?;
        let config: Self = serde_json::from_str(&json)
            .map_err(|e| HousingError::ConfigError(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the models directory
    pub fn with_models_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.models_dir = dir.into();
        self
    }

    /// Set the target column
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    /// Set the held-out fraction
    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    /// Set the random seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Set the number of trees
    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    /// Set maximum tree depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set the test row used for the single-row check
    pub fn with_sanity_row(mut self, row: usize) -> Self {
        self.sanity_row = row;
        self
    }

    /// Path of the persisted linear model
    pub fn lr_model_path(&self) -> PathBuf {
        self.models_dir.join(&self.lr_filename)
    }

    /// Path of the persisted forest
    pub fn rf_model_path(&self) -> PathBuf {
        self.models_dir.join(&self.rf_filename)
    }

    /// Reject settings that cannot produce a run
    pub fn validate(&self) -> Result<()> {
        if self.target_column.trim().is_empty() {
            return Err(HousingError::ConfigError("target_column must not be empty".to_string()));
        }
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(HousingError::ConfigError(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.n_estimators == 0 {
            return Err(HousingError::ConfigError("n_estimators must be at least 1".to_string()));
        }
        if self.lr_filename.is_empty() || self.rf_filename.is_empty() || self.lr_filename == self.rf_filename {
            return Err(HousingError::ConfigError(
                "model file names must be non-empty and distinct".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();

        assert_eq!(config.target_column, "Price");
        assert_eq!(config.excluded_columns, vec!["Price", "LogPrice"]);
        assert_eq!(config.test_size, 0.2);
        assert_eq!(config.random_state, 42);
        assert_eq!(config.n_estimators, 100);
        assert_eq!(config.sanity_row, 3);
        assert_eq!(config.lr_model_path(), PathBuf::from("models/lr_model.bin"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(PipelineConfig::default().with_test_size(1.0).validate().is_err());
        assert!(PipelineConfig::default().with_n_estimators(0).validate().is_err());
        assert!(PipelineConfig::default().with_target(" ").validate().is_err());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"n_estimators": 25, "models_dir": "out"}}"#).unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();

        assert_eq!(config.n_estimators, 25);
        assert_eq!(config.models_dir, PathBuf::from("out"));
        assert_eq!(config.random_state, 42);
        assert_eq!(config.data_path, PathBuf::from(DEFAULT_DATA_PATH));
    }

    #[test]
    fn test_invalid_json_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"test_size": 2.5}}"#).unwrap();

        let err = PipelineConfig::from_json_file(file.path()).unwrap_err();
        assert!(matches!(err, HousingError::ConfigError(_)));
    }
}
