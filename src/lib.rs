//! Housing regression - house price model training
//!
//! This crate trains and evaluates two price regressors on a cleaned housing
//! dataset and persists them for later scoring:
//! - CSV loading and feature/target extraction
//! - Seeded train/test partitioning
//! - Linear regression and random forest models
//! - Held-out metrics and a single-row sanity check
//! - Model persistence and raw-property scoring
//!
//! # Modules
//!
//! - [`dataset`] - Feature/target extraction and train/test split
//! - [`training`] - Models, metrics and the training engine
//! - [`features`] - Raw property records aligned to a feature schema
//! - [`export`] - Model serialization
//! - [`utils`] - CSV loading and number formatting
//! - [`cli`] - Command-line interface

// Core error handling
pub mod error;

// Data and models
pub mod dataset;
pub mod features;
pub mod training;

// Persistence and utilities
pub mod export;
pub mod utils;

// Services
pub mod cli;

pub use error::{HousingError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{HousingError, Result};

    pub use crate::dataset::{split_features_target, train_test_split, FeatureMatrix, TrainTestSplit};

    pub use crate::training::{
        LinearRegression, PipelineConfig, RandomForestRegressor, RegressionMetrics, Regressor,
        TrainEngine, TrainedModel, TrainingReport,
    };

    pub use crate::features::{prepare_features_from_raw, RawProperty};

    pub use crate::export::{load_model, save_model};

    pub use crate::utils::DataLoader;
}
