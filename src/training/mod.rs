//! Model training module
//!
//! Provides the two price regressors and the engine that trains them:
//! - Ordinary least squares linear regression
//! - Random forest of CART regression trees
//! - Held-out evaluation (R², MAE, MSE, RMSE) and a single-row sanity check

mod config;
mod engine;
mod models;
pub mod linear_models;
pub mod decision_tree;
pub mod random_forest;

pub use config::{
    PipelineConfig, DEFAULT_DATA_PATH, DEFAULT_MODELS_DIR, DEFAULT_RANDOM_STATE, DEFAULT_TEST_SIZE,
    LR_MODEL_FILENAME, RF_MODEL_FILENAME,
};
pub use engine::{ModelReport, SanityCheck, TrainEngine, TrainedModel, TrainingReport};
pub use models::{RegressionMetrics, Regressor};
pub use linear_models::LinearRegression;
pub use decision_tree::{DecisionTree, TreeNode};
pub use random_forest::{MaxFeatures, RandomForestRegressor};
