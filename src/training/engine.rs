//! Training engine: split, fit, evaluate, sanity-check and persist both models

use crate::dataset::{split_features_target, train_test_split, TrainTestSplit};
use crate::error::{HousingError, Result};
use crate::export;
use crate::utils::DataLoader;
use super::config::PipelineConfig;
use super::linear_models::LinearRegression;
use super::models::{RegressionMetrics, Regressor};
use super::random_forest::RandomForestRegressor;
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Enum to hold trained model variants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    LinearRegression(LinearRegression),
    RandomForestRegressor(RandomForestRegressor),
}

impl TrainedModel {
    fn as_regressor(&self) -> &dyn Regressor {
        match self {
            TrainedModel::LinearRegression(m) => m,
            TrainedModel::RandomForestRegressor(m) => m,
        }
    }

    /// Display name, e.g. "Linear Regression"
    pub fn name(&self) -> &'static str {
        self.as_regressor().name()
    }

    /// Two-letter label used in the sanity check output
    pub fn short_label(&self) -> &'static str {
        match self {
            TrainedModel::LinearRegression(_) => "LR",
            TrainedModel::RandomForestRegressor(_) => "RF",
        }
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        self.as_regressor().predict(x)
    }

    /// Columns the model was trained on
    pub fn feature_names(&self) -> &[String] {
        self.as_regressor().feature_names()
    }

    pub fn is_fitted(&self) -> bool {
        self.as_regressor().is_fitted()
    }

    /// Persist the model with bincode
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        export::save_model(self, path)
    }

    /// Load a model written by [`TrainedModel::save`]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let model: Self = export::load_model(path)?;
        if !model.is_fitted() {
            return Err(HousingError::ModelNotFitted);
        }
        Ok(model)
    }
}

/// Evaluation of one model on the test partition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelReport {
    pub name: String,
    pub metrics: RegressionMetrics,
    pub training_time_secs: f64,
    /// Where the model was written, once saved
    pub artifact: Option<PathBuf>,
}

/// Predictions of every model for a single test row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanityCheck {
    /// Position within the test partition
    pub row: usize,
    /// Row index in the loaded dataset
    pub source_row: usize,
    pub actual: f64,
    /// (short label, prediction) in training order
    pub predictions: Vec<(String, f64)>,
}

/// Summary of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub n_rows: usize,
    pub n_features: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub models: Vec<ModelReport>,
    pub sanity_check: SanityCheck,
}

impl TrainingReport {
    /// Paths of every saved model
    pub fn artifacts(&self) -> Vec<&Path> {
        self.models.iter().filter_map(|m| m.artifact.as_deref()).collect()
    }
}

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: PipelineConfig,
    loader: DataLoader,
    feature_names: Vec<String>,
    models: Vec<TrainedModel>,
    report: Option<TrainingReport>,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            loader: DataLoader::new(),
            feature_names: Vec::new(),
            models: Vec::new(),
            report: None,
        }
    }

    /// Load the configured dataset, fit both models and save them
    pub fn run(&mut self) -> Result<TrainingReport> {
        self.config.validate()?;

        info!(path = %self.config.data_path.display(), "Loading dataset");
        let df = self.loader.load_csv(&self.config.data_path)?;

        self.fit(&df)?;
        self.save_models()?;

        self.report.clone().ok_or(HousingError::ModelNotFitted)
    }

    /// Fit and evaluate both models on `df`. A failed fit leaves the engine unfitted.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.report = None;
        self.models.clear();
        self.feature_names.clear();

        self.config.validate()?;

        let (features, y) =
            split_features_target(df, &self.config.target_column, &self.config.excluded_columns)?;
        info!(
            rows = features.n_rows(),
            features = features.n_features(),
            "Features prepared"
        );
        debug!(columns = ?features.names, "Feature columns");

        let split = train_test_split(
            &features.data,
            &y,
            self.config.test_size,
            self.config.random_state,
        )?;
        info!(train = split.train_size(), test = split.test_size(), "Data split");

        if self.config.sanity_row >= split.test_size() {
            return Err(HousingError::InvalidParameter {
                name: "sanity_row".to_string(),
                value: self.config.sanity_row.to_string(),
                reason: format!("test partition has only {} rows", split.test_size()),
            });
        }

        let names = features.names.clone();

        let mut lr = LinearRegression::new().with_feature_names(names.clone());
        let lr_report = fit_and_evaluate(&mut lr, &split)?;

        let mut rf = RandomForestRegressor::new(self.config.n_estimators)
            .with_random_state(self.config.random_state)
            .with_feature_names(names.clone());
        if let Some(depth) = self.config.max_depth {
            rf = rf.with_max_depth(depth);
        }
        let rf_report = fit_and_evaluate(&mut rf, &split)?;

        let models = vec![
            TrainedModel::LinearRegression(lr),
            TrainedModel::RandomForestRegressor(rf),
        ];
        let sanity_check = sanity_check(&models, &split, self.config.sanity_row)?;

        self.report = Some(TrainingReport {
            n_rows: features.n_rows(),
            n_features: features.n_features(),
            train_size: split.train_size(),
            test_size: split.test_size(),
            models: vec![lr_report, rf_report],
            sanity_check,
        });
        self.feature_names = names;
        self.models = models;

        Ok(self)
    }

    /// Write both fitted models into the configured models directory
    pub fn save_models(&mut self) -> Result<Vec<PathBuf>> {
        let report = self.report.as_mut().ok_or(HousingError::ModelNotFitted)?;

        let paths = [self.config.lr_model_path(), self.config.rf_model_path()];
        let targets: Vec<(&TrainedModel, PathBuf)> =
            self.models.iter().zip(paths.iter().cloned()).collect();

        let written = export::save_models(&targets)?;
        for (model_report, path) in report.models.iter_mut().zip(written.iter()) {
            model_report.artifact = Some(path.clone());
        }

        Ok(written)
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Fitted models in training order (linear first)
    pub fn models(&self) -> &[TrainedModel] {
        &self.models
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn report(&self) -> Option<&TrainingReport> {
        self.report.as_ref()
    }
}

fn fit_and_evaluate<M: Regressor>(model: &mut M, split: &TrainTestSplit) -> Result<ModelReport> {
    info!(model = model.name(), "Training model");
    let start = Instant::now();
    model.fit(&split.x_train, &split.y_train)?;
    let elapsed = start.elapsed().as_secs_f64();

    let y_pred = model.predict(&split.x_test)?;
    let metrics = RegressionMetrics::compute(&split.y_test, &y_pred)?;
    info!(
        model = model.name(),
        r2 = metrics.r2,
        rmse = metrics.rmse,
        secs = elapsed,
        "Model evaluated"
    );

    Ok(ModelReport {
        name: model.name().to_string(),
        metrics,
        training_time_secs: elapsed,
        artifact: None,
    })
}

fn sanity_check(models: &[TrainedModel], split: &TrainTestSplit, row: usize) -> Result<SanityCheck> {
    let sample = split.x_test.select(Axis(0), &[row]);

    let predictions = models
        .iter()
        .map(|m| {
            let pred = m.predict(&sample)?;
            Ok((m.short_label().to_string(), pred[0]))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(SanityCheck {
        row,
        source_row: split.test_indices[row],
        actual: split.y_test[row],
        predictions,
    })
}
