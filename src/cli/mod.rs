//! Housing regression CLI module
//!
//! Command-line interface for training, prediction and dataset inspection.

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::*;
use ndarray::Array1;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::dataset::columns_to_array2;
use crate::features::{prepare_features_from_raw, RawProperty};
use crate::training::{PipelineConfig, RegressionMetrics, SanityCheck, TrainEngine, TrainedModel, TrainingReport};
use crate::utils::{format_currency, format_thousands, DataLoader};

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "housing-regression")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Train and evaluate house price regressors")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Train both models, report test metrics and save them
    Train {
        /// Cleaned CSV dataset
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Existing directory receiving the model files
        #[arg(short, long)]
        models_dir: Option<PathBuf>,

        /// JSON pipeline configuration
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Predict prices with a saved model
    Predict {
        /// Saved model file
        #[arg(short, long)]
        model: PathBuf,

        /// CSV with the training feature columns
        #[arg(short, long, conflicts_with_all = ["size_sqft", "bedrooms", "bathrooms", "year_built", "location"])]
        data: Option<PathBuf>,

        /// Living area in square feet
        #[arg(long, requires_all = ["bedrooms", "bathrooms", "year_built", "location"])]
        size_sqft: Option<f64>,

        #[arg(long)]
        bedrooms: Option<f64>,

        #[arg(long)]
        bathrooms: Option<f64>,

        #[arg(long)]
        year_built: Option<f64>,

        /// Location name, e.g. City, Suburb or Rural
        #[arg(long)]
        location: Option<String>,

        /// Write predictions to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show dataset information
    Info {
        /// CSV file
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// What a `predict` invocation scores
#[derive(Debug, Clone, PartialEq)]
pub enum PredictInput {
    Csv(PathBuf),
    Raw(RawProperty),
}

impl PredictInput {
    /// Build the input from the `predict` flags; exactly one source must be given
    pub fn from_args(
        data: Option<PathBuf>,
        size_sqft: Option<f64>,
        bedrooms: Option<f64>,
        bathrooms: Option<f64>,
        year_built: Option<f64>,
        location: Option<String>,
    ) -> anyhow::Result<Self> {
        match (data, size_sqft, bedrooms, bathrooms, year_built, location) {
            (Some(path), None, None, None, None, None) => Ok(PredictInput::Csv(path)),
            (None, Some(size_sqft), Some(bedrooms), Some(bathrooms), Some(year_built), Some(location)) => {
                Ok(PredictInput::Raw(RawProperty {
                    size_sqft,
                    bedrooms,
                    bathrooms,
                    year_built,
                    location,
                }))
            }
            _ => anyhow::bail!(
                "pass either --data or all of --size-sqft, --bedrooms, --bathrooms, --year-built, --location"
            ),
        }
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

/// Merge the optional config file with command-line overrides
pub fn resolve_config(
    data: Option<&Path>,
    models_dir: Option<&Path>,
    config: Option<&Path>,
) -> anyhow::Result<PipelineConfig> {
    let mut resolved = match config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    if let Some(data) = data {
        resolved.data_path = data.to_path_buf();
    }
    if let Some(dir) = models_dir {
        resolved.models_dir = dir.to_path_buf();
    }

    resolved.validate()?;
    Ok(resolved)
}

pub fn cmd_train(config: PipelineConfig) -> anyhow::Result<TrainingReport> {
    section("Train");

    step_run("Loading data");
    let start = Instant::now();
    let df = DataLoader::new()
        .load_csv(&config.data_path)
        .with_context(|| format!("loading {}", config.data_path.display()))?;
    step_done(&format!("{} rows × {} cols in {:?}", df.height(), df.width(), start.elapsed()));

    let models_dir = config.models_dir.clone();
    let mut engine = TrainEngine::new(config);

    step_run("Training models");
    let start = Instant::now();
    engine.fit(&df)?;
    step_done(&format!("{:?}", start.elapsed()));

    let report = engine
        .report()
        .cloned()
        .context("training finished without a report")?;

    for model in &report.models {
        print_metrics(&model.name, &model.metrics);
    }
    print_sanity_check(&report.sanity_check);

    engine.save_models()?;
    println!("\nModels saved to {}", models_dir.display());

    engine
        .report()
        .cloned()
        .context("training finished without a report")
}

/// Print one model's evaluation block
pub fn print_metrics(name: &str, metrics: &RegressionMetrics) {
    println!("\n{} Performance:", name.bold());
    println!("  R²   : {:.3}", metrics.r2);
    println!("  MAE  : {}", format_thousands(metrics.mae));
    println!("  MSE  : {}", format_thousands(metrics.mse));
    println!("  RMSE : {}", format_thousands(metrics.rmse));
}

pub fn print_sanity_check(check: &SanityCheck) {
    println!("\nSingle-row sanity check:");
    println!("  Actual Price: {}", format_currency(check.actual));
    for (label, pred) in &check.predictions {
        println!("  {:<12}: {}", format!("{} Pred", label), format_currency(*pred));
    }
}

pub fn cmd_predict(model_path: &Path, input: PredictInput, output: Option<&Path>) -> anyhow::Result<Array1<f64>> {
    section("Predict");

    step_run("Loading model");
    let model = TrainedModel::load(model_path)
        .with_context(|| format!("loading model {}", model_path.display()))?;
    step_done(model.name());

    let x = match &input {
        PredictInput::Csv(path) => {
            let df = DataLoader::new().load_csv(path)?;
            if model.feature_names().is_empty() {
                anyhow::bail!("{} does not record its feature columns", model_path.display());
            }
            columns_to_array2(&df, model.feature_names())?
        }
        PredictInput::Raw(raw) => prepare_features_from_raw(raw, model.feature_names())?,
    };

    let predictions = model.predict(&x)?;

    println!();
    for (i, pred) in predictions.iter().enumerate().take(20) {
        println!("  {:>6} {}", muted(&format!("#{}", i)), format_currency(*pred).white());
    }
    if predictions.len() > 20 {
        println!("  {}", dim(&format!("… {} more", predictions.len() - 20)));
    }
    println!();

    if let Some(path) = output {
        write_predictions(path, &predictions)?;
        println!("  {} {}", ok("✓"), format!("Predictions written to {}", path.display()));
    }

    Ok(predictions)
}

fn write_predictions(path: &Path, predictions: &Array1<f64>) -> anyhow::Result<()> {
    let values: Vec<f64> = predictions.to_vec();
    let mut df = df!("PredictedPrice" => &values)?;
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    CsvWriter::new(&mut file).include_header(true).finish(&mut df)?;
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let loader = DataLoader::new();
    let info = loader.get_file_info(data_path)?;
    let df = loader.load_csv(data_path)?;

    println!("  {:<12} {}", muted("File"), info.path);
    println!("  {:<12} {:.1} KB", muted("Size"), info.file_size as f64 / 1024.0);
    println!("  {:<12} {}", muted("Rows"), df.height());
    println!("  {:<12} {}", muted("Columns"), df.width());
    println!();

    println!("  {:<20} {:<12} {:>6}", muted("Column"), muted("Type"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(40)));

    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6}",
            col.name().as_str(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
        );
    }

    println!();
    Ok(())
}
