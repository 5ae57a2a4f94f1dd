//! Housing regression - Main Entry Point
//!
//! Trains the price models by default; `predict` and `info` work on saved
//! models and datasets.

use clap::Parser;
use housing_regression::cli::{cmd_info, cmd_predict, cmd_train, resolve_config, Cli, Commands, PredictInput};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "housing_regression=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Train { data, models_dir, config }) => {
            let config = resolve_config(data.as_deref(), models_dir.as_deref(), config.as_deref())?;
            cmd_train(config)?;
        }
        Some(Commands::Predict {
            model,
            data,
            size_sqft,
            bedrooms,
            bathrooms,
            year_built,
            location,
            output,
        }) => {
            let input = PredictInput::from_args(data, size_sqft, bedrooms, bathrooms, year_built, location)?;
            cmd_predict(&model, input, output.as_deref())?;
        }
        Some(Commands::Info { data }) => {
            cmd_info(&data)?;
        }
        None => {
            // Default: the full training run with stock settings
            cmd_train(resolve_config(None, None, None)?)?;
        }
    }

    Ok(())
}
