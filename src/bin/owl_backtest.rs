//! Owl Backtest CLI
//!
//! Scores forecasting models on a daily price series with rolling-origin
//! cross-validation and searches hyperparameter grids.
//!
//! # Usage
//!
//! ```bash
//! # Compare the default models on a market-chart export
//! owl-backtest evaluate --data bitcoin.json --folds 5
//!
//! # Tune ARIMA orders on a date,price CSV and print JSON
//! owl-backtest tune --data prices.csv --family arima --json
//!
//! # More detail
//! RUST_LOG=forecast_backtest=debug owl-backtest tune --data prices.csv
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use owl_backtest::prelude::*;
use owl_backtest::{default_models, Family};

const SEPARATOR: &str = "============================================================";

/// Rolling-origin backtesting CLI.
#[derive(Parser)]
#[command(name = "owl-backtest")]
#[command(about = "Cross-validate and tune price forecasting models")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score the default models fold by fold
    Evaluate {
        /// Price file (.json market chart, otherwise date,price CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Number of folds, overrides the config file
        #[arg(short, long)]
        folds: Option<usize>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Search the default grid of one model family
    Tune {
        /// Price file (.json market chart, otherwise date,price CSV)
        #[arg(short, long)]
        data: PathBuf,

        /// Model family to tune (arima or smoothing)
        #[arg(long, default_value_t = Family::Arima)]
        family: Family,

        /// Number of folds, overrides the config file
        #[arg(short, long)]
        folds: Option<usize>,

        /// JSON configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn load_config(path: Option<&Path>, folds: Option<usize>) -> Result<BacktestConfig> {
    let mut config = match path {
        Some(path) => BacktestConfig::from_json_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => BacktestConfig::default(),
    };
    if let Some(folds) = folds {
        config.folds = folds;
    }
    config.validate()?;
    Ok(config)
}

fn load_series(path: &Path, config: &BacktestConfig) -> Result<Series> {
    let series = DataLoader::from_path(path, config.duplicate_days)
        .with_context(|| format!("failed to load prices from {}", path.display()))?;

    let gaps = series.gaps();
    if !gaps.is_empty() {
        warn!(gaps = gaps.len(), "series is not gap-free at daily cadence");
    }
    info!(
        observations = series.len(),
        start = %series.start(),
        end = %series.end(),
        "loaded series"
    );
    Ok(series)
}

fn cmd_evaluate(series: &Series, config: &BacktestConfig, json: bool) -> Result<()> {
    let evaluator = Evaluator::new(config.evaluator_config());
    let report = evaluator.evaluate(series, &default_models())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", SEPARATOR);
    println!("Rolling-origin evaluation ({} folds)", report.folds().len());
    println!("{}", SEPARATOR);
    for name in report.model_names() {
        let Some(scores) = report.scores(name) else {
            continue;
        };
        println!("\n{}", name);
        for record in scores {
            match &record.outcome {
                FoldOutcome::Scored { mae } => {
                    println!("  fold {:>2}: MAE {:.4}", record.fold_index, mae)
                }
                FoldOutcome::Failed { reason } => {
                    println!("  fold {:>2}: failed ({})", record.fold_index, reason)
                }
            }
        }
        if let Some(summary) = report.summary(name) {
            println!(
                "  mean MAE {:.4} (std {:.4}), {} failed folds",
                summary.mean, summary.std_dev, summary.failures
            );
        }
    }

    Ok(())
}

fn cmd_tune(series: &Series, config: &BacktestConfig, family: Family, json: bool) -> Result<()> {
    let grid = family.default_grid();
    if grid.is_empty() {
        bail!("the {} grid is empty", family);
    }

    let tuner = Tuner::new(Evaluator::new(config.evaluator_config()));
    let result = tuner.tune(series, &grid)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("{}", SEPARATOR);
    println!("Grid search over {} {} configurations", grid.len(), family);
    println!("{}", SEPARATOR);
    println!("Best hyperparameters: {}", result.best.name);
    println!("Mean MAE:             {:.4}", result.best.mean_score);
    println!("Failed folds:         {}", result.best.failure_count);

    println!("\nTop configurations:");
    for entry in result.ranked.iter().take(10) {
        println!(
            "  {:<24} mean {:>12.4}  failures {}",
            entry.name, entry.mean_score, entry.failure_count
        );
    }
    let with_failures = result.ranked.iter().filter(|r| r.failure_count > 0).count();
    println!(
        "\n{} of {} configurations failed at least one fold",
        with_failures,
        result.ranked.len()
    );

    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("owl_backtest=info,forecast_backtest=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            data,
            folds,
            config,
            json,
        } => {
            let config = load_config(config.as_deref(), folds)?;
            let series = load_series(&data, &config)?;
            cmd_evaluate(&series, &config, json)?;
        }
        Commands::Tune {
            data,
            family,
            folds,
            config,
            json,
        } => {
            let config = load_config(config.as_deref(), folds)?;
            let series = load_series(&data, &config)?;
            cmd_tune(&series, &config, family, json)?;
        }
    }

    Ok(())
}
