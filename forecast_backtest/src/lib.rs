//! # Forecast Backtest
//!
//! Rolling-origin cross-validation for univariate price forecasting models.
//!
//! ## Features
//!
//! - Daily price series with ordering and gap checks
//! - Loading from market-chart JSON and `date,price` CSV
//! - Expanding-window fold generation with no lookahead
//! - Forecasting models behind one fit/forecast contract (Exponential Smoothing, ARIMA)
//! - Per-fold MAE scoring where fit failures are recorded, not raised
//! - Grid search ranked by failure count, then mean error, then grid order
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use forecast_backtest::evaluator::{Evaluator, EvaluatorConfig};
//! use forecast_backtest::models::ModelConfig;
//! use forecast_backtest::series::Series;
//! use forecast_backtest::tuner::Tuner;
//!
//! # fn main() -> forecast_backtest::Result<()> {
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = Series::from_values(start, (0..40).map(|i| 100.0 + i as f64).collect())?;
//!
//! let evaluator = Evaluator::new(EvaluatorConfig {
//!     folds: 4,
//!     ..Default::default()
//! });
//! let report = evaluator.evaluate(&series, &[ModelConfig::exponential_smoothing()])?;
//! assert_eq!(report.scores("ETS(additive)").map(|s| s.len()), Some(4));
//!
//! let grid = vec![ModelConfig::arima(0, 1, 0), ModelConfig::arima(1, 1, 0)];
//! let result = Tuner::new(evaluator).tune(&series, &grid)?;
//! println!("best: {} ({:.4})", result.best.name, result.best.mean_score);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod grid;
pub mod metrics;
pub mod models;
pub mod series;
pub mod splitter;
pub mod tuner;

// Re-export commonly used types
pub use crate::config::BacktestConfig;
pub use crate::data::DataLoader;
pub use crate::error::{ForecastError, ModelFitError, Result};
pub use crate::evaluator::{EvaluationReport, Evaluator, EvaluatorConfig, FoldOutcome, ScoreRecord};
pub use crate::grid::{ArimaGrid, SmoothingGrid};
pub use crate::metrics::ScoreSummary;
pub use crate::models::{FitOptions, ForecastModel, ForecastResult, ModelConfig, TrainedForecastModel};
pub use crate::series::{DuplicateDayPolicy, Series};
pub use crate::splitter::{split, Fold};
pub use crate::tuner::{RankedConfig, Tuner, TuningResult};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
