//! # Owl Backtest
//!
//! `owl_backtest` bundles the backtesting crates of the workspace behind one
//! import and holds the model sets the command-line tool runs by default.
//!
//! ## Example
//!
//! ```
//! use owl_backtest::prelude::*;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let series = Series::from_values(start, (0..30).map(|i| 50.0 + i as f64).collect()).unwrap();
//!
//! let evaluator = Evaluator::new(EvaluatorConfig { folds: 3, ..Default::default() });
//! let report = evaluator.evaluate(&series, &owl_backtest::default_models()).unwrap();
//! assert_eq!(report.model_names().count(), 2);
//! ```

pub use forecast_backtest;
pub use trade_math;

use forecast_backtest::{ArimaGrid, ModelConfig, SmoothingGrid};
use std::fmt;
use std::str::FromStr;

/// Everything needed to load a series, evaluate models and tune them
pub mod prelude {
    pub use chrono::NaiveDate;
    pub use forecast_backtest::models::{ArimaOrder, SmoothingConfig, Trend};
    pub use forecast_backtest::{
        split, ArimaGrid, BacktestConfig, DataLoader, DuplicateDayPolicy, EvaluationReport,
        Evaluator, EvaluatorConfig, FitOptions, Fold, FoldOutcome, ForecastError, ForecastModel,
        ModelConfig, ModelFitError, RankedConfig, ScoreRecord, ScoreSummary, Series,
        SmoothingGrid, TrainedForecastModel, Tuner, TuningResult,
    };
}

/// Models compared by a plain evaluation run: Holt smoothing and ARIMA(1,1,1)
pub fn default_models() -> Vec<ModelConfig> {
    vec![ModelConfig::exponential_smoothing(), ModelConfig::arima(1, 1, 1)]
}

/// Model family a grid search runs over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Family {
    #[default]
    Arima,
    Smoothing,
}

impl Family {
    /// The default grid of this family, in search order
    pub fn default_grid(self) -> Vec<ModelConfig> {
        match self {
            Family::Arima => ArimaGrid::default().configs(),
            Family::Smoothing => SmoothingGrid::default().configs(),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Family::Arima => write!(f, "arima"),
            Family::Smoothing => write!(f, "smoothing"),
        }
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "arima" => Ok(Family::Arima),
            "smoothing" | "ets" | "exponential_smoothing" => Ok(Family::Smoothing),
            other => Err(format!("unknown model family: {}", other)),
        }
    }
}
