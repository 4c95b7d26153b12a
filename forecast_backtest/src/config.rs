//! Run configuration loaded from JSON

use crate::error::{ForecastError, Result};
use crate::evaluator::EvaluatorConfig;
use crate::models::FitOptions;
use crate::series::DuplicateDayPolicy;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

/// Settings for an evaluation or tuning run.
///
/// Missing fields take their default values, so `{}` is a valid file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Number of rolling-origin folds
    pub folds: usize,
    /// Evaluate folds and grid entries on the rayon pool
    pub parallel: bool,
    /// Wall-clock limit per fit in milliseconds, `None` for no limit
    pub fit_timeout_ms: Option<u64>,
    /// Iteration budget for parameter estimation
    pub max_iterations: usize,
    /// Convergence tolerance for parameter estimation
    pub tolerance: f64,
    /// How market-chart loading treats several prices on one day
    pub duplicate_days: DuplicateDayPolicy,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            parallel: true,
            fit_timeout_ms: Some(5000),
            max_iterations: 1000,
            tolerance: 1e-8,
            duplicate_days: DuplicateDayPolicy::KeepLast,
        }
    }
}

impl BacktestConfig {
    /// Load and validate a configuration file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.folds == 0 {
            return Err(ForecastError::InvalidParameter(
                "folds must be at least 1".to_string(),
            ));
        }
        if self.max_iterations == 0 {
            return Err(ForecastError::InvalidParameter(
                "max_iterations must be at least 1".to_string(),
            ));
        }
        if self.tolerance <= 0.0 || !self.tolerance.is_finite() {
            return Err(ForecastError::InvalidParameter(format!(
                "tolerance must be positive and finite, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            max_iterations: self.max_iterations,
            tolerance: self.tolerance,
            time_limit: self.fit_timeout_ms.map(Duration::from_millis),
        }
    }

    pub fn evaluator_config(&self) -> EvaluatorConfig {
        EvaluatorConfig {
            folds: self.folds,
            parallel: self.parallel,
            fit: self.fit_options(),
        }
    }
}

impl From<&BacktestConfig> for EvaluatorConfig {
    fn from(config: &BacktestConfig) -> Self {
        config.evaluator_config()
    }
}
