//! Grid search over model configurations
//!
//! Every configuration in the grid is scored on the same rolling-origin folds
//! and the grid is ranked by `(failure_count, mean_score, grid_index)`. A
//! configuration with a failed fold therefore never outranks one without,
//! whatever its mean over the folds it did complete, and ties go to the
//! configuration listed first.

use crate::error::{ForecastError, Result};
use crate::evaluator::{Evaluator, ScoreRecord};
use crate::metrics::ScoreSummary;
use crate::models::{ForecastModel, ModelConfig};
use crate::series::Series;
use crate::splitter::split;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::info;

/// Cross-validated score of one grid entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedConfig {
    pub config: ModelConfig,
    pub name: String,
    /// Mean MAE over the folds that completed, `+∞` if none did
    pub mean_score: f64,
    pub std_dev: f64,
    pub failure_count: usize,
    /// Fold scores in fold order
    pub folds: Vec<ScoreRecord>,
    /// Position of the configuration in the grid
    pub grid_index: usize,
}

impl RankedConfig {
    fn from_scores(grid_index: usize, config: ModelConfig, folds: Vec<ScoreRecord>) -> Self {
        let summary = ScoreSummary::from_scores(folds.iter().map(ScoreRecord::mae));
        Self {
            name: config.name(),
            config,
            mean_score: summary.mean,
            std_dev: summary.std_dev,
            failure_count: summary.failures,
            folds,
            grid_index,
        }
    }

    /// Whether at least one fold was scored
    pub fn is_viable(&self) -> bool {
        self.failure_count < self.folds.len()
    }

    fn rank(&self, other: &Self) -> Ordering {
        self.failure_count
            .cmp(&other.failure_count)
            .then_with(|| self.mean_score.total_cmp(&other.mean_score))
            .then_with(|| self.grid_index.cmp(&other.grid_index))
    }
}

/// Outcome of a grid search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TuningResult {
    pub best: RankedConfig,
    /// Every grid entry, best first
    pub ranked: Vec<RankedConfig>,
}

impl TuningResult {
    /// Best configuration
    pub fn best_config(&self) -> &ModelConfig {
        &self.best.config
    }

    /// Mean score of the best configuration
    pub fn best_score(&self) -> f64 {
        self.best.mean_score
    }
}

/// Selects the configuration with the lowest cross-validated error
#[derive(Debug, Clone, Default)]
pub struct Tuner {
    evaluator: Evaluator,
}

impl Tuner {
    pub fn new(evaluator: Evaluator) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Score every configuration in `grid` and rank them.
    ///
    /// # Errors
    ///
    /// - [`ForecastError::InvalidParameter`] for an empty grid
    /// - [`ForecastError::InsufficientData`] if the series cannot be split
    /// - [`ForecastError::NoViableConfig`] if every configuration failed on
    ///   every fold
    pub fn tune(&self, series: &Series, grid: &[ModelConfig]) -> Result<TuningResult> {
        if grid.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "configuration grid is empty".to_string(),
            ));
        }

        let config = self.evaluator.config();
        let folds = split(series, config.folds)?;
        info!(
            observations = series.len(),
            folds = folds.len(),
            configs = grid.len(),
            "starting grid search"
        );

        let score = |(i, model): (usize, &ModelConfig)| {
            let records = self.evaluator.score_config(series, &folds, model);
            RankedConfig::from_scores(i, model.clone(), records)
        };
        let mut ranked: Vec<RankedConfig> = if config.parallel {
            grid.par_iter().enumerate().map(score).collect()
        } else {
            grid.iter().enumerate().map(score).collect()
        };

        if !ranked.iter().any(RankedConfig::is_viable) {
            return Err(ForecastError::NoViableConfig {
                configs: grid.len(),
                folds: folds.len(),
            });
        }

        ranked.sort_by(RankedConfig::rank);
        let best = ranked[0].clone();
        info!(
            best = %best.name,
            mean_score = best.mean_score,
            failures = best.failure_count,
            "grid search finished"
        );

        Ok(TuningResult { best, ranked })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::EvaluatorConfig;

    fn ranked(grid_index: usize, mean_score: f64, failure_count: usize) -> RankedConfig {
        RankedConfig {
            config: ModelConfig::arima(grid_index, 0, 0),
            name: format!("ARIMA({},0,0)", grid_index),
            mean_score,
            std_dev: 0.0,
            failure_count,
            folds: Vec::new(),
            grid_index,
        }
    }

    #[test]
    fn failures_dominate_score() {
        let mut entries = vec![ranked(0, 0.1, 1), ranked(1, 5.0, 0), ranked(2, 3.0, 0)];
        entries.sort_by(RankedConfig::rank);
        let order: Vec<usize> = entries.iter().map(|e| e.grid_index).collect();
        assert_eq!(order, vec![2, 1, 0]);
    }

    #[test]
    fn ties_keep_grid_order() {
        let mut entries = vec![ranked(3, 1.0, 0), ranked(1, 1.0, 0), ranked(2, 1.0, 0)];
        entries.sort_by(RankedConfig::rank);
        let order: Vec<usize> = entries.iter().map(|e| e.grid_index).collect();
        assert_eq!(order, vec![1, 2, 3]);
    }

    #[test]
    fn rejects_empty_grid() {
        let series = Series::from_values(
            chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            vec![1.0; 12],
        )
        .unwrap();
        let tuner = Tuner::new(Evaluator::new(EvaluatorConfig {
            folds: 2,
            ..Default::default()
        }));
        assert!(matches!(
            tuner.tune(&series, &[]),
            Err(ForecastError::InvalidParameter(_))
        ));
    }
}
