//! Rolling-origin evaluation of forecast models
//!
//! The evaluator splits a series into expanding-window folds, fits every model
//! on every fold's training window, forecasts the fold's test window and
//! records the mean absolute error. A fold whose fit or forecast fails is
//! recorded as failed; it never aborts the other folds or models.

use crate::error::{ForecastError, ModelFitError, Result};
use crate::metrics::ScoreSummary;
use crate::models::{FitOptions, ForecastModel, ModelConfig, TrainedForecastModel};
use crate::series::Series;
use crate::splitter::{split, Fold};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

/// Evaluation settings
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatorConfig {
    /// Number of folds
    pub folds: usize,
    /// Dispatch fold evaluations on the rayon pool
    pub parallel: bool,
    /// Bounds on every single fit
    pub fit: FitOptions,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            folds: 5,
            parallel: true,
            fit: FitOptions::default(),
        }
    }
}

/// Result of one model on one fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FoldOutcome {
    /// The model was fitted and its forecast scored
    Scored { mae: f64 },
    /// Fitting or forecasting failed
    Failed { reason: ModelFitError },
}

/// Score of one model on one fold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub model_name: String,
    pub fold_index: usize,
    pub outcome: FoldOutcome,
}

impl ScoreRecord {
    /// The fold's MAE, or `+∞` if the fold failed
    pub fn error(&self) -> f64 {
        self.mae().unwrap_or(f64::INFINITY)
    }

    /// The fold's MAE if it was scored
    pub fn mae(&self) -> Option<f64> {
        match self.outcome {
            FoldOutcome::Scored { mae } => Some(mae),
            FoldOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, FoldOutcome::Failed { .. })
    }

    /// Why the fold failed, if it did
    pub fn failure(&self) -> Option<&ModelFitError> {
        match &self.outcome {
            FoldOutcome::Failed { reason } => Some(reason),
            FoldOutcome::Scored { .. } => None,
        }
    }
}

/// Per-model fold scores from one evaluation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    folds: Vec<Fold>,
    models: Vec<String>,
    scores: BTreeMap<String, Vec<ScoreRecord>>,
}

impl EvaluationReport {
    /// Fold boundaries the models were evaluated on
    pub fn folds(&self) -> &[Fold] {
        &self.folds
    }

    /// Model names in the order they were supplied
    pub fn model_names(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(String::as_str)
    }

    /// Fold scores of one model, in fold order
    pub fn scores(&self, model_name: &str) -> Option<&[ScoreRecord]> {
        self.scores.get(model_name).map(Vec::as_slice)
    }

    /// All scores keyed by model name
    pub fn all_scores(&self) -> &BTreeMap<String, Vec<ScoreRecord>> {
        &self.scores
    }

    /// Mean and spread of one model's scored folds plus its failure count
    pub fn summary(&self, model_name: &str) -> Option<ScoreSummary> {
        self.scores(model_name)
            .map(|records| ScoreSummary::from_scores(records.iter().map(ScoreRecord::mae)))
    }
}

/// Drives the splitter and the model adapters
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate a set of models over the same folds.
    ///
    /// Fails if `models` is empty, two models share a display name or the
    /// series is too short for the configured fold count. Fit failures are
    /// recorded in the report.
    pub fn evaluate(&self, series: &Series, models: &[ModelConfig]) -> Result<EvaluationReport> {
        if models.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "at least one model is required".to_string(),
            ));
        }

        let names: Vec<String> = models.iter().map(ForecastModel::name).collect();
        if let Some(duplicate) = first_duplicate(&names) {
            return Err(ForecastError::InvalidParameter(format!(
                "model {} is listed more than once",
                duplicate
            )));
        }

        let folds = split(series, self.config.folds)?;
        info!(
            observations = series.len(),
            folds = folds.len(),
            models = models.len(),
            "starting evaluation"
        );

        let tasks: Vec<(usize, &Fold)> = (0..models.len())
            .flat_map(|m| folds.iter().map(move |fold| (m, fold)))
            .collect();

        let run = |&(m, fold): &(usize, &Fold)| self.score_fold(series, &models[m], &names[m], fold);
        let records: Vec<ScoreRecord> = if self.config.parallel {
            tasks.par_iter().map(run).collect()
        } else {
            tasks.iter().map(run).collect()
        };

        let mut scores: BTreeMap<String, Vec<ScoreRecord>> = BTreeMap::new();
        for record in records {
            scores
                .entry(record.model_name.clone())
                .or_default()
                .push(record);
        }

        let report = EvaluationReport {
            folds,
            models: names,
            scores,
        };
        for name in report.model_names() {
            if let Some(summary) = report.summary(name) {
                info!(
                    model = %name,
                    mean_mae = summary.mean,
                    failures = summary.failures,
                    "model evaluated"
                );
            }
        }

        Ok(report)
    }

    /// Evaluate a single model
    pub fn evaluate_one(&self, series: &Series, model: &ModelConfig) -> Result<EvaluationReport> {
        self.evaluate(series, std::slice::from_ref(model))
    }

    /// Score one configuration on precomputed folds, sequentially
    pub(crate) fn score_config(
        &self,
        series: &Series,
        folds: &[Fold],
        model: &ModelConfig,
    ) -> Vec<ScoreRecord> {
        let name = model.name();
        folds
            .iter()
            .map(|fold| self.score_fold(series, model, &name, fold))
            .collect()
    }

    fn score_fold(&self, series: &Series, model: &ModelConfig, name: &str, fold: &Fold) -> ScoreRecord {
        let train = series.values_in(fold.train.clone()).to_vec();
        let test = series.values_in(fold.test.clone()).to_vec();

        let outcome = match fit_and_score(model, &train, &test, &self.config.fit) {
            Ok(mae) => {
                debug!(model = %name, fold = fold.index, mae, "fold scored");
                FoldOutcome::Scored { mae }
            }
            Err(reason) => {
                warn!(model = %name, fold = fold.index, error = %reason, "fold failed");
                FoldOutcome::Failed { reason }
            }
        };

        ScoreRecord {
            model_name: name.to_string(),
            fold_index: fold.index,
            outcome,
        }
    }
}

fn first_duplicate(names: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    names
        .iter()
        .map(String::as_str)
        .find(|name| !seen.insert(*name))
}

fn fit_and_score(
    model: &ModelConfig,
    train: &[f64],
    test: &[f64],
    options: &FitOptions,
) -> std::result::Result<f64, ModelFitError> {
    let fitted = model.fit(train, options)?;
    let forecast = fitted.forecast(test.len())?;

    let mae = forecast
        .mean_absolute_error(test)
        .map_err(|_| ModelFitError::ForecastLength {
            expected: test.len(),
            got: forecast.horizon(),
        })?;
    if !mae.is_finite() {
        return Err(ModelFitError::NonFinite {
            message: format!("forecast error is {}", mae),
        });
    }

    Ok(mae)
}
