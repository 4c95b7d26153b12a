//! Error types for the forecast_backtest crate

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors surfaced to callers of the backtesting engine
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The series is too short for the requested number of folds
    #[error("Insufficient data: {folds} folds need at least {needed} observations, got {got}")]
    InsufficientData {
        folds: usize,
        needed: usize,
        got: usize,
    },

    /// Every configuration in a grid search failed on every fold
    #[error("No viable configuration: all {configs} configurations failed on all {folds} folds")]
    NoViableConfig { configs: usize, folds: usize },

    /// The series violates an ordering, length or value invariant
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A single model fit or forecast failed
    #[error("Model fit error: {0}")]
    ModelFit(#[from] ModelFitError),

    /// Error related to data loading or conversion
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error decoding JSON documents
    #[error("JSON error: {0}")]
    JsonError(String),

    /// Error decoding CSV documents
    #[error("CSV error: {0}")]
    CsvError(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<serde_json::Error> for ForecastError {
    fn from(err: serde_json::Error) -> Self {
        ForecastError::JsonError(err.to_string())
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::CsvError(err.to_string())
    }
}

/// Why fitting or forecasting a single fold failed.
///
/// These are expected outcomes for some hyperparameter regions. The evaluator
/// stores them in the fold's score record instead of aborting the run.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelFitError {
    /// The training window is too short for the requested model structure
    #[error("insufficient observations: need at least {needed}, got {got}")]
    InsufficientObservations { needed: usize, got: usize },

    /// The estimation produced non-finite values
    #[error("non-finite estimate: {message}")]
    NonFinite { message: String },

    /// The fit did not finish within the configured time limit
    #[error("fit exceeded time limit of {limit_ms} ms")]
    Timeout { limit_ms: u64 },

    /// A forecast was requested for a horizon of zero
    #[error("invalid forecast horizon: {horizon}")]
    InvalidHorizon { horizon: usize },

    /// The model returned a different number of values than requested
    #[error("forecast returned {got} values for a horizon of {expected}")]
    ForecastLength { expected: usize, got: usize },
}

impl ModelFitError {
    pub(crate) fn non_finite(message: impl Into<String>) -> Self {
        ModelFitError::NonFinite {
            message: message.into(),
        }
    }
}
