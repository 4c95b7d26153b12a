//! Forecasting models behind one fit/forecast contract
//!
//! Each algorithm family lives in its own module and implements
//! [`ForecastModel`]. [`ModelConfig`] is the closed set of families the
//! evaluator works with; adding an algorithm means adding a module and a
//! variant here, the evaluator and tuner stay untouched.

use crate::error::{ForecastError, ModelFitError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::time::{Duration, Instant};
use trade_math::{NelderMeadConfig, NelderMeadResult, Termination};

pub mod arima;
pub mod exponential_smoothing;

pub use arima::{ArimaOrder, FittedArima};
pub use exponential_smoothing::{FittedSmoothing, SmoothingConfig, Trend};

/// Forecast values for a horizon, aligned with the test window they predict
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    values: Vec<f64>,
    horizon: usize,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizon: usize) -> Result<Self> {
        if values.len() != horizon {
            return Err(ForecastError::InvalidParameter(format!(
                "Values length ({}) doesn't match horizon ({})",
                values.len(),
                horizon
            )));
        }

        Ok(Self { values, horizon })
    }

    /// Wrap model output, rejecting non-finite values
    pub(crate) fn checked(values: Vec<f64>) -> std::result::Result<Self, ModelFitError> {
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(ModelFitError::non_finite(format!(
                "forecast step {} is {}",
                i + 1,
                values[i]
            )));
        }
        let horizon = values.len();
        Ok(Self { values, horizon })
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.horizon
    }

    /// Calculate mean absolute error between forecast and actual values
    pub fn mean_absolute_error(&self, actual: &[f64]) -> Result<f64> {
        crate::metrics::mean_absolute_error(&self.values, actual)
    }
}

/// Bounds on a single fit
#[derive(Debug, Clone, PartialEq)]
pub struct FitOptions {
    /// Iteration budget for parameter estimation
    pub max_iterations: usize,
    /// Convergence tolerance for parameter estimation
    pub tolerance: f64,
    /// Wall-clock limit for one fit; exceeding it fails the fit with a timeout
    pub time_limit: Option<Duration>,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
            tolerance: 1e-8,
            time_limit: Some(Duration::from_secs(5)),
        }
    }
}

impl FitOptions {
    /// Minimiser configuration for a fit that started at `started`
    pub(crate) fn minimiser(&self, started: Instant) -> NelderMeadConfig {
        NelderMeadConfig {
            max_iter: self.max_iterations,
            tolerance: self.tolerance,
            deadline: self.time_limit.map(|limit| started + limit),
            ..Default::default()
        }
    }

    /// Map a minimiser run onto the fit contract.
    ///
    /// Running out of iterations is accepted (the best point found is used);
    /// running out of time or ending on a non-finite objective is not.
    pub(crate) fn check(
        &self,
        result: NelderMeadResult,
    ) -> std::result::Result<NelderMeadResult, ModelFitError> {
        if result.termination == Termination::DeadlineExceeded {
            let limit_ms = self
                .time_limit
                .map(|limit| u64::try_from(limit.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or_default();
            return Err(ModelFitError::Timeout { limit_ms });
        }
        if !result.value.is_finite() || result.point.iter().any(|p| !p.is_finite()) {
            return Err(ModelFitError::non_finite(format!(
                "estimation ended at objective {}",
                result.value
            )));
        }
        Ok(result)
    }
}

/// A fitted model, consumed by a single forecast call
pub trait TrainedForecastModel: Debug {
    /// Forecast `horizon` steps past the end of the training data
    fn forecast(self, horizon: usize) -> std::result::Result<ForecastResult, ModelFitError>;
}

/// Forecast model that can be fitted to a training window
pub trait ForecastModel {
    /// The type of fitted model produced
    type Fitted: TrainedForecastModel;

    /// Fit the model to the training values
    fn fit(
        &self,
        train: &[f64],
        options: &FitOptions,
    ) -> std::result::Result<Self::Fitted, ModelFitError>;

    /// Display name of the configured model
    fn name(&self) -> String;
}

/// A forecasting algorithm family together with its hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ModelConfig {
    /// Exponential smoothing (Holt, damped Holt, additive Holt-Winters)
    ExponentialSmoothing(SmoothingConfig),
    /// Autoregressive integrated moving average of a given order
    Arima(ArimaOrder),
}

impl ModelConfig {
    /// Exponential smoothing with additive trend and no seasonality
    pub fn exponential_smoothing() -> Self {
        ModelConfig::ExponentialSmoothing(SmoothingConfig::default())
    }

    /// ARIMA(p, d, q)
    pub fn arima(p: usize, d: usize, q: usize) -> Self {
        ModelConfig::Arima(ArimaOrder::new(p, d, q))
    }

    /// Name of the algorithm family
    pub fn family(&self) -> &'static str {
        match self {
            ModelConfig::ExponentialSmoothing(_) => "ExponentialSmoothing",
            ModelConfig::Arima(_) => "ARIMA",
        }
    }
}

impl fmt::Display for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelConfig::ExponentialSmoothing(config) => write!(f, "{}", config),
            ModelConfig::Arima(order) => write!(f, "{}", order),
        }
    }
}

/// Fitted state of any model family
#[derive(Debug, Clone)]
pub enum FittedModel {
    ExponentialSmoothing(FittedSmoothing),
    Arima(FittedArima),
}

impl TrainedForecastModel for FittedModel {
    fn forecast(self, horizon: usize) -> std::result::Result<ForecastResult, ModelFitError> {
        match self {
            FittedModel::ExponentialSmoothing(model) => model.forecast(horizon),
            FittedModel::Arima(model) => model.forecast(horizon),
        }
    }
}

impl ForecastModel for ModelConfig {
    type Fitted = FittedModel;

    fn fit(
        &self,
        train: &[f64],
        options: &FitOptions,
    ) -> std::result::Result<FittedModel, ModelFitError> {
        match self {
            ModelConfig::ExponentialSmoothing(config) => config
                .fit(train, options)
                .map(FittedModel::ExponentialSmoothing),
            ModelConfig::Arima(order) => order.fit(train, options).map(FittedModel::Arima),
        }
    }

    fn name(&self) -> String {
        self.to_string()
    }
}
