//! Exponential smoothing models for time series forecasting
//!
//! Covers simple smoothing, Holt's linear trend, the damped trend variant and
//! additive Holt-Winters seasonality. State recursions (with `φ = 1` unless
//! the trend is damped and `s` only present with a seasonal period `m`):
//!
//! - Level: `l_t = α (y_t - s_{t-m}) + (1 - α)(l_{t-1} + φ b_{t-1})`
//! - Trend: `b_t = β (l_t - l_{t-1}) + (1 - β) φ b_{t-1}`
//! - Season: `s_t = γ (y_t - l_t) + (1 - γ) s_{t-m}`
//! - Forecast: `ŷ_{T+h} = l_T + (φ + … + φ^h) b_T + s_{T+h-m}`
//!
//! The smoothing parameters are estimated by minimising the one-step-ahead
//! sum of squared errors over the training window.

use crate::error::ModelFitError;
use crate::models::{FitOptions, ForecastModel, ForecastResult, TrainedForecastModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use trade_math::nelder_mead;

const UNIT_BOUNDS: (f64, f64) = (0.0001, 0.9999);
const PHI_BOUNDS: (f64, f64) = (0.8, 0.98);

/// Trend component of an exponential smoothing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    /// Level only
    None,
    /// Linear (Holt) trend
    Additive,
    /// Trend damped towards flat by `φ`
    Damped,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::None => write!(f, "none"),
            Trend::Additive => write!(f, "additive"),
            Trend::Damped => write!(f, "damped"),
        }
    }
}

/// Structure of an exponential smoothing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SmoothingConfig {
    /// Trend component
    pub trend: Trend,
    /// Additive seasonal period; periods below 2 mean no seasonality
    pub seasonal_period: Option<usize>,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            trend: Trend::Additive,
            seasonal_period: None,
        }
    }
}

impl fmt::Display for SmoothingConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.season() {
            Some(m) => write!(f, "ETS({},season={})", self.trend, m),
            None => write!(f, "ETS({})", self.trend),
        }
    }
}

impl SmoothingConfig {
    /// Non-seasonal model with the given trend
    pub fn new(trend: Trend) -> Self {
        Self {
            trend,
            seasonal_period: None,
        }
    }

    /// Additive seasonal model with the given trend and period
    pub fn seasonal(trend: Trend, period: usize) -> Self {
        Self {
            trend,
            seasonal_period: Some(period),
        }
    }

    fn season(&self) -> Option<usize> {
        self.seasonal_period.filter(|&m| m >= 2)
    }

    fn min_observations(&self) -> usize {
        match (self.season(), self.trend) {
            (Some(m), _) => 2 * m,
            (None, Trend::None) => 1,
            (None, _) => 2,
        }
    }

    /// Unpack a parameter vector laid out as `[α, β?, γ?, φ?]`
    fn unpack(&self, params: &[f64]) -> Params {
        let mut iter = params.iter().copied();
        let alpha = iter.next().unwrap_or(UNIT_BOUNDS.0);
        let beta = if self.trend == Trend::None {
            0.0
        } else {
            iter.next().unwrap_or(UNIT_BOUNDS.0)
        };
        let gamma = if self.season().is_some() {
            iter.next().unwrap_or(UNIT_BOUNDS.0)
        } else {
            0.0
        };
        let phi = if self.trend == Trend::Damped {
            iter.next().unwrap_or(PHI_BOUNDS.1)
        } else {
            1.0
        };
        Params {
            alpha,
            beta,
            gamma,
            phi,
        }
    }

    /// Starting point and bounds for the parameter search
    fn search_space(&self) -> (Vec<f64>, Vec<(f64, f64)>) {
        let mut initial = vec![0.3];
        let mut bounds = vec![UNIT_BOUNDS];
        if self.trend != Trend::None {
            initial.push(0.1);
            bounds.push(UNIT_BOUNDS);
        }
        if self.season().is_some() {
            initial.push(0.1);
            bounds.push(UNIT_BOUNDS);
        }
        if self.trend == Trend::Damped {
            initial.push(0.95);
            bounds.push(PHI_BOUNDS);
        }
        (initial, bounds)
    }

    /// Run the state recursion over `values` with fixed parameters
    fn run(&self, values: &[f64], params: &Params) -> State {
        let has_trend = self.trend != Trend::None;
        let n = values.len();

        let (mut level, mut trend, mut season, start) = match self.season() {
            Some(m) => {
                let first = mean(&values[..m]);
                let trend = if has_trend {
                    (mean(&values[m..2 * m]) - first) / m as f64
                } else {
                    0.0
                };
                let season: Vec<f64> = values[..m].iter().map(|y| y - first).collect();
                (first, trend, season, m)
            }
            None => {
                let trend = if has_trend && n > 1 {
                    values[1] - values[0]
                } else {
                    0.0
                };
                (values[0], trend, Vec::new(), 1)
            }
        };

        let mut sse = 0.0;
        for t in start..n {
            let y = values[t];
            let seasonal = match self.season() {
                Some(m) => season[t - m],
                None => 0.0,
            };

            let forecast = level + params.phi * trend + seasonal;
            let error = y - forecast;
            sse += error * error;

            let previous_level = level;
            level = params.alpha * (y - seasonal) + (1.0 - params.alpha) * (level + params.phi * trend);
            if has_trend {
                trend = params.beta * (level - previous_level) + (1.0 - params.beta) * params.phi * trend;
            }
            if self.season().is_some() {
                season.push(params.gamma * (y - level) + (1.0 - params.gamma) * seasonal);
            }
        }

        // Only the last season is needed for forecasting
        if let Some(m) = self.season() {
            season.drain(..season.len() - m);
        }

        State {
            sse,
            level,
            trend,
            season,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Params {
    alpha: f64,
    beta: f64,
    gamma: f64,
    phi: f64,
}

#[derive(Debug, Clone)]
struct State {
    sse: f64,
    level: f64,
    trend: f64,
    season: Vec<f64>,
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Fitted exponential smoothing model
#[derive(Debug, Clone)]
pub struct FittedSmoothing {
    /// Name of the model
    name: String,
    /// Level smoothing parameter
    alpha: f64,
    /// Trend smoothing parameter (0 without trend)
    beta: f64,
    /// Seasonal smoothing parameter (0 without seasonality)
    gamma: f64,
    /// Damping parameter (1 unless damped)
    phi: f64,
    /// Final level
    level: f64,
    /// Final trend
    trend: f64,
    /// Seasonal states for the last `m` training steps, oldest first
    season: Vec<f64>,
    /// One-step-ahead SSE over the training window
    sse: f64,
}

impl FittedSmoothing {
    /// Name of the fitted model
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Estimated (α, β, γ, φ)
    pub fn parameters(&self) -> (f64, f64, f64, f64) {
        (self.alpha, self.beta, self.gamma, self.phi)
    }

    /// Final level state
    pub fn level(&self) -> f64 {
        self.level
    }

    /// Final trend state
    pub fn trend(&self) -> f64 {
        self.trend
    }

    /// One-step-ahead sum of squared errors on the training window
    pub fn sse(&self) -> f64 {
        self.sse
    }
}

impl ForecastModel for SmoothingConfig {
    type Fitted = FittedSmoothing;

    fn fit(&self, train: &[f64], options: &FitOptions) -> Result<FittedSmoothing, ModelFitError> {
        let needed = self.min_observations();
        if train.len() < needed {
            return Err(ModelFitError::InsufficientObservations {
                needed,
                got: train.len(),
            });
        }

        let started = Instant::now();
        let (initial, bounds) = self.search_space();
        let result = nelder_mead(
            |p| self.run(train, &self.unpack(p)).sse,
            &initial,
            Some(&bounds),
            &options.minimiser(started),
        );
        let result = options.check(result)?;

        let params = self.unpack(&result.point);
        let state = self.run(train, &params);
        if !state.level.is_finite() || !state.trend.is_finite() || state.season.iter().any(|s| !s.is_finite()) {
            return Err(ModelFitError::non_finite("smoothing state diverged"));
        }

        Ok(FittedSmoothing {
            name: self.to_string(),
            alpha: params.alpha,
            beta: params.beta,
            gamma: params.gamma,
            phi: params.phi,
            level: state.level,
            trend: state.trend,
            season: state.season,
            sse: state.sse,
        })
    }

    fn name(&self) -> String {
        self.to_string()
    }
}

impl TrainedForecastModel for FittedSmoothing {
    fn forecast(self, horizon: usize) -> Result<ForecastResult, ModelFitError> {
        if horizon == 0 {
            return Err(ModelFitError::InvalidHorizon { horizon });
        }

        let mut damped_sum = 0.0;
        let mut phi_power = 1.0;
        let values = (1..=horizon)
            .map(|h| {
                phi_power *= self.phi;
                damped_sum += phi_power;
                let seasonal = if self.season.is_empty() {
                    0.0
                } else {
                    self.season[(h - 1) % self.season.len()]
                };
                self.level + damped_sum * self.trend + seasonal
            })
            .collect();

        ForecastResult::checked(values)
    }
}
