//! ARIMA models for time series forecasting
//!
//! The series is differenced `d` times and an ARMA(p, q) model with an
//! intercept is fitted to the result by conditional sum of squares (CSS):
//!
//! `z_t = c + φ_1 z_{t-1} + … + φ_p z_{t-p} + e_t + θ_1 e_{t-1} + … + θ_q e_{t-q}`
//!
//! Residuals before the first `p` observations are taken as zero.
//! Forecasts are produced recursively on the differenced scale with future
//! residuals set to zero and then integrated back onto the price scale.

use crate::error::ModelFitError;
use crate::models::{FitOptions, ForecastModel, ForecastResult, TrainedForecastModel};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use trade_math::{difference, integrate, nelder_mead};

/// Bound on every AR and MA coefficient during estimation
const COEFFICIENT_BOUND: f64 = 0.99;

/// ARIMA order (p, d, q)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArimaOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl fmt::Display for ArimaOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

impl ArimaOrder {
    /// Create a new order
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }

    /// Number of estimated parameters, intercept included
    pub fn parameter_count(&self) -> usize {
        self.p + self.q + 1
    }

    /// Shortest training window this order can be fitted on
    pub fn min_observations(&self) -> usize {
        self.d + self.p.max(self.q) + self.parameter_count() + 1
    }

    /// Split a parameter vector into (intercept, AR, MA)
    fn unpack<'a>(&self, params: &'a [f64]) -> (f64, &'a [f64], &'a [f64]) {
        (params[0], &params[1..1 + self.p], &params[1 + self.p..])
    }

    /// CSS residuals of the differenced series for the given parameters
    fn residuals(&self, z: &[f64], params: &[f64]) -> Vec<f64> {
        let (intercept, ar, ma) = self.unpack(params);
        let mut residuals = vec![0.0; z.len()];

        for t in self.p..z.len() {
            let mut prediction = intercept;
            for (i, phi) in ar.iter().enumerate() {
                prediction += phi * z[t - 1 - i];
            }
            for (j, theta) in ma.iter().enumerate() {
                if t > j {
                    prediction += theta * residuals[t - 1 - j];
                }
            }
            residuals[t] = z[t] - prediction;
        }

        residuals
    }

    fn css(&self, z: &[f64], params: &[f64]) -> f64 {
        self.residuals(z, params)[self.p..]
            .iter()
            .map(|e| e * e)
            .sum()
    }
}

/// Fitted ARIMA model
#[derive(Debug, Clone)]
pub struct FittedArima {
    order: ArimaOrder,
    intercept: f64,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    /// Undifferenced training values, needed to integrate forecasts
    history: Vec<f64>,
    /// Training values after differencing
    differenced: Vec<f64>,
    /// CSS residuals on the differenced scale
    residuals: Vec<f64>,
    /// Residual variance
    sigma2: f64,
}

impl FittedArima {
    /// Order of the fitted model
    pub fn order(&self) -> ArimaOrder {
        self.order
    }

    /// Estimated intercept on the differenced scale
    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    /// Estimated AR coefficients
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    /// Estimated MA coefficients
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    /// Residual variance of the fit
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }
}

impl ForecastModel for ArimaOrder {
    type Fitted = FittedArima;

    fn fit(&self, train: &[f64], options: &FitOptions) -> Result<FittedArima, ModelFitError> {
        let needed = self.min_observations();
        if train.len() < needed {
            return Err(ModelFitError::InsufficientObservations {
                needed,
                got: train.len(),
            });
        }

        let started = Instant::now();
        let z = difference(train, self.d).map_err(|_| ModelFitError::InsufficientObservations {
            needed,
            got: train.len(),
        })?;

        let mean = z.iter().sum::<f64>() / z.len() as f64;
        let mut initial = vec![0.0; self.parameter_count()];
        initial[0] = mean;

        let mut bounds = vec![(-COEFFICIENT_BOUND, COEFFICIENT_BOUND); self.parameter_count()];
        bounds[0] = (f64::NEG_INFINITY, f64::INFINITY);

        let result = nelder_mead(
            |params| self.css(&z, params),
            &initial,
            Some(&bounds),
            &options.minimiser(started),
        );
        let result = options.check(result)?;

        let residuals = self.residuals(&z, &result.point);
        let effective = (z.len() - self.p) as f64;
        let sigma2 = result.value / effective;
        if !sigma2.is_finite() {
            return Err(ModelFitError::non_finite("residual variance is not finite"));
        }

        let (intercept, ar, ma) = self.unpack(&result.point);
        Ok(FittedArima {
            order: *self,
            intercept,
            ar_coefficients: ar.to_vec(),
            ma_coefficients: ma.to_vec(),
            history: train.to_vec(),
            differenced: z,
            residuals,
            sigma2,
        })
    }

    fn name(&self) -> String {
        self.to_string()
    }
}

impl TrainedForecastModel for FittedArima {
    fn forecast(self, horizon: usize) -> Result<ForecastResult, ModelFitError> {
        if horizon == 0 {
            return Err(ModelFitError::InvalidHorizon { horizon });
        }

        let mut z = self.differenced;
        let mut residuals = self.residuals;
        for _ in 0..horizon {
            let t = z.len();
            let mut next = self.intercept;
            for (i, phi) in self.ar_coefficients.iter().enumerate() {
                next += phi * z[t - 1 - i];
            }
            for (j, theta) in self.ma_coefficients.iter().enumerate() {
                next += theta * residuals[t - 1 - j];
            }
            z.push(next);
            residuals.push(0.0);
        }

        let start = z.len() - horizon;
        let values = integrate(&z[start..], &self.history, self.order.d)
            .map_err(|err| ModelFitError::non_finite(err.to_string()))?;

        ForecastResult::checked(values)
    }
}
