//! Hyperparameter grids
//!
//! Grids are materialised into a plain `Vec<ModelConfig>` before a search so
//! the iteration order, and with it tie-breaking, is fixed and inspectable.

use crate::models::{ArimaOrder, ModelConfig, SmoothingConfig, Trend};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// ARIMA orders to sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArimaGrid {
    pub p: Range<usize>,
    pub d: Range<usize>,
    pub q: Range<usize>,
}

impl Default for ArimaGrid {
    fn default() -> Self {
        Self {
            p: 0..6,
            d: 0..3,
            q: 0..3,
        }
    }
}

impl ArimaGrid {
    pub fn new(p: Range<usize>, d: Range<usize>, q: Range<usize>) -> Self {
        Self { p, d, q }
    }

    /// Total number of orders in the grid
    pub fn total_combinations(&self) -> usize {
        self.p.len() * self.d.len() * self.q.len()
    }

    /// All orders, ascending with `p` outermost and `q` innermost
    pub fn configs(&self) -> Vec<ModelConfig> {
        let mut configs = Vec::with_capacity(self.total_combinations());
        for p in self.p.clone() {
            for d in self.d.clone() {
                for q in self.q.clone() {
                    configs.push(ModelConfig::Arima(ArimaOrder::new(p, d, q)));
                }
            }
        }
        configs
    }
}

/// Exponential smoothing structures to sweep
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingGrid {
    pub trends: Vec<Trend>,
    /// `None` means no seasonality
    pub seasonal_periods: Vec<Option<usize>>,
}

impl Default for SmoothingGrid {
    fn default() -> Self {
        Self {
            trends: vec![Trend::None, Trend::Additive, Trend::Damped],
            seasonal_periods: vec![None, Some(7)],
        }
    }
}

impl SmoothingGrid {
    pub fn total_combinations(&self) -> usize {
        self.trends.len() * self.seasonal_periods.len()
    }

    /// All structures, trend outermost
    pub fn configs(&self) -> Vec<ModelConfig> {
        let mut configs = Vec::with_capacity(self.total_combinations());
        for &trend in &self.trends {
            for &seasonal_period in &self.seasonal_periods {
                configs.push(ModelConfig::ExponentialSmoothing(SmoothingConfig {
                    trend,
                    seasonal_period,
                }));
            }
        }
        configs
    }
}
