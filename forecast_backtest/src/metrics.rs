//! Forecast error metrics and fold score aggregation

use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Mean absolute error between a forecast and the values it predicts.
///
/// Both slices must be non-empty and of equal length.
pub fn mean_absolute_error(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::InvalidParameter(format!(
            "Forecast ({}) and actual ({}) values must have the same non-zero length",
            forecast.len(),
            actual.len()
        )));
    }

    Ok(forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (f - a).abs())
        .mean())
}

/// Aggregate of one model's fold scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreSummary {
    /// Mean MAE over scored folds, `+∞` when no fold was scored
    pub mean: f64,
    /// Sample standard deviation over scored folds, 0 with fewer than two
    pub std_dev: f64,
    /// Number of folds that produced a score
    pub scored: usize,
    /// Number of folds whose fit or forecast failed
    pub failures: usize,
}

impl ScoreSummary {
    /// Summarise fold scores, `None` marking a failed fold
    pub fn from_scores<I>(scores: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        let mut values = Vec::new();
        let mut failures = 0;
        for score in scores {
            match score {
                Some(value) => values.push(value),
                None => failures += 1,
            }
        }

        let mean = if values.is_empty() {
            f64::INFINITY
        } else {
            values.iter().mean()
        };
        let std_dev = if values.len() < 2 {
            0.0
        } else {
            values.iter().std_dev()
        };

        Self {
            mean,
            std_dev,
            scored: values.len(),
            failures,
        }
    }

    /// Whether no fold produced a score
    pub fn all_failed(&self) -> bool {
        self.scored == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mae_of_exact_forecast_is_zero() {
        assert_eq!(mean_absolute_error(&[1.0, 2.0], &[1.0, 2.0]).unwrap(), 0.0);
    }

    #[test]
    fn mae_averages_absolute_differences() {
        let mae = mean_absolute_error(&[1.0, 5.0, 3.0], &[2.0, 3.0, 3.0]).unwrap();
        assert_relative_eq!(mae, 1.0);
    }

    #[test]
    fn mae_rejects_mismatched_lengths() {
        assert!(mean_absolute_error(&[1.0], &[1.0, 2.0]).is_err());
        assert!(mean_absolute_error(&[], &[]).is_err());
    }

    #[test]
    fn summary_ignores_failed_folds() {
        let summary = ScoreSummary::from_scores(vec![Some(1.0), None, Some(3.0)]);
        assert_relative_eq!(summary.mean, 2.0);
        assert_relative_eq!(summary.std_dev, 2.0_f64.sqrt());
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.failures, 1);
    }

    #[test]
    fn summary_of_all_failures_is_infinite() {
        let summary = ScoreSummary::from_scores(vec![None, None]);
        assert!(summary.mean.is_infinite());
        assert!(summary.all_failed());
    }
}
