//! Differencing and integration for integrated (the "I" in ARIMA) models
//!
//! `difference` removes `d` orders of integration from a series and
//! `integrate` maps values forecast on the differenced scale back onto the
//! scale of the original series.

use crate::{MathError, Result};

/// Difference a series `order` times.
///
/// Each pass shortens the series by one value, so the result has
/// `values.len() - order` elements.
pub fn difference(values: &[f64], order: usize) -> Result<Vec<f64>> {
    if values.len() <= order {
        return Err(MathError::InsufficientData(format!(
            "differencing of order {} needs more than {} values, got {}",
            order,
            order,
            values.len()
        )));
    }

    let mut result = values.to_vec();
    for _ in 0..order {
        result = result.windows(2).map(|w| w[1] - w[0]).collect();
    }
    Ok(result)
}

/// Integrate values forecast on the `order`-times differenced scale.
///
/// `history` is the undifferenced series the forecasts continue. Integration
/// runs from the highest differencing level down, seeding each cumulative sum
/// with the last value of the history at that level.
pub fn integrate(differenced: &[f64], history: &[f64], order: usize) -> Result<Vec<f64>> {
    if order == 0 {
        return Ok(differenced.to_vec());
    }
    if history.len() < order {
        return Err(MathError::InsufficientData(format!(
            "integration of order {} needs at least {} history values, got {}",
            order,
            order,
            history.len()
        )));
    }

    let mut result = differenced.to_vec();
    for level in (0..order).rev() {
        let seed = if level == 0 {
            history[history.len() - 1]
        } else {
            let intermediate = difference(history, level)?;
            intermediate[intermediate.len() - 1]
        };

        let mut running = seed;
        for value in result.iter_mut() {
            running += *value;
            *value = running;
        }
    }

    Ok(result)
}
