//! Expanding-window, rolling-origin fold generation
//!
//! With `n` observations and `k` folds the test window size is
//! `w = n / (k + 1)`. Fold `i` trains on `[0, w * (i + 1))` and tests on
//! `[w * (i + 1), w * (i + 2))`; the last fold's test window is extended to
//! the end of the series so the remainder of the division is not dropped.
//! Every test window starts exactly where its own training window ends.

use crate::error::{ForecastError, Result};
use crate::series::Series;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Train/test index ranges for one fold
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fold {
    /// Position of the fold in the split (0-based)
    pub index: usize,
    /// Training indices, always starting at 0
    pub train: Range<usize>,
    /// Test indices, starting where `train` ends
    pub test: Range<usize>,
}

impl Fold {
    /// Number of training observations
    pub fn train_len(&self) -> usize {
        self.train.len()
    }

    /// Number of test observations, which is the forecast horizon
    pub fn horizon(&self) -> usize {
        self.test.len()
    }
}

/// Split a series into `k` expanding-window folds.
///
/// Fails with [`ForecastError::InsufficientData`] when `k == 0` or the series
/// has fewer than `k + 1` observations.
pub fn split(series: &Series, k: usize) -> Result<Vec<Fold>> {
    split_len(series.len(), k)
}

/// Fold boundaries for a series of length `n`
pub fn split_len(n: usize, k: usize) -> Result<Vec<Fold>> {
    if k == 0 {
        return Err(ForecastError::InsufficientData {
            folds: k,
            needed: 1,
            got: n,
        });
    }
    if n < k + 1 {
        return Err(ForecastError::InsufficientData {
            folds: k,
            needed: k + 1,
            got: n,
        });
    }

    let window = n / (k + 1);
    let folds = (0..k)
        .map(|i| {
            let origin = window * (i + 1);
            let test_end = if i + 1 == k { n } else { window * (i + 2) };
            Fold {
                index: i,
                train: 0..origin,
                test: origin..test_end,
            }
        })
        .collect();

    Ok(folds)
}
