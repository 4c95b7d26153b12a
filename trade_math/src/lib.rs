//! # Trade Math
//!
//! Numerical kernels shared by the forecasting models.
//! This crate knows nothing about series, folds or model configurations; it
//! only works on plain `f64` slices.

use thiserror::Error;

pub mod differencing;
pub mod optimization;

pub use differencing::{difference, integrate};
pub use optimization::{nelder_mead, NelderMeadConfig, NelderMeadResult, Termination};

/// Errors that can occur in numerical routines
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),
}

/// Result type for numerical operations
pub type Result<T> = std::result::Result<T, MathError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        let err = MathError::InsufficientData("need 3 values, got 1".to_string());
        assert_eq!(
            err.to_string(),
            "Insufficient data for calculation: need 3 values, got 1"
        );
    }
}
