//! # Research Math
//!
//! Numeric kernels used by the research-productivity forecasting engine.
//! This crate provides the Holt linear-trend smoother with estimated
//! parameters, the bounded simplex optimiser that fits it, and the
//! trailing-window statistics used by the sparse-series fallback.

use thiserror::Error;

pub mod optimize;
pub mod smoothing;
pub mod window;

pub use optimize::{Minimum, NelderMead};
pub use smoothing::{HoltFit, HoltLinear};
pub use window::{count_nonzero, trailing_mean};

/// Errors that can occur in forecasting calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Calculation error: {0}")]
    CalculationError(String),

    #[error("Optimiser did not converge after {iterations} iterations")]
    NonConvergence { iterations: usize },
}

/// Result type for research math operations
pub type Result<T> = std::result::Result<T, MathError>;
