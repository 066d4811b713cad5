//! Error types for the hei_forecast crate

use polars::prelude::PolarsError;
use research_math::MathError;
use thiserror::Error;

/// Custom error types for the hei_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// Malformed or missing input fields; aborts the whole batch
    #[error("Schema error: {0}")]
    Schema(String),

    /// A year outside every configured period
    #[error("Year {year} falls outside every configured period")]
    OutOfRange { year: i32 },

    /// Invalid configuration detected at startup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Trend-model fitting failed for one series
    #[error("Fit convergence error: {0}")]
    FitConvergence(String),

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    DataError(String),

    /// Error from invalid parameters
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Error from CSV reading or writing
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    PolarsError(String),

    /// Error parsing a TOML configuration file
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// Error serialising a run summary
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error from the numeric kernels
    #[error("Math error: {0}")]
    MathError(#[from] MathError),
}

impl ForecastError {
    /// Whether this error aborts a batch run rather than a single series or row
    pub fn is_batch_fatal(&self) -> bool {
        !matches!(
            self,
            ForecastError::OutOfRange { .. } | ForecastError::FitConvergence(_)
        )
    }
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::PolarsError(err.to_string())
    }
}
