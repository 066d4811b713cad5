//! Forecasting models for institution-metric series

use crate::data::Series;
use crate::error::{ForecastError, Result};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// Forecast result containing projected values
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastResult {
    /// Forecasted values, one per step ahead
    values: Vec<f64>,
    /// Number of periods forecasted
    horizons: usize,
}

impl ForecastResult {
    /// Create a new forecast result
    pub fn new(values: Vec<f64>, horizons: usize) -> Result<Self> {
        if values.len() != horizons {
            return Err(ForecastError::DataError(format!(
                "Values length ({}) doesn't match horizons ({})",
                values.len(),
                horizons
            )));
        }

        Ok(Self { values, horizons })
    }

    /// A flat forecast repeating `value`
    pub fn constant(value: f64, horizons: usize) -> Self {
        Self {
            values: vec![value; horizons],
            horizons,
        }
    }

    /// Get the forecasted values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Get the number of periods forecasted
    pub fn horizons(&self) -> usize {
        self.horizons
    }

    /// Attach calendar years starting right after `last_year`
    pub fn to_series(&self, last_year: i32) -> Result<Series> {
        let points = (1..)
            .map(|h| last_year + h)
            .zip(self.values.iter().copied())
            .collect();
        Series::new(points)
    }
}

/// The two forecasting branches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForecastMethod {
    /// Holt linear trend with estimated parameters
    TrendModel,
    /// Flat projection of a short trailing mean
    MovingAverageFallback,
}

impl fmt::Display for ForecastMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastMethod::TrendModel => f.write_str("trend model"),
            ForecastMethod::MovingAverageFallback => f.write_str("moving-average fallback"),
        }
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Generate forecast for future periods
    fn forecast(&self, horizons: usize) -> Result<ForecastResult>;

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a series
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a series
    fn train(&self, series: &Series) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;

    /// Which forecasting branch this model implements
    fn method(&self) -> ForecastMethod;
}

pub mod exponential_smoothing;
pub mod moving_average;

pub use exponential_smoothing::{TrainedTrendModel, TrendModel};
pub use moving_average::{MovingAverageFallback, TrainedMovingAverage};
