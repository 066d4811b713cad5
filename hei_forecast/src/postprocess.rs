//! Metric-specific clean-up of raw forecast values

use crate::data::Metric;
use crate::models::ForecastResult;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// How a metric's forecasts are rounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundingPolicy {
    /// Nearest integer, ties away from zero (`2.5 -> 3`)
    NearestInteger,
    /// Keep full `f64` precision
    FullPrecision,
}

impl RoundingPolicy {
    pub fn apply(self, value: f64) -> f64 {
        match self {
            RoundingPolicy::NearestInteger => value.round(),
            RoundingPolicy::FullPrecision => value,
        }
    }
}

/// Clamp to zero then round according to the metric's policy.
/// NaN clamps to zero.
pub fn adjust_value(value: f64, metric: Metric) -> f64 {
    let clamped = if value > 0.0 { value } else { 0.0 };
    metric.rounding_policy().apply(clamped)
}

/// Apply [`adjust_value`] to every value of a forecast
pub fn adjust(forecast: &ForecastResult, metric: Metric) -> Result<ForecastResult> {
    let values = forecast
        .values()
        .iter()
        .map(|v| adjust_value(*v, metric))
        .collect();

    ForecastResult::new(values, forecast.horizons())
}
