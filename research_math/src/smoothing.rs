//! Holt's linear trend method (double exponential smoothing)
//!
//! The recursion keeps a level `l` and a trend `b`:
//!
//! ```text
//! l_t = alpha * y_t + (1 - alpha) * (l_{t-1} + b_{t-1})
//! b_t = beta * (l_t - l_{t-1}) + (1 - beta) * b_{t-1}
//! y_hat_{t+h} = l_t + h * b_t
//! ```
//!
//! [`HoltLinear::estimate`] treats `alpha`, `beta` and the initial states
//! `l_0`, `b_0` as free parameters and picks the set that minimises the sum
//! of squared one-step-ahead errors, which is the maximum-likelihood fit
//! under Gaussian errors.

use crate::optimize::NelderMead;
use crate::{MathError, Result};
use serde::{Deserialize, Serialize};

/// Holt's linear trend model with fixed smoothing constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoltLinear {
    alpha: f64,
    beta: f64,
    initial_level: f64,
    initial_trend: f64,
}

/// Fitted Holt model: parameters, terminal state and in-sample error
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HoltFit {
    pub model: HoltLinear,
    /// Level after the last observation
    pub level: f64,
    /// Trend after the last observation
    pub trend: f64,
    /// Sum of squared one-step-ahead errors
    pub sse: f64,
    /// Optimiser iterations spent, zero for fixed-parameter fits
    pub iterations: usize,
}

impl HoltLinear {
    /// Create a model with fixed smoothing constants and initial states
    pub fn new(alpha: f64, beta: f64, initial_level: f64, initial_trend: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&alpha) {
            return Err(MathError::InvalidInput(
                "Alpha must be between 0 and 1 (inclusive)".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&beta) {
            return Err(MathError::InvalidInput(
                "Beta must be between 0 and 1 (inclusive)".to_string(),
            ));
        }
        if !initial_level.is_finite() || !initial_trend.is_finite() {
            return Err(MathError::InvalidInput(
                "Initial level and trend must be finite".to_string(),
            ));
        }

        Ok(Self {
            alpha,
            beta,
            initial_level,
            initial_trend,
        })
    }

    /// Estimate all four parameters from `data` with the given optimiser.
    ///
    /// The search starts from `alpha = 0.5`, `beta = 0.1`, `l_0 = y_0` and
    /// `b_0 = y_1 - y_0`. Smoothing constants are clamped into `[0, 1]`
    /// inside the objective, so the simplex itself runs unconstrained.
    pub fn estimate(data: &[f64], optimizer: &NelderMead) -> Result<HoltFit> {
        if data.len() < 2 {
            return Err(MathError::InsufficientData(format!(
                "Holt estimation needs at least 2 observations, have {}",
                data.len()
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(MathError::InvalidInput(
                "Series contains non-finite values".to_string(),
            ));
        }

        let initial_level = data[0];
        let initial_trend = data[1] - data[0];
        let start = [0.5, 0.1, initial_level, initial_trend];
        let steps = [
            0.1,
            0.05,
            0.1 * initial_level.abs().max(1.0),
            0.1 * initial_trend.abs().max(1.0),
        ];

        let objective = |p: &[f64]| {
            let (alpha, beta) = (p[0].clamp(0.0, 1.0), p[1].clamp(0.0, 1.0));
            let (_, _, sse) = run_recursion(data, alpha, beta, p[2], p[3]);
            sse
        };

        let minimum = optimizer.minimize(objective, &start, &steps)?;
        let p = &minimum.point;
        let model = Self::new(p[0].clamp(0.0, 1.0), p[1].clamp(0.0, 1.0), p[2], p[3])?;

        let mut fit = model.fit(data)?;
        fit.iterations = minimum.iterations;
        Ok(fit)
    }

    /// Run the recursion over `data` with this model's parameters
    pub fn fit(&self, data: &[f64]) -> Result<HoltFit> {
        if data.is_empty() {
            return Err(MathError::InsufficientData(
                "No data available for Holt smoothing".to_string(),
            ));
        }

        let (level, trend, sse) = run_recursion(
            data,
            self.alpha,
            self.beta,
            self.initial_level,
            self.initial_trend,
        );

        if !level.is_finite() || !trend.is_finite() || !sse.is_finite() {
            return Err(MathError::CalculationError(
                "Holt recursion produced a non-finite state".to_string(),
            ));
        }

        Ok(HoltFit {
            model: *self,
            level,
            trend,
            sse,
            iterations: 0,
        })
    }

    /// Get the level smoothing constant
    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Get the trend smoothing constant
    pub fn beta(&self) -> f64 {
        self.beta
    }

    /// Get the initial level `l_0`
    pub fn initial_level(&self) -> f64 {
        self.initial_level
    }

    /// Get the initial trend `b_0`
    pub fn initial_trend(&self) -> f64 {
        self.initial_trend
    }
}

impl HoltFit {
    /// Forecast `h` steps past the last observation
    pub fn forecast(&self, h: usize) -> f64 {
        self.level + h as f64 * self.trend
    }

    /// Forecasts for steps `1..=horizon`
    pub fn forecast_path(&self, horizon: usize) -> Vec<f64> {
        (1..=horizon).map(|h| self.forecast(h)).collect()
    }
}

/// Returns `(level, trend, sse)` after consuming every observation
fn run_recursion(data: &[f64], alpha: f64, beta: f64, level0: f64, trend0: f64) -> (f64, f64, f64) {
    let mut level = level0;
    let mut trend = trend0;
    let mut sse = 0.0;

    for &y in data {
        let error = y - (level + trend);
        sse += error * error;

        let new_level = alpha * y + (1.0 - alpha) * (level + trend);
        trend = beta * (new_level - level) + (1.0 - beta) * trend;
        level = new_level;
    }

    (level, trend, sse)
}
