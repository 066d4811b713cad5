//! Holt linear-trend model with maximum-likelihood parameter estimates

use crate::data::Series;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastMethod, ForecastModel, ForecastResult, TrainedForecastModel};
use research_math::{HoltFit, HoltLinear, NelderMead};

/// Double exponential smoothing with estimated alpha, beta and initial states
#[derive(Debug, Clone)]
pub struct TrendModel {
    /// Name of the model
    name: String,
    /// Optimiser used for the parameter search
    optimizer: NelderMead,
}

/// Trained trend model
#[derive(Debug, Clone)]
pub struct TrainedTrendModel {
    /// Name of the model
    name: String,
    /// Estimated parameters and terminal state
    fit: HoltFit,
}

impl TrendModel {
    /// Create a new trend model using the given optimiser settings
    pub fn new(optimizer: NelderMead) -> Self {
        Self {
            name: "Holt Linear Trend".to_string(),
            optimizer,
        }
    }
}

impl Default for TrendModel {
    fn default() -> Self {
        Self::new(NelderMead::default())
    }
}

impl ForecastModel for TrendModel {
    type Trained = TrainedTrendModel;

    /// Fails with [`ForecastError::FitConvergence`] when the optimiser hits its
    /// iteration cap or the recursion turns non-finite.
    fn train(&self, series: &Series) -> Result<Self::Trained> {
        let values = series.values();
        let fit = HoltLinear::estimate(&values, &self.optimizer)
            .map_err(|e| ForecastError::FitConvergence(e.to_string()))?;

        Ok(TrainedTrendModel {
            name: self.name.clone(),
            fit,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::TrendModel
    }
}

impl TrainedTrendModel {
    /// Estimated parameters and terminal level/trend
    pub fn fit(&self) -> &HoltFit {
        &self.fit
    }
}

impl TrainedForecastModel for TrainedTrendModel {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        ForecastResult::new(self.fit.forecast_path(horizons), horizons)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
