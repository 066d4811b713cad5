//! Moving-average fallback for sparse series

use crate::data::Series;
use crate::error::{ForecastError, Result};
use crate::models::{ForecastMethod, ForecastModel, ForecastResult, TrainedForecastModel};
use research_math::trailing_mean;

/// Flat projection of the mean of the last `window` observations
#[derive(Debug, Clone)]
pub struct MovingAverageFallback {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
}

/// Trained moving-average fallback
#[derive(Debug, Clone)]
pub struct TrainedMovingAverage {
    /// Name of the model
    name: String,
    /// Window size
    window: usize,
    /// Mean of the trailing window
    average: f64,
}

impl MovingAverageFallback {
    /// Create a new moving-average fallback
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(ForecastError::InvalidParameter(
                "Window size must be positive".to_string(),
            ));
        }

        Ok(Self {
            name: format!("Simple Moving Average (window={})", window),
            window,
        })
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl Default for MovingAverageFallback {
    fn default() -> Self {
        Self {
            name: "Simple Moving Average (window=3)".to_string(),
            window: 3,
        }
    }
}

impl ForecastModel for MovingAverageFallback {
    type Trained = TrainedMovingAverage;

    /// Averages the last `min(window, len)` observations. Zeros stay in the
    /// window even though they do not count towards trend eligibility.
    fn train(&self, series: &Series) -> Result<Self::Trained> {
        if series.is_empty() {
            return Err(ForecastError::DataError(
                "Empty series has no moving average".to_string(),
            ));
        }

        let average = trailing_mean(&series.values(), self.window)?;

        Ok(TrainedMovingAverage {
            name: self.name.clone(),
            window: self.window,
            average,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn method(&self) -> ForecastMethod {
        ForecastMethod::MovingAverageFallback
    }
}

impl TrainedMovingAverage {
    /// The projected constant
    pub fn average(&self) -> f64 {
        self.average
    }

    pub fn window(&self) -> usize {
        self.window
    }
}

impl TrainedForecastModel for TrainedMovingAverage {
    fn forecast(&self, horizons: usize) -> Result<ForecastResult> {
        Ok(ForecastResult::constant(self.average, horizons))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_includes_zeros() {
        let series = Series::new(vec![(2023, 0.0), (2024, 5.0), (2025, 7.0)]).unwrap();
        let trained = MovingAverageFallback::new(3).unwrap().train(&series).unwrap();

        assert_eq!(trained.average(), 4.0);
        assert_eq!(trained.forecast(10).unwrap().values(), &[4.0; 10]);
    }

    #[test]
    fn test_short_series_uses_all_points() {
        let series = Series::new(vec![(2024, 6.0), (2025, 8.0)]).unwrap();
        let trained = MovingAverageFallback::new(3).unwrap().train(&series).unwrap();

        assert_eq!(trained.average(), 7.0);
    }

    #[test]
    fn test_invalid_window_and_empty_series() {
        assert!(MovingAverageFallback::new(0).is_err());
        let model = MovingAverageFallback::new(3).unwrap();
        assert!(model.train(&Series::default()).is_err());
    }
}
