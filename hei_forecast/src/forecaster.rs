//! Per-series model selection
//!
//! A series with at least `min_points_for_trend` non-zero observations gets
//! the trend model. Sparser series, and series whose trend fit fails, get the
//! moving-average fallback. An empty series projects zeros.

use crate::config::ForecastConfig;
use crate::data::Series;
use crate::error::{ForecastError, Result};
use crate::models::{
    ForecastMethod, ForecastModel, ForecastResult, MovingAverageFallback, TrainedForecastModel,
    TrendModel,
};
use research_math::{count_nonzero, HoltFit, NelderMead};
use serde::Serialize;

/// Why a series did not get the trend model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FallbackReason {
    /// Fewer non-zero observations than the trend threshold
    SparseSeries { nonzero: usize },
    /// Empty or all-zero history
    DegenerateSeries,
    /// The trend model was eligible but fitting failed
    FitFailed(String),
}

/// Forecast for one series plus how it was produced
#[derive(Debug, Clone)]
pub struct SeriesForecast {
    pub method: ForecastMethod,
    pub fallback: Option<FallbackReason>,
    /// Raw projections, steps `1..=horizon`
    pub result: ForecastResult,
    /// Parameters of the trend fit when the trend model was used
    pub trend_fit: Option<HoltFit>,
    /// Last year of the input series; `None` for an empty series
    pub last_year: Option<i32>,
}

impl SeriesForecast {
    /// Projections labelled with calendar years, when the input had any
    pub fn to_series(&self) -> Option<Result<Series>> {
        self.last_year.map(|year| self.result.to_series(year))
    }
}

/// Chooses between the trend model and the moving-average fallback
#[derive(Debug, Clone)]
pub struct SeriesForecaster {
    min_points_for_trend: usize,
    trend: TrendModel,
    fallback: MovingAverageFallback,
}

impl SeriesForecaster {
    pub fn new(min_points_for_trend: usize, window: usize, optimizer: NelderMead) -> Result<Self> {
        if min_points_for_trend == 0 {
            return Err(ForecastError::InvalidParameter(
                "Trend threshold must be positive".to_string(),
            ));
        }

        Ok(Self {
            min_points_for_trend,
            trend: TrendModel::new(optimizer),
            fallback: MovingAverageFallback::new(window)?,
        })
    }

    pub fn from_config(config: &ForecastConfig) -> Result<Self> {
        Self::new(
            config.min_points_for_trend,
            config.moving_average_window,
            config.optimizer()?,
        )
    }

    /// Method the selection rule picks, before any fit is attempted
    pub fn select_method(&self, series: &Series) -> ForecastMethod {
        if count_nonzero(&series.values()) >= self.min_points_for_trend {
            ForecastMethod::TrendModel
        } else {
            ForecastMethod::MovingAverageFallback
        }
    }

    /// Forecast `horizon` steps past the end of `series`.
    ///
    /// A zero horizon is an error, as is any batch-fatal error from the trend
    /// model. Per-series fit failures are reported through
    /// [`SeriesForecast::fallback`] instead.
    pub fn forecast(&self, series: &Series, horizon: usize) -> Result<SeriesForecast> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Horizon must be positive".to_string(),
            ));
        }

        let last_year = series.last_year();
        if series.is_empty() {
            return Ok(SeriesForecast {
                method: ForecastMethod::MovingAverageFallback,
                fallback: Some(FallbackReason::DegenerateSeries),
                result: ForecastResult::constant(0.0, horizon),
                trend_fit: None,
                last_year,
            });
        }

        let nonzero = count_nonzero(&series.values());
        if nonzero < self.min_points_for_trend {
            let reason = if nonzero == 0 {
                FallbackReason::DegenerateSeries
            } else {
                FallbackReason::SparseSeries { nonzero }
            };
            return self.moving_average(series, horizon, reason);
        }

        match self.trend.train(series) {
            Ok(trained) => Ok(SeriesForecast {
                method: self.trend.method(),
                fallback: None,
                result: trained.forecast(horizon)?,
                trend_fit: Some(*trained.fit()),
                last_year,
            }),
            Err(err) if !err.is_batch_fatal() => {
                self.moving_average(series, horizon, FallbackReason::FitFailed(err.to_string()))
            }
            Err(err) => Err(err),
        }
    }

    fn moving_average(
        &self,
        series: &Series,
        horizon: usize,
        reason: FallbackReason,
    ) -> Result<SeriesForecast> {
        let trained = self.fallback.train(series)?;

        Ok(SeriesForecast {
            method: self.fallback.method(),
            fallback: Some(reason),
            result: trained.forecast(horizon)?,
            trend_fit: None,
            last_year: series.last_year(),
        })
    }
}

impl Default for SeriesForecaster {
    fn default() -> Self {
        Self {
            min_points_for_trend: 3,
            trend: TrendModel::default(),
            fallback: MovingAverageFallback::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn series(points: &[(i32, f64)]) -> Series {
        Series::new(points.to_vec()).unwrap()
    }

    #[test]
    fn test_empty_series_projects_zeros() {
        let forecast = SeriesForecaster::default()
            .forecast(&Series::default(), 4)
            .unwrap();

        assert_eq!(forecast.result.values(), &[0.0; 4]);
        assert_eq!(forecast.fallback, Some(FallbackReason::DegenerateSeries));
        assert!(forecast.to_series().is_none());
    }

    #[test]
    fn test_forecast_years_follow_last_observation() {
        let forecast = SeriesForecaster::default()
            .forecast(&series(&[(2023, 45.0), (2024, 52.0), (2025, 58.0)]), 10)
            .unwrap();
        let projected = forecast.to_series().unwrap().unwrap();

        assert_eq!(projected.years(), (2026..=2035).collect::<Vec<_>>());
        assert_approx_eq!(
            forecast.trend_fit.unwrap().forecast(1),
            forecast.result.values()[0],
            1e-12
        );
    }

    #[test]
    fn test_iteration_cap_falls_back() {
        let strict = NelderMead::new(1, 1e-12).unwrap();
        let forecaster = SeriesForecaster::new(3, 3, strict).unwrap();

        let forecast = forecaster
            .forecast(&series(&[(2021, 3.0), (2022, 9.0), (2023, 4.0), (2024, 12.0)]), 3)
            .unwrap();

        assert_eq!(forecast.method, ForecastMethod::MovingAverageFallback);
        assert!(matches!(forecast.fallback, Some(FallbackReason::FitFailed(_))));
        assert_approx_eq!(forecast.result.values()[0], (9.0 + 4.0 + 12.0) / 3.0, 1e-12);
    }

    #[test]
    fn test_zero_horizon_is_rejected() {
        let result = SeriesForecaster::default().forecast(&series(&[(2020, 1.0)]), 0);
        assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
    }
}
