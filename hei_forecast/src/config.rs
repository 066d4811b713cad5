//! Forecast configuration loaded from TOML with validated defaults.
//!
//! Every tunable of a run lives here and is checked once at startup; the
//! orchestrator treats the resulting value as immutable.
//!
//! ```toml
//! horizon = 10
//! min_points_for_trend = 3
//!
//! [optimizer]
//! max_iterations = 5000
//!
//! [[periods]]
//! name = "Pre-Pandemic"
//! start_year = 2015
//! end_year = 2019
//! phase = "history"
//! ```

use crate::error::{ForecastError, Result};
use crate::period::PeriodConfig;
use research_math::NelderMead;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Settings for the trend-model parameter search
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OptimizerConfig {
    /// Iteration cap; exceeding it sends the series to the fallback
    pub max_iterations: usize,
    /// Relative objective tolerance at convergence
    pub tolerance: f64,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        let defaults = NelderMead::default();
        Self {
            max_iterations: defaults.max_iterations,
            tolerance: defaults.f_tolerance,
        }
    }
}

/// Complete configuration of a forecasting run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastConfig {
    /// Years to project past the last historical year
    pub horizon: usize,
    /// Non-zero observations required before the trend model is used
    pub min_points_for_trend: usize,
    /// Trailing observations averaged by the fallback
    pub moving_average_window: usize,
    /// Drop input rows outside the history-phase periods before fitting
    pub restrict_to_history_periods: bool,
    /// Forecast institution-metric groups on the rayon pool
    pub parallel: bool,
    pub optimizer: OptimizerConfig,
    pub periods: PeriodConfig,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            horizon: 10,
            min_points_for_trend: 3,
            moving_average_window: 3,
            restrict_to_history_periods: true,
            parallel: true,
            optimizer: OptimizerConfig::default(),
            periods: PeriodConfig::default(),
        }
    }
}

impl ForecastConfig {
    /// Load and validate a configuration file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(&path)?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate a TOML document; absent keys take their defaults
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: ForecastConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants not expressible in the types. Periods are already
    /// validated when the config is built or deserialised.
    pub fn validate(&self) -> Result<()> {
        if self.horizon == 0 {
            return Err(ForecastError::Config(
                "horizon must be a positive number of years".to_string(),
            ));
        }
        if self.min_points_for_trend < 2 {
            return Err(ForecastError::Config(
                "min_points_for_trend must be at least 2".to_string(),
            ));
        }
        if self.moving_average_window == 0 {
            return Err(ForecastError::Config(
                "moving_average_window must be positive".to_string(),
            ));
        }
        self.optimizer()?;
        Ok(())
    }

    /// Override the horizon, re-validating the result
    pub fn with_horizon(mut self, horizon: usize) -> Result<Self> {
        self.horizon = horizon;
        self.validate()?;
        Ok(self)
    }

    /// Build the optimiser described by this configuration
    pub fn optimizer(&self) -> Result<NelderMead> {
        NelderMead::new(self.optimizer.max_iterations, self.optimizer.tolerance)
            .map_err(|e| ForecastError::Config(format!("optimizer: {}", e)))
    }
}
