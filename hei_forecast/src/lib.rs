//! # HEI Forecast
//!
//! Per-institution, per-metric forecasting engine for higher-education
//! research-productivity tables.
//!
//! ## Features
//!
//! - Long-format observation tables with schema validation (CSV and parquet)
//! - Wide-sheet ingest that melts the two-header-row export into long format
//! - Holt linear-trend model with estimated smoothing parameters
//! - Moving-average fallback for sparse or degenerate series
//! - Metric-aware post-processing (non-negative, integral counts)
//! - Named period classification for reporting
//! - Deterministic batch orchestration, optionally parallel over series
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use hei_forecast::{ForecastConfig, ForecastOrchestrator, TableLoader};
//!
//! let history = TableLoader::from_csv("productivity_long.csv")?;
//! let config = ForecastConfig::load_from_file("config/forecast.toml")?;
//!
//! let run = ForecastOrchestrator::new(config)?.run(&history)?;
//! hei_forecast::io::write_csv_file(&run.observations, "forecasts.csv")?;
//! println!("{}", run.summary_json()?);
//! # Ok::<(), hei_forecast::ForecastError>(())
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod forecaster;
pub mod ingest;
pub mod io;
pub mod models;
pub mod orchestrator;
pub mod period;
pub mod postprocess;

// Re-export commonly used types
pub use crate::config::{ForecastConfig, OptimizerConfig};
pub use crate::data::{validate_records, Metric, Observation, RawRecord, RowKind, Series};
pub use crate::error::{ForecastError, Result};
pub use crate::forecaster::{FallbackReason, SeriesForecast, SeriesForecaster};
pub use crate::io::TableLoader;
pub use crate::models::{ForecastMethod, ForecastModel, ForecastResult, TrainedForecastModel};
pub use crate::orchestrator::{ForecastOrchestrator, ForecastRun, RunSummary};
pub use crate::period::{classify, Period, PeriodConfig, PeriodPhase};
pub use crate::postprocess::{adjust, RoundingPolicy};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
