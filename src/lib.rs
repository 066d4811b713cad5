//! # HEI Productivity
//!
//! Research-productivity forecasting pipeline for higher education
//! institutions. This crate ties the workspace together:
//!
//! - [`research_math`]: Holt linear-trend fitting and window statistics
//! - [`hei_forecast`]: data model, configuration, forecaster and orchestrator
//! - [`hei_report`]: period summaries, region geography and report export
//!
//! The `hei-pipeline` binary exposes ingest, forecast and summarize steps
//! on the command line.
//!
//! ## Example
//!
//! ```no_run
//! use hei_productivity::hei_forecast::{ForecastConfig, ForecastOrchestrator, TableLoader};
//! use hei_productivity::hei_report::export_report;
//!
//! let history = TableLoader::from_csv("productivity_long.csv")?;
//! let config = ForecastConfig::default();
//! let run = ForecastOrchestrator::new(config.clone())?.run(&history)?;
//! export_report(&run.observations, &config.periods, "reports")?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use hei_forecast;
pub use hei_report;
pub use research_math;

pub mod logging;
