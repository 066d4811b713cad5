//! # HEI Report
//!
//! Reporting layer over forecast tables: mean values per region and named
//! period, headline statistics, region centroids for map views, and export
//! of the report sheets to a directory.

use hei_forecast::ForecastError;
use thiserror::Error;

pub mod export;
pub mod geography;
pub mod summary;

pub use export::{export_report, ReportPaths};
pub use geography::{centroid, region_codes, Centroid, PH_CENTER};
pub use summary::{
    regional_period_summary, Headline, PeriodSummary, PeriodTotal, RegionalPeriodRow,
};

/// Errors raised while building or writing reports
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Forecast error: {0}")]
    ForecastError(#[from] ForecastError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
