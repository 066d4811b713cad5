//! Writes the report sheets into an output directory

use crate::summary::{regional_period_summary, Headline};
use crate::Result;
use hei_forecast::io::write_csv_file;
use hei_forecast::{Observation, PeriodConfig};
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Files produced by [`export_report`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub forecasts: PathBuf,
    pub regional_periods: PathBuf,
    pub period_totals: PathBuf,
    pub headline: PathBuf,
}

impl ReportPaths {
    fn in_dir(dir: &Path) -> Self {
        Self {
            forecasts: dir.join("forecasts.csv"),
            regional_periods: dir.join("regional_periods.csv"),
            period_totals: dir.join("period_totals.csv"),
            headline: dir.join("headline.json"),
        }
    }
}

#[derive(Serialize)]
struct HeadlineReport<'a> {
    #[serde(flatten)]
    headline: &'a Headline,
    skipped_rows: usize,
}

/// Write the full table, the period summaries and the headline figures
/// into `dir`, creating it if needed
pub fn export_report<P: AsRef<Path>>(
    table: &[Observation],
    periods: &PeriodConfig,
    dir: P,
) -> Result<ReportPaths> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;
    let paths = ReportPaths::in_dir(dir);

    write_csv_file(table, &paths.forecasts)?;

    let summary = regional_period_summary(table, periods)?;
    write_rows(&summary.regional, &paths.regional_periods)?;
    write_rows(&summary.totals, &paths.period_totals)?;

    let headline = Headline::from_table(table);
    let report = HeadlineReport {
        headline: &headline,
        skipped_rows: summary.skipped_rows,
    };
    fs::write(&paths.headline, serde_json::to_string_pretty(&report)?)?;

    info!(dir = %dir.display(), "Exported report sheets");
    Ok(paths)
}

fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(File::create(path)?);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}
