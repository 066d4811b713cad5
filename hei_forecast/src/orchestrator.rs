//! Batch forecasting over every institution-metric pair
//!
//! The orchestrator validates the whole input first, so a schema problem
//! produces no output at all. It then fits each (institution, metric) group
//! independently. Groups share nothing, so with `parallel = true` they run on
//! the rayon pool; results are collected in group order, so the output does
//! not depend on scheduling.

use crate::config::ForecastConfig;
use crate::data::{validate_records, Metric, Observation, RawRecord, RowKind, Series};
use crate::error::{ForecastError, Result};
use crate::forecaster::{FallbackReason, SeriesForecaster};
use crate::models::ForecastMethod;
use crate::postprocess;
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, info, warn};

const PROGRESS_EVERY: usize = 50;

/// Counts describing a completed run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub groups: usize,
    pub history_rows: usize,
    pub forecast_rows: usize,
    /// Input rows outside the history window, excluded from fit and output
    pub dropped_rows: usize,
    pub trend_model: usize,
    pub moving_average: usize,
    /// Trend-eligible series that fell back after a failed fit
    pub fit_failures: usize,
    /// Empty or all-zero series
    pub degenerate: usize,
    pub last_history_year: Option<i32>,
    pub forecast_years: Option<(i32, i32)>,
}

/// Output table of a run plus its summary
#[derive(Debug, Clone)]
pub struct ForecastRun {
    /// Historical rows followed by forecast rows
    pub observations: Vec<Observation>,
    pub summary: RunSummary,
}

impl ForecastRun {
    pub fn history(&self) -> impl Iterator<Item = &Observation> {
        self.observations
            .iter()
            .filter(|o| o.kind == RowKind::Historical)
    }

    pub fn forecasts(&self) -> impl Iterator<Item = &Observation> {
        self.observations.iter().filter(|o| o.kind == RowKind::Forecast)
    }

    /// Serialise the summary as pretty JSON
    pub fn summary_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.summary)?)
    }
}

struct GroupOutcome {
    rows: Vec<Observation>,
    method: ForecastMethod,
    fallback: Option<FallbackReason>,
}

/// Runs the forecaster and post-processor over a whole table
#[derive(Debug, Clone)]
pub struct ForecastOrchestrator {
    config: ForecastConfig,
    forecaster: SeriesForecaster,
}

impl ForecastOrchestrator {
    /// Validate `config` and build the orchestrator
    pub fn new(config: ForecastConfig) -> Result<Self> {
        config.validate()?;
        let forecaster = SeriesForecaster::from_config(&config)?;
        Ok(Self { config, forecaster })
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Validate raw records, then [`run`](Self::run)
    pub fn run_records(&self, records: Vec<RawRecord>) -> Result<ForecastRun> {
        let observations = validate_records(records)?;
        self.run(&observations)
    }

    /// Forecast every (institution, metric) pair in `historical`.
    ///
    /// Fails with [`ForecastError::Schema`] if a row is already a forecast or
    /// an (institution, metric, year) triple repeats.
    pub fn run(&self, historical: &[Observation]) -> Result<ForecastRun> {
        check_history(historical)?;

        let (retained, dropped_rows) = self.restrict_to_window(historical);
        if dropped_rows > 0 {
            warn!(
                dropped_rows,
                "Excluded rows outside the configured history window"
            );
        }

        let groups = group_rows(&retained);
        let horizon = self.config.horizon;
        let last_history_year = retained.iter().map(|o| o.year).max();

        let Some(last_year) = last_history_year else {
            warn!("No historical rows to forecast");
            return Ok(ForecastRun {
                observations: Vec::new(),
                summary: RunSummary {
                    generated_at: Utc::now(),
                    groups: 0,
                    history_rows: 0,
                    forecast_rows: 0,
                    dropped_rows,
                    trend_model: 0,
                    moving_average: 0,
                    fit_failures: 0,
                    degenerate: 0,
                    last_history_year: None,
                    forecast_years: None,
                },
            });
        };

        let forecast_end = i32::try_from(horizon)
            .ok()
            .and_then(|h| last_year.checked_add(h))
            .ok_or_else(|| {
                ForecastError::Schema(format!(
                    "Forecast horizon {} past year {} is not representable",
                    horizon, last_year
                ))
            })?;

        let total = groups.len();
        info!(
            groups = total,
            horizon, "Generating forecasts for school-metric combinations"
        );

        let entries: Vec<_> = groups.into_iter().collect();
        let outcomes: Vec<GroupOutcome> = if self.config.parallel {
            entries
                .par_iter()
                .map(|((school, metric), rows)| self.forecast_group(school, *metric, rows, last_year))
                .collect::<Result<_>>()?
        } else {
            entries
                .iter()
                .enumerate()
                .map(|(i, ((school, metric), rows))| {
                    if (i + 1) % PROGRESS_EVERY == 0 {
                        info!("Progress: {}/{}", i + 1, total);
                    }
                    self.forecast_group(school, *metric, rows, last_year)
                })
                .collect::<Result<_>>()?
        };

        let mut summary = RunSummary {
            generated_at: Utc::now(),
            groups: total,
            history_rows: retained.len(),
            forecast_rows: 0,
            dropped_rows,
            trend_model: 0,
            moving_average: 0,
            fit_failures: 0,
            degenerate: 0,
            last_history_year: Some(last_year),
            forecast_years: Some((last_year + 1, forecast_end)),
        };

        let mut observations: Vec<Observation> = retained.into_iter().cloned().collect();
        for outcome in outcomes {
            match outcome.method {
                ForecastMethod::TrendModel => summary.trend_model += 1,
                ForecastMethod::MovingAverageFallback => summary.moving_average += 1,
            }
            match outcome.fallback {
                Some(FallbackReason::FitFailed(_)) => summary.fit_failures += 1,
                Some(FallbackReason::DegenerateSeries) => summary.degenerate += 1,
                _ => {}
            }
            summary.forecast_rows += outcome.rows.len();
            observations.extend(outcome.rows);
        }

        info!(
            history = summary.history_rows,
            forecast = summary.forecast_rows,
            trend = summary.trend_model,
            fallback = summary.moving_average,
            "Forecasting complete"
        );

        Ok(ForecastRun {
            observations,
            summary,
        })
    }

    fn restrict_to_window<'a>(&self, rows: &'a [Observation]) -> (Vec<&'a Observation>, usize) {
        let window = if self.config.restrict_to_history_periods {
            self.config.periods.history_window()
        } else {
            None
        };

        match window {
            Some((start, end)) => {
                let kept: Vec<&Observation> = rows
                    .iter()
                    .filter(|o| (start..=end).contains(&o.year))
                    .collect();
                let dropped = rows.len() - kept.len();
                (kept, dropped)
            }
            None => (rows.iter().collect(), 0),
        }
    }

    fn forecast_group(
        &self,
        school: &str,
        metric: Metric,
        rows: &[&Observation],
        last_year: i32,
    ) -> Result<GroupOutcome> {
        let points: Vec<(i32, f64)> = rows.iter().map(|o| (o.year, o.value)).collect();
        let series = Series::zero_filled(&points, last_year)?;

        let forecast = self.forecaster.forecast(&series, self.config.horizon)?;
        match &forecast.fallback {
            Some(FallbackReason::FitFailed(reason)) => {
                warn!(school, metric = %metric, %reason, "Trend fit failed, using moving average");
            }
            Some(FallbackReason::DegenerateSeries) => {
                warn!(school, metric = %metric, "Degenerate series, projecting flat values");
            }
            _ => debug!(school, metric = %metric, method = %forecast.method, "Selected forecast method"),
        }

        let adjusted = postprocess::adjust(&forecast.result, metric)?;

        // rows are sorted by year, so the last one carries the latest metadata
        let template = rows
            .last()
            .ok_or_else(|| ForecastError::DataError(format!("Empty group for {}", school)))?;
        let rows = adjusted
            .values()
            .iter()
            .zip(1..)
            .map(|(value, h)| Observation::forecast_from(template, last_year + h, *value))
            .collect();

        Ok(GroupOutcome {
            rows,
            method: forecast.method,
            fallback: forecast.fallback,
        })
    }
}

fn check_history(rows: &[Observation]) -> Result<()> {
    let mut seen = HashSet::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        if row.kind != RowKind::Historical {
            return Err(ForecastError::Schema(format!(
                "row {}: input already contains a forecast row",
                i + 1
            )));
        }
        if !seen.insert((row.institution.as_str(), row.metric, row.year)) {
            return Err(ForecastError::Schema(format!(
                "row {}: duplicate entry for ({}, {}, {})",
                i + 1,
                row.institution,
                row.metric,
                row.year
            )));
        }
    }
    Ok(())
}

/// Rows per (institution, metric), each group sorted by year
fn group_rows<'a>(rows: &[&'a Observation]) -> BTreeMap<(String, Metric), Vec<&'a Observation>> {
    let mut groups: BTreeMap<(String, Metric), Vec<&'a Observation>> = BTreeMap::new();
    for row in rows {
        groups
            .entry((row.institution.clone(), row.metric))
            .or_default()
            .push(*row);
    }
    for group in groups.values_mut() {
        group.sort_by_key(|o| o.year);
    }
    groups
}

/// Forecast `historical` with `config`
pub fn run(historical: &[Observation], config: ForecastConfig) -> Result<ForecastRun> {
    ForecastOrchestrator::new(config)?.run(historical)
}
