//! Period summaries over a combined history and forecast table

use crate::geography::centroid;
use crate::Result;
use hei_forecast::{ForecastError, Metric, Observation, PeriodConfig, RowKind};
use serde::Serialize;
use statrs::statistics::Statistics;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Mean annual value of one metric in one region over one period
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalPeriodRow {
    #[serde(rename = "Region Code")]
    pub region_code: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "Metric")]
    pub metric: Metric,
    #[serde(rename = "Period")]
    pub period: String,
    #[serde(rename = "Mean Value")]
    pub mean_value: f64,
    #[serde(rename = "Rows")]
    pub rows: usize,
    /// At least one row in the bucket is a forecast
    #[serde(rename = "Has Forecast")]
    pub has_forecast: bool,
    #[serde(rename = "Latitude")]
    pub lat: f64,
    #[serde(rename = "Longitude")]
    pub lon: f64,
}

/// Total of one metric over one period, across all institutions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodTotal {
    #[serde(rename = "Period")]
    pub period: String,
    #[serde(rename = "Metric")]
    pub metric: Metric,
    #[serde(rename = "Total")]
    pub total: f64,
}

/// Regional means, period totals and the count of unclassifiable rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSummary {
    /// Ordered by region code, region, metric, then period order
    pub regional: Vec<RegionalPeriodRow>,
    /// Ordered by period order, then metric
    pub totals: Vec<PeriodTotal>,
    /// Rows whose year falls outside every period
    pub skipped_rows: usize,
}

#[derive(Default)]
struct Bucket {
    values: Vec<f64>,
    has_forecast: bool,
}

/// Summarise `table` per region, metric and period.
///
/// Rows outside every period are counted and skipped rather than failing
/// the report; any other classification error is returned.
pub fn regional_period_summary(
    table: &[Observation],
    periods: &PeriodConfig,
) -> Result<PeriodSummary> {
    let mut buckets: BTreeMap<(String, String, Metric, usize), Bucket> = BTreeMap::new();
    let mut totals: BTreeMap<(usize, Metric), f64> = BTreeMap::new();
    let mut skipped_rows = 0;

    for row in table {
        let period = match periods.classify(row.year) {
            Ok(period) => period,
            Err(ForecastError::OutOfRange { .. }) => {
                skipped_rows += 1;
                continue;
            }
            Err(err) => return Err(err.into()),
        };
        let index = period_index(periods, &period.name);

        let bucket = buckets
            .entry((row.region_code.clone(), row.region.clone(), row.metric, index))
            .or_default();
        bucket.values.push(row.value);
        bucket.has_forecast |= row.kind == RowKind::Forecast;

        *totals.entry((index, row.metric)).or_insert(0.0) += row.value;
    }

    if skipped_rows > 0 {
        warn!(skipped_rows, "Skipped rows outside every configured period");
    }

    let regional: Vec<RegionalPeriodRow> = buckets
        .into_iter()
        .map(|((region_code, region, metric, index), bucket)| {
            let location = centroid(&region_code);
            RegionalPeriodRow {
                period: periods.periods()[index].name.clone(),
                mean_value: bucket.values.iter().mean(),
                rows: bucket.values.len(),
                has_forecast: bucket.has_forecast,
                lat: location.lat,
                lon: location.lon,
                region_code,
                region,
                metric,
            }
        })
        .collect();

    let totals = totals
        .into_iter()
        .map(|((index, metric), total)| PeriodTotal {
            period: periods.periods()[index].name.clone(),
            metric,
            total,
        })
        .collect();

    info!(rows = regional.len(), "Built regional period summary");

    Ok(PeriodSummary {
        regional,
        totals,
        skipped_rows,
    })
}

fn period_index(periods: &PeriodConfig, name: &str) -> usize {
    periods
        .periods()
        .iter()
        .position(|p| p.name == name)
        .unwrap_or_default()
}

/// Headline figures for the report cover
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Headline {
    pub schools: usize,
    pub regions: usize,
    pub historical_years: Option<(i32, i32)>,
    pub forecast_years: Option<(i32, i32)>,
}

impl Headline {
    pub fn from_table(table: &[Observation]) -> Self {
        let schools: BTreeSet<&str> = table.iter().map(|o| o.institution.as_str()).collect();
        let regions: BTreeSet<&str> = table.iter().map(|o| o.region_code.as_str()).collect();

        Self {
            schools: schools.len(),
            regions: regions.len(),
            historical_years: year_range(table, RowKind::Historical),
            forecast_years: year_range(table, RowKind::Forecast),
        }
    }
}

fn year_range(table: &[Observation], kind: RowKind) -> Option<(i32, i32)> {
    table
        .iter()
        .filter(|o| o.kind == kind)
        .map(|o| o.year)
        .fold(None, |acc, year| match acc {
            None => Some((year, year)),
            Some((lo, hi)) => Some((lo.min(year), hi.max(year))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn obs(region_code: &str, school: &str, year: i32, value: f64) -> Observation {
        Observation::historical(region_code, "Region", school, year, Metric::PublicationQuantity, value)
    }

    #[test]
    fn test_means_per_region_and_period() {
        let table = vec![
            obs("NCR", "A", 2015, 2.0),
            obs("NCR", "B", 2016, 4.0),
            obs("NCR", "A", 2020, 9.0),
            obs("REGION V", "C", 2015, 1.0),
        ];

        let summary = regional_period_summary(&table, &PeriodConfig::default()).unwrap();
        assert_eq!(summary.regional.len(), 3);

        let first = &summary.regional[0];
        assert_eq!((first.region_code.as_str(), first.period.as_str()), ("NCR", "Pre-Pandemic"));
        assert_approx_eq!(first.mean_value, 3.0, 1e-12);
        assert_eq!(first.rows, 2);
        assert!(!first.has_forecast);
        assert_approx_eq!(first.lat, 14.5995, 1e-9);

        assert_eq!(summary.regional[1].period, "Pandemic");
        assert_eq!(summary.totals[0].total, 7.0);
    }

    #[test]
    fn test_out_of_range_rows_are_skipped() {
        let table = vec![obs("NCR", "A", 2010, 2.0), obs("NCR", "A", 2015, 2.0)];

        let summary = regional_period_summary(&table, &PeriodConfig::default()).unwrap();
        assert_eq!(summary.skipped_rows, 1);
        assert_eq!(summary.regional.len(), 1);
    }

    #[test]
    fn test_headline_ranges() {
        let history = obs("NCR", "A", 2015, 2.0);
        let table = vec![
            history.clone(),
            obs("CAR", "B", 2025, 1.0),
            Observation::forecast_from(&history, 2026, 3.0),
            Observation::forecast_from(&history, 2035, 3.0),
        ];

        let headline = Headline::from_table(&table);
        assert_eq!(headline.schools, 2);
        assert_eq!(headline.regions, 2);
        assert_eq!(headline.historical_years, Some((2015, 2025)));
        assert_eq!(headline.forecast_years, Some((2026, 2035)));
        assert_eq!(Headline::from_table(&[]).forecast_years, None);
    }
}
