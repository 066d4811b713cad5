//! Long-format observations and per-pair series

use crate::error::{ForecastError, Result};
use crate::postprocess::RoundingPolicy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Research-productivity metric tracked per institution and year
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Metric {
    PublicationQuantity,
    CitationQuantity,
    /// Field-Weighted Citation Impact
    Fwci,
}

impl Metric {
    pub const ALL: [Metric; 3] = [
        Metric::PublicationQuantity,
        Metric::CitationQuantity,
        Metric::Fwci,
    ];

    /// Label used in the source sheet and in every table column
    pub fn label(self) -> &'static str {
        match self {
            Metric::PublicationQuantity => "Publication Quantity",
            Metric::CitationQuantity => "Citation Quantity",
            Metric::Fwci => "Field-Weighted Citation Impact",
        }
    }

    /// Parse a metric label. Matching ignores case and surrounding
    /// whitespace, and accepts `FWCI` for the citation-impact metric.
    /// Anything else is a schema error.
    pub fn from_label(label: &str) -> Result<Self> {
        let normalized = label.trim().to_lowercase();
        match normalized.as_str() {
            "publication quantity" => Ok(Metric::PublicationQuantity),
            "citation quantity" => Ok(Metric::CitationQuantity),
            "field-weighted citation impact" | "fwci" => Ok(Metric::Fwci),
            _ => Err(ForecastError::Schema(format!(
                "Unrecognized metric '{}'",
                label.trim()
            ))),
        }
    }

    /// Whether the metric is a discrete count
    pub fn is_count(self) -> bool {
        matches!(self, Metric::PublicationQuantity | Metric::CitationQuantity)
    }

    /// Rounding applied to this metric's forecasts
    pub const fn rounding_policy(self) -> RoundingPolicy {
        match self {
            Metric::PublicationQuantity | Metric::CitationQuantity => RoundingPolicy::NearestInteger,
            Metric::Fwci => RoundingPolicy::FullPrecision,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Metric {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        Metric::from_label(s)
    }
}

impl TryFrom<String> for Metric {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        Metric::from_label(&value)
    }
}

impl From<Metric> for String {
    fn from(metric: Metric) -> Self {
        metric.label().to_string()
    }
}

/// Whether a row was observed or projected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowKind {
    #[serde(rename = "History")]
    Historical,
    #[serde(rename = "Forecast")]
    Forecast,
}

impl RowKind {
    pub fn label(self) -> &'static str {
        match self {
            RowKind::Historical => "History",
            RowKind::Forecast => "Forecast",
        }
    }

    pub fn from_label(label: &str) -> Result<Self> {
        match label.trim() {
            "History" | "Historical" => Ok(RowKind::Historical),
            "Forecast" => Ok(RowKind::Forecast),
            other => Err(ForecastError::Schema(format!("Unrecognized row type '{}'", other))),
        }
    }
}

impl fmt::Display for RowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One row of the long-format table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(rename = "Region Code")]
    pub region_code: String,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "School")]
    pub institution: String,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "Metric")]
    pub metric: Metric,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Type")]
    pub kind: RowKind,
}

impl Observation {
    /// Create a historical observation
    pub fn historical(
        region_code: impl Into<String>,
        region: impl Into<String>,
        institution: impl Into<String>,
        year: i32,
        metric: Metric,
        value: f64,
    ) -> Self {
        Self {
            region_code: region_code.into(),
            region: region.into(),
            institution: institution.into(),
            year,
            metric,
            value,
            kind: RowKind::Historical,
        }
    }

    /// Copy this row's region and institution into a forecast row
    pub fn forecast_from(template: &Observation, year: i32, value: f64) -> Self {
        Self {
            region_code: template.region_code.clone(),
            region: template.region.clone(),
            institution: template.institution.clone(),
            year,
            metric: template.metric,
            value,
            kind: RowKind::Forecast,
        }
    }
}

/// A row as read from an external table, before schema validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(rename = "Region Code", default)]
    pub region_code: Option<String>,
    #[serde(rename = "Region", default)]
    pub region: Option<String>,
    #[serde(rename = "School", default)]
    pub school: Option<String>,
    #[serde(rename = "Year", default)]
    pub year: Option<i32>,
    #[serde(rename = "Metric", default)]
    pub metric: Option<String>,
    #[serde(rename = "Value", default)]
    pub value: Option<f64>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
}

impl RawRecord {
    /// Validate the record. `row` is the 1-based data row used in messages.
    /// A missing `Type` means the row is historical.
    pub fn into_observation(self, row: usize) -> Result<Observation> {
        let region_code = required_text(self.region_code, "Region Code", row)?;
        let region = required_text(self.region, "Region", row)?;
        let institution = required_text(self.school, "School", row)?;
        let year = self.year.ok_or_else(|| missing("Year", row))?;
        let metric_label = required_text(self.metric, "Metric", row)?;
        let metric = Metric::from_label(&metric_label)
            .map_err(|e| ForecastError::Schema(format!("row {}: {}", row, e)))?;
        let value = self.value.ok_or_else(|| missing("Value", row))?;
        let kind = match self.kind.as_deref().map(str::trim) {
            None | Some("") => RowKind::Historical,
            Some(label) => RowKind::from_label(label)
                .map_err(|e| ForecastError::Schema(format!("row {}: {}", row, e)))?,
        };

        Ok(Observation {
            region_code,
            region,
            institution,
            year,
            metric,
            value,
            kind,
        })
    }
}

fn required_text(value: Option<String>, field: &str, row: usize) -> Result<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(missing(field, row)),
    }
}

fn missing(field: &str, row: usize) -> ForecastError {
    ForecastError::Schema(format!("row {}: missing required field '{}'", row, field))
}

/// Validate a batch of raw records, failing on the first bad row
pub fn validate_records(records: Vec<RawRecord>) -> Result<Vec<Observation>> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, record)| record.into_observation(i + 1))
        .collect()
}

/// Longest run of years a zero-filled series may cover
pub const MAX_SERIES_SPAN: i32 = 500;

/// Chronological (year, value) pairs for one institution and metric
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    points: Vec<(i32, f64)>,
}

impl Series {
    /// Create a series; years must be strictly increasing
    pub fn new(points: Vec<(i32, f64)>) -> Result<Self> {
        if let Some(pair) = points.windows(2).find(|w| w[1].0 <= w[0].0) {
            return Err(ForecastError::DataError(format!(
                "Series years must be strictly increasing, found {} after {}",
                pair[1].0, pair[0].0
            )));
        }

        Ok(Self { points })
    }

    /// Build a series covering every year from the first point through
    /// `end_year`, filling absent years with zero
    pub fn zero_filled(points: &[(i32, f64)], end_year: i32) -> Result<Self> {
        let mut sorted = points.to_vec();
        sorted.sort_by_key(|(year, _)| *year);
        let checked = Series::new(sorted)?;

        let Some(&(first_year, _)) = checked.points.first() else {
            return Ok(checked);
        };
        if checked.last_year().is_some_and(|last| last > end_year) {
            return Err(ForecastError::DataError(format!(
                "Series extends past end year {}",
                end_year
            )));
        }

        let span = end_year
            .checked_sub(first_year)
            .filter(|span| *span < MAX_SERIES_SPAN)
            .ok_or_else(|| {
                ForecastError::Schema(format!(
                    "Series span {}..={} exceeds {} years",
                    first_year, end_year, MAX_SERIES_SPAN
                ))
            })?;

        let mut filled = Vec::with_capacity(span as usize + 1);
        let mut source = checked.points.iter().peekable();
        for year in first_year..=end_year {
            match source.peek() {
                Some(&&(y, value)) if y == year => {
                    filled.push((year, value));
                    source.next();
                }
                _ => filled.push((year, 0.0)),
            }
        }

        Ok(Self { points: filled })
    }

    pub fn points(&self) -> &[(i32, f64)] {
        &self.points
    }

    pub fn years(&self) -> Vec<i32> {
        self.points.iter().map(|(year, _)| *year).collect()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|(_, value)| *value).collect()
    }

    pub fn last_year(&self) -> Option<i32> {
        self.points.last().map(|(year, _)| *year)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_labels_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_label(metric.label()).unwrap(), metric);
        }
        assert_eq!(Metric::from_label(" fwci ").unwrap(), Metric::Fwci);
        assert!(matches!(
            Metric::from_label("H-Index"),
            Err(ForecastError::Schema(_))
        ));
    }

    #[test]
    fn test_raw_record_missing_field() {
        let record = RawRecord {
            region_code: Some("NCR".into()),
            region: Some("National Capital Region".into()),
            school: Some("   ".into()),
            year: Some(2020),
            metric: Some("FWCI".into()),
            value: Some(1.2),
            kind: None,
        };

        let err = record.into_observation(7).unwrap_err();
        assert!(err.to_string().contains("row 7"));
        assert!(err.to_string().contains("School"));
    }

    #[test]
    fn test_series_rejects_unordered_years() {
        assert!(Series::new(vec![(2020, 1.0), (2020, 2.0)]).is_err());
        assert!(Series::new(vec![(2021, 1.0), (2020, 2.0)]).is_err());
        assert!(Series::new(vec![(2020, 1.0), (2022, 2.0)]).is_ok());
    }

    #[test]
    fn test_zero_filled_series() {
        let series = Series::zero_filled(&[(2022, 4.0), (2019, 1.0)], 2024).unwrap();

        assert_eq!(series.years(), vec![2019, 2020, 2021, 2022, 2023, 2024]);
        assert_eq!(series.values(), vec![1.0, 0.0, 0.0, 4.0, 0.0, 0.0]);
        assert!(Series::zero_filled(&[(2026, 1.0)], 2025).is_err());
    }

    #[test]
    fn test_zero_filled_rejects_implausible_span() {
        assert!(matches!(
            Series::zero_filled(&[(i32::MIN, 1.0)], 2025),
            Err(ForecastError::Schema(_))
        ));
        assert!(matches!(
            Series::zero_filled(&[(2025 - MAX_SERIES_SPAN, 1.0)], 2025),
            Err(ForecastError::Schema(_))
        ));

        let widest = Series::zero_filled(&[(2026 - MAX_SERIES_SPAN, 1.0)], 2025).unwrap();
        assert_eq!(widest.len(), MAX_SERIES_SPAN as usize);
    }
}
