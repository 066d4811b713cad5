//! Wide-sheet ingest: melts the two-header-row productivity sheet into the
//! long format.
//!
//! The first header row carries the metric name above its block of year
//! columns. Merged cells export as a single label followed by blanks, so a
//! blank metric cell inherits the label to its left. The second header row
//! holds the year, or `REGION CODE` / `REGION` / `SCHOOL` for the metadata
//! columns.

use crate::data::{Metric, Observation};
use crate::error::{ForecastError, Result};
use csv::StringRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

const REGION_CODE: &str = "REGION CODE";
const REGION: &str = "REGION";
const SCHOOL: &str = "SCHOOL";

/// Region code the source sheet gets wrong for Caraga
const CARAGA_REGION_CODE: &str = "REGION XIII";

struct MetricColumn {
    index: usize,
    metric: Metric,
    year: i32,
}

struct SheetLayout {
    region_code: usize,
    region: usize,
    school: usize,
    metrics: Vec<MetricColumn>,
}

/// Melt a wide CSV export into historical observations
pub fn melt_wide_file<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
    let file = File::open(path)?;
    melt_wide(file)
}

/// Melt wide CSV content into historical observations.
///
/// Placeholder cells (`-`, blanks, unparsable text) become `0.0`, matching
/// the upstream convention that unreported equals zero.
pub fn melt_wide<R: Read>(reader: R) -> Result<Vec<Observation>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);

    let mut records = csv_reader.records();
    let metric_row = records
        .next()
        .ok_or_else(|| ForecastError::Schema("sheet has no metric header row".to_string()))??;
    let year_row = records
        .next()
        .ok_or_else(|| ForecastError::Schema("sheet has no year header row".to_string()))??;

    let layout = parse_headers(&metric_row, &year_row)?;

    let mut observations = Vec::new();
    for record in records {
        let record = record?;
        let school = cell(&record, layout.school);
        if school.is_empty() {
            continue;
        }
        let region = cell(&record, layout.region);
        let region_code = if region.to_uppercase().contains("CARAGA") {
            CARAGA_REGION_CODE.to_string()
        } else {
            cell(&record, layout.region_code)
        };

        for column in &layout.metrics {
            observations.push(Observation::historical(
                region_code.clone(),
                region.clone(),
                school.clone(),
                column.year,
                column.metric,
                clean_value(record.get(column.index).unwrap_or("")),
            ));
        }
    }

    info!(
        rows = observations.len(),
        metric_columns = layout.metrics.len(),
        "Melted wide sheet to long format"
    );
    Ok(observations)
}

fn parse_headers(metric_row: &StringRecord, year_row: &StringRecord) -> Result<SheetLayout> {
    let mut region_code = None;
    let mut region = None;
    let mut school = None;
    let mut metrics = Vec::new();
    let mut current_metric: Option<String> = None;

    for (index, sub_header) in year_row.iter().enumerate() {
        let label = metric_row.get(index).unwrap_or("").trim();
        if !label.is_empty() && !label.starts_with("Unnamed") {
            current_metric = Some(label.to_string());
        }

        let sub_header = sub_header.trim();
        match sub_header.to_uppercase().as_str() {
            REGION_CODE => region_code = Some(index),
            REGION => region = Some(index),
            SCHOOL => school = Some(index),
            _ => {
                let (Some(metric_label), Ok(year)) = (&current_metric, sub_header.parse::<i32>())
                else {
                    continue;
                };
                metrics.push(MetricColumn {
                    index,
                    metric: Metric::from_label(metric_label)?,
                    year,
                });
            }
        }
    }

    let require = |found: Option<usize>, name: &str| {
        found.ok_or_else(|| ForecastError::Schema(format!("sheet has no '{}' column", name)))
    };

    Ok(SheetLayout {
        region_code: require(region_code, REGION_CODE)?,
        region: require(region, REGION)?,
        school: require(school, SCHOOL)?,
        metrics,
    })
}

fn cell(record: &StringRecord, index: usize) -> String {
    record.get(index).unwrap_or("").trim().to_string()
}

/// Parse a value cell; placeholders and junk become zero
pub fn clean_value(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "-" {
        return 0.0;
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHEET: &str = "\
,,,Publication Quantity,,Field-Weighted Citation Impact,
REGION CODE,REGION,SCHOOL,2015,2016,2015,2016
NCR,National Capital Region, Alpha University ,4,-,1.5,
REGION VIII,CARAGA REGION,Beta College,,7,0.25,x
";

    #[test]
    fn test_melt_forward_fills_metric_headers() {
        let rows = melt_wide(SHEET.as_bytes()).unwrap();
        assert_eq!(rows.len(), 8);

        let alpha: Vec<_> = rows.iter().filter(|o| o.institution == "Alpha University").collect();
        assert_eq!(alpha.len(), 4);
        assert_eq!(alpha[0].metric, Metric::PublicationQuantity);
        assert_eq!((alpha[1].year, alpha[1].value), (2016, 0.0));
        assert_eq!((alpha[2].metric, alpha[2].value), (Metric::Fwci, 1.5));
    }

    #[test]
    fn test_caraga_region_code_is_corrected() {
        let rows = melt_wide(SHEET.as_bytes()).unwrap();
        assert!(rows
            .iter()
            .filter(|o| o.institution == "Beta College")
            .all(|o| o.region_code == "REGION XIII"));
    }

    #[test]
    fn test_clean_value_placeholders() {
        assert_eq!(clean_value(" - "), 0.0);
        assert_eq!(clean_value(""), 0.0);
        assert_eq!(clean_value("n/a"), 0.0);
        assert_eq!(clean_value("NaN"), 0.0);
        assert_eq!(clean_value(" 12.5 "), 12.5);
    }

    #[test]
    fn test_unknown_metric_header_is_schema_error() {
        let sheet = ",,,H-Index\nREGION CODE,REGION,SCHOOL,2015\nNCR,NCR,Alpha,3\n";
        assert!(matches!(
            melt_wide(sheet.as_bytes()),
            Err(ForecastError::Schema(_))
        ));
    }

    #[test]
    fn test_missing_metadata_column_is_schema_error() {
        let sheet = ",,Publication Quantity\nREGION CODE,REGION,2015\nNCR,NCR,3\n";
        assert!(matches!(
            melt_wide(sheet.as_bytes()),
            Err(ForecastError::Schema(_))
        ));
    }
}
