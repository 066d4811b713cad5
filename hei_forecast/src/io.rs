//! Reading and writing long-format tables
//!
//! CSV is the interchange format with the ETL and dashboard sides; parquet
//! is the columnar snapshot handed to storage. Both use the column names
//! `Region Code, Region, School, Year, Metric, Value` plus `Type` on output.

use crate::data::{validate_records, Observation, RawRecord};
use crate::error::{ForecastError, Result};
use polars::prelude::*;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

/// Loader for long-format tables
#[derive(Debug)]
pub struct TableLoader;

impl TableLoader {
    /// Read unvalidated records from a CSV file
    pub fn records_from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
        let file = File::open(path)?;
        Self::records_from_reader(file)
    }

    /// Read unvalidated records from any CSV source.
    /// Undecodable rows are schema errors.
    pub fn records_from_reader<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        csv_reader
            .deserialize::<RawRecord>()
            .enumerate()
            .map(|(i, record)| {
                record.map_err(|e| ForecastError::Schema(format!("row {}: {}", i + 1, e)))
            })
            .collect()
    }

    /// Read and validate observations from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        validate_records(Self::records_from_csv(path)?)
    }

    /// Read unvalidated records from a parquet snapshot
    pub fn records_from_parquet<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
        let file = File::open(path)?;
        let df = ParquetReader::new(file).finish()?;
        Self::records_from_dataframe(&df)
    }

    /// Read and validate observations from a parquet snapshot
    pub fn from_parquet<P: AsRef<Path>>(path: P) -> Result<Vec<Observation>> {
        validate_records(Self::records_from_parquet(path)?)
    }

    /// Read from CSV or parquet depending on the file extension
    pub fn records_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<RawRecord>> {
        let is_parquet = path
            .as_ref()
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

        if is_parquet {
            Self::records_from_parquet(path)
        } else {
            Self::records_from_csv(path)
        }
    }

    /// Extract records from a DataFrame. Categorical and numeric columns
    /// are cast to the expected types; a missing `Type` column is allowed.
    pub fn records_from_dataframe(df: &DataFrame) -> Result<Vec<RawRecord>> {
        let region_codes = string_column(df, "Region Code")?;
        let regions = string_column(df, "Region")?;
        let schools = string_column(df, "School")?;
        let years = int_column(df, "Year")?;
        let metrics = string_column(df, "Metric")?;
        let values = float_column(df, "Value")?;
        let kinds = if df.get_column_names().contains(&"Type") {
            string_column(df, "Type")?
        } else {
            vec![None; df.height()]
        };

        let records = (0..df.height())
            .map(|i| RawRecord {
                region_code: region_codes[i].clone(),
                region: regions[i].clone(),
                school: schools[i].clone(),
                year: years[i],
                metric: metrics[i].clone(),
                value: values[i],
                kind: kinds[i].clone(),
            })
            .collect();

        Ok(records)
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Series> {
    df.column(name)
        .map_err(|_| ForecastError::Schema(format!("missing column '{}'", name)))
}

fn string_column(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let series = column(df, name)?.cast(&DataType::Utf8)?;
    let values = series.utf8()?.into_iter().map(|v| v.map(str::to_string)).collect();
    Ok(values)
}

fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i32>>> {
    let series = column(df, name)?.cast(&DataType::Int32)?;
    let values = series.i32()?.into_iter().collect();
    Ok(values)
}

fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let series = column(df, name)?.cast(&DataType::Float64)?;
    let values = series.f64()?.into_iter().collect();
    Ok(values)
}

/// Build a DataFrame with the output column layout
pub fn to_dataframe(rows: &[Observation]) -> Result<DataFrame> {
    let df = DataFrame::new(vec![
        Series::new(
            "Region Code",
            rows.iter().map(|r| r.region_code.as_str()).collect::<Vec<_>>(),
        ),
        Series::new(
            "Region",
            rows.iter().map(|r| r.region.as_str()).collect::<Vec<_>>(),
        ),
        Series::new(
            "School",
            rows.iter().map(|r| r.institution.as_str()).collect::<Vec<_>>(),
        ),
        Series::new("Year", rows.iter().map(|r| r.year).collect::<Vec<i32>>()),
        Series::new(
            "Metric",
            rows.iter().map(|r| r.metric.label()).collect::<Vec<_>>(),
        ),
        Series::new("Value", rows.iter().map(|r| r.value).collect::<Vec<f64>>()),
        Series::new(
            "Type",
            rows.iter().map(|r| r.kind.label()).collect::<Vec<_>>(),
        ),
    ])?;

    Ok(df)
}

/// Write observations as CSV with a header row
pub fn write_csv<W: Write>(rows: &[Observation], writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer.serialize(row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Write observations to a CSV file
pub fn write_csv_file<P: AsRef<Path>>(rows: &[Observation], path: P) -> Result<()> {
    let file = File::create(path)?;
    write_csv(rows, file)
}

/// Write observations to a parquet snapshot
pub fn write_parquet<P: AsRef<Path>>(rows: &[Observation], path: P) -> Result<()> {
    let mut df = to_dataframe(rows)?;
    let file = File::create(path)?;
    ParquetWriter::new(file).finish(&mut df)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Metric;

    #[test]
    fn test_csv_reader_reports_row_numbers() {
        let csv = "Region Code,Region,School,Year,Metric,Value\n\
                   NCR,National Capital Region,Alpha U,2020,Publication Quantity,3\n\
                   NCR,National Capital Region,Alpha U,twenty,Publication Quantity,4\n";

        let err = TableLoader::records_from_reader(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ForecastError::Schema(_)));
        assert!(err.to_string().contains("row 2"));
    }

    #[test]
    fn test_missing_value_column_is_schema_error() {
        let csv = "Region Code,Region,School,Year,Metric\n\
                   NCR,National Capital Region,Alpha U,2020,FWCI\n";

        let records = TableLoader::records_from_reader(csv.as_bytes()).unwrap();
        let err = validate_records(records).unwrap_err();
        assert!(err.to_string().contains("Value"));
    }

    #[test]
    fn test_dataframe_layout() {
        let rows = vec![Observation::historical(
            "NCR",
            "National Capital Region",
            "Alpha U",
            2020,
            Metric::Fwci,
            1.25,
        )];

        let df = to_dataframe(&rows).unwrap();
        assert_eq!(
            df.get_column_names(),
            vec!["Region Code", "Region", "School", "Year", "Metric", "Value", "Type"]
        );

        let records = TableLoader::records_from_dataframe(&df).unwrap();
        assert_eq!(validate_records(records).unwrap(), rows);
    }
}
