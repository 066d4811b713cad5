use hei_forecast::ingest::melt_wide_file;
use hei_forecast::io::{write_csv_file, write_parquet};
use hei_forecast::{
    classify, ForecastConfig, ForecastError, ForecastOrchestrator, Metric, Observation,
    PeriodConfig, TableLoader,
};
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::io::Write;
use tempfile::{tempdir, NamedTempFile};

fn create_long_csv() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();

    writeln!(file, "Region Code,Region,School,Year,Metric,Value").unwrap();
    writeln!(file, "NCR,National Capital Region,Alpha U,2021,Publication Quantity,10").unwrap();
    writeln!(file, "NCR,National Capital Region,Alpha U,2022,Publication Quantity,12").unwrap();
    writeln!(file, "NCR,National Capital Region,Alpha U,2023,Publication Quantity,14").unwrap();
    writeln!(file, "NCR,National Capital Region,Alpha U,2024,Publication Quantity,16").unwrap();
    writeln!(file, "NCR,National Capital Region,Alpha U,2025,Publication Quantity,18").unwrap();
    writeln!(file, " NCR , National Capital Region , Alpha U ,2025, fwci ,1.25").unwrap();

    file
}

#[test]
fn test_csv_load_trims_and_normalises_metric() {
    let file = create_long_csv();
    let rows = TableLoader::from_csv(file.path()).unwrap();

    assert_eq!(rows.len(), 6);
    assert_eq!(rows[5].institution, "Alpha U");
    assert_eq!(rows[5].metric, Metric::Fwci);
    assert_eq!(rows[5].value, 1.25);
}

#[test]
fn test_forecast_output_round_trips_through_csv_and_parquet() {
    let file = create_long_csv();
    let history = TableLoader::from_csv(file.path()).unwrap();
    let run = ForecastOrchestrator::new(ForecastConfig::default())
        .unwrap()
        .run(&history)
        .unwrap();

    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("forecasts.csv");
    let parquet_path = dir.path().join("forecasts.parquet");
    write_csv_file(&run.observations, &csv_path).unwrap();
    write_parquet(&run.observations, &parquet_path).unwrap();

    let from_csv = TableLoader::from_csv(&csv_path).unwrap();
    let from_parquet = TableLoader::from_parquet(&parquet_path).unwrap();
    assert_eq!(from_csv, run.observations);
    assert_eq!(from_parquet, run.observations);

    let by_extension = TableLoader::records_from_path(&parquet_path).unwrap();
    assert_eq!(by_extension.len(), run.observations.len());
}

#[test]
fn test_linear_counts_forecast_exactly() {
    let file = create_long_csv();
    let history = TableLoader::from_csv(file.path()).unwrap();
    let run = ForecastOrchestrator::new(ForecastConfig::default().with_horizon(5).unwrap())
        .unwrap()
        .run(&history)
        .unwrap();

    let projected: Vec<(i32, f64)> = run
        .forecasts()
        .filter(|o| o.metric == Metric::PublicationQuantity)
        .map(|o| (o.year, o.value))
        .collect();
    assert_eq!(
        projected,
        vec![(2026, 20.0), (2027, 22.0), (2028, 24.0), (2029, 26.0), (2030, 28.0)]
    );
}

#[test]
fn test_missing_file_is_io_error() {
    let result = TableLoader::from_csv("/nonexistent/productivity.csv");
    assert!(matches!(result, Err(ForecastError::IoError(_))));
}

#[test]
fn test_missing_required_field_has_no_partial_output() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "Region Code,Region,School,Year,Metric,Value").unwrap();
    writeln!(file, "NCR,National Capital Region,Alpha U,2024,Publication Quantity,3").unwrap();
    writeln!(file, "NCR,National Capital Region,,2025,Publication Quantity,4").unwrap();

    let records = TableLoader::records_from_csv(file.path()).unwrap();
    let result = ForecastOrchestrator::new(ForecastConfig::default())
        .unwrap()
        .run_records(records);

    match result {
        Err(ForecastError::Schema(message)) => {
            assert!(message.contains("row 2"));
            assert!(message.contains("School"));
        }
        other => panic!("expected schema error, got {:?}", other.map(|r| r.summary)),
    }
}

#[test]
fn test_config_file_loading() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "horizon = 4").unwrap();
    writeln!(file, "moving_average_window = 2").unwrap();

    let config = ForecastConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.horizon, 4);
    assert_eq!(config.moving_average_window, 2);
    assert_eq!(config.periods, PeriodConfig::default());
}

#[rstest]
#[case(2015, "Pre-Pandemic")]
#[case(2019, "Pre-Pandemic")]
#[case(2020, "Pandemic")]
#[case(2022, "Pandemic")]
#[case(2023, "Post-Pandemic")]
#[case(2025, "Post-Pandemic")]
#[case(2026, "Forecast-Phase-1")]
#[case(2030, "Forecast-Phase-1")]
#[case(2031, "Forecast-Phase-2")]
#[case(2035, "Forecast-Phase-2")]
fn test_period_boundaries(#[case] year: i32, #[case] expected: &str) {
    assert_eq!(classify(year, &PeriodConfig::default()).unwrap(), expected);
}

#[test]
fn test_every_year_in_span_has_exactly_one_period() {
    let config = PeriodConfig::default();
    for year in 2015..=2035 {
        let matches = config.periods().iter().filter(|p| p.contains(year)).count();
        assert_eq!(matches, 1, "year {}", year);
        assert!(classify(year, &config).is_ok());
    }

    assert!(matches!(
        classify(2014, &config),
        Err(ForecastError::OutOfRange { year: 2014 })
    ));
    assert!(classify(2036, &config).is_err());
}

#[test]
fn test_wide_sheet_feeds_orchestrator() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, ",,,Citation Quantity,,,").unwrap();
    writeln!(file, "REGION CODE,REGION,SCHOOL,2023,2024,2025").unwrap();
    writeln!(file, "REGION VII,Central Visayas,Cebu Tech,100,120,-").unwrap();

    let history = melt_wide_file(file.path()).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[2], Observation::historical(
        "REGION VII",
        "Central Visayas",
        "Cebu Tech",
        2025,
        Metric::CitationQuantity,
        0.0,
    ));

    let run = ForecastOrchestrator::new(ForecastConfig::default())
        .unwrap()
        .run(&history)
        .unwrap();
    assert_eq!(run.summary.moving_average, 1);
    assert!(run.forecasts().all(|o| o.value == 73.0));
}
