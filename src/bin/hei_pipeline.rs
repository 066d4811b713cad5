//! # hei-pipeline
//!
//! Command-line driver for the research-productivity pipeline.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use hei_productivity::hei_forecast::ingest::melt_wide_file;
use hei_productivity::hei_forecast::io::{write_csv_file, write_parquet};
use hei_productivity::hei_forecast::{ForecastConfig, ForecastOrchestrator, TableLoader};
use hei_productivity::hei_report::export_report;
use hei_productivity::logging::{init_logging, LogFormat};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "hei-pipeline")]
#[command(about = "Forecast research productivity of higher education institutions", long_about = None)]
struct Cli {
    /// Enable debug logging for the pipeline crates
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Melt a wide two-header-row sheet export into the long table
    Ingest {
        /// Wide CSV export of the prepared sheet
        input: PathBuf,

        /// Long-format CSV to write
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Forecast every institution-metric series in a long table
    Forecast {
        /// Long-format history (CSV or parquet)
        input: PathBuf,

        /// Combined history and forecast CSV to write
        #[arg(short, long)]
        output: PathBuf,

        /// Also write a parquet snapshot
        #[arg(long)]
        parquet: Option<PathBuf>,

        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured horizon
        #[arg(long)]
        horizon: Option<usize>,

        /// Run summary JSON (default: next to the output, `.summary.json`)
        #[arg(long)]
        summary: Option<PathBuf>,
    },

    /// Build period summaries and export the report sheets
    Summarize {
        /// Combined history and forecast CSV
        input: PathBuf,

        /// Directory for the report files
        #[arg(short, long)]
        output: PathBuf,

        /// TOML configuration file providing the periods
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_config(path: Option<&Path>) -> Result<ForecastConfig> {
    match path {
        Some(path) => ForecastConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ForecastConfig::default()),
    }
}

fn ingest(input: &Path, output: &Path) -> Result<()> {
    let rows = melt_wide_file(input)
        .with_context(|| format!("Failed to melt wide sheet {}", input.display()))?;
    write_csv_file(&rows, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(rows = rows.len(), output = %output.display(), "Wrote long table");
    Ok(())
}

fn forecast(
    input: &Path,
    output: &Path,
    parquet: Option<&Path>,
    config: Option<&Path>,
    horizon: Option<usize>,
    summary: Option<&Path>,
) -> Result<()> {
    let mut config = load_config(config)?;
    if let Some(horizon) = horizon {
        config = config.with_horizon(horizon).context("Invalid horizon")?;
    }

    let records = TableLoader::records_from_path(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let run = ForecastOrchestrator::new(config)?
        .run_records(records)
        .context("Forecast run failed")?;

    write_csv_file(&run.observations, output)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    if let Some(path) = parquet {
        write_parquet(&run.observations, path)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }

    let summary_path = summary
        .map(Path::to_path_buf)
        .unwrap_or_else(|| output.with_extension("summary.json"));
    fs::write(&summary_path, run.summary_json()?)
        .with_context(|| format!("Failed to write {}", summary_path.display()))?;

    info!(
        rows = run.observations.len(),
        output = %output.display(),
        summary = %summary_path.display(),
        "Wrote forecast table"
    );
    Ok(())
}

fn summarize(input: &Path, output: &Path, config: Option<&Path>) -> Result<()> {
    let config = load_config(config)?;
    let table = TableLoader::from_csv(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;

    let paths = export_report(&table, &config.periods, output)
        .with_context(|| format!("Failed to export report to {}", output.display()))?;

    info!(headline = %paths.headline.display(), "Report exported");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_logging(cli.verbose, format);

    match &cli.command {
        Commands::Ingest { input, output } => ingest(input, output),
        Commands::Forecast {
            input,
            output,
            parquet,
            config,
            horizon,
            summary,
        } => forecast(
            input,
            output,
            parquet.as_deref(),
            config.as_deref(),
            *horizon,
            summary.as_deref(),
        ),
        Commands::Summarize {
            input,
            output,
            config,
        } => summarize(input, output, config.as_deref()),
    }
}
