//! Runoff Response - batch command line
//!
//! Runs one of the per-event pipelines over a folder of tabulated events:
//! 1. `uh`       - unit hydrograph, dimensionless UH and PRF per watershed event
//! 2. `lag`      - SCS excess rainfall and lag time per rainfall-runoff event
//! 3. `rainfall` - basin-average rainfall from NCDC station tables
//!
//! Usage:
//!   cargo run --release -- uh                          # folders from runoff.toml
//!   cargo run --release -- lag --input raw_data_lag --output lag_time
//!   cargo run --release -- --log-level debug rainfall --input stations
//!
//! Environment:
//!   RUST_LOG - overrides --log-level

use std::error::Error;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use serde::Serialize;

use runoff_response::batch::{self, BatchSummary};
use runoff_response::config::{self, RunoffConfig};
use runoff_response::ingest::IngestError;
use runoff_response::ingest::event_csv::{event_id_from_path, load_discharge_event, load_storm_event};
use runoff_response::ingest::rainfall::{average_station_rainfall, load_station_rainfall};
use runoff_response::logging;
use runoff_response::report::{self, FailureRow};

#[derive(Parser)]
#[command(name = "runoff_response")]
#[command(about = "Unit hydrograph, peak rate factor and lag time from storm event tables", long_about = None)]
struct Cli {
    /// Configuration file (defaults apply if it does not exist)
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,
    /// Log level used when RUST_LOG is not set
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive unit hydrographs and peak rate factors
    Uh(DirArgs),
    /// Estimate lag time between excess rainfall and peak discharge
    Lag(DirArgs),
    /// Average station precipitation tables into one basin series
    Rainfall(RainfallArgs),
}

#[derive(Args)]
struct DirArgs {
    /// Folder of event tables (*.csv)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Folder for results
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Args)]
struct RainfallArgs {
    /// Folder of station tables (*.csv with date,QPCP columns)
    #[arg(long)]
    input: PathBuf,
    /// Output table
    #[arg(long, default_value = "rainfall_mean.csv")]
    output: PathBuf,
}

#[derive(Serialize)]
struct RunSummary<'a, R: Serialize> {
    results: &'a [R],
    failures: &'a [FailureRow],
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_tracing(cli.log_level.as_deref()) {
        eprintln!("⚠️  Logging unavailable: {}", e);
    }

    let config = match config::load_config_or_default(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("\n❌ Configuration error: {}\n", e);
            std::process::exit(1);
        }
    };

    println!("🌧️  Runoff Response");
    println!("===================\n");

    let result = match cli.command {
        Commands::Uh(args) => run_unit_hydrograph(&config, args),
        Commands::Lag(args) => run_lag_time(&config, args),
        Commands::Rainfall(args) => run_rainfall(&config, args),
    };

    if let Err(e) = result {
        eprintln!("\n❌ {}\n", e);
        std::process::exit(1);
    }
}

// ---------------------------------------------------------------------------
// Pipelines
// ---------------------------------------------------------------------------

fn run_unit_hydrograph(config: &RunoffConfig, args: DirArgs) -> Result<(), Box<dyn Error>> {
    let input = args.input.unwrap_or_else(|| config.unit_hydrograph.input_dir.clone());
    let output = args.output.unwrap_or_else(|| config.unit_hydrograph.output_dir.clone());

    println!("📂 Reading UH events from {}", input.display());
    let (events, mut failures) = load_all(&input, load_discharge_event)?;
    println!("   {} event(s) loaded, {} unreadable\n", events.len(), failures.len());

    println!("📈 Deriving unit hydrographs ({} workers)...", config.batch.workers);
    let reports = batch::derive_all(events, config.pipeline_options(), config.batch.workers);

    fs::create_dir_all(&output)?;
    for uh in reports.iter().filter_map(|r| r.outcome.as_ref().ok()) {
        let event_dir = output.join(&uh.event_id);
        fs::create_dir_all(&event_dir)?;
        report::write_unit_hydrograph(
            create(&event_dir.join(format!("Unit Hydrograph of {}.csv", uh.event_id)))?,
            &uh.unit_hydrograph,
        )?;
        report::write_dimensionless(
            create(&event_dir.join(format!("Dimensionless Unit Hydrograph of {}.csv", uh.event_id)))?,
            &uh.dimensionless,
        )?;

        let advisory = if uh.depth_advisory { "  ⚠️  depth != 1.0" } else { "" };
        println!(
            "   ✓ {:<24} PRF {:>4}  Tp {:>6.2} h{}",
            uh.event_id,
            uh.prf,
            uh.time_to_peak_days * 24.0,
            advisory
        );
    }

    let rows = report::prf_rows(&reports);
    report::write_rows(create(&output.join("PRF of Watersheds.csv"))?, &rows)?;
    failures.extend(report::failure_rows(&reports));
    finish(&output, &rows, &failures, BatchSummary::from_reports(&reports))
}

fn run_lag_time(config: &RunoffConfig, args: DirArgs) -> Result<(), Box<dyn Error>> {
    let input = args.input.unwrap_or_else(|| config.lag_time.input_dir.clone());
    let output = args.output.unwrap_or_else(|| config.lag_time.output_dir.clone());

    println!("📂 Reading rainfall-runoff events from {}", input.display());
    let (events, mut failures) = load_all(&input, load_storm_event)?;
    println!("   {} event(s) loaded, {} unreadable\n", events.len(), failures.len());

    println!("⏱️  Estimating lag times ({} workers)...", config.batch.workers);
    let reports = batch::estimate_all(events, config.batch.workers);

    for lag in reports.iter().filter_map(|r| r.outcome.as_ref().ok()) {
        let flag = if lag.is_plausible() { "" } else { "  ⚠️  negative lag" };
        println!("   ✓ {:<24} lag {:>7.2} h{}", lag.event_id, lag.lag_hours, flag);
    }

    fs::create_dir_all(&output)?;
    let rows = report::lag_rows(&reports);
    report::write_rows(create(&output.join("Lag Time of Watersheds.csv"))?, &rows)?;
    failures.extend(report::failure_rows(&reports));
    finish(&output, &rows, &failures, BatchSummary::from_reports(&reports))
}

fn run_rainfall(config: &RunoffConfig, args: RainfallArgs) -> Result<(), Box<dyn Error>> {
    println!("📂 Reading station tables from {}", args.input.display());

    let mut readings = Vec::new();
    for path in csv_files(&args.input)? {
        match load_station_rainfall(&path) {
            Ok(r) => {
                println!("   ✓ {} ({} readings)", event_id_from_path(&path), r.len());
                readings.extend(r);
            }
            Err(e) => println!("   ❌ {}: {}", path.display(), e),
        }
    }

    let series = average_station_rainfall(&readings, config.rainfall.flag_value)?;
    report::write_series(create(&args.output)?, &series, "rainfall_in")?;
    println!(
        "\n✓ {} averaged step(s), {:.2} in total → {}",
        series.len(),
        series.sum(),
        args.output.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// File handling
// ---------------------------------------------------------------------------

/// Event tables in `dir`, sorted by file name.
fn csv_files(dir: &Path) -> Result<Vec<PathBuf>, IngestError> {
    let entries = fs::read_dir(dir).map_err(|e| IngestError::from_io(dir, e))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| IngestError::from_io(dir, e))?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if path.is_file() && is_csv {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Loads every table in `dir`; unreadable tables become failure rows.
fn load_all<E>(
    dir: &Path,
    load: fn(&Path) -> Result<E, IngestError>,
) -> Result<(Vec<E>, Vec<FailureRow>), IngestError> {
    let mut events = Vec::new();
    let mut failures = Vec::new();
    for path in csv_files(dir)? {
        match load(&path) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!(path = %path.display(), kind = e.kind(), error = %e, "skipping unreadable event table");
                failures.push(FailureRow {
                    event_id: event_id_from_path(&path),
                    kind: e.kind().to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
    Ok((events, failures))
}

fn create(path: &Path) -> Result<BufWriter<File>, IngestError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| IngestError::from_io(path, e))
}

fn finish<R: Serialize>(
    output: &Path,
    rows: &[R],
    failures: &[FailureRow],
    summary: BatchSummary,
) -> Result<(), Box<dyn Error>> {
    report::write_rows(create(&output.join("Failed Events.csv"))?, failures)?;
    report::write_json(
        create(&output.join("summary.json"))?,
        &RunSummary { results: rows, failures },
    )?;

    if !failures.is_empty() {
        println!("\n❌ Failed events:");
        for f in failures {
            println!("   {} [{}] {}", f.event_id, f.kind, f.message);
        }
    }

    println!(
        "\n✓ {} succeeded, {} failed → {}",
        summary.succeeded,
        failures.len(),
        output.display()
    );
    Ok(())
}
