//! # stackcast
//!
//! Command-line interface for stacked time series projection.

mod adapters;

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use projection_facade::{
    boundary_track, filter_series, formatter_by_name, read_config_file, Algorithm, ChartData,
    ConfigError, ConfigFile, PartialSlicePolicy, PipelineOutcome, ProjectionConfig,
    ProjectionEngine, ProjectionError, ProjectionPipeline, ValueFormatter,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::{adapter_for, parse_time, InputFormat};

const DEFAULT_LOG_FILTER: &str = "stackcast=info,projection_core=warn";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Projection(#[from] ProjectionError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Failed to write output: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid --{flag}: {reason}")]
    Argument { flag: &'static str, reason: String },
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Parser)]
#[command(name = "stackcast")]
#[command(about = "Stacked time series projection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct WindowArgs {
    /// Regression algorithm (linear, exponential, logarithmic, power, polynomial)
    #[arg(short, long)]
    algorithm: Option<String>,

    /// Time unit (seconds, minutes, hours, days, months, years)
    #[arg(short, long)]
    unit: Option<String>,

    /// Look-back window and projection horizon, in time units
    #[arg(short = 'n', long, allow_negative_numbers = true)]
    count: Option<i64>,

    /// Reference time as RFC 3339 or epoch milliseconds (default: current time)
    #[arg(long)]
    now: Option<String>,
}

impl WindowArgs {
    fn overrides(&self) -> ConfigFile {
        ConfigFile {
            algorithm: self.algorithm.clone(),
            time_unit: self.unit.clone(),
            time_value: self.count,
            ..ConfigFile::default()
        }
    }

    fn now(&self) -> CliResult<DateTime<Utc>> {
        match &self.now {
            Some(text) => parse_time(text).map_err(|reason| CliError::Argument {
                flag: "now",
                reason,
            }),
            None => Ok(Utc::now()),
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum PartialArg {
    Drop,
    Emit,
}

impl From<PartialArg> for PartialSlicePolicy {
    fn from(arg: PartialArg) -> Self {
        match arg {
            PartialArg::Drop => PartialSlicePolicy::Drop,
            PartialArg::Emit => PartialSlicePolicy::Emit,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Filter, project and stack series, writing chart JSON
    Project {
        /// Input file (JSON series, JSON data frames or long-form CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Input layout (default: from the file extension)
        #[arg(long, value_enum)]
        input_format: Option<InputFormat>,

        /// JSON config file; flags override its values
        #[arg(short, long)]
        config: Option<PathBuf>,

        #[command(flatten)]
        window: WindowArgs,

        /// Boundary line level
        #[arg(short, long, allow_negative_numbers = true)]
        boundary: Option<f64>,

        /// Multiplier applied to the boundary
        #[arg(long)]
        boundary_units: Option<f64>,

        /// What to do with timestamps only some series have
        #[arg(long, value_enum)]
        partial: Option<PartialArg>,

        /// Formatter for the stderr summary
        #[arg(long, default_value = "raw", value_parser = ["raw", "bits", "bytes", "1024"])]
        format_y: String,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fit each series in the window and report its model
    Fit {
        /// Input file (JSON series, JSON data frames or long-form CSV)
        #[arg(short, long)]
        input: PathBuf,

        /// Input layout (default: from the file extension)
        #[arg(long, value_enum)]
        input_format: Option<InputFormat>,

        #[command(flatten)]
        window: WindowArgs,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the boundary track
    Boundary {
        /// Boundary line level
        #[arg(long, allow_negative_numbers = true)]
        value: f64,

        /// Multiplier applied to the boundary
        #[arg(long)]
        boundary_units: Option<f64>,

        #[command(flatten)]
        window: WindowArgs,

        /// Output file (optional)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Merge the config file (if any) with flag overrides and validate.
fn resolve_config(path: Option<&Path>, overrides: ConfigFile) -> CliResult<ProjectionConfig> {
    let base = match path {
        Some(path) => read_config_file(path)?,
        None => ConfigFile::default(),
    };
    Ok(base.merge(overrides).into_config()?)
}

/// Write JSON to file or stdout
fn write_json<T: Serialize>(value: &T, output: Option<&PathBuf>) -> CliResult<()> {
    match output {
        Some(path) => {
            let mut file = File::create(path)?;
            serde_json::to_writer_pretty(&mut file, value)?;
            info!(path = %path.display(), "output written");
        }
        None => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// First projected time at which the stacked total reaches the boundary.
fn boundary_crossing(chart: &ChartData) -> Option<DateTime<Utc>> {
    let limit = chart.boundary.first()?.limit;
    let top = chart.series.first()?;
    top.projected
        .iter()
        .find(|p| {
            if limit >= 0.0 {
                p.cumulative_value >= limit
            } else {
                p.cumulative_value <= limit
            }
        })
        .map(|p| p.time)
}

fn print_summary(outcome: &PipelineOutcome, formatter: &dyn ValueFormatter) {
    for failure in outcome.failures() {
        eprintln!("  {:<24} skipped: {}", failure.name, failure.error);
    }
    let chart = match outcome {
        PipelineOutcome::Chart(chart) => chart,
        PipelineOutcome::NothingToRender { .. } => {
            eprintln!("Nothing to render");
            return;
        }
    };

    for series in chart.series.iter().rev() {
        let latest = series.historical.last().map(|p| p.original_value);
        let horizon = series.projected.last().map(|p| p.original_value);
        eprintln!(
            "  {:<24} {:>5} points  latest {:>12}  horizon {:>12}",
            series.name,
            series.historical.len(),
            latest.map_or("-".to_string(), |v| formatter.format(v)),
            horizon.map_or("-".to_string(), |v| formatter.format(v)),
        );
    }
    if let Some(top) = chart.series.first().and_then(|s| s.projected.last()) {
        eprintln!("  {:<24} {:>12}", "total at horizon", formatter.format(top.cumulative_value));
    }
    if let Some(limit) = chart.boundary.first().map(|p| p.limit) {
        match boundary_crossing(chart) {
            Some(time) => eprintln!(
                "  total reaches boundary {} at {}",
                formatter.format(limit),
                time.to_rfc3339()
            ),
            None => eprintln!("  total stays within boundary {}", formatter.format(limit)),
        }
    }
    if !chart.diagnostics.is_empty() {
        eprintln!("  {} diagnostics (see JSON output)", chart.diagnostics.len());
    }
}

/// Run project command
fn run_project(
    input: PathBuf,
    input_format: Option<InputFormat>,
    config: Option<PathBuf>,
    window: WindowArgs,
    overrides: ConfigFile,
    format_y: String,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let config = resolve_config(config.as_deref(), window.overrides().merge(overrides))?;
    let now = window.now()?;
    let formatter = formatter_by_name(&format_y).ok_or_else(|| CliError::Argument {
        flag: "format-y",
        reason: format!("unknown formatter '{}'", format_y),
    })?;

    let adapter = adapter_for(&input, input_format);
    info!(
        source = %adapter.describe(),
        algorithm = %config.algorithm,
        unit = %config.time_unit,
        count = config.time_value,
        now = %now.to_rfc3339(),
        "projecting"
    );
    let outcome = ProjectionPipeline::new(config)?.run_adapter(adapter.as_ref(), now)?;
    if !outcome.is_chart() {
        warn!(failures = outcome.failures().len(), "no series produced displayable output");
    }

    print_summary(&outcome, formatter.as_ref());
    write_json(&outcome, output.as_ref())
}

#[derive(Debug, Serialize)]
struct FitSummary {
    name: String,
    points: usize,
    algorithm: Option<Algorithm>,
    equation: Option<String>,
    coefficients: Vec<f64>,
    r_squared: Option<f64>,
    /// Projected value at the horizon
    horizon_value: Option<f64>,
    error: Option<String>,
}

/// Run fit command
fn run_fit(
    input: PathBuf,
    input_format: Option<InputFormat>,
    window: WindowArgs,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let config = resolve_config(None, window.overrides())?;
    let now = window.now()?;
    let adapter = adapter_for(&input, input_format);
    let series = adapter.load()?;
    info!(source = %adapter.describe(), series = series.len(), "fitting");

    let engine = ProjectionEngine::new();
    let mut summaries = Vec::with_capacity(series.len());
    for s in &series {
        let filtered = filter_series(s, config.time_unit, config.time_value, now)?;
        let summary = match engine.project(
            &filtered,
            config.algorithm,
            config.time_unit,
            config.time_value,
            now,
        ) {
            Ok(projection) => {
                let fit = &projection.fit;
                debug!(series = %s.name, equation = %fit.equation(), "fitted");
                FitSummary {
                    name: s.name.clone(),
                    points: filtered.len(),
                    algorithm: Some(fit.algorithm()),
                    equation: Some(fit.equation()),
                    coefficients: fit.coefficients(),
                    r_squared: Some(fit.r_squared()),
                    horizon_value: projection.projected.last().and_then(|p| p.value),
                    error: None,
                }
            }
            Err(error) => {
                warn!(series = %s.name, %error, "fit failed");
                FitSummary {
                    name: s.name.clone(),
                    points: filtered.len(),
                    algorithm: None,
                    equation: None,
                    coefficients: Vec::new(),
                    r_squared: None,
                    horizon_value: None,
                    error: Some(error.to_string()),
                }
            }
        };
        eprintln!(
            "  {:<24} {}",
            summary.name,
            summary
                .equation
                .as_deref()
                .or(summary.error.as_deref())
                .unwrap_or("-")
        );
        summaries.push(summary);
    }

    write_json(&summaries, output.as_ref())
}

/// Run boundary command
fn run_boundary(
    value: f64,
    boundary_units: Option<f64>,
    window: WindowArgs,
    output: Option<PathBuf>,
) -> CliResult<()> {
    let overrides = ConfigFile {
        boundary: Some(value),
        boundary_units,
        ..window.overrides()
    };
    let config = resolve_config(None, overrides)?;
    let now = window.now()?;
    let track = boundary_track(config.boundary, config.time_unit, config.time_value, now)?;
    info!(points = track.len(), "boundary track");
    write_json(&track, output.as_ref())
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Project {
            input,
            input_format,
            config,
            window,
            boundary,
            boundary_units,
            partial,
            format_y,
            output,
        } => {
            let overrides = ConfigFile {
                boundary,
                boundary_units,
                partial_slices: partial.map(PartialSlicePolicy::from),
                ..ConfigFile::default()
            };
            run_project(input, input_format, config, window, overrides, format_y, output)
        }

        Commands::Fit {
            input,
            input_format,
            window,
            output,
        } => run_fit(input, input_format, window, output),

        Commands::Boundary {
            value,
            boundary_units,
            window,
            output,
        } => run_boundary(value, boundary_units, window, output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
