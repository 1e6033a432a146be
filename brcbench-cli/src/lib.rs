#![warn(missing_docs)]
//! brcbench CLI Library
//!
//! This module provides the command-line harness that builds, runs and times
//! competing One Billion Row Challenge implementations against one input
//! file, then prints a comparison table.
//!
//! # Example
//!
//! ```ignore
//! fn main() -> std::process::ExitCode {
//!     match brcbench_cli::run() {
//!         Ok(()) => std::process::ExitCode::SUCCESS,
//!         Err(_) => std::process::ExitCode::FAILURE,
//!     }
//! }
//! ```

mod config;
mod error;
mod executor;
mod planner;
mod runner;

pub use config::*;
pub use error::HarnessError;
pub use executor::{
    AttemptSeries, CandidateOutcome, ExecutionConfig, Executor, build_report,
    format_human_output, input_label, render_table, run_attempts, warmup_excluded_mean,
};
pub use planner::{ExecutionPlan, build_plan};
pub use runner::{
    CommandRunner, ProcessRunner, RunAttempt, SPAWN_FAILURE_CODE, TIMEOUT_EXIT_CODE,
};

use brcbench_core::Registry;
use brcbench_report::{OutputFormat, Report, generate_csv_report, generate_json_report};
use clap::{Parser, Subcommand};
use regex::Regex;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// brcbench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "brcbench")]
#[command(author, version, about = "brcbench - build, run and time 1BRC implementations")]
pub struct Cli {
    /// Optional subcommand (Run, List, Init); defaults to Run
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Input measurements file (default: data/medium.txt next to brcbench.toml)
    pub file: Option<PathBuf>,

    /// Number of timed runs per implementation; the first is a warmup when
    /// more than one is requested
    #[arg(long, allow_negative_numbers = true)]
    pub runs: Option<i64>,

    /// Only benchmark implementations whose name matches this regex
    #[arg(long, global = true)]
    pub filter: Option<String>,

    /// Configuration file (default: discover brcbench.toml upwards)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Per-command timeout, e.g. "90s" or "5m" (default: wait forever)
    #[arg(long)]
    pub timeout: Option<String>,

    /// Benchmark this many implementations at once (skews timings)
    #[arg(long)]
    pub jobs: Option<usize>,

    /// Output format: human, json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Output file (stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build and time every implementation (default)
    Run,
    /// List configured implementations without building or running them
    List,
    /// Print a starter brcbench.toml
    Init,
}

/// Everything a harness run needs once CLI and config are merged
#[derive(Debug, Clone)]
pub struct RunSettings {
    /// Absolute input file path
    pub input: PathBuf,
    /// Effective runs and parallelism
    pub execution: ExecutionConfig,
    /// Per-command timeout
    pub timeout: Option<Duration>,
}

/// Run the brcbench CLI with the process arguments.
///
/// # Returns
/// Returns `Ok(())` on success, or an error if something goes wrong.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    run_with_cli(cli)
}

/// Run the brcbench CLI with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    if matches!(cli.command, Some(Commands::Init)) {
        print!("{}", BrcConfig::default_toml());
        return Ok(());
    }

    // Discover brcbench.toml configuration (CLI flags override)
    let loaded = LoadedConfig::resolve(cli.config.as_deref())?;
    let plan = plan_from(&cli, &loaded)?;

    match cli.command {
        Some(Commands::List) => {
            list_candidates(&plan);
            Ok(())
        }
        Some(Commands::Run) | Some(Commands::Init) | None => run_benchmarks(&cli, &loaded, plan),
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "brcbench=debug,brcbench_cli=debug,brcbench_core=debug"
    } else {
        "brcbench=info,brcbench_cli=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn plan_from(cli: &Cli, loaded: &LoadedConfig) -> Result<ExecutionPlan, HarnessError> {
    let registry = loaded.registry()?;
    let filter = cli.filter.as_deref().map(Regex::new).transpose()?;
    Ok(build_plan(registry, filter.as_ref()))
}

fn list_candidates(plan: &ExecutionPlan) {
    println!("brcbench plan:");
    for candidate in &plan.registry {
        println!("├── {} ({})", candidate.name, candidate.cwd.display());
        if let Some(build) = &candidate.build {
            println!("│   ├── build: {}", build.join(" "));
        }
        println!("│   └── run:   {}", candidate.run);
    }
    println!("{} implementations found.", plan.registry.len());
    if plan.skipped > 0 {
        println!("{} filtered out.", plan.skipped);
    }
}

/// Merge CLI flags over config values: CLI wins, then brcbench.toml.
pub fn resolve_settings(cli: &Cli, loaded: &LoadedConfig) -> anyhow::Result<RunSettings> {
    let file = cli.file.clone().unwrap_or_else(|| loaded.default_input());
    let input = std::path::absolute(&file)?;

    let runs = cli.runs.unwrap_or(loaded.config.runner.runs);
    let jobs = cli.jobs.unwrap_or(loaded.config.runner.jobs);
    let timeout = match cli.timeout.as_deref() {
        Some(s) => parse_timeout(s)?,
        None => loaded.config.timeout()?,
    };

    Ok(RunSettings {
        input,
        execution: ExecutionConfig::new(runs, jobs),
        timeout,
    })
}

/// Benchmark every candidate in `registry` and build the report.
///
/// The input file is checked before anything else; when it is missing no
/// build or run is attempted.
pub fn execute_harness<R: ProcessRunner + Sync>(
    registry: &Registry,
    settings: &RunSettings,
    runner: R,
) -> Result<Report, HarnessError> {
    if !settings.input.is_file() {
        return Err(HarnessError::InputNotFound(settings.input.clone()));
    }

    tracing::debug!(
        candidates = registry.len(),
        runs = settings.execution.runs,
        input = %settings.input.display(),
        "starting"
    );

    let start_time = Instant::now();
    let executor = Executor::new(runner, settings.execution);
    let outcomes = executor.execute(registry, &settings.input);
    let total_duration_ms = start_time.elapsed().as_secs_f64() * 1000.0;

    Ok(build_report(
        &outcomes,
        &settings.input,
        &settings.execution,
        settings.timeout,
        total_duration_ms,
    ))
}

fn run_benchmarks(cli: &Cli, loaded: &LoadedConfig, plan: ExecutionPlan) -> anyhow::Result<()> {
    let settings = resolve_settings(cli, loaded)?;

    let format_name = cli.format.as_deref().unwrap_or(&loaded.config.output.format);
    let format: OutputFormat = format_name.parse().unwrap_or_else(|e| {
        eprintln!("Warning: {}; using human output", e);
        OutputFormat::Human
    });

    if plan.registry.is_empty() {
        eprintln!("Warning: no implementations selected.");
    }

    if settings.execution.jobs > 1 {
        eprintln!(
            "Warning: running {} implementations at once; they compete for CPU and cache, \
             so timings are not comparable with a serial run.",
            settings.execution.jobs
        );
    }

    let runner = CommandRunner::new(settings.timeout);
    let report = execute_harness(&plan.registry, &settings, runner)?;

    // Generate output
    let output = match format {
        OutputFormat::Json => generate_json_report(&report)?,
        OutputFormat::Csv => generate_csv_report(&report),
        OutputFormat::Human => format_human_output(&report),
    };

    // Write output
    if let Some(ref path) = cli.output {
        write_output(path, &output)?;
        println!("Report written to: {}", path.display());
    } else {
        print!("{}", output);
    }

    Ok(())
}

fn write_output(path: &Path, output: &str) -> anyhow::Result<()> {
    let mut file = std::fs::File::create(path)?;
    file.write_all(output.as_bytes())?;
    Ok(())
}
