#![warn(missing_docs)]
//! # brcbench
//!
//! Benchmark harness for One Billion Row Challenge implementations.
//!
//! brcbench builds each registered implementation, runs it against a shared
//! measurements file a configurable number of times, and prints a table of
//! average wall-clock times:
//! - **Sequential by default**: one process at a time, so candidates never
//!   compete for CPU or cache
//! - **Warmup exclusion**: with more than one run, the first is discarded
//! - **Failure isolation**: a broken build or crashing run only blanks that
//!   implementation's row
//! - **Config file**: candidates and defaults live in `brcbench.toml`
//! - **Machine-readable output**: JSON and CSV alongside the terminal table
//!
//! ## Quick Start
//!
//! ```text
//! $ brcbench init > brcbench.toml
//! $ brcbench data/medium.txt --runs 5
//!
//! Implementation       Input      Time (avg)
//! -------------------- ---------- ---------------
//! go-qwen              medium.txt 1.234s
//! go-gemini3           medium.txt 987.6ms
//! ```
//!
//! ## Library Use
//!
//! ```ignore
//! use brcbench::prelude::*;
//!
//! let registry = Registry::new(vec![
//!     Candidate::new("rust", "rust", None, ["target/release/brc", "{file}"])?,
//! ])?;
//! let settings = RunSettings {
//!     input: "data/medium.txt".into(),
//!     execution: ExecutionConfig::new(5, 1),
//!     timeout: None,
//! };
//! let report = execute_harness(&registry, &settings, CommandRunner::default())?;
//! print!("{}", format_human_output(&report));
//! ```

// Re-export registry types
pub use brcbench_core::{Candidate, CommandTemplate, PLACEHOLDER, Registry, RegistryError};

// Re-export report types
pub use brcbench_report::{
    CandidateResult, CandidateStatus, OutputFormat, Report, format_duration,
    generate_csv_report, generate_json_report,
};

// Re-export the harness
pub use brcbench_cli::{
    AttemptSeries, BrcConfig, CandidateOutcome, Cli, CommandRunner, ExecutionConfig, Executor,
    HarnessError, LoadedConfig, ProcessRunner, RunAttempt, RunSettings, execute_harness,
    format_human_output, render_table, run, run_with_cli,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Candidate, CommandRunner, ExecutionConfig, Registry, RunSettings, execute_harness,
        format_human_output,
    };
}
