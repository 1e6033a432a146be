//! Benchmark Executor
//!
//! Builds and runs candidates and turns the timings into a report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Registry (brcbench.toml or built-in)
//!       │
//!       ▼
//! ┌─────────────┐
//! │  execution  │  Build, timed attempts, short-circuit on failure
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ statistics  │  Warmup-excluded mean
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  Build Report with metadata
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │ formatting  │  Human-readable table
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - Orchestration over a `ProcessRunner`
//! - [`statistics`] - Averaging with warmup exclusion
//! - [`report`] - Report building
//! - [`formatting`] - Human-readable output formatting
//! - [`metadata`] - System metadata collection

mod execution;
mod formatting;
mod metadata;
mod report;
mod statistics;

// Re-export public API
pub use execution::{AttemptSeries, CandidateOutcome, ExecutionConfig, Executor, run_attempts};
pub use formatting::{format_human_output, render_table};
pub use report::{build_report, input_label};
pub use statistics::warmup_excluded_mean;
