//! Report Generation
//!
//! Converts orchestrator outcomes into the serializable `Report` shared by
//! every output format.

use super::execution::{CandidateOutcome, ExecutionConfig};
use super::metadata::collect_system_info;
use brcbench_report::{CandidateResult, Report, ReportMeta, ReportSummary, SCHEMA_VERSION};
use chrono::Utc;
use std::path::Path;
use std::time::Duration;

/// Build a complete report
///
/// # Arguments
/// * `outcomes` - Per-candidate outcomes in registry order
/// * `input` - Absolute input path
/// * `config` - Effective run count and parallelism
/// * `timeout` - Per-command timeout, if any
/// * `total_duration_ms` - Wall time of the whole harness run
pub fn build_report(
    outcomes: &[CandidateOutcome],
    input: &Path,
    config: &ExecutionConfig,
    timeout: Option<Duration>,
    total_duration_ms: f64,
) -> Report {
    let results: Vec<CandidateResult> = outcomes
        .iter()
        .map(|o| CandidateResult {
            name: o.name.clone(),
            status: o.status,
            exit_code: o.exit_code,
            durations_s: o.durations.clone(),
            average_s: o.average,
            failed_attempt: o.failed_attempt,
        })
        .collect();

    let summary = ReportSummary::from_results(&results, total_duration_ms);

    Report {
        meta: ReportMeta {
            schema_version: SCHEMA_VERSION,
            version: env!("CARGO_PKG_VERSION").to_string(),
            timestamp: Utc::now(),
            input: input.display().to_string(),
            input_label: input_label(input),
            runs: config.runs,
            jobs: config.jobs,
            timeout_ms: timeout.map(|t| t.as_millis() as u64),
            system: collect_system_info(),
        },
        results,
        summary,
    }
}

/// Basename shown in the Input column
pub fn input_label(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}
