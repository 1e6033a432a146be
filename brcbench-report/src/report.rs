//! Report Data Structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Complete harness report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Run configuration and host description
    pub meta: ReportMeta,
    /// One entry per candidate, in registration order
    pub results: Vec<CandidateResult>,
    /// Status tallies
    pub summary: ReportSummary,
}

/// Report metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Layout version of this report
    pub schema_version: u32,
    /// brcbench version that produced the report
    pub version: String,
    /// When the report was generated
    pub timestamp: DateTime<Utc>,
    /// Absolute input path
    pub input: String,
    /// Input basename as shown in the table
    pub input_label: String,
    /// Effective repetitions per candidate
    pub runs: u32,
    /// Candidates benchmarked concurrently
    pub jobs: usize,
    /// Per-command timeout, if one was set
    pub timeout_ms: Option<u64>,
    /// Host description
    pub system: SystemInfo,
}

/// System information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    /// Operating system
    pub os: String,
    /// CPU architecture
    pub arch: String,
    /// CPU model name, or "Unknown"
    pub cpu: String,
    /// Available parallelism
    pub cpu_cores: u32,
}

/// Outcome of one candidate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    /// Candidate name
    pub name: String,
    /// How far the candidate got
    pub status: CandidateStatus,
    /// Last exit code observed (0 when measured)
    pub exit_code: i32,
    /// Every attempted run duration in seconds, warmup included
    pub durations_s: Vec<f64>,
    /// Warmup-excluded mean in seconds; 0.0 when not measured
    pub average_s: f64,
    /// 1-based attempt that failed, if a run failed
    pub failed_attempt: Option<usize>,
}

impl CandidateResult {
    /// The average, or `None` for the not-measured sentinel
    pub fn measured_average(&self) -> Option<f64> {
        (self.average_s > 0.0).then_some(self.average_s)
    }
}

/// Candidate execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateStatus {
    /// Every attempt succeeded
    Measured,
    /// The build command exited nonzero
    BuildFailed,
    /// A run attempt exited nonzero
    RunFailed,
    /// A run attempt outlived the timeout
    TimedOut,
}

impl CandidateStatus {
    /// Stable lowercase identifier, matching the serde form
    pub fn as_str(self) -> &'static str {
        match self {
            CandidateStatus::Measured => "measured",
            CandidateStatus::BuildFailed => "build_failed",
            CandidateStatus::RunFailed => "run_failed",
            CandidateStatus::TimedOut => "timed_out",
        }
    }
}

/// Report summary
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Candidates in the report
    pub total_candidates: usize,
    /// Candidates with an average
    pub measured: usize,
    /// Candidates whose build failed
    pub build_failures: usize,
    /// Candidates with a failed run attempt
    pub run_failures: usize,
    /// Candidates stopped by the timeout
    pub timeouts: usize,
    /// Wall time of the whole harness run
    pub total_duration_ms: f64,
}

impl ReportSummary {
    /// Tally statuses over `results`
    pub fn from_results(results: &[CandidateResult], total_duration_ms: f64) -> Self {
        let count = |status: CandidateStatus| results.iter().filter(|r| r.status == status).count();
        Self {
            total_candidates: results.len(),
            measured: count(CandidateStatus::Measured),
            build_failures: count(CandidateStatus::BuildFailed),
            run_failures: count(CandidateStatus::RunFailed),
            timeouts: count(CandidateStatus::TimedOut),
            total_duration_ms,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_report() -> Report {
        let results = vec![
            CandidateResult {
                name: "go-qwen".to_string(),
                status: CandidateStatus::Measured,
                exit_code: 0,
                durations_s: vec![2.0, 1.4, 1.6],
                average_s: 1.5,
                failed_attempt: None,
            },
            CandidateResult {
                name: "go,odd".to_string(),
                status: CandidateStatus::BuildFailed,
                exit_code: 2,
                durations_s: Vec::new(),
                average_s: 0.0,
                failed_attempt: None,
            },
        ];
        let summary = ReportSummary::from_results(&results, 12.5);
        Report {
            meta: ReportMeta {
                schema_version: crate::SCHEMA_VERSION,
                version: "0.1.0".to_string(),
                timestamp: Utc::now(),
                input: "/data/medium.txt".to_string(),
                input_label: "medium.txt".to_string(),
                runs: 3,
                jobs: 1,
                timeout_ms: None,
                system: SystemInfo {
                    os: "linux".to_string(),
                    arch: "x86_64".to_string(),
                    cpu: "Unknown".to_string(),
                    cpu_cores: 8,
                },
            },
            results,
            summary,
        }
    }

    #[test]
    fn summary_counts_statuses() {
        let report = sample_report();
        assert_eq!(report.summary.total_candidates, 2);
        assert_eq!(report.summary.measured, 1);
        assert_eq!(report.summary.build_failures, 1);
        assert_eq!(report.summary.run_failures, 0);
    }

    #[test]
    fn sentinel_is_not_a_measurement() {
        let report = sample_report();
        assert_eq!(report.results[0].measured_average(), Some(1.5));
        assert_eq!(report.results[1].measured_average(), None);
    }

    #[test]
    fn json_round_trip_keeps_status_names() {
        let json = crate::generate_json_report(&sample_report()).unwrap();
        assert!(json.contains("\"status\": \"build_failed\""));
        let parsed: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.results[1].status, CandidateStatus::BuildFailed);
        assert_eq!(parsed.meta.schema_version, crate::SCHEMA_VERSION);
    }
}
