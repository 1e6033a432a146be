#![warn(missing_docs)]
//! brcbench Report - Reporting
//!
//! Generates various output formats:
//! - Human (fixed-width comparison table, rendered by the CLI)
//! - JSON (machine-readable)
//! - CSV (spreadsheet-compatible)

mod csv;
mod duration;
mod json;
mod report;

pub use csv::generate_csv_report;
pub use duration::format_duration;
pub use json::{SCHEMA_VERSION, generate_json_report};
pub use report::{CandidateResult, CandidateStatus, Report, ReportMeta, ReportSummary, SystemInfo};

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// JSON with full schema
    Json,
    /// CSV for spreadsheets
    Csv,
    /// Human-readable terminal table
    Human,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            "human" | "text" | "table" => Ok(OutputFormat::Human),
            other => Err(format!("Unknown output format: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_output_formats() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("table".parse::<OutputFormat>(), Ok(OutputFormat::Human));
        assert!("html".parse::<OutputFormat>().is_err());
    }
}
