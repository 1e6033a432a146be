//! Output Formatting
//!
//! Human-readable comparison table:
//!
//! ```text
//!
//! Implementation       Input      Time (avg)
//! -------------------- ---------- ---------------
//! go-qwen              medium.txt 1.234s
//! go-gemini3           medium.txt -
//!
//! ```
//!
//! Column widths are minimums; longer names push the row out rather than
//! being truncated.

use brcbench_report::{Report, format_duration};

const NAME_WIDTH: usize = 20;
const INPUT_WIDTH: usize = 10;
const TIME_WIDTH: usize = 15;

/// Render (name, average) rows; a non-positive average renders as `-`.
pub fn render_table<'a>(rows: impl IntoIterator<Item = (&'a str, f64)>, input_label: &str) -> String {
    let mut output = String::new();

    output.push('\n');
    output.push_str(&format!(
        "{:NAME_WIDTH$} {:INPUT_WIDTH$} {:TIME_WIDTH$}\n",
        "Implementation", "Input", "Time (avg)"
    ));
    output.push_str(&format!(
        "{:NAME_WIDTH$} {:INPUT_WIDTH$} {:TIME_WIDTH$}\n",
        "-".repeat(NAME_WIDTH),
        "-".repeat(INPUT_WIDTH),
        "-".repeat(TIME_WIDTH)
    ));

    for (name, average) in rows {
        let pretty = if average > 0.0 {
            format_duration(average)
        } else {
            "-".to_string()
        };
        output.push_str(&format!(
            "{:NAME_WIDTH$} {:INPUT_WIDTH$} {:TIME_WIDTH$}\n",
            name, input_label, pretty
        ));
    }

    output.push('\n');
    output
}

/// Format a report for human-readable terminal display
pub fn format_human_output(report: &Report) -> String {
    render_table(
        report
            .results
            .iter()
            .map(|r| (r.name.as_str(), r.average_s)),
        &report.meta.input_label,
    )
}
