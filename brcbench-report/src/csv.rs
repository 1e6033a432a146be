//! CSV Output

use crate::report::Report;

/// Generate a CSV report, one row per candidate in registration order.
///
/// Unmeasured candidates leave `average_s` empty rather than writing the
/// zero sentinel.
pub fn generate_csv_report(report: &Report) -> String {
    let mut output = String::from("name,input,status,exit_code,average_s\n");

    for result in &report.results {
        let average = result
            .measured_average()
            .map(|s| format!("{:.6}", s))
            .unwrap_or_default();
        output.push_str(&format!(
            "{},{},{},{},{}\n",
            escape(&result.name),
            escape(&report.meta.input_label),
            result.status.as_str(),
            result.exit_code,
            average
        ));
    }

    output
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
