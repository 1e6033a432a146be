//! Duration Formatting

/// Format a duration in seconds for the comparison table.
///
/// Whole seconds and above print as `1.234s`, anything shorter as
/// milliseconds with one decimal (`500.0ms`). The zero "not measured"
/// sentinel is not special-cased here; callers decide how to show it.
pub fn format_duration(seconds: f64) -> String {
    if seconds >= 1.0 {
        format!("{:.3}s", seconds)
    } else {
        format!("{:.1}ms", seconds * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seconds_use_three_decimals() {
        assert_eq!(format_duration(1.234), "1.234s");
        assert_eq!(format_duration(1.0), "1.000s");
        assert_eq!(format_duration(42.0), "42.000s");
    }

    #[test]
    fn sub_second_uses_milliseconds() {
        assert_eq!(format_duration(0.5), "500.0ms");
        assert_eq!(format_duration(0.0123), "12.3ms");
        assert_eq!(format_duration(0.99949), "999.5ms");
    }
}
