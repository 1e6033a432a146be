//! Statistics Computation
//!
//! Averages for attempt series. The first attempt of a multi-run series is a
//! warmup (JIT, page cache, CPU frequency ramp) and never counts.

/// Mean of `durations` with the warmup attempt excluded.
///
/// With a single attempt that attempt is the measurement. Returns 0.0 for an
/// empty slice, which is the "not measured" sentinel.
pub fn warmup_excluded_mean(durations: &[f64]) -> f64 {
    let measured = match durations {
        [] => return 0.0,
        [only] => return *only,
        [_warmup, rest @ ..] => rest,
    };
    measured.iter().sum::<f64>() / measured.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_attempt_is_exact() {
        assert_eq!(warmup_excluded_mean(&[0.123_456_789]), 0.123_456_789);
    }

    #[test]
    fn first_attempt_is_dropped() {
        assert_eq!(warmup_excluded_mean(&[100.0, 1.0, 2.0, 3.0]), 2.0);
        assert_eq!(warmup_excluded_mean(&[0.001, 4.0]), 4.0);
    }

    #[test]
    fn empty_is_sentinel() {
        assert_eq!(warmup_excluded_mean(&[]), 0.0);
    }
}
