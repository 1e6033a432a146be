//! Benchmark Planner
//!
//! Builds the execution plan by filtering the registry.
//!
//! Filtering options:
//! - Regex pattern matching on candidate name
//!
//! Ordering: registration order is kept so the report reads the same way the
//! registry does.

use brcbench_core::Registry;
use regex::Regex;

/// Execution plan for a harness run
pub struct ExecutionPlan {
    /// Candidates to benchmark, in registration order
    pub registry: Registry,
    /// Number of candidates removed by the filter
    pub skipped: usize,
}

/// Build execution plan from the configured registry
pub fn build_plan(registry: Registry, filter: Option<&Regex>) -> ExecutionPlan {
    let total = registry.len();
    let registry = match filter {
        Some(re) => registry.retain(|c| re.is_match(&c.name)),
        None => registry,
    };

    ExecutionPlan {
        skipped: total - registry.len(),
        registry,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brcbench_core::Candidate;

    fn registry(names: &[&str]) -> Registry {
        Registry::new(
            names
                .iter()
                .map(|n| Candidate::new(*n, *n, None, ["./bin", "{file}"]).unwrap())
                .collect(),
        )
        .unwrap()
    }

    fn names(plan: &ExecutionPlan) -> Vec<&str> {
        plan.registry.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_no_filter_keeps_everything() {
        let plan = build_plan(registry(&["go-qwen", "go-gemini3"]), None);
        assert_eq!(names(&plan), ["go-qwen", "go-gemini3"]);
        assert_eq!(plan.skipped, 0);
    }

    #[test]
    fn test_regex_filter_preserves_order() {
        let re = Regex::new("hint$").unwrap();
        let plan = build_plan(
            registry(&["go-qwen-with-hint", "go-qwen", "go-gemini3-with-hint"]),
            Some(&re),
        );
        assert_eq!(names(&plan), ["go-qwen-with-hint", "go-gemini3-with-hint"]);
        assert_eq!(plan.skipped, 1);
    }

    #[test]
    fn test_filter_matching_nothing() {
        let re = Regex::new("^rust-").unwrap();
        let plan = build_plan(registry(&["go-qwen"]), Some(&re));
        assert!(plan.registry.is_empty());
        assert_eq!(plan.skipped, 1);
    }
}
