//! Benchmark Execution
//!
//! Core orchestration: one build then up to `runs` timed attempts per
//! candidate, stopping a candidate at its first failed attempt.
//!
//! ## Data Flow
//!
//! ```text
//! Registry (config or built-in)
//!        │
//!        ▼
//!   ExecutionConfig
//!        │
//!        ▼
//! ┌──────────────────┐
//! │  Executor        │  Build → Attempt 1 (warmup) → Attempts 2..R
//! │  (ProcessRunner) │
//! └────────┬─────────┘
//!          │
//!          ▼
//!  CandidateOutcome (durations, status, exit code, average)
//! ```
//!
//! Candidates run one at a time by default. With `jobs > 1` whole candidates
//! are dispatched to a thread pool; they then compete for CPU and cache, so
//! the numbers are only comparable among themselves.

use super::statistics::warmup_excluded_mean;
use crate::runner::{ProcessRunner, TIMEOUT_EXIT_CODE};
use brcbench_core::{Candidate, Registry};
use brcbench_report::CandidateStatus;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use std::ops::ControlFlow;
use std::path::Path;

/// Configuration for benchmark execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutionConfig {
    /// Timed attempts per candidate, at least 1
    pub runs: u32,
    /// Candidates executed concurrently, at least 1
    pub jobs: usize,
}

impl ExecutionConfig {
    /// Clamp requested values into range; zero or negative runs mean one run.
    pub fn new(requested_runs: i64, jobs: usize) -> Self {
        Self {
            runs: u32::try_from(requested_runs.max(1)).unwrap_or(u32::MAX),
            jobs: jobs.max(1),
        }
    }
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { runs: 1, jobs: 1 }
    }
}

/// Attempts made for one candidate
#[derive(Debug, Clone, PartialEq)]
pub enum AttemptSeries {
    /// Every attempt exited 0
    Completed(Vec<f64>),
    /// Attempt `attempt` (1-based) failed; later attempts never ran
    FailedAt {
        /// 1-based index of the failing attempt
        attempt: usize,
        /// Its exit code
        code: i32,
        /// Whether the timeout fired
        timed_out: bool,
        /// Durations up to and including the failed attempt
        durations: Vec<f64>,
    },
}

/// Run up to `runs` attempts, short-circuiting on the first nonzero exit.
pub fn run_attempts<R: ProcessRunner + ?Sized>(
    runner: &R,
    candidate: &Candidate,
    input: &Path,
    runs: u32,
) -> AttemptSeries {
    let runs = runs.max(1) as usize;
    let folded = (1..=runs).try_fold(Vec::with_capacity(runs), |mut durations, attempt| {
        let result = runner.run(candidate, input);
        durations.push(result.duration);
        if result.succeeded() {
            ControlFlow::Continue(durations)
        } else {
            ControlFlow::Break(AttemptSeries::FailedAt {
                attempt,
                code: result.exit_code,
                timed_out: result.timed_out,
                durations,
            })
        }
    });

    match folded {
        ControlFlow::Continue(durations) => AttemptSeries::Completed(durations),
        ControlFlow::Break(failed) => failed,
    }
}

/// Result from benchmarking a single candidate
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateOutcome {
    /// Candidate name
    pub name: String,
    /// How far the candidate got
    pub status: CandidateStatus,
    /// Attempted run durations in seconds, possibly cut short
    pub durations: Vec<f64>,
    /// Final exit code; the failing code when not measured
    pub exit_code: i32,
    /// Warmup-excluded mean in seconds; 0.0 when not measured
    pub average: f64,
    /// 1-based failed attempt for run failures
    pub failed_attempt: Option<usize>,
}

impl CandidateOutcome {
    fn build_failed(candidate: &Candidate, code: i32) -> Self {
        Self {
            name: candidate.name.clone(),
            status: CandidateStatus::BuildFailed,
            durations: Vec::new(),
            exit_code: code,
            average: 0.0,
            failed_attempt: None,
        }
    }

    fn from_series(candidate: &Candidate, series: AttemptSeries) -> Self {
        match series {
            AttemptSeries::Completed(durations) => Self {
                name: candidate.name.clone(),
                status: CandidateStatus::Measured,
                average: warmup_excluded_mean(&durations),
                durations,
                exit_code: 0,
                failed_attempt: None,
            },
            AttemptSeries::FailedAt {
                attempt,
                code,
                timed_out,
                durations,
            } => Self {
                name: candidate.name.clone(),
                status: if timed_out {
                    CandidateStatus::TimedOut
                } else {
                    CandidateStatus::RunFailed
                },
                durations,
                exit_code: code,
                average: 0.0,
                failed_attempt: Some(attempt),
            },
        }
    }

    /// Whether a timing was produced
    pub fn is_measured(&self) -> bool {
        self.status == CandidateStatus::Measured
    }

    /// One-line stderr diagnostic for unmeasured outcomes
    pub fn diagnostic(&self) -> Option<String> {
        match self.status {
            CandidateStatus::Measured => None,
            CandidateStatus::BuildFailed if self.exit_code == TIMEOUT_EXIT_CODE => Some(format!(
                "{}: build timed out (exit code {})",
                self.name, self.exit_code
            )),
            CandidateStatus::BuildFailed => Some(format!(
                "{}: build exited with code {}",
                self.name, self.exit_code
            )),
            CandidateStatus::RunFailed => {
                Some(format!("{}: exited with code {}", self.name, self.exit_code))
            }
            CandidateStatus::TimedOut => Some(format!(
                "{}: timed out on attempt {} (exit code {})",
                self.name,
                self.failed_attempt.unwrap_or(1),
                self.exit_code
            )),
        }
    }
}

/// Execute candidates and produce outcomes
pub struct Executor<R> {
    runner: R,
    config: ExecutionConfig,
}

impl<R: ProcessRunner + Sync> Executor<R> {
    /// Create an executor over `runner`
    pub fn new(runner: R, config: ExecutionConfig) -> Self {
        Self { runner, config }
    }

    /// Execute every candidate; outcomes come back in registry order.
    pub fn execute(&self, registry: &Registry, input: &Path) -> Vec<CandidateOutcome> {
        let pb = ProgressBar::new(registry.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );

        let outcomes = if self.config.jobs > 1 && registry.len() > 1 {
            self.execute_parallel(registry, input, &pb)
        } else {
            self.execute_sequential(registry, input, &pb)
        };

        pb.finish_and_clear();
        outcomes
    }

    fn execute_sequential(
        &self,
        registry: &Registry,
        input: &Path,
        pb: &ProgressBar,
    ) -> Vec<CandidateOutcome> {
        registry
            .iter()
            .map(|candidate| {
                pb.set_message(candidate.name.clone());
                let outcome = self.execute_single(candidate, input, pb);
                pb.inc(1);
                outcome
            })
            .collect()
    }

    fn execute_parallel(
        &self,
        registry: &Registry,
        input: &Path,
        pb: &ProgressBar,
    ) -> Vec<CandidateOutcome> {
        let worker_count = self.config.jobs.min(registry.len());
        let pool = match ThreadPoolBuilder::new().num_threads(worker_count).build() {
            Ok(pool) => pool,
            Err(e) => {
                pb.suspend(|| {
                    eprintln!("Warning: failed to build worker pool ({}); running serially", e)
                });
                return self.execute_sequential(registry, input, pb);
            }
        };

        let mut indexed: Vec<(usize, CandidateOutcome)> = pool.install(|| {
            registry
                .candidates()
                .par_iter()
                .enumerate()
                .map(|(index, candidate)| {
                    let outcome = self.execute_single(candidate, input, pb);
                    pb.inc(1);
                    (index, outcome)
                })
                .collect()
        });

        indexed.sort_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Build once, then run the attempt series
    pub fn execute_single(
        &self,
        candidate: &Candidate,
        input: &Path,
        pb: &ProgressBar,
    ) -> CandidateOutcome {
        let outcome = match self.build_step(candidate) {
            Some(code) => CandidateOutcome::build_failed(candidate, code),
            None => {
                let series = run_attempts(&self.runner, candidate, input, self.config.runs);
                CandidateOutcome::from_series(candidate, series)
            }
        };

        if let Some(line) = outcome.diagnostic() {
            pb.suspend(|| eprintln!("{}", line));
        } else {
            tracing::debug!(
                candidate = %outcome.name,
                average_s = outcome.average,
                attempts = outcome.durations.len(),
                "measured"
            );
        }
        outcome
    }

    /// Returns the failing exit code, or `None` when there is nothing to
    /// build or the build succeeded
    fn build_step(&self, candidate: &Candidate) -> Option<i32> {
        if !candidate.has_build() {
            return None;
        }
        let code = self.runner.build(candidate);
        (code != 0).then_some(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RunAttempt;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Replays scripted (duration, exit code) pairs and records every call
    #[derive(Default)]
    struct ScriptedRunner {
        builds: HashMap<String, i32>,
        runs: Mutex<HashMap<String, Vec<(f64, i32)>>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedRunner {
        fn build_code(mut self, name: &str, code: i32) -> Self {
            self.builds.insert(name.to_string(), code);
            self
        }

        fn script(self, name: &str, attempts: &[(f64, i32)]) -> Self {
            self.runs
                .lock()
                .unwrap()
                .insert(name.to_string(), attempts.iter().rev().copied().collect());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ProcessRunner for ScriptedRunner {
        fn build(&self, candidate: &Candidate) -> i32 {
            self.calls
                .lock()
                .unwrap()
                .push(format!("build {}", candidate.name));
            self.builds.get(&candidate.name).copied().unwrap_or(0)
        }

        fn run(&self, candidate: &Candidate, _input: &Path) -> RunAttempt {
            self.calls
                .lock()
                .unwrap()
                .push(format!("run {}", candidate.name));
            let (duration, exit_code) = self
                .runs
                .lock()
                .unwrap()
                .get_mut(&candidate.name)
                .and_then(Vec::pop)
                .unwrap_or((0.5, 0));
            RunAttempt {
                duration,
                exit_code,
                output: String::new(),
                timed_out: exit_code == TIMEOUT_EXIT_CODE,
            }
        }
    }

    fn candidate(name: &str, with_build: bool) -> Candidate {
        let build = with_build.then(|| vec!["make".to_string()]);
        Candidate::new(name, "/tmp", build, ["./bin", "{file}"]).unwrap()
    }

    fn registry(candidates: Vec<Candidate>) -> Registry {
        Registry::new(candidates).unwrap()
    }

    fn execute(runner: &ScriptedRunner, registry: &Registry, runs: i64) -> Vec<CandidateOutcome> {
        Executor::new(runner, ExecutionConfig::new(runs, 1)).execute(registry, Path::new("in.txt"))
    }

    #[test]
    fn runs_are_clamped_to_one() {
        assert_eq!(ExecutionConfig::new(0, 1).runs, 1);
        assert_eq!(ExecutionConfig::new(-5, 0), ExecutionConfig::new(1, 1));
        assert_eq!(ExecutionConfig::new(7, 3).runs, 7);
    }

    #[test]
    fn single_run_average_is_that_run() {
        let runner = ScriptedRunner::default().script("a", &[(0.123_456, 0)]);
        let outcomes = execute(&runner, &registry(vec![candidate("a", false)]), 1);
        assert_eq!(outcomes[0].average, 0.123_456);
        assert_eq!(outcomes[0].status, CandidateStatus::Measured);
        assert_eq!(runner.calls(), ["run a"]);
    }

    #[test]
    fn warmup_is_excluded_from_average() {
        let runner =
            ScriptedRunner::default().script("a", &[(9.0, 0), (1.0, 0), (2.0, 0), (3.0, 0)]);
        let outcomes = execute(&runner, &registry(vec![candidate("a", false)]), 4);
        assert_eq!(outcomes[0].durations, vec![9.0, 1.0, 2.0, 3.0]);
        assert_eq!(outcomes[0].average, 2.0);
    }

    #[test]
    fn zero_and_negative_runs_behave_like_one() {
        for runs in [0, -3] {
            let runner = ScriptedRunner::default().script("a", &[(0.25, 0), (5.0, 0)]);
            let outcomes = execute(&runner, &registry(vec![candidate("a", false)]), runs);
            assert_eq!(outcomes[0].average, 0.25);
            assert_eq!(runner.calls(), ["run a"]);
        }
    }

    #[test]
    fn build_failure_skips_runs() {
        let runner = ScriptedRunner::default().build_code("a", 2);
        let reg = registry(vec![candidate("a", true), candidate("b", true)]);
        let outcomes = execute(&runner, &reg, 3);

        assert_eq!(outcomes[0].status, CandidateStatus::BuildFailed);
        assert_eq!(outcomes[0].exit_code, 2);
        assert_eq!(outcomes[0].average, 0.0);
        assert!(outcomes[0].durations.is_empty());
        assert_eq!(
            outcomes[0].diagnostic().as_deref(),
            Some("a: build exited with code 2")
        );
        assert!(outcomes[1].is_measured());
        assert_eq!(
            runner.calls(),
            ["build a", "build b", "run b", "run b", "run b"]
        );
    }

    #[test]
    fn candidates_without_build_are_not_built() {
        let runner = ScriptedRunner::default();
        execute(&runner, &registry(vec![candidate("a", false)]), 2);
        assert_eq!(runner.calls(), ["run a", "run a"]);
    }

    #[test]
    fn run_failure_stops_remaining_attempts() {
        let runner = ScriptedRunner::default().script("a", &[(1.0, 0), (1.0, 3), (1.0, 0)]);
        let reg = registry(vec![candidate("a", false), candidate("b", false)]);
        let outcomes = execute(&runner, &reg, 3);

        assert_eq!(outcomes[0].status, CandidateStatus::RunFailed);
        assert_eq!(outcomes[0].exit_code, 3);
        assert_eq!(outcomes[0].failed_attempt, Some(2));
        assert_eq!(outcomes[0].durations.len(), 2);
        assert_eq!(outcomes[0].average, 0.0);
        assert_eq!(
            outcomes[0].diagnostic().as_deref(),
            Some("a: exited with code 3")
        );

        assert!(outcomes[1].is_measured());
        assert_eq!(outcomes[1].average, 0.5);
        assert_eq!(
            runner.calls(),
            ["run a", "run a", "run b", "run b", "run b"]
        );
    }

    #[test]
    fn failing_warmup_is_still_a_failure() {
        let runner = ScriptedRunner::default().script("a", &[(1.0, 1)]);
        let outcomes = execute(&runner, &registry(vec![candidate("a", false)]), 5);
        assert_eq!(outcomes[0].failed_attempt, Some(1));
        assert_eq!(runner.calls().len(), 1);
    }

    #[test]
    fn timeout_is_reported_separately() {
        let runner = ScriptedRunner::default().script("a", &[(2.0, TIMEOUT_EXIT_CODE)]);
        let outcomes = execute(&runner, &registry(vec![candidate("a", false)]), 1);
        assert_eq!(outcomes[0].status, CandidateStatus::TimedOut);
        assert_eq!(
            outcomes[0].diagnostic().as_deref(),
            Some("a: timed out on attempt 1 (exit code 124)")
        );
    }

    #[test]
    fn run_attempts_returns_sum_type() {
        let runner = ScriptedRunner::default().script("a", &[(1.0, 0), (2.0, 0)]);
        let series = run_attempts(&runner, &candidate("a", false), Path::new("x"), 2);
        assert_eq!(series, AttemptSeries::Completed(vec![1.0, 2.0]));

        let runner = ScriptedRunner::default().script("a", &[(1.0, 0), (2.0, -9)]);
        let series = run_attempts(&runner, &candidate("a", false), Path::new("x"), 4);
        assert_eq!(
            series,
            AttemptSeries::FailedAt {
                attempt: 2,
                code: -9,
                timed_out: false,
                durations: vec![1.0, 2.0],
            }
        );
    }

    #[test]
    fn parallel_results_keep_registry_order() {
        let names = ["e", "d", "c", "b", "a"];
        let mut runner = ScriptedRunner::default().build_code("c", 1);
        for (i, name) in names.iter().enumerate() {
            runner = runner.script(name, &[(i as f64 + 1.0, 0), (i as f64 + 1.0, 0)]);
        }
        let reg = registry(names.iter().map(|n| candidate(n, true)).collect());

        let outcomes = Executor::new(&runner, ExecutionConfig::new(2, 4))
            .execute(&reg, Path::new("in.txt"));

        let order: Vec<_> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(order, names);
        assert_eq!(outcomes[0].average, 1.0);
        assert_eq!(outcomes[4].average, 5.0);
        assert_eq!(outcomes[2].status, CandidateStatus::BuildFailed);
    }
}
