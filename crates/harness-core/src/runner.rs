//! Test runner
//!
//! Executes selected cases in registration order and folds every outcome
//! into a [`RunSummary`]. Nothing a test does (failing, erroring, panicking,
//! hanging past the timeout) escapes [`Runner::run`].

use crate::config::{ExecutionMode, RunnerConfig};
use crate::context::TestContext;
use crate::error::TransitionError;
use crate::filter::TestFilter;
use crate::float::FloatPolicy;
use crate::registry::{Registry, TestCase};
use crate::state::TestStatus;
use crate::summary::{RunSummary, TestRecord};
use crate::types::{Failure, FailureKind, SkipReason};
use crossbeam::channel::{self, RecvTimeoutError};
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

/// Executes registered tests
#[derive(Debug, Clone, Default)]
pub struct Runner {
    config: RunnerConfig,
}

impl Runner {
    /// Create a runner
    #[inline]
    #[must_use]
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Run every registered test
    #[must_use]
    pub fn run_all(&self, registry: &Registry) -> RunSummary {
        self.run(registry, &TestFilter::all())
    }

    /// Run the tests selected by `filter`
    #[must_use]
    pub fn run(&self, registry: &Registry, filter: &TestFilter) -> RunSummary {
        let cases = registry.select(filter);
        self.run_cases(&cases)
    }

    /// Run an explicit list of cases, reporting in the given order
    #[must_use]
    pub fn run_cases(&self, cases: &[&TestCase]) -> RunSummary {
        let started = Instant::now();
        tracing::info!(
            tests = cases.len(),
            workers = self.config.mode.workers(),
            timeout = ?self.config.timeout,
            "starting run"
        );

        let stop = AtomicBool::new(false);
        let records = match self.config.mode {
            ExecutionMode::Sequential => self.run_sequential(cases, &stop),
            ExecutionMode::Parallel { workers } => self.run_parallel(cases, workers, &stop),
        };

        let summary = RunSummary::from_records(records, started.elapsed());
        tracing::info!(
            total = summary.total(),
            passed = summary.passed(),
            failed = summary.failed(),
            skipped = summary.skipped(),
            elapsed = ?summary.elapsed(),
            "run finished"
        );
        summary
    }

    fn run_sequential(&self, cases: &[&TestCase], stop: &AtomicBool) -> Vec<TestRecord> {
        cases.iter().map(|case| self.run_one(case, stop)).collect()
    }

    fn run_parallel(&self, cases: &[&TestCase], workers: usize, stop: &AtomicBool) -> Vec<TestRecord> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("harness-worker-{index}"))
            .build();

        match pool {
            // Indexed collect keeps registration order.
            Ok(pool) => pool.install(|| cases.par_iter().map(|case| self.run_one(case, stop)).collect()),
            Err(err) => {
                tracing::warn!(error = %err, "worker pool unavailable, running sequentially");
                self.run_sequential(cases, stop)
            }
        }
    }

    fn run_one(&self, case: &TestCase, stop: &AtomicBool) -> TestRecord {
        let mut record = TestRecord::new(case.id().clone());

        if case.is_skipped() && !self.config.also_run_disabled {
            tracing::debug!(test = %case.id(), "skipped (disabled)");
            checked(record.skip(SkipReason::Disabled));
            return record;
        }
        if self.config.fail_fast && stop.load(Ordering::SeqCst) {
            tracing::debug!(test = %case.id(), "skipped (fail-fast)");
            checked(record.skip(SkipReason::FailFast));
            return record;
        }

        checked(record.transition(TestStatus::Running));
        tracing::debug!(test = %case.id(), "running");
        let started = Instant::now();

        let policy = self.config.float_policy;
        let failures = match self.config.timeout {
            None => execute(case, policy),
            Some(timeout) => execute_with_timeout(case, policy, timeout),
        };
        checked(record.complete(failures, started.elapsed()));

        if record.status() == TestStatus::Failed {
            tracing::debug!(test = %case.id(), failures = record.failures().len(), "failed");
            stop.store(true, Ordering::SeqCst);
        }
        record
    }
}

/// Run the lifecycle on the current thread
fn execute(case: &TestCase, policy: FloatPolicy) -> Vec<Failure> {
    let mut ctx = TestContext::new(case.id().clone()).with_float_policy(policy);
    case.execute(&mut ctx);
    ctx.into_failures()
}

/// Run the lifecycle on a dedicated thread and stop waiting after `timeout`
///
/// A timed-out thread is left detached; its fixture is torn down whenever the
/// body eventually returns.
fn execute_with_timeout(case: &TestCase, policy: FloatPolicy, timeout: Duration) -> Vec<Failure> {
    let (tx, rx) = channel::bounded(1);
    let owned = case.clone();

    let spawned = thread::Builder::new()
        .name(case.id().to_string())
        .spawn(move || {
            let failures = execute(&owned, policy);
            // The receiver is gone if the runner already gave up on us.
            let _ = tx.send(failures);
        });
    if let Err(err) = spawned {
        return vec![Failure::new(
            FailureKind::Error,
            format!("failed to spawn test thread: {err}"),
        )];
    }

    match rx.recv_timeout(timeout) {
        Ok(failures) => failures,
        Err(RecvTimeoutError::Timeout) => {
            tracing::warn!(test = %case.id(), ?timeout, "test timed out");
            vec![Failure::new(
                FailureKind::Timeout,
                format!("exceeded timeout of {:.3}s", timeout.as_secs_f64()),
            )]
        }
        Err(RecvTimeoutError::Disconnected) => vec![Failure::new(
            FailureKind::Panic,
            "test thread exited without reporting",
        )],
    }
}

/// The runner only requests transitions the state machine allows.
fn checked(result: Result<(), TransitionError>) {
    if let Err(err) = result {
        tracing::error!(error = %err, "runner requested an illegal transition");
    }
}
