//! Run results

use crate::error::TransitionError;
use crate::state::{validate_transition, TestStatus};
use crate::types::{Failure, FailureKind, SkipReason, TestId};
use serde::Serialize;
use std::fmt::{self, Display, Formatter};
use std::time::Duration;

/// Outcome of one test case
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestRecord {
    id: TestId,
    status: TestStatus,
    skip_reason: Option<SkipReason>,
    failures: Vec<Failure>,
    #[serde(serialize_with = "serialize_secs")]
    elapsed: Duration,
}

impl TestRecord {
    /// Fresh record in the `NotRun` state
    #[must_use]
    pub fn new(id: TestId) -> Self {
        Self {
            id,
            status: TestStatus::NotRun,
            skip_reason: None,
            failures: Vec::new(),
            elapsed: Duration::ZERO,
        }
    }

    /// Move to `to`, enforcing the lifecycle state machine
    ///
    /// # Errors
    /// Returns [`TransitionError`] for transitions the state machine forbids;
    /// the record is left unchanged.
    pub fn transition(&mut self, to: TestStatus) -> Result<(), TransitionError> {
        validate_transition(self.status, to)?;
        self.status = to;
        Ok(())
    }

    /// `NotRun -> Skipped`
    ///
    /// # Errors
    /// See [`TestRecord::transition`].
    pub fn skip(&mut self, reason: SkipReason) -> Result<(), TransitionError> {
        self.transition(TestStatus::Skipped)?;
        self.skip_reason = Some(reason);
        Ok(())
    }

    /// `Running -> Passed | Failed`, depending on `failures`
    ///
    /// # Errors
    /// See [`TestRecord::transition`].
    pub fn complete(&mut self, failures: Vec<Failure>, elapsed: Duration) -> Result<(), TransitionError> {
        let to = if failures.is_empty() {
            TestStatus::Passed
        } else {
            TestStatus::Failed
        };
        self.transition(to)?;
        self.failures = failures;
        self.elapsed = elapsed;
        Ok(())
    }

    /// Test identity
    #[inline]
    #[must_use]
    pub fn id(&self) -> &TestId {
        &self.id
    }

    /// Current status
    #[inline]
    #[must_use]
    pub fn status(&self) -> TestStatus {
        self.status
    }

    /// Why the test was skipped
    #[inline]
    #[must_use]
    pub fn skip_reason(&self) -> Option<SkipReason> {
        self.skip_reason
    }

    /// Recorded failures, in the order they happened
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Failure messages, in the order they happened
    pub fn failure_messages(&self) -> impl Iterator<Item = &str> {
        self.failures.iter().map(|f| f.message.as_str())
    }

    /// Whether a failure of `kind` was recorded
    #[must_use]
    pub fn has_failure_kind(&self, kind: FailureKind) -> bool {
        self.failures.iter().any(|f| f.kind == kind)
    }

    /// Wall time spent executing (zero for skipped tests)
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Aggregate result of one run
///
/// Records appear in registration order regardless of execution mode.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    total: usize,
    passed: usize,
    failed: usize,
    skipped: usize,
    #[serde(serialize_with = "serialize_secs")]
    elapsed: Duration,
    records: Vec<TestRecord>,
}

impl RunSummary {
    /// Tally finished records
    #[must_use]
    pub fn from_records(records: Vec<TestRecord>, elapsed: Duration) -> Self {
        let count = |status: TestStatus| records.iter().filter(|r| r.status == status).count();
        Self {
            total: records.len(),
            passed: count(TestStatus::Passed),
            failed: count(TestStatus::Failed),
            skipped: count(TestStatus::Skipped),
            elapsed,
            records,
        }
    }

    /// Number of selected tests
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of passed tests
    #[inline]
    #[must_use]
    pub fn passed(&self) -> usize {
        self.passed
    }

    /// Number of failed tests
    #[inline]
    #[must_use]
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Number of skipped tests
    #[inline]
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Tests that actually executed
    #[inline]
    #[must_use]
    pub fn executed(&self) -> usize {
        self.total - self.skipped
    }

    /// Wall time of the whole run
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Per-test records in registration order
    #[inline]
    #[must_use]
    pub fn records(&self) -> &[TestRecord] {
        &self.records
    }

    /// Record for `id`
    #[must_use]
    pub fn record(&self, id: &TestId) -> Option<&TestRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    /// Every failure with its test, in registration order
    pub fn failures(&self) -> impl Iterator<Item = (&TestId, &Failure)> {
        self.records
            .iter()
            .flat_map(|r| r.failures.iter().map(move |f| (r.id(), f)))
    }

    /// Whether every executed test passed
    #[inline]
    #[must_use]
    pub fn success(&self) -> bool {
        self.failed == 0
    }

    /// `passed / executed`, or `None` when nothing executed
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> Option<f64> {
        let executed = self.executed();
        (executed > 0).then(|| self.passed as f64 / executed as f64)
    }

    /// Process exit code for this run
    #[inline]
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.success())
    }
}

/// `Total: T, Passed: P, Failed: F, Skipped: S` followed by one
/// `fixture.test: message` line per failure
///
/// Failures with a known call site are suffixed ` (file:line)`; use
/// [`RunSummary::failures`] for the bare message and location separately.
impl Display for RunSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total: {}, Passed: {}, Failed: {}, Skipped: {}",
            self.total, self.passed, self.failed, self.skipped
        )?;
        for (id, failure) in self.failures() {
            write!(f, "\n{id}: {failure}")?;
        }
        Ok(())
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_secs<S: serde::Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(value.as_secs_f64())
}
