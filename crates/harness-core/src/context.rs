//! Assertion context passed to test bodies
//!
//! Two tiers of assertions:
//! - `expect_*` record a failure and return control, so the body keeps going
//! - `assert_*` record a failure and return `Err(Abort)`, so `?` ends the body
//!
//! Every assertion is `#[track_caller]`; failures carry the call site.

use crate::float::FloatPolicy;
use crate::types::{Failure, FailureKind, SourceLocation, TestId};
use std::fmt::{self, Debug, Display, Formatter};

/// Result type returned by test bodies
pub type TestResult = Result<(), Abort>;

/// Early exit from a test body
///
/// Produced by fatal assertions, [`TestContext::fail`] or `?` on any error.
pub enum Abort {
    /// A fatal assertion failed; the failure is already recorded
    Assertion,
    /// The body returned an error
    Error(String),
}

impl<E: std::error::Error> From<E> for Abort {
    fn from(err: E) -> Self {
        Self::Error(err.to_string())
    }
}

impl Debug for Abort {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assertion => f.write_str("Abort::Assertion"),
            Self::Error(message) => f.debug_tuple("Abort::Error").field(message).finish(),
        }
    }
}

impl Display for Abort {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assertion => f.write_str("fatal assertion failed"),
            Self::Error(message) => f.write_str(message),
        }
    }
}

/// Per-execution assertion recorder
#[derive(Debug)]
pub struct TestContext {
    id: TestId,
    float_policy: FloatPolicy,
    failures: Vec<Failure>,
}

impl TestContext {
    /// Create a context for one execution of `id`
    #[must_use]
    pub fn new(id: TestId) -> Self {
        Self {
            id,
            float_policy: FloatPolicy::default(),
            failures: Vec::new(),
        }
    }

    /// Use `policy` for [`expect_float_eq`](Self::expect_float_eq) and
    /// [`assert_float_eq`](Self::assert_float_eq)
    #[must_use]
    pub fn with_float_policy(mut self, policy: FloatPolicy) -> Self {
        self.float_policy = policy;
        self
    }

    /// Test being executed
    #[inline]
    #[must_use]
    pub fn id(&self) -> &TestId {
        &self.id
    }

    /// Current float policy
    #[inline]
    #[must_use]
    pub fn float_policy(&self) -> FloatPolicy {
        self.float_policy
    }

    /// Change the float policy for the remainder of the body
    pub fn set_float_policy(&mut self, policy: FloatPolicy) {
        self.float_policy = policy;
    }

    /// Failures recorded so far
    #[inline]
    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    /// Whether anything has failed so far
    #[inline]
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Record a failure of any kind
    pub fn record(&mut self, failure: Failure) {
        tracing::debug!(test = %self.id, kind = ?failure.kind, "{}", failure.message);
        self.failures.push(failure);
    }

    pub(crate) fn into_failures(self) -> Vec<Failure> {
        self.failures
    }

    #[track_caller]
    fn check(&mut self, ok: bool, message: impl FnOnce() -> String) -> bool {
        if !ok {
            let location = SourceLocation::caller();
            self.record(Failure::new(FailureKind::Assertion, message()).at(location));
        }
        ok
    }

    /// Record a non-fatal failure unconditionally
    #[track_caller]
    pub fn add_failure(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.check(false, || message);
    }

    /// Record a failure and abort the body
    #[track_caller]
    pub fn fail(&mut self, message: impl Into<String>) -> Abort {
        self.add_failure(message);
        Abort::Assertion
    }

    /// Non-fatal: `condition` must hold
    #[track_caller]
    pub fn expect_true(&mut self, condition: bool, what: &str) -> bool {
        self.check(condition, || format!("expected `{what}` to be true"))
    }

    /// Non-fatal: `condition` must not hold
    #[track_caller]
    pub fn expect_false(&mut self, condition: bool, what: &str) -> bool {
        self.check(!condition, || format!("expected `{what}` to be false"))
    }

    /// Non-fatal: `actual == expected`
    #[track_caller]
    pub fn expect_eq<T>(&mut self, actual: T, expected: T) -> bool
    where
        T: PartialEq + Debug,
    {
        self.check(actual == expected, || {
            format!("expected {expected:?}, got {actual:?}")
        })
    }

    /// Non-fatal: `actual != unexpected`
    #[track_caller]
    pub fn expect_ne<T>(&mut self, actual: T, unexpected: T) -> bool
    where
        T: PartialEq + Debug,
    {
        self.check(actual != unexpected, || {
            format!("expected a value other than {unexpected:?}")
        })
    }

    /// Non-fatal: floats equal under the context's policy
    #[track_caller]
    pub fn expect_float_eq(&mut self, actual: f64, expected: f64) -> bool {
        let policy = self.float_policy;
        self.expect_float_eq_with(actual, expected, policy)
    }

    /// Non-fatal: floats equal under `policy`
    #[track_caller]
    pub fn expect_float_eq_with(&mut self, actual: f64, expected: f64, policy: FloatPolicy) -> bool {
        self.check(policy.equal(actual, expected), || {
            format!("expected {expected:?} ({policy}), got {actual:?}")
        })
    }

    /// Non-fatal: `result` is `Ok`
    #[track_caller]
    pub fn expect_ok<T, E: Display>(&mut self, result: &Result<T, E>) -> bool {
        match result {
            Ok(_) => true,
            Err(err) => self.check(false, || format!("expected Ok, got error: {err}")),
        }
    }

    /// Fatal: `condition` must hold
    ///
    /// # Errors
    /// Returns [`Abort::Assertion`] when the condition is false.
    #[track_caller]
    pub fn assert_true(&mut self, condition: bool, what: &str) -> TestResult {
        fatal(self.expect_true(condition, what))
    }

    /// Fatal: `condition` must not hold
    ///
    /// # Errors
    /// Returns [`Abort::Assertion`] when the condition is true.
    #[track_caller]
    pub fn assert_false(&mut self, condition: bool, what: &str) -> TestResult {
        fatal(self.expect_false(condition, what))
    }

    /// Fatal: `actual == expected`
    ///
    /// # Errors
    /// Returns [`Abort::Assertion`] when the values differ.
    #[track_caller]
    pub fn assert_eq<T>(&mut self, actual: T, expected: T) -> TestResult
    where
        T: PartialEq + Debug,
    {
        fatal(self.expect_eq(actual, expected))
    }

    /// Fatal: floats equal under the context's policy
    ///
    /// # Errors
    /// Returns [`Abort::Assertion`] when the values are not equal.
    #[track_caller]
    pub fn assert_float_eq(&mut self, actual: f64, expected: f64) -> TestResult {
        fatal(self.expect_float_eq(actual, expected))
    }
}

fn fatal(passed: bool) -> TestResult {
    if passed {
        Ok(())
    } else {
        Err(Abort::Assertion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FixtureError;

    fn context() -> TestContext {
        TestContext::new(TestId::new("F", "t").unwrap())
    }

    #[test]
    fn expectations_record_and_continue() {
        let mut ctx = context();

        assert!(!ctx.expect_true(false, "false"));
        assert!(!ctx.expect_eq(1, 2));
        assert!(ctx.expect_eq("a", "a"));

        assert_eq!(ctx.failures().len(), 2);
        assert_eq!(ctx.failures()[1].message, "expected 2, got 1");
    }

    #[test]
    fn failures_carry_call_site() {
        let mut ctx = context();
        ctx.expect_true(false, "false");

        let location = ctx.failures()[0].location.unwrap();
        assert!(location.file.ends_with("context.rs"));
    }

    #[test]
    fn fatal_assertion_aborts() {
        let mut ctx = context();

        let body = |ctx: &mut TestContext| -> TestResult {
            ctx.assert_true(false, "first")?;
            ctx.add_failure("unreachable");
            Ok(())
        };

        assert!(matches!(body(&mut ctx), Err(Abort::Assertion)));
        assert_eq!(ctx.failures().len(), 1);
    }

    #[test]
    fn float_policy_applies() {
        let mut ctx = context();
        let zero = 0.0_f64;

        assert!(!ctx.expect_float_eq(10.0 / zero, 0.0));
        ctx.set_float_policy(FloatPolicy::ALMOST_EQ);
        assert!(ctx.expect_float_eq(0.1 + 0.2, 0.3));

        assert_eq!(ctx.failures().len(), 1);
        assert!(ctx.failures()[0].message.contains("inf"));
    }

    #[test]
    fn question_mark_converts_errors() {
        let body = || -> TestResult {
            let setup: Result<(), FixtureError> = Err(FixtureError::new("boom"));
            setup?;
            Ok(())
        };

        match body() {
            Err(Abort::Error(message)) => assert_eq!(message, "boom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn expect_ok_reports_error() {
        let mut ctx = context();
        let result: Result<(), FixtureError> = Err(FixtureError::new("nope"));

        assert!(!ctx.expect_ok(&result));
        assert_eq!(ctx.failures()[0].message, "expected Ok, got error: nope");
    }
}
