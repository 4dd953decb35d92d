//! One execution of one test: acquire, set up, run, tear down
//!
//! Panics from any hook or the body are caught here and turned into
//! failures, so a misbehaving test can only ever fail itself.

use crate::context::{Abort, TestContext, TestResult};
use crate::fixture::{Fixture, FixtureGuard};
use crate::types::{Failure, FailureKind};
use std::any::Any;
use std::marker::PhantomData;
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Type-erased executable test body
pub(crate) trait Runnable: Send + Sync {
    /// Run the full lifecycle, recording every failure into `ctx`
    fn execute(&self, ctx: &mut TestContext);
}

/// Lifecycle for a body bound to fixture type `F`
pub(crate) struct FixtureRunnable<F, M, B> {
    factory: M,
    body: B,
    _fixture: PhantomData<fn() -> F>,
}

impl<F, M, B> FixtureRunnable<F, M, B> {
    pub(crate) fn new(factory: M, body: B) -> Self {
        Self {
            factory,
            body,
            _fixture: PhantomData,
        }
    }
}

impl<F, M, B> Runnable for FixtureRunnable<F, M, B>
where
    F: Fixture,
    M: Fn() -> F + Send + Sync,
    B: Fn(&mut F, &mut TestContext) -> TestResult + Send + Sync,
{
    fn execute(&self, ctx: &mut TestContext) {
        let fixture = match catch_unwind(AssertUnwindSafe(|| (self.factory)())) {
            Ok(fixture) => fixture,
            Err(payload) => {
                ctx.record(Failure::new(
                    FailureKind::Setup,
                    format!("fixture construction panicked: {}", panic_message(&*payload)),
                ));
                return;
            }
        };
        let mut guard = FixtureGuard::acquire(fixture);

        match catch_unwind(AssertUnwindSafe(|| guard.fixture_mut().set_up())) {
            Ok(Ok(())) => {
                let outcome = catch_unwind(AssertUnwindSafe(|| (self.body)(guard.fixture_mut(), ctx)));
                record_body_outcome(ctx, outcome);
            }
            Ok(Err(err)) => ctx.record(Failure::new(FailureKind::Setup, err.to_string())),
            Err(payload) => ctx.record(Failure::new(
                FailureKind::Setup,
                format!("set_up panicked: {}", panic_message(&*payload)),
            )),
        }

        match catch_unwind(AssertUnwindSafe(move || guard.finish())) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => ctx.record(Failure::new(FailureKind::Teardown, err.to_string())),
            Err(payload) => ctx.record(Failure::new(
                FailureKind::Teardown,
                format!("tear_down panicked: {}", panic_message(&*payload)),
            )),
        }
    }
}

fn record_body_outcome(ctx: &mut TestContext, outcome: std::thread::Result<TestResult>) {
    match outcome {
        Ok(Ok(())) => {}
        // Fatal assertions record their own failure before aborting; a bare
        // abort still has to fail the test.
        Ok(Err(Abort::Assertion)) => {
            if !ctx.has_failures() {
                ctx.record(Failure::new(
                    FailureKind::Assertion,
                    "fatal assertion aborted the body",
                ));
            }
        }
        Ok(Err(Abort::Error(message))) => ctx.record(Failure::new(FailureKind::Error, message)),
        Err(payload) => {
            let message = panic_message(&*payload);
            tracing::warn!(test = %ctx.id(), "test body panicked: {message}");
            ctx.record(Failure::new(FailureKind::Panic, message));
        }
    }
}

/// Best-effort text of a panic payload
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
