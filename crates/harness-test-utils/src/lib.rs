//! Testing utilities for the harness workspace
//!
//! Instrumented fixtures that count (and log) every lifecycle hook, so tests
//! can check what the runner actually invoked.

#![allow(missing_docs)]

use harness_core::{
    Fixture, FixtureError, RegistryBuilder, RegistryError, RunSummary, TestContext, TestResult,
    TestStatus,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared hook counters; clones observe the same counts
#[derive(Debug, Default, Clone)]
pub struct LifecycleCounters {
    setups: Arc<AtomicUsize>,
    bodies: Arc<AtomicUsize>,
    teardowns: Arc<AtomicUsize>,
    fixtures: Arc<AtomicUsize>,
}

impl LifecycleCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn setups(&self) -> usize {
        self.setups.load(Ordering::SeqCst)
    }

    pub fn bodies(&self) -> usize {
        self.bodies.load(Ordering::SeqCst)
    }

    pub fn teardowns(&self) -> usize {
        self.teardowns.load(Ordering::SeqCst)
    }

    /// Number of fixture instances constructed
    pub fn fixtures(&self) -> usize {
        self.fixtures.load(Ordering::SeqCst)
    }

    /// `(setups, bodies, teardowns)`
    pub fn snapshot(&self) -> (usize, usize, usize) {
        (self.setups(), self.bodies(), self.teardowns())
    }
}

/// What an instrumented hook does after counting itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HookBehavior {
    #[default]
    Succeed,
    Fail,
    Panic,
}

impl HookBehavior {
    fn apply(self, hook: &str) -> Result<(), FixtureError> {
        match self {
            Self::Succeed => Ok(()),
            Self::Fail => Err(FixtureError::new(format!("{hook} failed on purpose"))),
            Self::Panic => panic!("{hook} panicked on purpose"),
        }
    }
}

/// Ordered log of lifecycle events, safe to share across workers
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    inner: Arc<Mutex<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: impl Into<String>) {
        self.inner.lock().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.inner.lock().clone()
    }

    /// Events for one test, in the order they happened
    pub fn events_for(&self, test: &str) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|e| e.ends_with(&format!(":{test}")))
            .collect()
    }
}

/// Fixture that counts its construction and hooks
#[derive(Debug, Clone)]
pub struct CountingFixture {
    counters: LifecycleCounters,
    log: EventLog,
    label: String,
    setup: HookBehavior,
    teardown: HookBehavior,
    /// Free-form state a body may use
    pub value: i64,
}

impl Fixture for CountingFixture {
    fn set_up(&mut self) -> Result<(), FixtureError> {
        self.counters.setups.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("setup:{}", self.label));
        self.value = 42;
        self.setup.apply("set_up")
    }

    fn tear_down(&mut self) -> Result<(), FixtureError> {
        self.counters.teardowns.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("teardown:{}", self.label));
        self.teardown.apply("tear_down")
    }
}

/// Builder for instrumented registrations
#[derive(Debug, Clone, Default)]
pub struct Instrumented {
    counters: LifecycleCounters,
    log: EventLog,
    setup: HookBehavior,
    teardown: HookBehavior,
}

impl Instrumented {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_setup(mut self, behavior: HookBehavior) -> Self {
        self.setup = behavior;
        self
    }

    #[must_use]
    pub fn with_teardown(mut self, behavior: HookBehavior) -> Self {
        self.teardown = behavior;
        self
    }

    pub fn counters(&self) -> &LifecycleCounters {
        &self.counters
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Register `fixture.test`; the body is counted and logged before `body` runs
    pub fn register<B>(
        &self,
        builder: &mut RegistryBuilder,
        fixture: &str,
        test: &str,
        skipped: bool,
        body: B,
    ) -> Result<(), RegistryError>
    where
        B: Fn(&mut CountingFixture, &mut TestContext) -> TestResult + Send + Sync + 'static,
    {
        let template = CountingFixture {
            counters: self.counters.clone(),
            log: self.log.clone(),
            label: test.to_string(),
            setup: self.setup,
            teardown: self.teardown,
            value: 0,
        };
        let factory = move || {
            template.counters.fixtures.fetch_add(1, Ordering::SeqCst);
            template.clone()
        };
        let counted = move |fixture: &mut CountingFixture, ctx: &mut TestContext| {
            fixture.counters.bodies.fetch_add(1, Ordering::SeqCst);
            fixture.log.push(format!("body:{}", fixture.label));
            body(fixture, ctx)
        };

        builder.register(fixture, test, factory, counted, skipped)?;
        Ok(())
    }
}

/// `(full name, status)` pairs in report order
pub fn statuses(summary: &RunSummary) -> Vec<(String, TestStatus)> {
    summary
        .records()
        .iter()
        .map(|r| (r.id().to_string(), r.status()))
        .collect()
}

/// Body that passes without asserting anything
pub fn pass(_: &mut CountingFixture, _: &mut TestContext) -> TestResult {
    Ok(())
}
