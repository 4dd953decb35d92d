//! Test registry
//!
//! Registration happens on a mutable [`RegistryBuilder`]; [`RegistryBuilder::build`]
//! freezes it into a [`Registry`] that is read-only for the rest of the
//! process. Registration order is preserved and becomes the run order.
//!
//! # Example
//!
//! ```rust,ignore
//! let mut builder = Registry::builder();
//! builder
//!     .fixture::<FakeFixture>("FakeFixture")
//!     .disabled("test", |_, _| Ok(()))?
//!     .test("test_failure", |_, ctx| {
//!         ctx.expect_true(false, "false");
//!         Ok(())
//!     })?;
//! let registry = builder.build();
//! ```

use crate::context::{TestContext, TestResult};
use crate::error::RegistryError;
use crate::filter::TestFilter;
use crate::fixture::{Fixture, NoFixture};
use crate::lifecycle::{FixtureRunnable, Runnable};
use crate::types::TestId;
use indexmap::IndexMap;
use once_cell::sync::OnceCell;
use std::fmt::{self, Debug, Formatter};
use std::sync::Arc;

static GLOBAL: OnceCell<Registry> = OnceCell::new();

/// A registered test case
#[derive(Clone)]
pub struct TestCase {
    id: TestId,
    skipped: bool,
    runnable: Arc<dyn Runnable>,
}

impl TestCase {
    /// Identity of the case
    #[inline]
    #[must_use]
    pub fn id(&self) -> &TestId {
        &self.id
    }

    /// Whether the case is disabled
    #[inline]
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    pub(crate) fn execute(&self, ctx: &mut TestContext) {
        self.runnable.execute(ctx);
    }
}

impl Debug for TestCase {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("TestCase")
            .field("id", &self.id)
            .field("skipped", &self.skipped)
            .finish_non_exhaustive()
    }
}

/// A module's contribution of tests
///
/// Lets each module own its registrations; the binary only lists suites.
pub trait Suite {
    /// Register this suite's tests
    ///
    /// # Errors
    /// Propagates the first registration error.
    fn register(registry: &mut RegistryBuilder) -> Result<(), RegistryError>;
}

/// Mutable registry used during the registration phase
#[derive(Default)]
pub struct RegistryBuilder {
    cases: IndexMap<TestId, TestCase>,
}

impl RegistryBuilder {
    /// Create an empty builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a test bound to fixture type `F`
    ///
    /// `factory` builds a fresh fixture for every execution. A test name
    /// starting with `DISABLED_` is skipped regardless of `skipped`.
    ///
    /// # Errors
    /// - [`RegistryError::InvalidIdentifier`] for empty or malformed names
    /// - [`RegistryError::DuplicateTest`] if the pair is already registered;
    ///   the existing registration is left untouched
    pub fn register<F, M, B>(
        &mut self,
        fixture: &str,
        test: &str,
        factory: M,
        body: B,
        skipped: bool,
    ) -> Result<&TestCase, RegistryError>
    where
        F: Fixture,
        M: Fn() -> F + Send + Sync + 'static,
        B: Fn(&mut F, &mut TestContext) -> TestResult + Send + Sync + 'static,
    {
        let id = TestId::new(fixture, test)?;
        if self.cases.contains_key(&id) {
            return Err(RegistryError::DuplicateTest(id));
        }

        let case = TestCase {
            skipped: skipped || id.has_disabled_prefix(),
            id: id.clone(),
            runnable: Arc::new(FixtureRunnable::new(factory, body)),
        };
        tracing::trace!(test = %id, skipped = case.skipped, "registered");

        let entry = self.cases.entry(id).or_insert(case);
        Ok(entry)
    }

    /// Register a fixture-less test
    ///
    /// # Errors
    /// Same as [`RegistryBuilder::register`].
    pub fn register_fn<B>(&mut self, fixture: &str, test: &str, body: B) -> Result<&TestCase, RegistryError>
    where
        B: Fn(&mut TestContext) -> TestResult + Send + Sync + 'static,
    {
        self.register(fixture, test, || NoFixture, move |_, ctx| body(ctx), false)
    }

    /// Group registrations under a fixture built with `F::default()`
    pub fn fixture<F>(&mut self, name: &str) -> FixtureGroup<'_, F>
    where
        F: Fixture + Default,
    {
        self.fixture_with(name, F::default)
    }

    /// Group registrations under a fixture built by `factory`
    pub fn fixture_with<F, M>(&mut self, name: &str, factory: M) -> FixtureGroup<'_, F>
    where
        F: Fixture,
        M: Fn() -> F + Send + Sync + 'static,
    {
        FixtureGroup {
            builder: self,
            name: name.to_string(),
            factory: Arc::new(factory),
        }
    }

    /// Let a [`Suite`] register its tests
    ///
    /// # Errors
    /// Propagates the suite's first registration error.
    pub fn add_suite<S: Suite>(&mut self) -> Result<&mut Self, RegistryError> {
        S::register(self)?;
        Ok(self)
    }

    /// Number of registered cases
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether nothing is registered yet
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Whether `id` is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, id: &TestId) -> bool {
        self.cases.contains_key(id)
    }

    /// Freeze the registry
    #[must_use]
    pub fn build(self) -> Registry {
        tracing::debug!(tests = self.cases.len(), "registry frozen");
        Registry {
            cases: self.cases.into_values().collect::<Vec<_>>().into(),
        }
    }
}

impl Debug for RegistryBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryBuilder")
            .field("cases", &self.cases.len())
            .finish()
    }
}

/// Registrations sharing one fixture type and factory
pub struct FixtureGroup<'a, F> {
    builder: &'a mut RegistryBuilder,
    name: String,
    factory: Arc<dyn Fn() -> F + Send + Sync>,
}

impl<F: Fixture> FixtureGroup<'_, F> {
    /// Register an enabled test
    ///
    /// # Errors
    /// Same as [`RegistryBuilder::register`].
    pub fn test<B>(&mut self, name: &str, body: B) -> Result<&mut Self, RegistryError>
    where
        B: Fn(&mut F, &mut TestContext) -> TestResult + Send + Sync + 'static,
    {
        self.add(name, body, false)
    }

    /// Register a disabled test
    ///
    /// # Errors
    /// Same as [`RegistryBuilder::register`].
    pub fn disabled<B>(&mut self, name: &str, body: B) -> Result<&mut Self, RegistryError>
    where
        B: Fn(&mut F, &mut TestContext) -> TestResult + Send + Sync + 'static,
    {
        self.add(name, body, true)
    }

    fn add<B>(&mut self, name: &str, body: B, skipped: bool) -> Result<&mut Self, RegistryError>
    where
        B: Fn(&mut F, &mut TestContext) -> TestResult + Send + Sync + 'static,
    {
        let factory = Arc::clone(&self.factory);
        self.builder
            .register(&self.name, name, move || factory(), body, skipped)?;
        Ok(self)
    }
}

/// Frozen, cheaply clonable registry
#[derive(Clone)]
pub struct Registry {
    cases: Arc<[TestCase]>,
}

impl Registry {
    /// Start a registration phase
    #[inline]
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// Number of registered cases
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    /// Cases in registration order
    pub fn iter(&self) -> impl Iterator<Item = &TestCase> {
        self.cases.iter()
    }

    /// Look up a case
    #[must_use]
    pub fn get(&self, id: &TestId) -> Option<&TestCase> {
        self.cases.iter().find(|case| case.id() == id)
    }

    /// Cases accepted by `filter`, in registration order
    #[must_use]
    pub fn select(&self, filter: &TestFilter) -> Vec<&TestCase> {
        self.cases
            .iter()
            .filter(|case| filter.matches(case.id()))
            .collect()
    }

    /// Install as the process-wide registry
    ///
    /// # Errors
    /// Returns [`RegistryError::AlreadyInstalled`] if a registry was already
    /// installed; the installed one is kept.
    pub fn install(self) -> Result<&'static Registry, RegistryError> {
        let mut installed = false;
        let registry = GLOBAL.get_or_init(|| {
            installed = true;
            self
        });
        if installed {
            Ok(registry)
        } else {
            Err(RegistryError::AlreadyInstalled)
        }
    }

    /// The process-wide registry, if installed
    #[must_use]
    pub fn global() -> Option<&'static Registry> {
        GLOBAL.get()
    }
}

impl Debug for Registry {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.cases.iter().map(TestCase::id)).finish()
    }
}
