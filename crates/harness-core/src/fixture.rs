//! Fixtures: shared setup/teardown for a group of tests
//!
//! A fresh fixture value is built for every execution. The runner holds it in
//! a [`FixtureGuard`], which calls `tear_down` exactly once: explicitly via
//! [`FixtureGuard::finish`], or from `Drop` if the execution unwinds first.

use crate::error::FixtureError;

/// Setup/teardown capability for a group of tests
///
/// Both hooks default to no-ops, so a plain data struct can be a fixture by
/// implementing the trait with an empty body.
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct TempDirFixture {
///     dir: Option<tempfile::TempDir>,
/// }
///
/// impl Fixture for TempDirFixture {
///     fn set_up(&mut self) -> Result<(), FixtureError> {
///         self.dir = Some(tempfile::tempdir()?);
///         Ok(())
///     }
/// }
/// ```
pub trait Fixture: Send + 'static {
    /// Prepare state before the body runs
    ///
    /// # Errors
    /// A returned error fails the test; the body is skipped and `tear_down`
    /// still runs.
    fn set_up(&mut self) -> Result<(), FixtureError> {
        Ok(())
    }

    /// Release state after the body; runs even when setup or body failed
    ///
    /// # Errors
    /// A returned error fails the test.
    fn tear_down(&mut self) -> Result<(), FixtureError> {
        Ok(())
    }
}

/// Fixture for tests that need no setup or teardown
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFixture;

impl Fixture for NoFixture {}

/// Scoped ownership of one fixture instance
pub struct FixtureGuard<F: Fixture> {
    fixture: F,
    torn_down: bool,
}

impl<F: Fixture> FixtureGuard<F> {
    /// Take ownership of a freshly constructed fixture
    #[inline]
    pub fn acquire(fixture: F) -> Self {
        Self {
            fixture,
            torn_down: false,
        }
    }

    /// Mutable access for setup and the body
    #[inline]
    pub fn fixture_mut(&mut self) -> &mut F {
        &mut self.fixture
    }

    /// Run `tear_down` now and release the fixture
    ///
    /// # Errors
    /// Returns whatever `tear_down` returned.
    pub fn finish(mut self) -> Result<(), FixtureError> {
        self.torn_down = true;
        self.fixture.tear_down()
    }
}

impl<F: Fixture> Drop for FixtureGuard<F> {
    fn drop(&mut self) {
        if !self.torn_down {
            self.torn_down = true;
            if let Err(err) = self.fixture.tear_down() {
                tracing::warn!(error = %err, "teardown failed while unwinding");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Counting {
        teardowns: Arc<AtomicUsize>,
    }

    impl Fixture for Counting {
        fn tear_down(&mut self) -> Result<(), FixtureError> {
            self.teardowns.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn guard() -> (FixtureGuard<Counting>, Arc<AtomicUsize>) {
        let teardowns = Arc::new(AtomicUsize::new(0));
        let guard = FixtureGuard::acquire(Counting {
            teardowns: Arc::clone(&teardowns),
        });
        (guard, teardowns)
    }

    #[test]
    fn finish_tears_down_once() {
        let (guard, teardowns) = guard();
        guard.finish().unwrap();
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn drop_tears_down_when_not_finished() {
        let (guard, teardowns) = guard();
        drop(guard);
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unwinding_tears_down() {
        let (mut guard, teardowns) = guard();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _fixture = guard.fixture_mut();
            panic!("body exploded");
        }));

        assert!(result.is_err());
        assert_eq!(teardowns.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn no_fixture_hooks_succeed() {
        let mut fixture = NoFixture;
        assert!(fixture.set_up().is_ok());
        assert!(fixture.tear_down().is_ok());
    }
}
