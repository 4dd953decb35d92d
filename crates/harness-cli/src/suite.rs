//! Built-in reference suite
//!
//! Three tests under one fixture: one disabled, and two that fail by
//! construction. A default `harness run` therefore exits with status 1.

use harness_core::prelude::*;

/// Fixture with no state and no-op hooks
#[derive(Debug, Default)]
pub struct FakeFixture;

impl Fixture for FakeFixture {}

/// Registers `FakeFixture.{DISABLED_test, test_numerical, test_failure}`
#[derive(Debug)]
pub struct ReferenceSuite;

impl Suite for ReferenceSuite {
    fn register(registry: &mut RegistryBuilder) -> Result<(), RegistryError> {
        registry
            .fixture::<FakeFixture>("FakeFixture")
            .test("DISABLED_test", |_, _| Ok(()))?
            .test("test_numerical", |_, ctx| {
                let x = 0.0_f64;
                // 10 / 0 is infinite, never zero.
                ctx.expect_float_eq(10.0 / x, 0.0);
                Ok(())
            })?
            .test("test_failure", |_, ctx| {
                ctx.expect_true(false, "false");
                Ok(())
            })?;
        Ok(())
    }
}

/// Frozen registry holding [`ReferenceSuite`]
///
/// # Errors
/// Propagates registration errors.
pub fn builtin_registry() -> Result<Registry, RegistryError> {
    let mut builder = Registry::builder();
    builder.add_suite::<ReferenceSuite>()?;
    Ok(builder.build())
}
