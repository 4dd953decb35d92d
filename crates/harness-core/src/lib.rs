//! Harness Core - fixture-based test registry and runner
//!
//! Two phases, like any registry that must not change under a running
//! consumer:
//! 1. **Registration**: tests are declared on a [`RegistryBuilder`], grouped
//!    under fixtures, then frozen into a [`Registry`]
//! 2. **Execution**: a [`Runner`] executes the selected tests, each with a
//!    fresh fixture, and returns a [`RunSummary`]
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use harness_core::prelude::*;
//!
//! #[derive(Default)]
//! struct FakeFixture;
//! impl Fixture for FakeFixture {}
//!
//! let mut builder = Registry::builder();
//! builder
//!     .fixture::<FakeFixture>("FakeFixture")
//!     .test("test_numerical", |_, ctx| {
//!         let x = 0.0;
//!         ctx.expect_float_eq(10.0 / x, 0.0);
//!         Ok(())
//!     })?;
//!
//! let summary = Runner::default().run_all(&builder.build());
//! println!("{summary}");
//! ```

#![warn(unreachable_pub)]

pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod fixture;
pub mod float;
mod lifecycle;
pub mod registry;
pub mod runner;
pub mod state;
pub mod summary;
pub mod types;

pub use config::{ExecutionMode, RunnerConfig};
pub use context::{Abort, TestContext, TestResult};
pub use error::{ConfigError, FilterError, FixtureError, PolicyError, RegistryError, TransitionError};
pub use filter::TestFilter;
pub use fixture::{Fixture, FixtureGuard, NoFixture};
pub use float::FloatPolicy;
pub use registry::{FixtureGroup, Registry, RegistryBuilder, Suite, TestCase};
pub use runner::Runner;
pub use state::{allowed_transitions, validate_transition, TestStatus};
pub use summary::{RunSummary, TestRecord};
pub use types::{Failure, FailureKind, SkipReason, SourceLocation, TestId};

/// Common imports for writing and running tests
pub mod prelude {
    pub use crate::{
        Abort, Fixture, FixtureError, FloatPolicy, NoFixture, Registry, RegistryBuilder,
        RegistryError, RunSummary, Runner, RunnerConfig, Suite, TestContext, TestFilter,
        TestResult, TestStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
