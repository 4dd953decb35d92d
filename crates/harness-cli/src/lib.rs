//! Harness CLI - command-line front end for test registries
//!
//! `harness run` selects tests with a gtest-style filter, runs them and
//! writes reports. The exit code is 0 when every executed test passed, 1 when
//! any failed and 2 for usage or configuration errors.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! let registry = harness_cli::suite::builtin_registry()?;
//! let code = harness_cli::run(["harness", "run", "--workers", "4"], &registry, &mut std::io::stdout());
//! std::process::exit(code);
//! ```

#![warn(unreachable_pub)]

pub mod app;
pub mod logging;
pub mod suite;

pub use app::{command, execute, run, EXIT_USAGE};
pub use logging::LogFormat;
