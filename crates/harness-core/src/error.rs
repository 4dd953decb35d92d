//! Error types for the harness
//!
//! Registration errors are returned to the caller. Everything that goes wrong
//! while a test executes is captured as a [`Failure`](crate::Failure) instead
//! and never escapes the runner.

use crate::state::TestStatus;
use crate::types::TestId;
use std::path::PathBuf;

/// Errors raised while populating or installing a registry
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    /// A test with the same fixture and test name is already registered
    #[error("duplicate test: {0}")]
    DuplicateTest(TestId),

    /// Fixture or test name is empty or contains a reserved character
    #[error("invalid {kind} name {name:?}: {reason}")]
    InvalidIdentifier {
        /// Which identifier was rejected (`fixture` or `test`)
        kind: &'static str,
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: &'static str,
    },

    /// The process-wide registry was already installed
    #[error("process-wide registry already installed")]
    AlreadyInstalled,
}

impl RegistryError {
    /// Check if this error reports a duplicate registration
    #[inline]
    #[must_use]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::DuplicateTest(_))
    }
}

/// Error returned by fixture `set_up` / `tear_down` hooks
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct FixtureError {
    message: String,
}

impl FixtureError {
    /// Create a fixture error with a message
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The error message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<std::io::Error> for FixtureError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Invalid floating-point comparison policy
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
pub enum PolicyError {
    /// Tolerance was negative, NaN or infinite
    #[error("tolerance must be finite and non-negative, got {0}")]
    InvalidTolerance(f64),
}

/// Illegal test status transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("illegal transition {from:?} -> {to:?}")]
pub struct TransitionError {
    /// Current status
    pub from: TestStatus,
    /// Requested status
    pub to: TestStatus,
}

/// Errors loading or validating a [`RunnerConfig`](crate::RunnerConfig)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Config text is not valid TOML for this schema
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but holds an unusable value
    #[error("invalid config value: {0}")]
    Invalid(String),
}

/// Invalid `--filter` pattern
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid filter pattern {pattern:?}: {reason}")]
pub struct FilterError {
    /// The offending pattern
    pub pattern: String,
    /// Why it was rejected
    pub reason: String,
}
