//! Core value types shared by the registry, runner and reports

use crate::error::RegistryError;
use serde::Serialize;
use std::fmt::{self, Display, Formatter};

/// Characters the filter syntax reserves
pub const FILTER_RESERVED: [char; 4] = ['-', ':', '*', '?'];

/// Name prefix that marks a test as disabled
pub const DISABLED_PREFIX: &str = "DISABLED_";

/// Identity of a test case: `(fixture name, test name)`
///
/// Rendered as `fixture.test` in reports and matched in that form by filters,
/// so neither half may contain `.`, whitespace or a filter metacharacter
/// (`-`, `:`, `*`, `?`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TestId {
    fixture: String,
    test: String,
}

impl TestId {
    /// Create a validated test id
    ///
    /// # Errors
    /// Returns [`RegistryError::InvalidIdentifier`] when either name is empty
    /// or contains `.`, whitespace or a filter metacharacter.
    pub fn new(fixture: impl Into<String>, test: impl Into<String>) -> Result<Self, RegistryError> {
        let fixture = fixture.into();
        let test = test.into();
        validate_identifier("fixture", &fixture)?;
        validate_identifier("test", &test)?;
        Ok(Self { fixture, test })
    }

    /// Fixture name
    #[inline]
    #[must_use]
    pub fn fixture(&self) -> &str {
        &self.fixture
    }

    /// Test name
    #[inline]
    #[must_use]
    pub fn test(&self) -> &str {
        &self.test
    }

    /// Whether the test name carries the `DISABLED_` prefix
    #[inline]
    #[must_use]
    pub fn has_disabled_prefix(&self) -> bool {
        self.test.starts_with(DISABLED_PREFIX)
    }

    /// Full name, `fixture.test`
    #[must_use]
    pub fn full_name(&self) -> String {
        self.to_string()
    }
}

impl Display for TestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.fixture, self.test)
    }
}

fn validate_identifier(kind: &'static str, name: &str) -> Result<(), RegistryError> {
    let reason = if name.is_empty() {
        "must not be empty"
    } else if name.contains('.') {
        "must not contain '.'"
    } else if name.chars().any(char::is_whitespace) {
        "must not contain whitespace"
    } else if name.contains(&FILTER_RESERVED[..]) {
        "must not contain '-', ':', '*' or '?'"
    } else {
        return Ok(());
    };

    Err(RegistryError::InvalidIdentifier {
        kind,
        name: name.to_string(),
        reason,
    })
}

/// Source location of an assertion call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SourceLocation {
    /// Source file as reported by the compiler
    pub file: &'static str,
    /// 1-based line number
    pub line: u32,
}

impl SourceLocation {
    /// Location of the caller of a `#[track_caller]` function
    #[inline]
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let location = std::panic::Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl Display for SourceLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// Where a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A non-fatal or fatal assertion did not hold
    Assertion,
    /// Fixture `set_up` failed or panicked
    Setup,
    /// The body returned an error
    Error,
    /// The body panicked
    Panic,
    /// Fixture `tear_down` failed or panicked
    Teardown,
    /// The test exceeded the run timeout
    Timeout,
}

impl FailureKind {
    /// Short label used in reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Assertion => "assertion failed",
            Self::Setup => "setup failed",
            Self::Error => "error",
            Self::Panic => "panicked",
            Self::Teardown => "teardown failed",
            Self::Timeout => "timed out",
        }
    }
}

/// A single recorded failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    /// Failure category
    pub kind: FailureKind,
    /// Human-readable message
    pub message: String,
    /// Assertion call site, when known
    pub location: Option<SourceLocation>,
}

impl Failure {
    /// Create a failure without a source location
    #[inline]
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            location: None,
        }
    }

    /// Attach a source location
    #[inline]
    #[must_use]
    pub fn at(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }
}

impl Display for Failure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(location) => write!(f, "{} ({location})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Why a test was not executed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Registered as skipped or named with the `DISABLED_` prefix
    Disabled,
    /// Not started because an earlier test failed in fail-fast mode
    FailFast,
}

impl SkipReason {
    /// Short label used in reports
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::FailFast => "not run after earlier failure",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = TestId::new("FakeFixture", "test_failure").unwrap();
        assert_eq!(id.to_string(), "FakeFixture.test_failure");
        assert_eq!(id.fixture(), "FakeFixture");
        assert_eq!(id.test(), "test_failure");
    }

    #[test]
    fn test_id_rejects_empty_names() {
        let err = TestId::new("", "t").unwrap_err();
        assert!(matches!(
            err,
            RegistryError::InvalidIdentifier { kind: "fixture", .. }
        ));

        let err = TestId::new("F", "").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidIdentifier { kind: "test", .. }));
    }

    #[test]
    fn test_id_rejects_reserved_characters() {
        assert!(TestId::new("F.G", "t").is_err());
        assert!(TestId::new("F", "a b").is_err());
        assert!(TestId::new("F", "tab\there").is_err());
        for name in ["My-Fixture", "a:b", "all*", "which?"] {
            assert!(TestId::new(name, "t").is_err(), "{name}");
            assert!(TestId::new("F", name).is_err(), "{name}");
        }
        assert!(TestId::new("My_Fixture", "DISABLED_t").is_ok());
    }

    #[test]
    fn disabled_prefix_detected() {
        assert!(TestId::new("F", "DISABLED_test").unwrap().has_disabled_prefix());
        assert!(!TestId::new("F", "test_DISABLED_").unwrap().has_disabled_prefix());
    }

    #[test]
    fn failure_display_includes_location() {
        let failure = Failure::new(FailureKind::Assertion, "expected true").at(SourceLocation {
            file: "tests/x.rs",
            line: 7,
        });
        assert_eq!(failure.to_string(), "expected true (tests/x.rs:7)");
    }

    #[test]
    fn caller_location_points_here() {
        let location = SourceLocation::caller();
        assert!(location.file.ends_with("types.rs"));
        assert!(location.line > 0);
    }
}
