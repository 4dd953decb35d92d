//! Per-test lifecycle state machine
//!
//! `NotRun -> {Skipped | Running}`, `Running -> {Passed | Failed}`.
//! `Passed`, `Failed` and `Skipped` are terminal.

use crate::error::TransitionError;
use serde::Serialize;

/// Status of a single test case
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Not yet considered by the runner
    #[default]
    NotRun,
    /// Fixture acquired, hooks or body in progress
    Running,
    /// Executed without any recorded failure
    Passed,
    /// At least one failure was recorded
    Failed,
    /// Never executed
    Skipped,
}

impl TestStatus {
    /// Every status, in lifecycle order
    pub const ALL: [Self; 5] = [
        Self::NotRun,
        Self::Running,
        Self::Passed,
        Self::Failed,
        Self::Skipped,
    ];

    /// Whether no further transition is possible
    #[inline]
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Passed | Self::Failed | Self::Skipped)
    }
}

/// Validates a status transition.
///
/// # Errors
/// Returns [`TransitionError`] when `to` is not reachable from `from` in one
/// step.
pub fn validate_transition(from: TestStatus, to: TestStatus) -> Result<(), TransitionError> {
    if allowed_transitions(from).contains(&to) {
        Ok(())
    } else {
        Err(TransitionError { from, to })
    }
}

/// Statuses reachable from `from` in one step
#[must_use]
pub fn allowed_transitions(from: TestStatus) -> &'static [TestStatus] {
    use TestStatus::{Failed, NotRun, Passed, Running, Skipped};
    match from {
        NotRun => &[Skipped, Running],
        Running => &[Passed, Failed],
        Passed | Failed | Skipped => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_run_transitions() {
        assert!(validate_transition(TestStatus::NotRun, TestStatus::Running).is_ok());
        assert!(validate_transition(TestStatus::NotRun, TestStatus::Skipped).is_ok());

        assert!(validate_transition(TestStatus::NotRun, TestStatus::Passed).is_err());
        assert!(validate_transition(TestStatus::NotRun, TestStatus::Failed).is_err());
    }

    #[test]
    fn running_transitions() {
        assert!(validate_transition(TestStatus::Running, TestStatus::Passed).is_ok());
        assert!(validate_transition(TestStatus::Running, TestStatus::Failed).is_ok());

        assert!(validate_transition(TestStatus::Running, TestStatus::Skipped).is_err());
        assert!(validate_transition(TestStatus::Running, TestStatus::NotRun).is_err());
    }

    #[test]
    fn terminal_states_are_final() {
        for from in TestStatus::ALL.into_iter().filter(|s| s.is_terminal()) {
            for to in TestStatus::ALL {
                assert!(validate_transition(from, to).is_err(), "{from:?} -> {to:?}");
            }
        }
    }

    #[test]
    fn error_carries_both_ends() {
        let err = validate_transition(TestStatus::Passed, TestStatus::Running).unwrap_err();
        assert_eq!(err.from, TestStatus::Passed);
        assert_eq!(err.to, TestStatus::Running);
    }
}
