//! GitHub Actions workflow annotations
//!
//! One `::error` command per recorded failure, placed at the assertion call
//! site when known, and optionally one `::warning` per skipped test.

use harness_core::{Failure, RunSummary, SourceLocation, TestRecord, TestStatus};
use std::fmt::{self, Display, Formatter};

/// Annotation severity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// Failed test
    Error,
    /// Skipped test
    Warning,
}

impl Level {
    fn command(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warning => "warning",
        }
    }
}

/// A single workflow command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    /// Severity
    pub level: Level,
    /// `fixture.test`
    pub title: String,
    /// Short reason appended to the title
    pub reason: Option<String>,
    /// Source position, when known
    pub location: Option<SourceLocation>,
    /// Message body, one entry per line
    pub message_lines: Vec<String>,
}

impl Annotation {
    fn for_failure(record: &TestRecord, failure: &Failure) -> Self {
        Self {
            level: Level::Error,
            title: record.id().to_string(),
            reason: Some(failure.kind.label().to_string()),
            location: failure.location,
            message_lines: failure.message.lines().map(str::to_string).collect(),
        }
    }

    fn for_skip(record: &TestRecord) -> Self {
        Self {
            level: Level::Warning,
            title: record.id().to_string(),
            reason: record.skip_reason().map(|r| r.label().to_string()),
            location: None,
            message_lines: Vec::new(),
        }
    }
}

impl Display for Annotation {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "::{} ", self.level.command())?;
        if let Some(location) = self.location {
            write!(
                f,
                "file={},line={},",
                escape_property(location.file),
                location.line
            )?;
        }

        let title = match &self.reason {
            Some(reason) => format!("{} ({reason})", self.title),
            None => self.title.clone(),
        };
        write!(f, "title={}", escape_property(&title))?;

        if !self.message_lines.is_empty() {
            let lines: Vec<String> = self.message_lines.iter().map(|l| escape_data(l)).collect();
            write!(f, "::{}", lines.join("%0A"))?;
        }
        Ok(())
    }
}

/// Annotations for every failure, plus skipped tests when `include_skipped`
#[must_use]
pub fn collect(summary: &RunSummary, include_skipped: bool) -> Vec<Annotation> {
    let mut out = Vec::new();
    for record in summary.records() {
        match record.status() {
            TestStatus::Failed => out.extend(
                record
                    .failures()
                    .iter()
                    .map(|failure| Annotation::for_failure(record, failure)),
            ),
            TestStatus::Skipped if include_skipped => out.push(Annotation::for_skip(record)),
            _ => {}
        }
    }
    out
}

/// One annotation per line
#[must_use]
pub fn render(summary: &RunSummary, include_skipped: bool) -> String {
    collect(summary, include_skipped)
        .iter()
        .map(|a| format!("{a}\n"))
        .collect()
}

/// Escape a command message
#[must_use]
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a command property value
#[must_use]
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_core::{FailureKind, SkipReason, TestId};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn summary() -> RunSummary {
        let mut bad = TestRecord::new(TestId::new("FakeFixture", "test_failure").unwrap());
        bad.transition(TestStatus::Running).unwrap();
        bad.complete(
            vec![
                Failure::new(FailureKind::Assertion, "expected `false` to be true\nsecond line").at(
                    SourceLocation {
                        file: "src/suite.rs",
                        line: 12,
                    },
                ),
                Failure::new(FailureKind::Teardown, "tear_down failed"),
            ],
            Duration::ZERO,
        )
        .unwrap();

        let mut off = TestRecord::new(TestId::new("FakeFixture", "DISABLED_test").unwrap());
        off.skip(SkipReason::Disabled).unwrap();

        RunSummary::from_records(vec![bad, off], Duration::ZERO)
    }

    #[test]
    fn one_error_per_failure() {
        assert_eq!(
            render(&summary(), false),
            "::error file=src/suite.rs,line=12,title=FakeFixture.test_failure (assertion failed)\
             ::expected `false` to be true%0Asecond line\n\
             ::error title=FakeFixture.test_failure (teardown failed)::tear_down failed\n"
        );
    }

    #[test]
    fn skipped_warnings_are_opt_in() {
        let annotations = collect(&summary(), true);
        assert_eq!(annotations.len(), 3);
        assert_eq!(
            annotations[2].to_string(),
            "::warning title=FakeFixture.DISABLED_test (disabled)"
        );
    }

    #[test]
    fn escaping() {
        assert_eq!(escape_data("50%\r\n"), "50%25%0D%0A");
        assert_eq!(escape_property("C:\\a,b"), "C%3A\\a%2Cb");
    }
}
