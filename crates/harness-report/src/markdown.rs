//! Markdown step summary for CI job pages

use crate::error::ReportError;
use harness_core::{RunSummary, TestRecord, TestStatus};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Environment variable naming the step summary file
pub const STEP_SUMMARY_ENV: &str = "GITHUB_STEP_SUMMARY";

/// Render the metrics table plus collapsible failed/skipped lists
#[must_use]
pub fn render(summary: &RunSummary) -> String {
    let mut out = String::new();

    out.push_str("## Test Results\n\n");
    out.push_str(&format!(
        "{}/{} ({} Skipped)\n\n",
        summary.passed(),
        summary.executed(),
        summary.skipped()
    ));

    let rate = summary
        .success_rate()
        .map_or_else(|| "n/a".to_string(), |rate| format!("{:.2}%", rate * 100.0));
    let metrics = [
        ("Total Tests", summary.total().to_string()),
        ("Skipped", summary.skipped().to_string()),
        ("Passed", summary.passed().to_string()),
        ("Failures", summary.failed().to_string()),
        ("Success Rate", rate),
    ];
    out.push_str(&table(&metrics, "Metric", "Value"));
    out.push_str("\n\n");

    let failed: Vec<&TestRecord> = with_status(summary, TestStatus::Failed);
    if !failed.is_empty() {
        details(&mut out, ":boom: <strong>Failed Tests</strong>", &failed);
    }
    let skipped: Vec<&TestRecord> = with_status(summary, TestStatus::Skipped);
    if !skipped.is_empty() {
        details(&mut out, ":warning: <strong>Skipped Tests</strong>", &skipped);
    }

    out
}

/// Two-column markdown table with padded cells
#[must_use]
pub fn table(rows: &[(&str, String)], header0: &str, header1: &str) -> String {
    let n0 = rows.iter().map(|(k, _)| k.len()).chain([header0.len()]).max().unwrap_or(0);
    let n1 = rows.iter().map(|(_, v)| v.len()).chain([header1.len()]).max().unwrap_or(0);

    let mut lines = vec![
        format!("| {header0:<n0$} | {header1:<n1$} |"),
        format!("| {} | {} |", "-".repeat(n0), "-".repeat(n1)),
    ];
    lines.extend(rows.iter().map(|(k, v)| format!("| {k:<n0$} | {v:<n1$} |")));
    lines.join("\n")
}

/// `fixture.test - Status (reason)`
#[must_use]
pub fn describe(record: &TestRecord) -> String {
    let reason = match record.status() {
        TestStatus::Failed => record.failures().first().map(|f| f.kind.label()),
        TestStatus::Skipped => record.skip_reason().map(|r| r.label()),
        _ => None,
    };
    match reason {
        Some(reason) => format!("{} - {:?} ({reason})", record.id(), record.status()),
        None => format!("{} - {:?}", record.id(), record.status()),
    }
}

/// Step summary path from the environment, if set
#[must_use]
pub fn step_summary_path() -> Option<PathBuf> {
    std::env::var_os(STEP_SUMMARY_ENV)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Append `markdown` to the file at `path`, creating it if missing
///
/// # Errors
/// Returns [`ReportError::Io`] if the file cannot be opened or written.
pub fn append_step_summary(path: &Path, markdown: &str) -> Result<(), ReportError> {
    let io_err = |source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(markdown.as_bytes()).map_err(io_err)?;
    if !markdown.ends_with('\n') {
        file.write_all(b"\n").map_err(io_err)?;
    }
    tracing::debug!(path = %path.display(), "appended step summary");
    Ok(())
}

fn with_status(summary: &RunSummary, status: TestStatus) -> Vec<&TestRecord> {
    summary.records().iter().filter(|r| r.status() == status).collect()
}

fn details(out: &mut String, title: &str, records: &[&TestRecord]) {
    out.push_str("<details>\n\n");
    out.push_str(&format!("<summary>{title} (Click to expand)</summary>\n\n"));
    for record in records {
        out.push_str(&format!("* {}\n", describe(record)));
    }
    out.push_str("\n</details>\n\n");
}

#[cfg(test)]
mod tests {
    use super::*;
    use harness_core::{Failure, FailureKind, SkipReason, TestId};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn finished(test: &str, failures: Vec<Failure>) -> TestRecord {
        let mut r = TestRecord::new(TestId::new("F", test).unwrap());
        r.transition(TestStatus::Running).unwrap();
        r.complete(failures, Duration::ZERO).unwrap();
        r
    }

    fn skipped(test: &str) -> TestRecord {
        let mut r = TestRecord::new(TestId::new("F", test).unwrap());
        r.skip(SkipReason::Disabled).unwrap();
        r
    }

    #[test]
    fn table_pads_columns() {
        let rows = [("Total Tests", "3".to_string()), ("Passed", "1".to_string())];
        assert_eq!(
            table(&rows, "Metric", "Value"),
            "| Metric      | Value |\n\
             | ----------- | ----- |\n\
             | Total Tests | 3     |\n\
             | Passed      | 1     |"
        );
    }

    #[test]
    fn describe_includes_reason() {
        let bad = finished("bad", vec![Failure::new(FailureKind::Assertion, "x")]);
        assert_eq!(describe(&bad), "F.bad - Failed (assertion failed)");
        assert_eq!(describe(&skipped("skip")), "F.skip - Skipped (disabled)");
        assert_eq!(describe(&finished("ok", vec![])), "F.ok - Passed");
    }

    #[test]
    fn render_full_summary() {
        let summary = RunSummary::from_records(
            vec![
                finished("ok", vec![]),
                skipped("DISABLED_off"),
                finished("bad", vec![Failure::new(FailureKind::Assertion, "x")]),
            ],
            Duration::ZERO,
        );

        let expected = "\
## Test Results

1/2 (1 Skipped)

| Metric       | Value  |
| ------------ | ------ |
| Total Tests  | 3      |
| Skipped      | 1      |
| Passed       | 1      |
| Failures     | 1      |
| Success Rate | 50.00% |

<details>

<summary>:boom: <strong>Failed Tests</strong> (Click to expand)</summary>

* F.bad - Failed (assertion failed)

</details>

<details>

<summary>:warning: <strong>Skipped Tests</strong> (Click to expand)</summary>

* F.DISABLED_off - Skipped (disabled)

</details>

";
        assert_eq!(render(&summary), expected);
    }

    #[test]
    fn success_rate_not_available_when_nothing_ran() {
        let summary = RunSummary::from_records(vec![skipped("only")], Duration::ZERO);
        let md = render(&summary);
        assert!(md.contains("| Success Rate | n/a   |"));
        assert!(md.contains("0/0 (1 Skipped)"));
        assert!(!md.contains("Failed Tests"));
    }

    #[test]
    fn append_creates_then_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");

        append_step_summary(&path, "first").unwrap();
        append_step_summary(&path, "second\n").unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "first\nsecond\n");
    }

    #[test]
    fn append_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = append_step_summary(&dir.path().join("nope/summary.md"), "x").unwrap_err();
        assert!(err.is_io());
    }
}
