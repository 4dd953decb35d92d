//! JUnit XML output
//!
//! One `<testsuite>` per fixture, in registration order. The subset written
//! here is what common CI importers read: counts and times on suites,
//! `<failure>` and `<skipped>` children on test cases.

use chrono::{DateTime, SecondsFormat, Utc};
use harness_core::{FailureKind, RunSummary, TestRecord, TestStatus};
use indexmap::IndexMap;
use std::fmt::Write;
use std::time::Duration;

/// Render `summary` as a JUnit document named `name`
#[must_use]
pub fn render(summary: &RunSummary, name: &str, timestamp: DateTime<Utc>) -> String {
    let mut suites: IndexMap<&str, Vec<&TestRecord>> = IndexMap::new();
    for record in summary.records() {
        suites.entry(record.id().fixture()).or_default().push(record);
    }

    let mut xml = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    let _ = writeln!(
        xml,
        "<testsuites name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{}\" timestamp=\"{}\">",
        escape(name),
        summary.total(),
        summary.failed(),
        summary.skipped(),
        secs(summary.elapsed()),
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
    );

    for (fixture, records) in &suites {
        let count = |status: TestStatus| records.iter().filter(|r| r.status() == status).count();
        let time: Duration = records.iter().map(|r| r.elapsed()).sum();
        let _ = writeln!(
            xml,
            "  <testsuite name=\"{}\" tests=\"{}\" failures=\"{}\" errors=\"0\" skipped=\"{}\" time=\"{}\">",
            escape(fixture),
            records.len(),
            count(TestStatus::Failed),
            count(TestStatus::Skipped),
            secs(time),
        );
        for record in records {
            write_case(&mut xml, record);
        }
        xml.push_str("  </testsuite>\n");
    }

    xml.push_str("</testsuites>\n");
    xml
}

fn write_case(xml: &mut String, record: &TestRecord) {
    let id = record.id();
    let open = format!(
        "    <testcase name=\"{}\" classname=\"{}\" time=\"{}\"",
        escape(id.test()),
        escape(id.fixture()),
        secs(record.elapsed()),
    );

    match record.status() {
        TestStatus::Failed => {
            let _ = writeln!(xml, "{open}>");
            for failure in record.failures() {
                let _ = writeln!(
                    xml,
                    "      <failure message=\"{}\" type=\"{}\">{}</failure>",
                    escape(failure.message.lines().next().unwrap_or_default()),
                    failure_type(failure.kind),
                    escape(&failure.to_string()),
                );
            }
            xml.push_str("    </testcase>\n");
        }
        TestStatus::Skipped => {
            let reason = record.skip_reason().map_or("skipped", |r| r.label());
            let _ = writeln!(xml, "{open}>");
            let _ = writeln!(xml, "      <skipped message=\"{}\"/>", escape(reason));
            xml.push_str("    </testcase>\n");
        }
        _ => {
            let _ = writeln!(xml, "{open}/>");
        }
    }
}

fn failure_type(kind: FailureKind) -> &'static str {
    match kind {
        FailureKind::Assertion => "assertion",
        FailureKind::Setup => "setup",
        FailureKind::Error => "error",
        FailureKind::Panic => "panic",
        FailureKind::Teardown => "teardown",
        FailureKind::Timeout => "timeout",
    }
}

fn secs(duration: Duration) -> String {
    format!("{:.3}", duration.as_secs_f64())
}

/// Escape text for use in XML attributes and character data
#[must_use]
pub fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\n' | '\t' | '\r' => out.push(c),
            c if c.is_control() => {
                let _ = write!(out, "[0x{:02X}]", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use harness_core::{Failure, SkipReason, SourceLocation, TestId};
    use pretty_assertions::assert_eq;

    fn record(fixture: &str, test: &str) -> TestRecord {
        TestRecord::new(TestId::new(fixture, test).unwrap())
    }

    fn finished(fixture: &str, test: &str, failures: Vec<Failure>, ms: u64) -> TestRecord {
        let mut r = record(fixture, test);
        r.transition(TestStatus::Running).unwrap();
        r.complete(failures, Duration::from_millis(ms)).unwrap();
        r
    }

    #[test]
    fn groups_by_fixture_in_order() {
        let mut off = record("A", "DISABLED_x");
        off.skip(SkipReason::Disabled).unwrap();
        let failure = Failure::new(FailureKind::Assertion, "expected 1, got <2>").at(SourceLocation {
            file: "t.rs",
            line: 3,
        });
        let summary = RunSummary::from_records(
            vec![
                finished("B", "ok", vec![], 5),
                finished("A", "bad", vec![failure], 10),
                off,
            ],
            Duration::from_millis(20),
        );
        let timestamp = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

        let expected = r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites name="harness" tests="3" failures="1" errors="0" skipped="1" time="0.020" timestamp="2024-01-02T03:04:05Z">
  <testsuite name="B" tests="1" failures="0" errors="0" skipped="0" time="0.005">
    <testcase name="ok" classname="B" time="0.005"/>
  </testsuite>
  <testsuite name="A" tests="2" failures="1" errors="0" skipped="1" time="0.010">
    <testcase name="bad" classname="A" time="0.010">
      <failure message="expected 1, got &lt;2&gt;" type="assertion">expected 1, got &lt;2&gt; (t.rs:3)</failure>
    </testcase>
    <testcase name="DISABLED_x" classname="A" time="0.000">
      <skipped message="disabled"/>
    </testcase>
  </testsuite>
</testsuites>
"#;
        assert_eq!(render(&summary, "harness", timestamp), expected);
    }

    #[test]
    fn escape_special_characters() {
        assert_eq!(escape(r#"a<b>&"c'"#), "a&lt;b&gt;&amp;&quot;c&apos;");
        assert_eq!(escape("bell\u{7}"), "bell[0x07]");
        assert_eq!(escape("two\nlines"), "two\nlines");
    }
}
