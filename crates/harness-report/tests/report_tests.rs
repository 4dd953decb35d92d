//! Report Tests
//!
//! Renders summaries produced by a real run.

use harness_core::prelude::*;
use harness_report::{annotations, markdown, render, write_junit, Format};
use pretty_assertions::assert_eq;

fn summary() -> RunSummary {
    let mut builder = Registry::builder();
    builder.register_fn("Fake", "ok", |_| Ok(())).unwrap();
    builder
        .register_fn("Fake", "test_failure", |ctx| {
            ctx.expect_true(false, "false");
            Ok(())
        })
        .unwrap();
    builder.register_fn("Fake", "DISABLED_test", |_| Ok(())).unwrap();
    Runner::default().run_all(&builder.build())
}

#[test]
fn test_text_report() {
    let text = render(&summary(), Format::Text).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "Total: 3, Passed: 1, Failed: 1, Skipped: 1");
    assert!(lines[1].starts_with("Fake.test_failure: expected `false` to be true ("));
    assert!(lines[1].contains("report_tests.rs:"));
    assert!(text.ends_with('\n'));
}

#[test]
fn test_annotation_points_at_assertion() {
    let rendered = annotations::render(&summary(), false);
    let line = rendered.lines().next().unwrap();

    assert!(line.starts_with("::error file="));
    assert!(line.contains("report_tests.rs,line=14,"));
    assert!(line.ends_with("title=Fake.test_failure (assertion failed)::expected `false` to be true"));
}

#[test]
fn test_junit_file_written() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("junit.xml");

    write_junit(&summary(), "harness", &path).unwrap();
    let xml = std::fs::read_to_string(&path).unwrap();

    assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<testsuites name=\"harness\" tests=\"3\" failures=\"1\""));
    assert!(xml.contains("<testcase name=\"test_failure\" classname=\"Fake\""));
    assert!(xml.contains("<skipped message=\"disabled\"/>"));
    assert_eq!(xml.matches("<testsuite ").count(), 1);
}

#[test]
fn test_junit_into_missing_directory_fails() {
    let dir = tempfile::tempdir().unwrap();
    let err = write_junit(&summary(), "harness", &dir.path().join("missing/junit.xml")).unwrap_err();
    assert!(err.is_io());
}

#[test]
fn test_markdown_and_json_agree_on_counts() {
    let summary = summary();

    let md = markdown::render(&summary);
    assert!(md.contains("1/2 (1 Skipped)"));
    assert!(md.contains("| Success Rate | 50.00% |"));

    let json = render(&summary, Format::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["passed"], 1);
    assert_eq!(value["skipped"], 1);
    assert_eq!(value["success_rate"], 0.5);
}
