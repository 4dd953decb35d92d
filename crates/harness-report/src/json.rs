//! JSON report

use crate::error::ReportError;
use chrono::{DateTime, Utc};
use harness_core::RunSummary;
use serde::Serialize;

/// Envelope written by [`render`]
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    /// Harness version that produced the report
    pub version: &'static str,
    /// When the report was generated
    pub generated_at: DateTime<Utc>,
    /// `passed / executed`, absent when nothing executed
    pub success_rate: Option<f64>,
    /// Full run summary
    #[serde(flatten)]
    pub summary: &'a RunSummary,
}

/// Pretty-printed JSON for `summary`
///
/// # Errors
/// Returns [`ReportError::Json`] if serialization fails.
pub fn render(summary: &RunSummary, generated_at: DateTime<Utc>) -> Result<String, ReportError> {
    let report = JsonReport {
        version: harness_core::VERSION,
        generated_at,
        success_rate: summary.success_rate(),
        summary,
    };
    Ok(serde_json::to_string_pretty(&report)?)
}
