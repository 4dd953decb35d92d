//! Harness Report - renderers for run summaries
//!
//! Every renderer takes a finished [`RunSummary`] and produces text; writing
//! it somewhere is left to the caller except for the step summary, which CI
//! expects to be appended to.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use harness_report::{render, Format};
//!
//! let summary = runner.run_all(&registry);
//! print!("{}", render(&summary, Format::Text)?);
//! std::fs::write("junit.xml", harness_report::junit::render(&summary, "harness", chrono::Utc::now()))?;
//! ```

#![warn(unreachable_pub)]

pub mod annotations;
pub mod error;
pub mod json;
pub mod junit;
pub mod markdown;

pub use error::ReportError;

use chrono::Utc;
use harness_core::RunSummary;
use std::fmt::{self, Display, Formatter};
use std::path::Path;
use std::str::FromStr;

/// Output format for the primary report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// `Total: ...` line plus one line per failure
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
    /// Markdown step summary
    Markdown,
}

impl Format {
    /// Every format, in help-text order
    pub const ALL: [Format; 3] = [Format::Text, Format::Json, Format::Markdown];

    /// Lowercase name accepted on the command line
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ReportError::UnknownFormat(s.to_string()))
    }
}

/// Render `summary` in `format`, newline-terminated
///
/// # Errors
/// Returns [`ReportError::Json`] if JSON serialization fails.
pub fn render(summary: &RunSummary, format: Format) -> Result<String, ReportError> {
    let mut out = match format {
        Format::Text => summary.to_string(),
        Format::Json => json::render(summary, Utc::now())?,
        Format::Markdown => markdown::render(summary),
    };
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Write a JUnit report for `summary` to `path`
///
/// # Errors
/// Returns [`ReportError::Io`] if the file cannot be written.
pub fn write_junit(summary: &RunSummary, name: &str, path: &Path) -> Result<(), ReportError> {
    let xml = junit::render(summary, name, Utc::now());
    std::fs::write(path, xml).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), tests = summary.total(), "wrote JUnit report");
    Ok(())
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
