//! Report errors

use std::path::PathBuf;

/// Errors raised while rendering or writing a report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// Writing a report file failed
    #[error("failed to write report to {path}: {source}")]
    Io {
        /// Destination path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization failed
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Unrecognised output format name
    #[error("unknown report format {0:?} (expected text, json or markdown)")]
    UnknownFormat(String),
}

impl ReportError {
    /// Check if this error came from the filesystem
    #[inline]
    #[must_use]
    pub fn is_io(&self) -> bool {
        matches!(self, Self::Io { .. })
    }
}
