//! Runner configuration
//!
//! Built in code with the `with_*` methods, or loaded from TOML:
//!
//! ```toml
//! workers = 4          # 1 (default) runs sequentially
//! timeout_secs = 2.5   # per-test timeout, omitted = none
//! fail_fast = false
//! also_run_disabled = false
//! float_policy = { policy = "ulps", value = 4 }
//! ```

use crate::error::ConfigError;
use crate::float::FloatPolicy;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// How test cases are scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// One test at a time on the calling thread
    #[default]
    Sequential,
    /// Tests spread over a pool of `workers` threads
    Parallel {
        /// Pool size, at least 1
        workers: usize,
    },
}

impl ExecutionMode {
    /// Mode for a worker count; `1` means sequential
    #[must_use]
    pub fn from_workers(workers: usize) -> Self {
        if workers <= 1 {
            Self::Sequential
        } else {
            Self::Parallel { workers }
        }
    }

    /// Number of threads executing tests
    #[must_use]
    pub fn workers(self) -> usize {
        match self {
            Self::Sequential => 1,
            Self::Parallel { workers } => workers,
        }
    }
}

/// Runner settings
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RunnerConfig {
    /// Scheduling mode
    pub mode: ExecutionMode,
    /// Per-test timeout
    pub timeout: Option<Duration>,
    /// Stop starting tests after the first failure
    pub fail_fast: bool,
    /// Execute disabled tests too
    pub also_run_disabled: bool,
    /// Initial float policy of every test context
    pub float_policy: FloatPolicy,
}

impl RunnerConfig {
    /// Sequential, no timeout
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With execution mode
    #[inline]
    #[must_use]
    pub fn with_mode(mut self, mode: ExecutionMode) -> Self {
        self.mode = mode;
        self
    }

    /// With a per-test timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// With fail-fast enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// With disabled tests executed or skipped
    #[inline]
    #[must_use]
    pub fn with_also_run_disabled(mut self, also_run_disabled: bool) -> Self {
        self.also_run_disabled = also_run_disabled;
        self
    }

    /// With the initial float policy for test contexts
    #[inline]
    #[must_use]
    pub fn with_float_policy(mut self, policy: FloatPolicy) -> Self {
        self.float_policy = policy;
        self
    }

    /// Check every setting
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for zero workers, a zero timeout or an
    /// invalid float tolerance.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if let ExecutionMode::Parallel { workers: 0 } = self.mode {
            return Err(ConfigError::Invalid("workers must be at least 1".into()));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(ConfigError::Invalid("timeout must be greater than zero".into()));
        }
        self.float_policy
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        Ok(self)
    }

    /// Parse a TOML document
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed TOML or unknown keys,
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: FileConfig = toml::from_str(text)?;
        file.into_config()?.validate()
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`RunnerConfig::from_toml_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    workers: Option<usize>,
    timeout_secs: Option<f64>,
    fail_fast: bool,
    also_run_disabled: bool,
    float_policy: FloatPolicy,
}

impl FileConfig {
    fn into_config(self) -> Result<RunnerConfig, ConfigError> {
        let mode = match self.workers {
            Some(0) => return Err(ConfigError::Invalid("workers must be at least 1".into())),
            Some(workers) => ExecutionMode::from_workers(workers),
            None => ExecutionMode::Sequential,
        };
        let timeout = self.timeout_secs.map(parse_timeout).transpose()?;

        Ok(RunnerConfig {
            mode,
            timeout,
            fail_fast: self.fail_fast,
            also_run_disabled: self.also_run_disabled,
            float_policy: self.float_policy,
        })
    }
}

/// Convert a seconds value into a timeout
///
/// # Errors
/// Returns [`ConfigError::Invalid`] unless `secs` is finite and positive.
pub fn parse_timeout(secs: f64) -> Result<Duration, ConfigError> {
    if secs.is_finite() && secs > 0.0 {
        Duration::try_from_secs_f64(secs).map_err(|err| ConfigError::Invalid(err.to_string()))
    } else {
        Err(ConfigError::Invalid(format!(
            "timeout must be a positive number of seconds, got {secs}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_is_sequential_without_timeout() {
        let config = RunnerConfig::new();
        assert_eq!(config.mode, ExecutionMode::Sequential);
        assert_eq!(config.timeout, None);
        assert_eq!(config.float_policy, FloatPolicy::Exact);
    }

    #[test]
    fn parse_full_document() {
        let config = RunnerConfig::from_toml_str(
            r#"
            workers = 4
            timeout_secs = 1.5
            fail_fast = true
            float_policy = { policy = "tolerance", value = 0.001 }
            "#,
        )
        .unwrap();

        assert_eq!(config.mode, ExecutionMode::Parallel { workers: 4 });
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert!(config.fail_fast);
        assert!(!config.also_run_disabled);
        assert_eq!(config.float_policy, FloatPolicy::Tolerance(0.001));
    }

    #[test]
    fn one_worker_is_sequential() {
        let config = RunnerConfig::from_toml_str("workers = 1").unwrap();
        assert_eq!(config.mode, ExecutionMode::Sequential);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            RunnerConfig::from_toml_str("workers = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RunnerConfig::from_toml_str("timeout_secs = -1.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RunnerConfig::from_toml_str("float_policy = { policy = \"tolerance\", value = -1.0 }"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn rejects_unknown_keys() {
        assert!(matches!(
            RunnerConfig::from_toml_str("shuffle = true"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn validate_catches_programmatic_mistakes() {
        let config = RunnerConfig::new().with_mode(ExecutionMode::Parallel { workers: 0 });
        assert!(config.validate().is_err());

        let config = RunnerConfig::new().with_timeout(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn from_file_reads_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "also_run_disabled = true").unwrap();

        let config = RunnerConfig::from_file(file.path()).unwrap();
        assert!(config.also_run_disabled);
    }

    #[test]
    fn from_file_reports_missing_file() {
        let err = RunnerConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
