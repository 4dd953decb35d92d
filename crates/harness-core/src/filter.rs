//! Test selection
//!
//! Patterns follow the familiar `POSITIVE[-NEGATIVE]` form, each side a
//! `:`-separated list of globs matched against `fixture.test`:
//!
//! - `*` matches any run of characters, `?` exactly one
//! - an empty positive side means `*`
//! - a test is selected when it matches a positive glob and no negative one
//!
//! `FakeFixture.*-*numerical*` selects every `FakeFixture` test except the
//! numeric one.

use crate::error::FilterError;
use crate::types::TestId;
use regex::Regex;
use std::fmt::{self, Debug, Formatter};
use std::str::FromStr;

/// Compiled selection predicate over test ids
#[derive(Clone, Default)]
pub struct TestFilter {
    source: Option<String>,
    positive: Option<Regex>,
    negative: Option<Regex>,
}

impl TestFilter {
    /// Filter accepting every test
    #[inline]
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Compile a pattern
    ///
    /// # Errors
    /// Returns [`FilterError`] when the pattern has an empty glob (e.g.
    /// `a::b`) or more than one `-` section.
    pub fn parse(pattern: &str) -> Result<Self, FilterError> {
        let pattern = pattern.trim();
        let (positive, negative) = match pattern.split_once('-') {
            Some((_, rest)) if rest.contains('-') => {
                return Err(FilterError {
                    pattern: pattern.to_string(),
                    reason: "more than one '-' section".to_string(),
                })
            }
            Some((positive, negative)) => (positive, Some(negative)),
            None => (pattern, None),
        };

        let positive = if positive.is_empty() || positive == "*" {
            None
        } else {
            Some(compile(pattern, positive)?)
        };
        let negative = negative.map(|globs| compile(pattern, globs)).transpose()?;

        Ok(Self {
            source: Some(pattern.to_string()),
            positive,
            negative,
        })
    }

    /// Whether `id` is selected
    #[must_use]
    pub fn matches(&self, id: &TestId) -> bool {
        let name = id.full_name();
        let included = self.positive.as_ref().map_or(true, |re| re.is_match(&name));
        let excluded = self.negative.as_ref().is_some_and(|re| re.is_match(&name));
        included && !excluded
    }

    /// Pattern this filter was parsed from, if any
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

impl FromStr for TestFilter {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Debug for TestFilter {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TestFilter")
            .field(&self.source.as_deref().unwrap_or("*"))
            .finish()
    }
}

/// Turn a `:`-separated glob list into one anchored alternation
fn compile(pattern: &str, globs: &str) -> Result<Regex, FilterError> {
    let mut alternatives = Vec::new();
    for glob in globs.split(':') {
        if glob.is_empty() {
            return Err(FilterError {
                pattern: pattern.to_string(),
                reason: "empty glob".to_string(),
            });
        }
        alternatives.push(glob_to_regex(glob));
    }

    Regex::new(&format!("^(?:{})$", alternatives.join("|"))).map_err(|err| FilterError {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}

fn glob_to_regex(glob: &str) -> String {
    let mut out = String::with_capacity(glob.len() * 2);
    for ch in glob.chars() {
        match ch {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    out
}
