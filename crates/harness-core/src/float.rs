//! Floating-point equality policies
//!
//! Comparisons never rely on whatever `==` happens to do for non-finite
//! values. Under every policy:
//! - NaN is never equal to anything, itself included
//! - an infinity only equals the same infinity
//! - a finite value never equals a non-finite one

use crate::error::PolicyError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

const SIGN_MASK: u64 = 1 << 63;

/// Policy used by [`TestContext::expect_float_eq`](crate::TestContext::expect_float_eq)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", content = "value", rename_all = "snake_case")]
pub enum FloatPolicy {
    /// IEEE 754 equality (`0.0 == -0.0`)
    #[default]
    Exact,
    /// Equal within the given number of units in the last place
    Ulps(u32),
    /// Equal when `|a - b| <= tolerance`
    Tolerance(f64),
}

impl FloatPolicy {
    /// Four ULPs, the usual "almost equal" for doubles
    pub const ALMOST_EQ: Self = Self::Ulps(4);

    /// Absolute tolerance policy
    ///
    /// # Errors
    /// Returns [`PolicyError::InvalidTolerance`] for negative, NaN or infinite
    /// tolerances. An infinite tolerance would make every finite pair equal.
    pub fn tolerance(abs: f64) -> Result<Self, PolicyError> {
        if abs.is_finite() && abs >= 0.0 {
            Ok(Self::Tolerance(abs))
        } else {
            Err(PolicyError::InvalidTolerance(abs))
        }
    }

    /// Check the policy's own parameters
    ///
    /// # Errors
    /// Same conditions as [`FloatPolicy::tolerance`].
    pub fn validate(self) -> Result<Self, PolicyError> {
        match self {
            Self::Tolerance(abs) => Self::tolerance(abs),
            other => Ok(other),
        }
    }

    /// Compare two values under this policy
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn equal(self, a: f64, b: f64) -> bool {
        if a.is_nan() || b.is_nan() {
            return false;
        }
        if !a.is_finite() || !b.is_finite() {
            return a == b;
        }

        match self {
            Self::Exact => a == b,
            Self::Ulps(max) => a == b || ulps_between(a, b) <= u64::from(max),
            // An invalid tolerance compares as exact rather than widening.
            Self::Tolerance(abs) if abs.is_finite() && abs >= 0.0 => (a - b).abs() <= abs,
            Self::Tolerance(_) => a == b,
        }
    }
}

impl Display for FloatPolicy {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact => f.write_str("exact"),
            Self::Ulps(n) => write!(f, "within {n} ulps"),
            Self::Tolerance(abs) => write!(f, "within {abs}"),
        }
    }
}

/// Distance between two finite doubles in units in the last place
#[must_use]
pub fn ulps_between(a: f64, b: f64) -> u64 {
    let (a, b) = (biased(a), biased(b));
    a.max(b) - a.min(b)
}

/// Maps sign-and-magnitude bits onto a monotonic unsigned scale
fn biased(x: f64) -> u64 {
    let bits = x.to_bits();
    if bits & SIGN_MASK == 0 {
        bits | SIGN_MASK
    } else {
        (!bits).wrapping_add(1)
    }
}
