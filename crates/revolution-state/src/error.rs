//! Error types for the revolution-state crate.
//!
//! Validation failures are detected before any mutation, so every error
//! here leaves the state exactly as it was.

use revolution_types::{Flag, FlagValue, Metric, MetricBound};

/// A single requirement that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unmet {
    /// A metric was outside its bound.
    Metric {
        /// The metric.
        metric: Metric,
        /// The bound it had to satisfy.
        bound: MetricBound,
        /// Its actual value.
        actual: i32,
    },
    /// A flag did not hold the required value.
    Flag {
        /// The flag.
        flag: Flag,
        /// Required value.
        required: FlagValue,
        /// Actual value (`false` when unset).
        actual: FlagValue,
    },
}

impl core::fmt::Display for Unmet {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Metric {
                metric,
                bound,
                actual,
            } => {
                write!(f, "{metric} is {actual}")?;
                if let Some(min) = bound.at_least {
                    write!(f, ", needs at least {min}")?;
                }
                if let Some(max) = bound.at_most {
                    write!(f, ", needs at most {max}")?;
                }
                Ok(())
            }
            Self::Flag {
                flag,
                required,
                actual,
            } => write!(f, "{flag} is {actual}, needs {required}"),
        }
    }
}

/// Errors raised while resolving decision effects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The option's requirements do not hold.
    #[error("requirement not met: {unmet}")]
    RequirementNotMet {
        /// The first requirement that failed.
        unmet: Unmet,
    },

    /// A delta names a metric outside the fixed set.
    #[error("unknown metric: {key}")]
    UnknownMetric {
        /// The rejected key.
        key: String,
    },
}
