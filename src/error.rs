//! Error taxonomy for the statistics pipeline
//!
//! Every stage surfaces failures through [`AnalysisError`] instead of
//! substituting zero or NaN. Per-record parse failures are recoverable: the
//! derivation stage and the loader turn them into warnings and keep going.

use thiserror::Error;

/// Errors raised by the derivation, aggregation, inference and regression stages
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Malformed date or numeric field in a single record
    #[error("Failed to parse {field} from {value:?}: {reason}")]
    Parse {
        field: &'static str,
        value: String,
        reason: String,
    },

    /// A statistic was requested over a group with no usable values
    #[error("Group {group} has no non-missing values")]
    EmptyGroup { group: String },

    /// A statistic is mathematically undefined for the given data
    #[error("{statistic} is undefined: {reason}")]
    UndefinedStatistic {
        statistic: &'static str,
        reason: String,
    },

    /// Too few observations for the requested computation
    #[error("{context} needs at least {required} observations, got {actual}")]
    InsufficientSample {
        context: &'static str,
        required: usize,
        actual: usize,
    },

    /// Input with no spread where spread is required
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

/// Result type for pipeline stage operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

impl AnalysisError {
    pub(crate) fn parse(field: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self::Parse {
            field,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}
