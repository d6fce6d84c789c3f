//! Projection error types

use thiserror::Error;

use crate::model::Track;

/// Result type alias for projection operations
pub type Result<T> = std::result::Result<T, ProjectionError>;

/// Errors that can occur while filtering, fitting, stacking or configuring
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProjectionError {
    /// Regression algorithm name is not one of the supported five
    #[error("Unknown regression algorithm '{0}'")]
    UnknownAlgorithm(String),

    /// Calendar unit name is not one of the supported six
    #[error("Unknown time unit '{0}'")]
    UnknownTimeUnit(String),

    /// Too few usable points to fit a model
    #[error("Insufficient data: need at least {required} points, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// More points at one timestamp than there are series to stack
    #[error("Stacking overflow on {track} track at {timestamp_ms}ms: series '{series}' already contributed")]
    StackingOverflow {
        track: Track,
        timestamp_ms: i64,
        series: String,
    },

    /// No series produced anything to draw
    #[error("Nothing to render: no series produced displayable output")]
    EmptyProjection,

    /// Invalid parameter value
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// A series adapter could not read or decode its source
    #[error("Failed to load series: {0}")]
    Source(String),
}

impl ProjectionError {
    /// Shorthand for [`ProjectionError::InvalidParameter`]
    pub fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
