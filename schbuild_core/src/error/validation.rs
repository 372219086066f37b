//! Validation related error types

use thiserror::Error;

/// Settings, request and pattern errors
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Invalid input parameter
    #[error("Invalid parameter '{parameter}': {reason}")]
    InvalidParameter { parameter: String, reason: String },

    /// Glob pattern that does not compile
    #[error("Invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// Unknown target or request name
    #[error("Unknown target '{name}' (expected one of: {expected})")]
    UnknownTarget { name: String, expected: String },
}

impl ValidationError {
    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: &str, reason: &str) -> Self {
        Self::InvalidParameter {
            parameter: parameter.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an invalid pattern error
    pub fn invalid_pattern(pattern: &str, reason: &str) -> Self {
        Self::InvalidPattern {
            pattern: pattern.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an unknown target error
    pub fn unknown_target(name: &str, expected: &[&str]) -> Self {
        Self::UnknownTarget {
            name: name.to_string(),
            expected: expected.join(", "),
        }
    }
}
