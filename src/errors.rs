//! Shared error types for the normalization pipeline and its data resources.

use std::path::PathBuf;
use thiserror::Error;

use crate::core::Test;

/// Main error type for bicams operations
#[derive(Debug, Error)]
pub enum BicamsError {
    /// A required data resource (conversion table, reference sample) is
    /// missing, unreadable, or fails its integrity checks. Fatal at startup.
    #[error("data resource `{resource}` unavailable: {message}")]
    DataUnavailable {
        resource: String,
        path: Option<PathBuf>,
        message: String,
    },

    /// A batch record violates a column constraint. Aborts the whole batch
    /// before any pipeline call; no partial results are produced.
    #[error("validation failed on column `{column}`: {constraint}")]
    Validation { column: String, constraint: String },

    /// A raw score has no matching bucket in its conversion table.
    #[error("raw score {raw_score} has no bucket in the {test} conversion table")]
    OutOfRange { test: Test, raw_score: u32 },

    /// IO errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV parsing errors
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// JSON errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl BicamsError {
    /// Create a data-unavailable error with path context
    pub fn data_unavailable(
        resource: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self::DataUnavailable {
            resource: resource.into(),
            path: Some(path.into()),
            message: message.into(),
        }
    }

    /// Create a data-unavailable error without a backing path
    pub fn resource(resource: impl Into<String>, message: impl Into<String>) -> Self {
        Self::DataUnavailable {
            resource: resource.into(),
            path: None,
            message: message.into(),
        }
    }

    /// Create a validation error naming the offending column and constraint
    pub fn validation(column: impl Into<String>, constraint: impl Into<String>) -> Self {
        Self::Validation {
            column: column.into(),
            constraint: constraint.into(),
        }
    }
}

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, BicamsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_column_and_constraint() {
        let err = BicamsError::validation("sex", "value 3 not in allowed set {1, 2}");
        let msg = err.to_string();
        assert!(msg.contains("sex"));
        assert!(msg.contains("{1, 2}"));
    }

    #[test]
    fn out_of_range_error_names_test_and_score() {
        let err = BicamsError::OutOfRange {
            test: Test::Sdmt,
            raw_score: 200,
        };
        let msg = err.to_string();
        assert!(msg.contains("sdmt"));
        assert!(msg.contains("200"));
    }

    #[test]
    fn data_unavailable_carries_resource_name() {
        let err = BicamsError::data_unavailable(
            "sdmt conversion table",
            "/nonexistent/sdmt.csv",
            "file not found",
        );
        assert!(err.to_string().contains("sdmt conversion table"));
    }
}
