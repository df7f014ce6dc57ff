//! Custom error types for the data-quality analyzer.
//!
//! This module provides the error hierarchy using `thiserror`. Every
//! condition the analyzer can detect in its input table surfaces as a typed
//! variant; nothing is swallowed or replaced with a silent `NaN`.
//!
//! Errors are serializable so the CLI can emit them alongside JSON reports.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the analyzer.
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// A requested column is absent from the table.
    #[error("Column '{0}' not found in table")]
    MissingColumn(String),

    /// The table has no rows to analyze.
    #[error("Table is empty")]
    EmptyTable,

    /// A timestamp value could not be parsed during monthly resampling.
    #[error("Unparseable timestamp in column '{column}' at row {row}: '{value}'")]
    UnparseableTimestamp {
        column: String,
        row: usize,
        value: String,
    },

    /// Standard deviation of the column is zero, so z-scores are undefined.
    #[error("Insufficient variance in column '{0}': standard deviation is zero")]
    InsufficientVariance(String),

    /// The column exists but does not hold numeric values.
    #[error("Column '{column}' is not numeric (dtype {dtype})")]
    NonNumericColumn { column: String, dtype: String },

    /// No non-missing values found in a column for computation.
    #[error("No valid values found in column '{0}'")]
    NoValidValues(String),

    /// Invalid configuration or argument.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<AnalysisError>,
    },
}

impl AnalysisError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        AnalysisError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, used in serialized output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingColumn(_) => "MISSING_COLUMN",
            Self::EmptyTable => "EMPTY_TABLE",
            Self::UnparseableTimestamp { .. } => "UNPARSEABLE_TIMESTAMP",
            Self::InsufficientVariance(_) => "INSUFFICIENT_VARIANCE",
            Self::NonNumericColumn { .. } => "NON_NUMERIC_COLUMN",
            Self::NoValidValues(_) => "NO_VALID_VALUES",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Strip any [`AnalysisError::WithContext`] wrappers.
    pub fn root(&self) -> &AnalysisError {
        match self {
            Self::WithContext { source, .. } => source.root(),
            other => other,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for AnalysisError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("AnalysisError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for analyzer operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| AnalysisError::Polars(e).with_context(context))
    }
}

static_assertions::assert_impl_all!(AnalysisError: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(AnalysisError::EmptyTable.error_code(), "EMPTY_TABLE");
        assert_eq!(
            AnalysisError::MissingColumn("GHI".to_string()).error_code(),
            "MISSING_COLUMN"
        );
        assert_eq!(
            AnalysisError::InsufficientVariance("Cleaning".to_string()).error_code(),
            "INSUFFICIENT_VARIANCE"
        );
    }

    #[test]
    fn test_error_serialization() {
        let error = AnalysisError::MissingColumn("WSgust".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("MISSING_COLUMN"));
        assert!(json.contains("WSgust"));
    }

    #[test]
    fn test_with_context() {
        let error =
            AnalysisError::MissingColumn("Tamb".to_string()).with_context("During resampling");
        assert!(error.to_string().contains("During resampling"));
        assert_eq!(error.error_code(), "MISSING_COLUMN");
        assert!(matches!(error.root(), AnalysisError::MissingColumn(c) if c == "Tamb"));
    }

    #[test]
    fn test_unparseable_timestamp_message() {
        let error = AnalysisError::UnparseableTimestamp {
            column: "Timestamp".to_string(),
            row: 7,
            value: "n/a".to_string(),
        };
        let message = error.to_string();
        assert!(message.contains("row 7"));
        assert!(message.contains("'n/a'"));
    }
}
