//! Shared utilities for the analyzer.
//!
//! Column lookup, dtype classification and value extraction used by every
//! analysis module.

use crate::config::ColumnPolicy;
use crate::error::{AnalysisError, Result};
use polars::prelude::*;
use tracing::warn;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Names of all numeric columns, in table order.
pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .collect()
}

// =============================================================================
// Column Lookup
// =============================================================================

/// Check whether the table has a column with this exact name.
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_names().iter().any(|c| c.as_str() == name)
}

/// Fail with [`AnalysisError::EmptyTable`] when the table has no rows.
pub fn ensure_not_empty(df: &DataFrame) -> Result<()> {
    if df.height() == 0 {
        return Err(AnalysisError::EmptyTable);
    }
    Ok(())
}

/// Look up a column, mapping absence to [`AnalysisError::MissingColumn`].
pub fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    if !has_column(df, name) {
        return Err(AnalysisError::MissingColumn(name.to_string()));
    }
    Ok(df.column(name)?)
}

/// Filter the requested column names down to the ones to analyze.
///
/// Under [`ColumnPolicy::Strict`] the first absent column is an error;
/// under [`ColumnPolicy::Lenient`] absent columns are skipped with a warning.
pub fn resolve_columns<S: AsRef<str>>(
    df: &DataFrame,
    requested: &[S],
    policy: ColumnPolicy,
) -> Result<Vec<String>> {
    let mut resolved = Vec::with_capacity(requested.len());
    for name in requested {
        let name = name.as_ref();
        if has_column(df, name) {
            resolved.push(name.to_string());
            continue;
        }
        match policy {
            ColumnPolicy::Strict => return Err(AnalysisError::MissingColumn(name.to_string())),
            ColumnPolicy::Lenient => warn!("Skipping column '{}': not present in table", name),
        }
    }
    Ok(resolved)
}

// =============================================================================
// Value Extraction
// =============================================================================

/// Extract a numeric column as `f64` values aligned with row positions.
///
/// Nulls and `NaN` become `None`. Non-numeric columns are rejected.
pub fn numeric_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    let col = require_column(df, name)?;
    let series = col.as_materialized_series();
    if !is_numeric_dtype(series.dtype()) {
        return Err(AnalysisError::NonNumericColumn {
            column: name.to_string(),
            dtype: series.dtype().to_string(),
        });
    }

    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect();
    Ok(values)
}

/// Non-missing values of a numeric column, failing if there are none.
pub fn present_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let values: Vec<f64> = numeric_values(df, name)?.into_iter().flatten().collect();
    if values.is_empty() {
        return Err(AnalysisError::NoValidValues(name.to_string()));
    }
    Ok(values)
}

/// Round to two decimal places.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
