//! Column profiling: descriptive statistics and distributions.
//!
//! This module provides the per-column numbers a report or a plotting layer
//! needs:
//! - Summary statistics (mean, median, variance, skewness, kurtosis)
//! - Box-plot summaries
//! - Histogram bins

mod distribution;
pub(crate) mod statistics;

use crate::error::{AnalysisError, Result};
use crate::types::{BoxSummary, ColumnStats, Histogram};
use crate::utils::present_values;
use polars::prelude::*;
use tracing::debug;

/// Column profiler. Every function reads the table and returns new values.
pub struct DataProfiler;

impl DataProfiler {
    /// Summary statistics of one numeric column over its non-missing values.
    pub fn column_stats(df: &DataFrame, column: &str) -> Result<ColumnStats> {
        let values = present_values(df, column)?;
        Ok(Self::stats_from_values(column, &values))
    }

    /// Box-plot summary of one numeric column.
    pub fn box_summary(df: &DataFrame, column: &str) -> Result<BoxSummary> {
        let values = present_values(df, column)?;
        statistics::box_summary(&values).ok_or_else(|| AnalysisError::NoValidValues(column.to_string()))
    }

    /// Equal-width histogram of one numeric column.
    pub fn histogram(df: &DataFrame, column: &str, bins: usize) -> Result<Histogram> {
        if bins == 0 {
            return Err(AnalysisError::InvalidConfig(
                "histogram needs at least one bin".to_string(),
            ));
        }
        let values = present_values(df, column)?;
        let (edges, counts) = distribution::equal_width_bins(&values, bins)
            .ok_or_else(|| AnalysisError::NoValidValues(column.to_string()))?;

        debug!("Histogram for '{}': {} values in {} bins", column, values.len(), bins);
        Ok(Histogram {
            column: column.to_string(),
            edges,
            counts,
        })
    }

    fn stats_from_values(column: &str, values: &[f64]) -> ColumnStats {
        let sorted = statistics::sorted(values);
        let variance = statistics::sample_variance(values);

        ColumnStats {
            column: column.to_string(),
            count: values.len(),
            mean: statistics::mean(values).unwrap_or(f64::NAN),
            median: statistics::quantile_sorted(&sorted, 0.5).unwrap_or(f64::NAN),
            variance,
            std_dev: variance.map(f64::sqrt),
            skewness: statistics::skewness(values),
            kurtosis: statistics::kurtosis(values),
            min: sorted.first().copied().unwrap_or(f64::NAN),
            max: sorted.last().copied().unwrap_or(f64::NAN),
        }
    }
}
