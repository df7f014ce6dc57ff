//! Outlier detection.
//!
//! Two independent rules, each reporting the row indices it flags:
//! - IQR fences: `[Q1 - k*IQR, Q3 + k*IQR]`, quartiles by linear interpolation
//! - Z-score: `|x - mean| / std > threshold` with the population standard deviation
//!
//! Missing entries are never flagged and do not take part in the fences or
//! the moments.

use crate::error::{AnalysisError, Result};
use crate::profiler::statistics::{mean, population_std, quantile_sorted, sorted};
use crate::types::{IqrOutliers, ZScoreOutliers};
use crate::utils::numeric_values;
use polars::prelude::*;
use tracing::debug;

/// Rows whose value satisfies `predicate`, skipping missing entries.
fn flagged_rows(values: &[Option<f64>], predicate: impl Fn(f64) -> bool) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, v)| v.is_some_and(&predicate))
        .map(|(row, _)| row)
        .collect()
}

/// Detect outliers in one column with the IQR rule.
pub(crate) fn iqr_outliers(df: &DataFrame, column: &str, multiplier: f64) -> Result<IqrOutliers> {
    let values = numeric_values(df, column)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    let sorted = sorted(&present);

    let (Some(q1), Some(q3)) = (quantile_sorted(&sorted, 0.25), quantile_sorted(&sorted, 0.75))
    else {
        return Err(AnalysisError::NoValidValues(column.to_string()));
    };

    let iqr = q3 - q1;
    let lower_bound = q1 - multiplier * iqr;
    let upper_bound = q3 + multiplier * iqr;
    let rows = flagged_rows(&values, |v| v < lower_bound || v > upper_bound);

    debug!(
        "IQR outliers in '{}': {} rows outside [{:.3}, {:.3}]",
        column,
        rows.len(),
        lower_bound,
        upper_bound
    );

    Ok(IqrOutliers {
        column: column.to_string(),
        q1,
        q3,
        iqr,
        lower_bound,
        upper_bound,
        rows,
    })
}

/// Detect outliers in one column with the z-score rule.
///
/// Fails with [`AnalysisError::InsufficientVariance`] when the standard
/// deviation is zero, since every z-score would be undefined.
pub(crate) fn zscore_outliers(df: &DataFrame, column: &str, threshold: f64) -> Result<ZScoreOutliers> {
    let values = numeric_values(df, column)?;
    let present: Vec<f64> = values.iter().flatten().copied().collect();

    let (Some(mean), Some(std_dev)) = (mean(&present), population_std(&present)) else {
        return Err(AnalysisError::NoValidValues(column.to_string()));
    };
    if std_dev == 0.0 {
        return Err(AnalysisError::InsufficientVariance(column.to_string()));
    }

    let rows = flagged_rows(&values, |v| ((v - mean) / std_dev).abs() > threshold);

    debug!(
        "Z-score outliers in '{}': {} rows with |z| > {}",
        column,
        rows.len(),
        threshold
    );

    Ok(ZScoreOutliers {
        column: column.to_string(),
        mean,
        std_dev,
        threshold,
        count: rows.len(),
        rows,
    })
}
