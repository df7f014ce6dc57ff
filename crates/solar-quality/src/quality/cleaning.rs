//! Comparison of sensor readings across sensor-cleaning states.

use crate::error::{AnalysisError, Result};
use crate::profiler::statistics::box_summary;
use crate::types::{CleaningGroup, CleaningImpact};
use crate::utils::{is_numeric_dtype, numeric_values, require_column};
use polars::prelude::*;
use std::collections::BTreeMap;

/// Integer flag per row; `None` where the flag is missing.
fn flag_values(df: &DataFrame, flag_column: &str) -> Result<Vec<Option<i64>>> {
    let series = require_column(df, flag_column)?.as_materialized_series();

    match series.dtype() {
        DataType::Boolean => {
            let ints = series.cast(&DataType::Int64)?;
            Ok(ints.i64()?.into_iter().collect())
        }
        DataType::Float32 | DataType::Float64 => numeric_values(df, flag_column)?
            .into_iter()
            .enumerate()
            .map(|(row, v)| match v {
                Some(v) if v.fract() != 0.0 => Err(AnalysisError::InvalidConfig(format!(
                    "flag column '{}' holds non-integer value {} at row {}",
                    flag_column, v, row
                ))),
                other => Ok(other.map(|v| v as i64)),
            })
            .collect(),
        dtype if is_numeric_dtype(dtype) => {
            let ints = series.cast(&DataType::Int64)?;
            Ok(ints.i64()?.into_iter().collect())
        }
        dtype => Err(AnalysisError::NonNumericColumn {
            column: flag_column.to_string(),
            dtype: dtype.to_string(),
        }),
    }
}

/// Group the value columns by flag value and summarize each group.
///
/// Rows with a missing flag are skipped. Groups are ordered by flag value;
/// a value column with no data inside a group is left out of that group.
pub(crate) fn cleaning_impact(
    df: &DataFrame,
    flag_column: &str,
    value_columns: &[String],
) -> Result<CleaningImpact> {
    let flags = flag_values(df, flag_column)?;

    let mut group_rows: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for (row, flag) in flags.iter().enumerate() {
        if let Some(flag) = flag {
            group_rows.entry(*flag).or_default().push(row);
        }
    }

    let columns = value_columns
        .iter()
        .map(|name| Ok((name.as_str(), numeric_values(df, name)?)))
        .collect::<Result<Vec<_>>>()?;

    let groups = group_rows
        .into_iter()
        .map(|(flag, rows)| {
            let summaries = columns
                .iter()
                .filter_map(|(name, values)| {
                    let group_values: Vec<f64> = rows.iter().filter_map(|&r| values[r]).collect();
                    box_summary(&group_values).map(|summary| (name.to_string(), summary))
                })
                .collect();
            CleaningGroup {
                flag,
                rows: rows.len(),
                summaries,
            }
        })
        .collect();

    Ok(CleaningImpact {
        flag_column: flag_column.to_string(),
        groups,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_groups_by_flag_value() {
        let df = df!(
            "Cleaning" => &[0i64, 0, 1, 1, 0],
            "ModA" => &[10.0f64, 20.0, 100.0, 110.0, 30.0],
            "ModB" => &[Some(1.0f64), Some(2.0), None, Some(4.0), Some(3.0)],
        )
        .unwrap();

        let impact = cleaning_impact(&df, "Cleaning", &cols(&["ModA", "ModB"])).unwrap();
        assert_eq!(impact.groups.len(), 2);
        assert_eq!(impact.groups[0].flag, 0);
        assert_eq!(impact.groups[0].rows, 3);

        let dirty = impact.summary(0, "ModA").unwrap();
        assert_eq!(dirty.median, 20.0);
        assert_eq!(dirty.mean, 20.0);

        let cleaned = impact.summary(1, "ModA").unwrap();
        assert_eq!(cleaned.mean, 105.0);

        let cleaned_b = impact.summary(1, "ModB").unwrap();
        assert_eq!(cleaned_b.count, 1);
    }

    #[test]
    fn test_boolean_flag() {
        let df = df!(
            "Cleaning" => &[true, false, true],
            "ModA" => &[3.0f64, 1.0, 5.0],
        )
        .unwrap();
        let impact = cleaning_impact(&df, "Cleaning", &cols(&["ModA"])).unwrap();
        assert_eq!(impact.summary(1, "ModA").unwrap().mean, 4.0);
        assert_eq!(impact.summary(0, "ModA").unwrap().mean, 1.0);
    }

    #[test]
    fn test_missing_flags_skipped() {
        let df = df!(
            "Cleaning" => &[Some(1i64), None, Some(1)],
            "ModA" => &[1.0f64, 1000.0, 3.0],
        )
        .unwrap();
        let impact = cleaning_impact(&df, "Cleaning", &cols(&["ModA"])).unwrap();
        assert_eq!(impact.groups.len(), 1);
        assert_eq!(impact.summary(1, "ModA").unwrap().max, 3.0);
    }

    #[test]
    fn test_fractional_flag_rejected() {
        let df = df!(
            "Cleaning" => &[0.0f64, 0.5],
            "ModA" => &[1.0f64, 2.0],
        )
        .unwrap();
        let err = cleaning_impact(&df, "Cleaning", &cols(&["ModA"])).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIG");
    }

    #[test]
    fn test_string_flag_rejected() {
        let df = df!(
            "Cleaning" => &["yes", "no"],
            "ModA" => &[1.0f64, 2.0],
        )
        .unwrap();
        let err = cleaning_impact(&df, "Cleaning", &cols(&["ModA"])).unwrap_err();
        assert!(matches!(err, AnalysisError::NonNumericColumn { .. }));
    }
}
