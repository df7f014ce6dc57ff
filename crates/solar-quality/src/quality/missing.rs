//! Missing-value detection.

use crate::error::{AnalysisError, Result};
use crate::types::{MissingColumnReport, MissingReport};
use crate::utils::{is_numeric_dtype, round2};
use polars::prelude::*;

/// Row indices of missing entries in one column.
///
/// Nulls are missing in every dtype; `NaN` is also missing in float columns.
fn missing_rows(col: &Column) -> Result<Vec<usize>> {
    let series = col.as_materialized_series();

    if is_numeric_dtype(series.dtype()) {
        let float_series = series.cast(&DataType::Float64)?;
        let rows = float_series
            .f64()?
            .into_iter()
            .enumerate()
            .filter(|(_, v)| v.is_none_or(f64::is_nan))
            .map(|(row, _)| row)
            .collect();
        return Ok(rows);
    }

    let nulls = series.is_null();
    let rows = nulls
        .into_iter()
        .enumerate()
        .filter(|(_, is_null)| is_null.unwrap_or(false))
        .map(|(row, _)| row)
        .collect();
    Ok(rows)
}

/// Build the missing-value report for every column of the table.
pub(crate) fn missing_value_report(df: &DataFrame) -> Result<MissingReport> {
    let total_rows = df.height();
    if total_rows == 0 {
        return Err(AnalysisError::EmptyTable);
    }

    let mut columns = Vec::new();
    for col in df.get_columns() {
        let rows = missing_rows(col)?;
        if rows.is_empty() {
            continue;
        }
        let count = rows.len();
        columns.push(MissingColumnReport {
            column: col.name().to_string(),
            count,
            percentage: round2(count as f64 / total_rows as f64 * 100.0),
            rows,
        });
    }

    Ok(MissingReport {
        total_rows,
        columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reports_only_columns_with_missing() {
        let df = df!(
            "GHI" => &[Some(1.0f64), None, Some(3.0)],
            "DNI" => &[1.0f64, 2.0, 3.0],
            "Comments" => &[None::<&str>, None, None],
        )
        .unwrap();

        let report = missing_value_report(&df).unwrap();
        assert_eq!(report.total_rows, 3);
        assert_eq!(
            report.columns,
            vec![
                MissingColumnReport {
                    column: "GHI".to_string(),
                    count: 1,
                    percentage: 33.33,
                    rows: vec![1],
                },
                MissingColumnReport {
                    column: "Comments".to_string(),
                    count: 3,
                    percentage: 100.0,
                    rows: vec![0, 1, 2],
                },
            ]
        );
        assert!(report.get("DNI").is_none());
    }

    #[test]
    fn test_nan_counts_as_missing() {
        let df = df!("Tamb" => &[f64::NAN, 25.0, f64::NAN]).unwrap();
        let report = missing_value_report(&df).unwrap();
        let tamb = report.get("Tamb").unwrap();
        assert_eq!(tamb.count, 2);
        assert_eq!(tamb.rows, vec![0, 2]);
        assert_eq!(tamb.percentage, 66.67);
    }

    #[test]
    fn test_no_missing_values() {
        let df = df!("WS" => &[1.0f64, 2.0]).unwrap();
        let report = missing_value_report(&df).unwrap();
        assert!(!report.has_missing());
    }

    #[test]
    fn test_empty_table() {
        let df = df!("WS" => Vec::<f64>::new()).unwrap();
        let err = missing_value_report(&df).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyTable));
    }
}
