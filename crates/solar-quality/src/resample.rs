//! Calendar-month resampling.
//!
//! Rows are grouped by the calendar month of a timestamp column and each
//! value column is averaged within its month. The input table is never
//! touched: the result is a new table with one row per month present in the
//! data, in chronological order.

use crate::error::{AnalysisError, Result};
use crate::types::MonthlyMean;
use crate::utils::{numeric_values, require_column};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::debug;

/// Name of the month column in resampled tables.
pub const MONTH_COLUMN: &str = "month";

/// Timestamp layouts accepted in string columns, tried in order.
const DATETIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// A calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    fn from_date(date: impl Datelike) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month.
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    /// Month formatted as `YYYY-MM`.
    pub fn label(&self) -> String {
        format!("{:04}-{:02}", self.year, self.month)
    }
}

/// Parse a timestamp string with the accepted layouts.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn datetime_from_physical(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let dt = match unit {
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
    }?;
    Some(dt.naive_utc())
}

fn unix_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

fn unparseable(column: &str, row: usize, value: impl Into<String>) -> AnalysisError {
    AnalysisError::UnparseableTimestamp {
        column: column.to_string(),
        row,
        value: value.into(),
    }
}

/// Calendar month of every row of the timestamp column.
///
/// Accepts `Datetime`, `Date` and `String` columns. A missing or
/// unparseable value fails with [`AnalysisError::UnparseableTimestamp`].
pub fn month_keys(df: &DataFrame, column: &str) -> Result<Vec<YearMonth>> {
    let series = require_column(df, column)?.as_materialized_series();

    match series.dtype() {
        DataType::Datetime(unit, _) => {
            let unit = *unit;
            let physical = series.cast(&DataType::Int64)?;
            physical
                .i64()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    let v = v.ok_or_else(|| unparseable(column, row, "null"))?;
                    datetime_from_physical(v, unit)
                        .map(YearMonth::from_date)
                        .ok_or_else(|| unparseable(column, row, v.to_string()))
                })
                .collect()
        }
        DataType::Date => {
            let epoch = unix_epoch();
            let physical = series.cast(&DataType::Int32)?;
            physical
                .i32()?
                .into_iter()
                .enumerate()
                .map(|(row, v)| {
                    let v = v.ok_or_else(|| unparseable(column, row, "null"))?;
                    epoch
                        .checked_add_signed(chrono::Duration::days(i64::from(v)))
                        .map(YearMonth::from_date)
                        .ok_or_else(|| unparseable(column, row, v.to_string()))
                })
                .collect()
        }
        DataType::String => series
            .str()?
            .into_iter()
            .enumerate()
            .map(|(row, v)| {
                let raw = v.ok_or_else(|| unparseable(column, row, "null"))?;
                parse_timestamp(raw)
                    .map(YearMonth::from_date)
                    .ok_or_else(|| unparseable(column, row, raw))
            })
            .collect(),
        _ => {
            let first = series
                .get(0)
                .map(|v| v.to_string())
                .unwrap_or_else(|_| series.dtype().to_string());
            Err(unparseable(column, 0, first))
        }
    }
}

/// Per-month means of the value columns.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyMeans {
    pub months: Vec<YearMonth>,
    /// One entry per value column, aligned with `months`.
    pub columns: Vec<(String, Vec<Option<f64>>)>,
}

impl MonthlyMeans {
    /// Group rows by month and average each value column.
    ///
    /// Missing values are ignored; a month where a column has no values
    /// yields `None` for that column.
    pub fn compute(df: &DataFrame, time_column: &str, value_columns: &[String]) -> Result<Self> {
        if df.height() == 0 {
            return Err(AnalysisError::EmptyTable);
        }

        let keys = month_keys(df, time_column)?;
        let values = value_columns
            .iter()
            .map(|name| numeric_values(df, name))
            .collect::<Result<Vec<_>>>()?;

        // (sum, count) per value column, per month
        let mut buckets: BTreeMap<YearMonth, Vec<(f64, usize)>> = BTreeMap::new();
        for (row, key) in keys.iter().enumerate() {
            let acc = buckets
                .entry(*key)
                .or_insert_with(|| vec![(0.0, 0); values.len()]);
            for (slot, column) in acc.iter_mut().zip(&values) {
                if let Some(v) = column[row] {
                    slot.0 += v;
                    slot.1 += 1;
                }
            }
        }

        let months: Vec<YearMonth> = buckets.keys().copied().collect();
        let columns = value_columns
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let means = buckets
                    .values()
                    .map(|acc| {
                        let (sum, count) = acc[i];
                        (count > 0).then(|| sum / count as f64)
                    })
                    .collect();
                (name.clone(), means)
            })
            .collect();

        debug!(
            "Resampled {} rows into {} months over {} columns",
            df.height(),
            months.len(),
            value_columns.len()
        );

        Ok(Self { months, columns })
    }

    /// Build a table with a `month` date column (first day of each month)
    /// followed by one `Float64` column per value column.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let epoch = unix_epoch();
        let days = self
            .months
            .iter()
            .map(|m| {
                m.first_day()
                    .map(|d| d.signed_duration_since(epoch).num_days() as i32)
                    .ok_or_else(|| {
                        AnalysisError::InvalidConfig(format!("invalid month {}", m.label()))
                    })
            })
            .collect::<Result<Vec<i32>>>()?;

        let mut columns = Vec::with_capacity(self.columns.len() + 1);
        columns.push(Column::new(MONTH_COLUMN.into(), days).cast(&DataType::Date)?);
        for (name, means) in &self.columns {
            columns.push(Column::new(name.as_str().into(), means));
        }

        Ok(DataFrame::new(columns)?)
    }

    /// Flatten into one record per (month, column).
    pub fn to_long(&self) -> Vec<MonthlyMean> {
        self.months
            .iter()
            .enumerate()
            .flat_map(|(i, month)| {
                self.columns.iter().map(move |(name, means)| MonthlyMean {
                    month: month.label(),
                    column: name.clone(),
                    mean: means[i],
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    // ==================== timestamp parsing ====================

    #[test]
    fn test_parse_timestamp_formats() {
        assert!(parse_timestamp("2021-08-09 00:01").is_some());
        assert!(parse_timestamp("2021-08-09T00:01:30").is_some());
        assert!(parse_timestamp("2021-08-09 00:01:30.250").is_some());
        assert!(parse_timestamp("2021-08-09T00:01:30Z").is_some());
        assert!(parse_timestamp("2021-08-09").is_some());
        assert!(parse_timestamp("08/09/2021 14:30").is_some());
        assert!(parse_timestamp("yesterday").is_none());
        assert!(parse_timestamp("").is_none());
    }

    #[test]
    fn test_month_keys_from_strings() {
        let df = df!("Timestamp" => &["2021-08-31 23:59", "2021-09-01 00:00"]).unwrap();
        let keys = month_keys(&df, "Timestamp").unwrap();
        assert_eq!(
            keys,
            vec![
                YearMonth { year: 2021, month: 8 },
                YearMonth { year: 2021, month: 9 },
            ]
        );
    }

    #[test]
    fn test_month_keys_unparseable_reports_row() {
        let df = df!("Timestamp" => &["2021-08-31 23:59", "not a date"]).unwrap();
        let err = month_keys(&df, "Timestamp").unwrap_err();
        match err {
            AnalysisError::UnparseableTimestamp { column, row, value } => {
                assert_eq!(column, "Timestamp");
                assert_eq!(row, 1);
                assert_eq!(value, "not a date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_month_keys_null_is_unparseable() {
        let df = df!("Timestamp" => &[Some("2021-08-31 23:59"), None]).unwrap();
        let err = month_keys(&df, "Timestamp").unwrap_err();
        assert_eq!(err.error_code(), "UNPARSEABLE_TIMESTAMP");
    }

    #[test]
    fn test_month_keys_numeric_column_rejected() {
        let df = df!("Timestamp" => &[1.0f64, 2.0]).unwrap();
        let err = month_keys(&df, "Timestamp").unwrap_err();
        assert_eq!(err.error_code(), "UNPARSEABLE_TIMESTAMP");
    }

    #[test]
    fn test_month_keys_from_datetime_column() {
        let micros: Vec<i64> = [(2022, 1, 15), (2022, 3, 2)]
            .iter()
            .map(|&(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .and_hms_opt(10, 0, 0)
                    .unwrap()
                    .and_utc()
                    .timestamp_micros()
            })
            .collect();
        let timestamps = Series::new("Timestamp".into(), micros)
            .cast(&DataType::Datetime(TimeUnit::Microseconds, None))
            .unwrap();
        let df = DataFrame::new(vec![timestamps.into()]).unwrap();

        let keys = month_keys(&df, "Timestamp").unwrap();
        assert_eq!(keys[0], YearMonth { year: 2022, month: 1 });
        assert_eq!(keys[1], YearMonth { year: 2022, month: 3 });
    }

    #[test]
    fn test_month_keys_from_date_column() {
        let epoch = unix_epoch();
        let days: Vec<i32> = [(2020, 2, 29), (2020, 3, 1)]
            .iter()
            .map(|&(y, m, d)| {
                NaiveDate::from_ymd_opt(y, m, d)
                    .unwrap()
                    .signed_duration_since(epoch)
                    .num_days() as i32
            })
            .collect();
        let dates = Series::new("Timestamp".into(), days)
            .cast(&DataType::Date)
            .unwrap();
        let df = DataFrame::new(vec![dates.into()]).unwrap();

        let keys = month_keys(&df, "Timestamp").unwrap();
        assert_eq!(keys[0], YearMonth { year: 2020, month: 2 });
        assert_eq!(keys[1], YearMonth { year: 2020, month: 3 });
    }

    // ==================== resampling ====================

    #[test]
    fn test_single_month_single_row() {
        let df = df!(
            "Timestamp" => &["2021-08-01 00:00", "2021-08-15 12:00", "2021-08-31 23:59"],
            "GHI" => &[100.0f64, 200.0, 600.0],
        )
        .unwrap();

        let monthly = MonthlyMeans::compute(&df, "Timestamp", &cols(&["GHI"])).unwrap();
        assert_eq!(monthly.months.len(), 1);
        assert_eq!(monthly.columns[0].1, vec![Some(300.0)]);
    }

    #[test]
    fn test_months_in_chronological_order() {
        let df = df!(
            "Timestamp" => &["2022-01-10", "2021-12-10", "2022-01-20", "2021-12-20"],
            "Tamb" => &[Some(20.0f64), Some(30.0), Some(22.0), None],
        )
        .unwrap();

        let monthly = MonthlyMeans::compute(&df, "Timestamp", &cols(&["Tamb"])).unwrap();
        assert_eq!(
            monthly.months,
            vec![
                YearMonth { year: 2021, month: 12 },
                YearMonth { year: 2022, month: 1 },
            ]
        );
        assert_eq!(monthly.columns[0].1, vec![Some(30.0), Some(21.0)]);
    }

    #[test]
    fn test_month_without_values_is_none() {
        let df = df!(
            "Timestamp" => &["2022-01-10", "2022-02-10"],
            "DNI" => &[Some(5.0f64), None],
        )
        .unwrap();
        let monthly = MonthlyMeans::compute(&df, "Timestamp", &cols(&["DNI"])).unwrap();
        assert_eq!(monthly.columns[0].1, vec![Some(5.0), None]);
    }

    #[test]
    fn test_to_frame_shape_and_input_untouched() {
        let df = df!(
            "Timestamp" => &["2022-01-10", "2022-02-10", "2022-02-11"],
            "GHI" => &[1.0f64, 2.0, 4.0],
            "DHI" => &[0.5f64, 0.5, 1.5],
        )
        .unwrap();
        let before = df.clone();

        let frame = MonthlyMeans::compute(&df, "Timestamp", &cols(&["GHI", "DHI"]))
            .unwrap()
            .to_frame()
            .unwrap();

        assert_eq!(frame.shape(), (2, 3));
        assert_eq!(frame.column(MONTH_COLUMN).unwrap().dtype(), &DataType::Date);
        let ghi: Vec<Option<f64>> = frame
            .column("GHI")
            .unwrap()
            .as_materialized_series()
            .f64()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(ghi, vec![Some(1.0), Some(3.0)]);
        assert!(df.equals_missing(&before));
    }

    #[test]
    fn test_to_long() {
        let df = df!(
            "Timestamp" => &["2022-01-10", "2022-02-10"],
            "GHI" => &[1.0f64, 2.0],
        )
        .unwrap();
        let long = MonthlyMeans::compute(&df, "Timestamp", &cols(&["GHI"]))
            .unwrap()
            .to_long();
        assert_eq!(long.len(), 2);
        assert_eq!(long[1].month, "2022-02");
        assert_eq!(long[1].mean, Some(2.0));
    }

    #[test]
    fn test_empty_table() {
        let df = df!(
            "Timestamp" => Vec::<&str>::new(),
            "GHI" => Vec::<f64>::new(),
        )
        .unwrap();
        let err = MonthlyMeans::compute(&df, "Timestamp", &cols(&["GHI"])).unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyTable));
    }
}
