//! Solar Sensor Data-Quality Library
//!
//! Statistical profiling and data-quality checks for tabular measurements
//! from solar monitoring stations, built on Polars.
//!
//! # Overview
//!
//! - **Summary Statistics**: mean, median, sample variance, skewness and kurtosis per column
//! - **Missing Values**: per-column counts, percentages and row indices
//! - **Physical Checks**: negative readings in channels that cannot go below zero
//! - **Outliers**: IQR fences and z-scores, reported as row indices
//! - **Monthly Resample**: calendar-month means over a timestamp column
//! - **Cleaning Impact**: module readings grouped by the sensor-cleaning flag
//!
//! All checks borrow the input table read-only; none of them alter it.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use solar_quality::{AnalysisConfig, DataQualityAnalyzer, io::load_table};
//!
//! let df = load_table("data/benin-malanville.csv")?;
//! let analyzer = DataQualityAnalyzer::new(AnalysisConfig::default());
//!
//! // Individual checks
//! let stats = analyzer.summary_statistics(&df, &["GHI", "DNI", "DHI"])?;
//! let spikes = analyzer.detect_outliers_iqr(&df, "ModA")?;
//! let monthly = analyzer.monthly_resample(&df, "Timestamp", &["GHI", "Tamb"])?;
//!
//! // Or everything at once
//! let report = analyzer.analyze(&df)?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//! ```
//!
//! # Configuration
//!
//! [`AnalysisConfig`] holds the column lists and thresholds used by
//! [`DataQualityAnalyzer::analyze`]:
//!
//! ```rust,ignore
//! use solar_quality::config::*;
//!
//! let config = AnalysisConfig::builder()
//!     .column_policy(ColumnPolicy::Lenient)   // skip absent columns instead of failing
//!     .iqr_multiplier(3.0)
//!     .zscore_threshold(2.5)
//!     .timestamp_column("Time")
//!     .build()?;
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod resample;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ColumnPolicy, ConfigValidationError};
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use io::{SiteDataset, load_table};
pub use profiler::DataProfiler;
pub use quality::DataQualityAnalyzer;
pub use reporting::{ReportGenerator, SiteReport};
pub use resample::{MONTH_COLUMN, MonthlyMeans, YearMonth};
pub use types::{
    BoxSummary, CleaningGroup, CleaningImpact, ColumnStats, Histogram, IqrOutliers,
    MissingColumnReport, MissingReport, MonthlyMean, NegativeValueCount, QualityReport,
    ZScoreOutliers,
};
pub use utils::{is_numeric_dtype, numeric_columns};
