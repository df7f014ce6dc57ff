use super::{cleaning, missing, outliers};
use crate::config::{AnalysisConfig, ColumnPolicy};
use crate::error::{AnalysisError, Result, ResultExt};
use crate::profiler::DataProfiler;
use crate::resample::MonthlyMeans;
use crate::types::{
    BoxSummary, CleaningImpact, ColumnStats, Histogram, IqrOutliers, MissingReport,
    NegativeValueCount, QualityReport, ZScoreOutliers,
};
use crate::utils::{ensure_not_empty, has_column, numeric_columns, numeric_values, resolve_columns};
use polars::prelude::*;
use tracing::{debug, info, warn};

/// Computes statistics and flags data-quality issues over a table.
///
/// Every operation borrows the table read-only and returns freshly computed
/// values; nothing is cached between calls. An empty table is always an
/// error, and requested columns that are absent are handled according to
/// [`AnalysisConfig::column_policy`].
#[derive(Debug, Clone, Default)]
pub struct DataQualityAnalyzer {
    config: AnalysisConfig,
}

impl DataQualityAnalyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    fn policy(&self) -> ColumnPolicy {
        self.config.column_policy
    }

    /// Summary statistics for each requested column present in the table.
    pub fn summary_statistics<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        columns: &[S],
    ) -> Result<Vec<ColumnStats>> {
        ensure_not_empty(df)?;
        resolve_columns(df, columns, self.policy())?
            .iter()
            .map(|name| DataProfiler::column_stats(df, name))
            .collect()
    }

    /// Missing entries per column; only columns with at least one are listed.
    pub fn missing_value_report(&self, df: &DataFrame) -> Result<MissingReport> {
        missing::missing_value_report(df)
    }

    /// Count of values below zero in each column expected to be non-negative.
    pub fn negative_value_check<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        columns: &[S],
    ) -> Result<Vec<NegativeValueCount>> {
        ensure_not_empty(df)?;
        resolve_columns(df, columns, self.policy())?
            .into_iter()
            .map(|column| {
                let count = numeric_values(df, &column)?
                    .into_iter()
                    .flatten()
                    .filter(|v| *v < 0.0)
                    .count();
                if count > 0 {
                    debug!("Column '{}' has {} negative values", column, count);
                }
                Ok(NegativeValueCount { column, count })
            })
            .collect()
    }

    /// Rows outside the IQR fences of one column.
    ///
    /// The column is required regardless of the column policy.
    pub fn detect_outliers_iqr(&self, df: &DataFrame, column: &str) -> Result<IqrOutliers> {
        ensure_not_empty(df)?;
        let multiplier = self.config.iqr_multiplier;
        if !(multiplier.is_finite() && multiplier > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "IQR multiplier must be positive, got {}",
                multiplier
            )));
        }
        outliers::iqr_outliers(df, column, multiplier)
    }

    /// Rows whose absolute z-score exceeds `threshold`, per column.
    ///
    /// An empty `columns` slice selects every numeric column. A column with
    /// zero standard deviation fails with [`AnalysisError::InsufficientVariance`].
    pub fn detect_outliers_zscore<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        columns: &[S],
        threshold: f64,
    ) -> Result<Vec<ZScoreOutliers>> {
        ensure_not_empty(df)?;
        if !(threshold.is_finite() && threshold > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "z-score threshold must be positive, got {}",
                threshold
            )));
        }

        let columns = if columns.is_empty() {
            numeric_columns(df)
        } else {
            resolve_columns(df, columns, self.policy())?
        };

        columns
            .iter()
            .map(|name| outliers::zscore_outliers(df, name, threshold))
            .collect()
    }

    /// Mean of each value column per calendar month, as a new table.
    ///
    /// The result has a `month` date column (first day of the month) and one
    /// row per month present, in chronological order.
    pub fn monthly_resample<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        time_column: &str,
        value_columns: &[S],
    ) -> Result<DataFrame> {
        self.monthly_means(df, time_column, value_columns)?.to_frame()
    }

    /// Same grouping as [`Self::monthly_resample`], kept in structured form.
    pub fn monthly_means<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        time_column: &str,
        value_columns: &[S],
    ) -> Result<MonthlyMeans> {
        ensure_not_empty(df)?;
        if !has_column(df, time_column) {
            return Err(AnalysisError::MissingColumn(time_column.to_string()));
        }
        let columns = resolve_columns(df, value_columns, self.policy())?;
        MonthlyMeans::compute(df, time_column, &columns)
    }

    /// Box summaries of the value columns grouped by a cleaning flag.
    pub fn cleaning_impact<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        flag_column: &str,
        value_columns: &[S],
    ) -> Result<CleaningImpact> {
        ensure_not_empty(df)?;
        let columns = resolve_columns(df, value_columns, self.policy())?;
        cleaning::cleaning_impact(df, flag_column, &columns)
    }

    /// Five-number summary plus mean for each requested column.
    ///
    /// Columns without any non-missing value are left out.
    pub fn box_summaries<S: AsRef<str>>(
        &self,
        df: &DataFrame,
        columns: &[S],
    ) -> Result<Vec<(String, BoxSummary)>> {
        ensure_not_empty(df)?;
        let mut summaries = Vec::new();
        for name in resolve_columns(df, columns, self.policy())? {
            match DataProfiler::box_summary(df, &name) {
                Ok(summary) => summaries.push((name, summary)),
                Err(AnalysisError::NoValidValues(_)) => {
                    debug!("No values in '{}', no box summary", name);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(summaries)
    }

    /// Equal-width histogram of one column.
    pub fn histogram(&self, df: &DataFrame, column: &str, bins: usize) -> Result<Histogram> {
        ensure_not_empty(df)?;
        DataProfiler::histogram(df, column, bins)
    }

    /// Run every check with the configured column lists.
    ///
    /// Numeric columns whose z-scores are undefined (zero variance, or no
    /// values at all) are recorded in `zscore_skipped` rather than failing
    /// the whole pass. The timestamp and cleaning columns are optional under
    /// the lenient policy and required under the strict one.
    pub fn analyze(&self, df: &DataFrame) -> Result<QualityReport> {
        ensure_not_empty(df)?;
        let config = &self.config;
        info!("Analyzing table with shape {:?}", df.shape());

        let summary_statistics = self
            .summary_statistics(df, &config.statistics_columns)
            .context("Summary statistics")?;

        let missing_values = self.missing_value_report(df).context("Missing values")?;

        let negative_values = self
            .negative_value_check(df, &config.non_negative_columns)
            .context("Negative values")?;

        let iqr_outliers = resolve_columns(df, &config.iqr_columns, self.policy())?
            .iter()
            .map(|name| self.detect_outliers_iqr(df, name))
            .collect::<Result<Vec<_>>>()
            .context("IQR outliers")?;

        let mut zscore_outliers = Vec::new();
        let mut zscore_skipped = Vec::new();
        for name in numeric_columns(df) {
            match outliers::zscore_outliers(df, &name, config.zscore_threshold) {
                Ok(result) => zscore_outliers.push(result),
                Err(AnalysisError::InsufficientVariance(_) | AnalysisError::NoValidValues(_)) => {
                    warn!("Z-score undefined for column '{}', skipping", name);
                    zscore_skipped.push(name);
                }
                Err(e) => return Err(e.with_context("Z-score outliers")),
            }
        }

        let monthly_means = if self.optional_column(df, &config.timestamp_column)? {
            self.monthly_means(df, &config.timestamp_column, &config.monthly_columns)
                .context("Monthly resample")?
                .to_long()
        } else {
            Vec::new()
        };

        let cleaning_impact = if self.optional_column(df, &config.cleaning_column)? {
            Some(
                self.cleaning_impact(df, &config.cleaning_column, &config.cleaning_value_columns)
                    .context("Cleaning impact")?,
            )
        } else {
            None
        };

        let histograms = summary_statistics
            .iter()
            .map(|stats| DataProfiler::histogram(df, &stats.column, config.histogram_bins))
            .collect::<Result<Vec<_>>>()
            .context("Histograms")?;

        let box_summaries = self
            .box_summaries(df, &config.non_negative_columns)
            .context("Box summaries")?;

        info!(
            "Analysis complete: {} columns with missing values, {} IQR checks, {} z-score checks",
            missing_values.columns.len(),
            iqr_outliers.len(),
            zscore_outliers.len()
        );

        Ok(QualityReport {
            shape: df.shape(),
            summary_statistics,
            missing_values,
            negative_values,
            iqr_outliers,
            zscore_outliers,
            zscore_skipped,
            monthly_means,
            cleaning_impact,
            histograms,
            box_summaries,
        })
    }

    /// Whether an optional single column takes part in the full pass.
    fn optional_column(&self, df: &DataFrame, name: &str) -> Result<bool> {
        if has_column(df, name) {
            return Ok(true);
        }
        match self.policy() {
            ColumnPolicy::Strict => Err(AnalysisError::MissingColumn(name.to_string())),
            ColumnPolicy::Lenient => {
                warn!("Column '{}' not present, skipping dependent checks", name);
                Ok(false)
            }
        }
    }
}
