use serde::{Deserialize, Serialize};

// ============================================================================
// Descriptive Statistics
// ============================================================================

/// Summary statistics for one numeric column.
///
/// Computed over the non-missing values. Moments that are undefined for the
/// sample size are `None`: variance needs two values, skewness three,
/// kurtosis four.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: String,
    /// Number of non-missing values.
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Sample variance (N-1 denominator).
    pub variance: Option<f64>,
    /// Sample standard deviation (N-1 denominator).
    pub std_dev: Option<f64>,
    /// Adjusted Fisher-Pearson skewness (G1).
    pub skewness: Option<f64>,
    /// Bias-adjusted excess kurtosis (G2).
    pub kurtosis: Option<f64>,
    pub min: f64,
    pub max: f64,
}

/// Five-number summary plus mean, the data behind a box plot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxSummary {
    pub count: usize,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
    pub mean: f64,
}

/// Equal-width histogram of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub column: String,
    /// Bin edges, one more than the number of bins.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

// ============================================================================
// Data Quality Reports
// ============================================================================

/// Missing entries of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingColumnReport {
    pub column: String,
    pub count: usize,
    /// `count / total_rows * 100`, rounded to two decimals.
    pub percentage: f64,
    /// Row indices holding a missing value.
    pub rows: Vec<usize>,
}

/// Missing values across a table. Only columns with at least one missing
/// entry are listed, in table order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingReport {
    pub total_rows: usize,
    pub columns: Vec<MissingColumnReport>,
}

impl MissingReport {
    /// Entry for a column, `None` when the column has no missing values.
    pub fn get(&self, column: &str) -> Option<&MissingColumnReport> {
        self.columns.iter().find(|c| c.column == column)
    }

    /// Whether any column has missing values.
    pub fn has_missing(&self) -> bool {
        !self.columns.is_empty()
    }
}

/// Count of negative values in a column expected to be non-negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegativeValueCount {
    pub column: String,
    pub count: usize,
}

/// Rows flagged by the IQR rule for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IqrOutliers {
    pub column: String,
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Row indices whose value lies strictly outside the bounds.
    pub rows: Vec<usize>,
}

impl IqrOutliers {
    pub fn count(&self) -> usize {
        self.rows.len()
    }
}

/// Rows flagged by the z-score rule for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZScoreOutliers {
    pub column: String,
    pub mean: f64,
    /// Population standard deviation (N denominator).
    pub std_dev: f64,
    pub threshold: f64,
    pub count: usize,
    pub rows: Vec<usize>,
}

/// Box summaries of the value columns for one cleaning-flag value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningGroup {
    pub flag: i64,
    pub rows: usize,
    /// One `(column, summary)` pair per value column with data in this group.
    pub summaries: Vec<(String, BoxSummary)>,
}

/// Sensor readings compared across cleaning states.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningImpact {
    pub flag_column: String,
    /// Groups ordered by flag value.
    pub groups: Vec<CleaningGroup>,
}

impl CleaningImpact {
    /// Summary of `column` within the group whose flag equals `flag`.
    pub fn summary(&self, flag: i64, column: &str) -> Option<&BoxSummary> {
        self.groups
            .iter()
            .find(|g| g.flag == flag)?
            .summaries
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, summary)| summary)
    }
}

/// Mean of one value column for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyMean {
    /// Month in `YYYY-MM` form.
    pub month: String,
    pub column: String,
    pub mean: Option<f64>,
}

// ============================================================================
// Full Report
// ============================================================================

/// Result of one full analysis pass over a table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub shape: (usize, usize),
    pub summary_statistics: Vec<ColumnStats>,
    pub missing_values: MissingReport,
    pub negative_values: Vec<NegativeValueCount>,
    pub iqr_outliers: Vec<IqrOutliers>,
    pub zscore_outliers: Vec<ZScoreOutliers>,
    /// Numeric columns left out of z-score detection because their standard
    /// deviation is zero.
    pub zscore_skipped: Vec<String>,
    /// Long-form monthly means; empty when no timestamp column was analyzed.
    pub monthly_means: Vec<MonthlyMean>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cleaning_impact: Option<CleaningImpact>,
    pub histograms: Vec<Histogram>,
    /// Box-plot summaries of the non-negative measurement columns.
    pub box_summaries: Vec<(String, BoxSummary)>,
}

static_assertions::assert_impl_all!(QualityReport: Send, Sync);
