//! Configuration types for the data-quality analyzer.
//!
//! This module provides configuration options using the builder pattern.
//! The defaults describe the solar-site datasets: the column lists are the
//! measurements those files carry (irradiance, module sensors, wind,
//! ambient temperature, cleaning flag).

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// What to do when a requested column is absent from the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ColumnPolicy {
    /// Fail with [`AnalysisError::MissingColumn`]
    #[default]
    Strict,
    /// Skip the column and log a warning
    Lenient,
}

/// Configuration for the analyzer.
///
/// Use [`AnalysisConfig::builder()`] to create a new configuration
/// with fluent API.
///
/// # Example
///
/// ```rust,ignore
/// use solar_quality::config::{AnalysisConfig, ColumnPolicy};
///
/// let config = AnalysisConfig::builder()
///     .column_policy(ColumnPolicy::Lenient)
///     .zscore_threshold(2.5)
///     .build()?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Handling of requested columns that are absent from the table.
    /// Default: Strict
    pub column_policy: ColumnPolicy,

    /// Columns to compute summary statistics and histograms for.
    /// Default: RH, WS, GHI, DNI, DHI
    pub statistics_columns: Vec<String>,

    /// Columns whose values must be physically non-negative.
    /// Default: GHI, DNI, DHI, ModA, ModB, WS, WSgust
    pub non_negative_columns: Vec<String>,

    /// Columns checked with the IQR rule.
    /// Default: ModA, ModB, WS, WSgust
    pub iqr_columns: Vec<String>,

    /// Multiplier applied to the IQR to build the outlier fences.
    /// Default: 1.5
    pub iqr_multiplier: f64,

    /// Absolute z-score above which a value is an outlier.
    /// Default: 3.0
    pub zscore_threshold: f64,

    /// Name of the timestamp column used for monthly resampling.
    /// Default: "Timestamp"
    pub timestamp_column: String,

    /// Columns averaged per calendar month.
    /// Default: GHI, DNI, DHI, Tamb
    pub monthly_columns: Vec<String>,

    /// Name of the binary sensor-cleaning flag column.
    /// Default: "Cleaning"
    pub cleaning_column: String,

    /// Columns compared across cleaning states.
    /// Default: ModA, ModB
    pub cleaning_value_columns: Vec<String>,

    /// Number of equal-width histogram bins.
    /// Default: 30
    pub histogram_bins: usize,
}

fn names(columns: &[&str]) -> Vec<String> {
    columns.iter().map(|c| c.to_string()).collect()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            column_policy: ColumnPolicy::default(),
            statistics_columns: names(&["RH", "WS", "GHI", "DNI", "DHI"]),
            non_negative_columns: names(&["GHI", "DNI", "DHI", "ModA", "ModB", "WS", "WSgust"]),
            iqr_columns: names(&["ModA", "ModB", "WS", "WSgust"]),
            iqr_multiplier: 1.5,
            zscore_threshold: 3.0,
            timestamp_column: "Timestamp".to_string(),
            monthly_columns: names(&["GHI", "DNI", "DHI", "Tamb"]),
            cleaning_column: "Cleaning".to_string(),
            cleaning_value_columns: names(&["ModA", "ModB"]),
            histogram_bins: 30,
        }
    }
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }

    /// Read a configuration from a JSON file.
    ///
    /// Missing fields take their default values. The result is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: AnalysisConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if !(self.iqr_multiplier.is_finite() && self.iqr_multiplier > 0.0) {
            return Err(ConfigValidationError::NonPositive {
                field: "iqr_multiplier".to_string(),
                value: self.iqr_multiplier,
            });
        }

        if !(self.zscore_threshold.is_finite() && self.zscore_threshold > 0.0) {
            return Err(ConfigValidationError::NonPositive {
                field: "zscore_threshold".to_string(),
                value: self.zscore_threshold,
            });
        }

        if self.histogram_bins == 0 {
            return Err(ConfigValidationError::InvalidHistogramBins(
                self.histogram_bins,
            ));
        }

        if self.timestamp_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName(
                "timestamp_column".to_string(),
            ));
        }

        if self.cleaning_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName(
                "cleaning_column".to_string(),
            ));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid value for '{field}': {value} (must be a positive number)")]
    NonPositive { field: String, value: f64 },

    #[error("Invalid histogram bins: {0} (must be at least 1)")]
    InvalidHistogramBins(usize),

    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),
}

impl From<ConfigValidationError> for AnalysisError {
    fn from(err: ConfigValidationError) -> Self {
        AnalysisError::InvalidConfig(err.to_string())
    }
}

/// Builder for [`AnalysisConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    column_policy: Option<ColumnPolicy>,
    statistics_columns: Option<Vec<String>>,
    non_negative_columns: Option<Vec<String>>,
    iqr_columns: Option<Vec<String>>,
    iqr_multiplier: Option<f64>,
    zscore_threshold: Option<f64>,
    timestamp_column: Option<String>,
    monthly_columns: Option<Vec<String>>,
    cleaning_column: Option<String>,
    cleaning_value_columns: Option<Vec<String>>,
    histogram_bins: Option<usize>,
}

impl AnalysisConfigBuilder {
    /// Start from an existing configuration, e.g. one read from a file.
    pub fn from_config(config: AnalysisConfig) -> Self {
        Self {
            column_policy: Some(config.column_policy),
            statistics_columns: Some(config.statistics_columns),
            non_negative_columns: Some(config.non_negative_columns),
            iqr_columns: Some(config.iqr_columns),
            iqr_multiplier: Some(config.iqr_multiplier),
            zscore_threshold: Some(config.zscore_threshold),
            timestamp_column: Some(config.timestamp_column),
            monthly_columns: Some(config.monthly_columns),
            cleaning_column: Some(config.cleaning_column),
            cleaning_value_columns: Some(config.cleaning_value_columns),
            histogram_bins: Some(config.histogram_bins),
        }
    }

    /// Set how absent columns are handled.
    pub fn column_policy(mut self, policy: ColumnPolicy) -> Self {
        self.column_policy = Some(policy);
        self
    }

    /// Set the columns for summary statistics and histograms.
    pub fn statistics_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.statistics_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns checked for negative values.
    pub fn non_negative_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.non_negative_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the columns checked with the IQR rule.
    pub fn iqr_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.iqr_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the IQR fence multiplier.
    ///
    /// # Arguments
    /// * `multiplier` - Positive value (e.g., 1.5 for Tukey fences, 3.0 for "far out")
    pub fn iqr_multiplier(mut self, multiplier: f64) -> Self {
        self.iqr_multiplier = Some(multiplier);
        self
    }

    /// Set the absolute z-score threshold.
    pub fn zscore_threshold(mut self, threshold: f64) -> Self {
        self.zscore_threshold = Some(threshold);
        self
    }

    /// Set the timestamp column name.
    pub fn timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = Some(column.into());
        self
    }

    /// Set the columns averaged per month.
    pub fn monthly_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.monthly_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the cleaning flag column name.
    pub fn cleaning_column(mut self, column: impl Into<String>) -> Self {
        self.cleaning_column = Some(column.into());
        self
    }

    /// Set the columns compared across cleaning states.
    pub fn cleaning_value_columns<S: Into<String>>(
        mut self,
        columns: impl IntoIterator<Item = S>,
    ) -> Self {
        self.cleaning_value_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the number of histogram bins.
    pub fn histogram_bins(mut self, bins: usize) -> Self {
        self.histogram_bins = Some(bins);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `AnalysisConfig` or an error if validation fails.
    pub fn build(self) -> Result<AnalysisConfig, ConfigValidationError> {
        let defaults = AnalysisConfig::default();
        let config = AnalysisConfig {
            column_policy: self.column_policy.unwrap_or(defaults.column_policy),
            statistics_columns: self
                .statistics_columns
                .unwrap_or(defaults.statistics_columns),
            non_negative_columns: self
                .non_negative_columns
                .unwrap_or(defaults.non_negative_columns),
            iqr_columns: self.iqr_columns.unwrap_or(defaults.iqr_columns),
            iqr_multiplier: self.iqr_multiplier.unwrap_or(defaults.iqr_multiplier),
            zscore_threshold: self.zscore_threshold.unwrap_or(defaults.zscore_threshold),
            timestamp_column: self.timestamp_column.unwrap_or(defaults.timestamp_column),
            monthly_columns: self.monthly_columns.unwrap_or(defaults.monthly_columns),
            cleaning_column: self.cleaning_column.unwrap_or(defaults.cleaning_column),
            cleaning_value_columns: self
                .cleaning_value_columns
                .unwrap_or(defaults.cleaning_value_columns),
            histogram_bins: self.histogram_bins.unwrap_or(defaults.histogram_bins),
        };

        config.validate()?;
        Ok(config)
    }
}
