//! Data-quality checks.
//!
//! [`DataQualityAnalyzer`] is the entry point; the submodules hold the
//! per-check logic it dispatches to:
//! - `missing`: null and `NaN` detection per column
//! - `outliers`: IQR fences and z-scores
//! - `cleaning`: sensor readings grouped by cleaning state

mod analyzer;
mod cleaning;
mod missing;
mod outliers;

pub use analyzer::DataQualityAnalyzer;
