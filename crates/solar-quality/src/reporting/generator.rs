use crate::error::Result;
use crate::types::QualityReport;
use chrono::Local;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

/// Quality report for one site, with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteReport {
    pub site: String,
    pub input_file: String,
    /// Local time the report was generated, RFC 3339.
    pub generated_at: String,
    pub report: QualityReport,
}

impl SiteReport {
    pub fn new(site: impl Into<String>, input_file: impl AsRef<Path>, report: QualityReport) -> Self {
        Self {
            site: site.into(),
            input_file: input_file.as_ref().display().to_string(),
            generated_at: Local::now().to_rfc3339(),
            report,
        }
    }
}

/// Writes reports and derived tables under one output directory.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `<output_dir>/<base_name>_report.json`.
    pub fn write_report_to_file(&self, report: &SiteReport, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self.output_dir.join(format!("{}_report.json", base_name));
        let mut file = File::create(&report_path)?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }

    /// Write a monthly-resampled table to `<output_dir>/<base_name>_monthly.csv`.
    pub fn write_monthly_csv(&self, monthly: &DataFrame, base_name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;

        let output_path = self.output_dir.join(format!("{}_monthly.csv", base_name));
        let mut file = File::create(&output_path)?;
        let mut monthly = monthly.clone();
        CsvWriter::new(&mut file)
            .include_header(true)
            .with_separator(b',')
            .finish(&mut monthly)?;

        info!("Monthly table saved: {}", output_path.display());

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MissingReport;
    use tempfile::TempDir;

    fn empty_report() -> QualityReport {
        QualityReport {
            shape: (3, 1),
            summary_statistics: Vec::new(),
            missing_values: MissingReport {
                total_rows: 3,
                columns: Vec::new(),
            },
            negative_values: Vec::new(),
            iqr_outliers: Vec::new(),
            zscore_outliers: Vec::new(),
            zscore_skipped: Vec::new(),
            monthly_means: Vec::new(),
            cleaning_impact: None,
            histograms: Vec::new(),
            box_summaries: Vec::new(),
        }
    }

    #[test]
    fn test_write_report_to_file() {
        let dir = TempDir::new().unwrap();
        let generator = ReportGenerator::new(dir.path().join("reports"));
        let report = SiteReport::new("benin", "data/benin.csv", empty_report());

        let path = generator.write_report_to_file(&report, &report.site).unwrap();
        assert_eq!(path.file_name().unwrap(), "benin_report.json");

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["site"], "benin");
        assert_eq!(json["input_file"], "data/benin.csv");
        assert_eq!(json["report"]["shape"][0], 3);
        assert!(json["report"].get("cleaning_impact").is_none());
    }

    #[test]
    fn test_write_monthly_csv() {
        let dir = TempDir::new().unwrap();
        let generator = ReportGenerator::new(dir.path().to_path_buf());
        let monthly = df!("GHI" => &[Some(1.5f64), None]).unwrap();

        let path = generator.write_monthly_csv(&monthly, "togo").unwrap();
        let content = fs::read_to_string(path).unwrap();
        assert_eq!(content.lines().next(), Some("GHI"));
        assert_eq!(content.lines().count(), 3);
    }
}
