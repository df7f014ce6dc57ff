//! Report output.
//!
//! [`SiteReport`] wraps a [`QualityReport`](crate::types::QualityReport) with
//! the metadata needed to tell reports apart once they are on disk. It is
//! used for both JSON on stdout (`--json`) and JSON files (`--emit-report`).
//!
//! # Example
//!
//! ```rust,ignore
//! use solar_quality::reporting::{ReportGenerator, SiteReport};
//!
//! let report = SiteReport::new("benin", "data/benin.csv", quality_report);
//! let generator = ReportGenerator::new(PathBuf::from("outputs"));
//! generator.write_report_to_file(&report, "benin")?;
//! ```

mod generator;

pub use generator::{ReportGenerator, SiteReport};
