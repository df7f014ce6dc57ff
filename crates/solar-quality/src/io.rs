//! Loading site tables from disk.
//!
//! CSV files are read with a sequence of increasingly forgiving strategies,
//! since field exports are often hand-edited. Parquet files are read as-is.

use crate::error::{AnalysisError, Result, ResultExt};
use polars::prelude::*;
use std::fs::File;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// One site's measurements, loaded and named.
#[derive(Debug, Clone)]
pub struct SiteDataset {
    /// Site label, taken from the file stem (`benin.csv` gives `benin`).
    pub name: String,
    pub path: PathBuf,
    pub frame: DataFrame,
}

impl SiteDataset {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let frame = load_table(path)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "site".to_string());

        info!(
            "Loaded site '{}' from {}: {} rows x {} columns",
            name,
            path.display(),
            frame.height(),
            frame.width()
        );

        Ok(Self {
            name,
            path: path.to_path_buf(),
            frame,
        })
    }
}

/// Load a table from a `.csv` or `.parquet` file.
///
/// Any extension other than `parquet` is treated as CSV.
pub fn load_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(AnalysisError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("input file not found: {}", path.display()),
        )));
    }

    let is_parquet = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

    if is_parquet {
        let file = File::open(path)?;
        ParquetReader::new(file)
            .finish()
            .context(format!("Reading parquet {}", path.display()))
    } else {
        load_csv_with_fallbacks(path)
    }
}

fn csv_options(quoted: bool, infer_schema_rows: Option<usize>) -> CsvReadOptions {
    let mut parse = CsvParseOptions::default().with_try_parse_dates(true);
    if quoted {
        parse = parse.with_quote_char(Some(b'"'));
    } else {
        parse = parse.with_quote_char(None);
    }
    CsvReadOptions::default()
        .with_infer_schema_length(infer_schema_rows)
        .with_has_header(true)
        .with_parse_options(parse)
}

/// Try standard quoting, then a full-file schema scan, then no quoting, then
/// a pre-cleaned copy of the text.
///
/// Every fallback after the first infers the schema from the whole file.
fn load_csv_with_fallbacks(path: &Path) -> Result<DataFrame> {
    match csv_options(true, Some(INFER_SCHEMA_ROWS))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("Standard CSV loading failed: {}", e),
    }

    match csv_options(true, None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("CSV loading with full schema scan failed: {}", e),
    }

    match csv_options(false, None)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => debug!("CSV loading without quotes failed: {}", e),
    }

    let content = std::fs::read_to_string(path)?;
    csv_options(true, None)
        .into_reader_with_file_handle(Cursor::new(clean_csv_content(&content)))
        .finish()
        .context(format!("Reading CSV {}", path.display()))
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_load_csv_with_missing_cells() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "togo.csv",
            "Timestamp,GHI,Comments\n2022-01-01 00:00,1.5,\n2022-01-01 00:01,,ok\n",
        );

        let site = SiteDataset::load(&path).unwrap();
        assert_eq!(site.name, "togo");
        assert_eq!(site.frame.shape(), (2, 3));

        let ghi = site.frame.column("GHI").unwrap();
        assert_eq!(ghi.null_count(), 1);
    }

    #[test]
    fn test_late_decimal_after_integer_rows() {
        let dir = TempDir::new().unwrap();
        let mut content = String::from("Timestamp,GHI\n");
        for minute in 0..150 {
            content.push_str(&format!("2022-01-01 {:02}:{:02},0\n", minute / 60, minute % 60));
        }
        content.push_str("2022-01-01 02:30,12.5\n");
        let path = write_file(&dir, "night.csv", &content);

        let df = load_table(&path).unwrap();
        assert_eq!(df.height(), 151);
        let ghi = df.column("GHI").unwrap().as_materialized_series();
        assert_eq!(ghi.dtype(), &DataType::Float64);
        assert_eq!(ghi.f64().unwrap().get(150), Some(12.5));
    }

    #[test]
    fn test_clean_csv_content() {
        let cleaned = clean_csv_content("a,b\n\n\"\"x\"\",1\n   \n");
        assert_eq!(cleaned, "a,b\n\"x\",1");
    }

    #[test]
    fn test_missing_file() {
        let err = load_table("/definitely/not/here.csv").unwrap_err();
        assert_eq!(err.error_code(), "IO_ERROR");
    }

    #[test]
    fn test_parquet_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.parquet");
        let mut df = df!("GHI" => &[1.0f64, 2.0], "Cleaning" => &[0i64, 1]).unwrap();
        ParquetWriter::new(File::create(&path).unwrap())
            .finish(&mut df)
            .unwrap();

        let loaded = load_table(&path).unwrap();
        assert!(loaded.equals_missing(&df));
    }
}
