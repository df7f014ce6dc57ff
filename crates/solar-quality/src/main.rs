//! CLI entry point for the solar data-quality analyzer.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use solar_quality::utils::has_column;
use solar_quality::{
    AnalysisConfig, AnalysisConfigBuilder, ColumnPolicy, DataQualityAnalyzer, QualityReport,
    ReportGenerator, SiteDataset, SiteReport,
};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Data-quality analysis for solar monitoring station exports",
    long_about = "Profiles solar sensor tables and flags data-quality issues: \
                  missing values, negative irradiance, IQR and z-score outliers, \
                  monthly means and the effect of panel cleaning.\n\n\
                  EXAMPLES:\n  \
                  # Analyze one site\n  \
                  solar-quality -i data/benin-malanville.csv\n\n  \
                  # Compare several sites and save JSON reports\n  \
                  solar-quality -i benin.csv -i togo.csv -i sierraleone.csv --emit-report -o reports/\n\n  \
                  # Machine-readable output\n  \
                  solar-quality -i benin.csv --json | jq '.[0].report.negative_values'"
)]
struct Args {
    /// Path to a site CSV or Parquet file (repeatable)
    #[arg(short, long, required = true)]
    input: Vec<PathBuf>,

    /// Output directory for reports and monthly tables
    #[arg(short, long, default_value = "./outputs")]
    output: PathBuf,

    /// Output JSON to stdout instead of a human-readable summary
    ///
    /// Disables all logging; only the reports are written.
    #[arg(long)]
    json: bool,

    /// Write <site>_report.json and <site>_monthly.csv to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    /// Skip configured columns that are absent instead of failing
    #[arg(long)]
    lenient_columns: bool,

    /// Absolute z-score above which a value is an outlier
    #[arg(long)]
    z_threshold: Option<f64>,

    /// IQR fence multiplier
    #[arg(long)]
    iqr_multiplier: Option<f64>,

    /// Name of the timestamp column used for monthly means
    #[arg(long)]
    timestamp_column: Option<String>,

    /// Number of histogram bins
    #[arg(long)]
    histogram_bins: Option<usize>,

    /// JSON file with analysis settings; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings, errors and the final summary
    #[arg(short, long)]
    quiet: bool,
}

/// Initialize the tracing subscriber.
///
/// Nothing is installed for JSON output so stdout carries only the reports.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Loaded first so RUST_LOG from .env reaches the filter
    dotenv().ok();
    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let analyzer = DataQualityAnalyzer::new(config);
    let generator = ReportGenerator::new(args.output.clone());
    if args.emit_report {
        info!("Writing reports to: {}", generator.output_dir().display());
    }

    let mut reports = Vec::with_capacity(args.input.len());
    for path in &args.input {
        let site = SiteDataset::load(path)
            .with_context(|| format!("Failed to load {}", path.display()))?;

        let report = analyzer
            .analyze(&site.frame)
            .with_context(|| format!("Failed to analyze site '{}'", site.name))?;
        let report = SiteReport::new(&site.name, &site.path, report);

        if args.emit_report {
            emit_site_outputs(&generator, &analyzer, &site, &report)?;
        }
        reports.push(report);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    for report in &reports {
        print_human_readable_summary(report);
    }
    if reports.len() > 1 {
        print_site_comparison(&reports, analyzer.config());
    }

    Ok(())
}

/// Start from the config file (or defaults) and apply flag overrides.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let base = match &args.config {
        Some(path) => {
            info!("Loading analysis config from: {}", path.display());
            AnalysisConfig::from_json_file(path)?
        }
        None => AnalysisConfig::default(),
    };

    let mut builder = AnalysisConfigBuilder::from_config(base);
    if args.lenient_columns {
        builder = builder.column_policy(ColumnPolicy::Lenient);
    }
    if let Some(threshold) = args.z_threshold {
        builder = builder.zscore_threshold(threshold);
    }
    if let Some(multiplier) = args.iqr_multiplier {
        builder = builder.iqr_multiplier(multiplier);
    }
    if let Some(ref column) = args.timestamp_column {
        builder = builder.timestamp_column(column);
    }
    if let Some(bins) = args.histogram_bins {
        builder = builder.histogram_bins(bins);
    }

    builder
        .build()
        .map_err(|e| anyhow!("Invalid analysis config: {}", e))
}

fn emit_site_outputs(
    generator: &ReportGenerator,
    analyzer: &DataQualityAnalyzer,
    site: &SiteDataset,
    report: &SiteReport,
) -> Result<()> {
    let report_path = generator.write_report_to_file(report, &site.name)?;
    info!("Report written to: {}", report_path.display());

    let config = analyzer.config();
    if has_column(&site.frame, &config.timestamp_column) {
        let monthly =
            analyzer.monthly_resample(&site.frame, &config.timestamp_column, &config.monthly_columns)?;
        generator.write_monthly_csv(&monthly, &site.name)?;
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn display_name(path: &str) -> &str {
    Path::new(path)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(path)
}

/// Print the per-site summary shown when `--json` is not set.
fn print_human_readable_summary(site: &SiteReport) {
    let report: &QualityReport = &site.report;

    println!();
    println!("{}", "=".repeat(80));
    println!("SITE: {}", site.site);
    println!("{}", "=".repeat(80));
    println!();
    println!(
        "Input: {} ({} rows x {} columns)",
        display_name(&site.input_file),
        report.shape.0,
        report.shape.1
    );
    println!();

    if !report.summary_statistics.is_empty() {
        println!("Summary Statistics:");
        println!(
            "  {:<10} {:>8} {:>10} {:>10} {:>10} {:>10} {:>8} {:>8}",
            "column", "count", "mean", "median", "std", "variance", "skew", "kurt"
        );
        for stats in &report.summary_statistics {
            println!(
                "  {:<10} {:>8} {:>10.2} {:>10.2} {:>10} {:>10} {:>8} {:>8}",
                stats.column,
                stats.count,
                stats.mean,
                stats.median,
                fmt_opt(stats.std_dev),
                fmt_opt(stats.variance),
                fmt_opt(stats.skewness),
                fmt_opt(stats.kurtosis)
            );
        }
        println!();
    }

    println!("Missing Values:");
    if report.missing_values.has_missing() {
        for column in &report.missing_values.columns {
            println!(
                "  {:<10} {:>8} ({:.2}%)",
                column.column, column.count, column.percentage
            );
        }
    } else {
        println!("  none");
    }
    println!();

    let negatives: Vec<_> = report.negative_values.iter().filter(|n| n.count > 0).collect();
    println!("Negative Values:");
    if negatives.is_empty() {
        println!("  none");
    }
    for negative in negatives {
        println!("  {:<10} {:>8}", negative.column, negative.count);
    }
    println!();

    if !report.iqr_outliers.is_empty() {
        println!("IQR Outliers:");
        for outliers in &report.iqr_outliers {
            println!(
                "  {:<10} {:>8} outside [{:.2}, {:.2}]",
                outliers.column,
                outliers.count(),
                outliers.lower_bound,
                outliers.upper_bound
            );
        }
        println!();
    }

    let flagged: Vec<_> = report.zscore_outliers.iter().filter(|z| z.count > 0).collect();
    if !flagged.is_empty() {
        println!("Z-Score Outliers:");
        for outliers in flagged {
            println!(
                "  {:<10} {:>8} with |z| > {}",
                outliers.column, outliers.count, outliers.threshold
            );
        }
        println!();
    }
    if !report.zscore_skipped.is_empty() {
        println!("Z-score skipped (no variance): {}", report.zscore_skipped.join(", "));
        println!();
    }

    if !report.monthly_means.is_empty() {
        println!("Monthly Means:");
        for mean in &report.monthly_means {
            println!("  {}  {:<10} {:>10}", mean.month, mean.column, fmt_opt(mean.mean));
        }
        println!();
    }

    if !report.box_summaries.is_empty() {
        println!("Box Summaries:");
        for (column, summary) in &report.box_summaries {
            println!(
                "  {:<10} min={:.2} q1={:.2} median={:.2} q3={:.2} max={:.2}",
                column, summary.min, summary.q1, summary.median, summary.q3, summary.max
            );
        }
        println!();
    }

    if let Some(ref impact) = report.cleaning_impact {
        println!("Cleaning Impact ({}):", impact.flag_column);
        for group in &impact.groups {
            for (column, summary) in &group.summaries {
                println!(
                    "  flag={} {:<6} n={:<8} median={:.2} mean={:.2} q1={:.2} q3={:.2}",
                    group.flag,
                    column,
                    summary.count,
                    summary.median,
                    summary.mean,
                    summary.q1,
                    summary.q3
                );
            }
        }
        println!();
    }

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save detailed JSON reports");
    println!("{}", "=".repeat(80));
}

/// Side-by-side means of the statistics columns across sites.
fn print_site_comparison(reports: &[SiteReport], config: &AnalysisConfig) {
    println!();
    println!("SITE COMPARISON (mean)");
    print!("  {:<10}", "column");
    for site in reports {
        print!(" {:>14}", site.site);
    }
    println!();

    for column in &config.statistics_columns {
        print!("  {:<10}", column);
        for site in reports {
            let mean = site
                .report
                .summary_statistics
                .iter()
                .find(|s| &s.column == column)
                .map(|s| s.mean);
            print!(" {:>14}", fmt_opt(mean));
        }
        println!();
    }
    println!("{}", "=".repeat(80));
}
