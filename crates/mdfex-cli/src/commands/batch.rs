//! Batch processing command for multiple report files.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, warn};

use mdfex_core::models::config::MdfexConfig;
use mdfex_core::models::record::ExtractionResult;
use mdfex_core::pdf::{PdfExtractor, PdfProcessor};
use mdfex_core::report::{ManifestReportParser, ReportParser};
use mdfex_core::store::{ManifestStore, PersistSummary};

use crate::store::SqliteStore;

/// Arguments for the batch command.
#[derive(Args)]
pub struct BatchArgs {
    /// Input files or glob pattern
    #[arg(required = true)]
    input: String,

    /// Output directory
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Output format for each file
    #[arg(short, long, value_enum, default_value = "json")]
    format: super::process::OutputFormat,

    /// Also generate a summary CSV
    #[arg(long)]
    summary: bool,

    /// Continue on error
    #[arg(long)]
    continue_on_error: bool,

    /// SQLite database to persist records into
    #[arg(long, requires = "flight", requires = "registration_date")]
    database: Option<PathBuf>,

    /// Flight number to file the records under
    #[arg(long, requires = "database")]
    flight: Option<String>,

    /// Registration date (YYYY-MM-DD) to file the records under
    #[arg(long, requires = "database")]
    registration_date: Option<NaiveDate>,
}

/// Result of processing a single file.
struct FileResult {
    path: PathBuf,
    result: Option<ExtractionResult>,
    persisted: Option<PersistSummary>,
    error: Option<String>,
    processing_time_ms: u64,
}

pub async fn run(args: BatchArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        MdfexConfig::from_file(std::path::Path::new(path))?
    } else {
        MdfexConfig::default()
    };

    // Expand glob pattern
    let files: Vec<PathBuf> = glob(&args.input)?
        .filter_map(|r| r.ok())
        .filter(|p| {
            let ext = p.extension().and_then(|e| e.to_str()).unwrap_or("");
            ext.eq_ignore_ascii_case("pdf")
        })
        .collect();

    if files.is_empty() {
        anyhow::bail!("No matching files found for pattern: {}", args.input);
    }

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );

    // Create output directory if specified
    if let Some(ref output_dir) = args.output_dir {
        fs::create_dir_all(output_dir)?;
    }

    // A single shared store so duplicates are skipped across files too
    let mut store = match &args.database {
        Some(path) => {
            Some(SqliteStore::open(path).map_err(|e| anyhow::anyhow!("opening store: {}", e))?)
        }
        None => None,
    };

    let overall_pb = ProgressBar::new(files.len() as u64);
    overall_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let parser =
        ManifestReportParser::new().with_unnumbered_terms(config.extraction.keep_unnumbered_terms);

    let mut results = Vec::with_capacity(files.len());
    for path in files {
        let file_start = Instant::now();

        match process_single_file(&path, &parser, &config) {
            Ok(result) => {
                let persisted = match (&mut store, &args.registration_date) {
                    (Some(store), Some(date)) => {
                        let flight = args.flight.as_deref().unwrap_or_default();
                        match store.persist(&result.records, flight, *date) {
                            Ok(summary) => Some(summary),
                            Err(e) => {
                                overall_pb.finish_and_clear();
                                anyhow::bail!("persisting records from {}: {}", path.display(), e);
                            }
                        }
                    }
                    _ => None,
                };

                results.push(FileResult {
                    path: path.clone(),
                    result: Some(result),
                    persisted,
                    error: None,
                    processing_time_ms: file_start.elapsed().as_millis() as u64,
                });
            }
            Err(e) => {
                let error_msg = e.to_string();
                if args.continue_on_error {
                    warn!("Failed to process {}: {}", path.display(), error_msg);
                    results.push(FileResult {
                        path: path.clone(),
                        result: None,
                        persisted: None,
                        error: Some(error_msg),
                        processing_time_ms: file_start.elapsed().as_millis() as u64,
                    });
                } else {
                    error!("Failed to process {}: {}", path.display(), error_msg);
                    anyhow::bail!("Processing failed: {}", error_msg);
                }
            }
        }

        overall_pb.inc(1);
    }

    overall_pb.finish_with_message("Complete");

    // Write outputs
    let successful: Vec<_> = results.iter().filter(|r| r.result.is_some()).collect();
    let failed: Vec<_> = results.iter().filter(|r| r.error.is_some()).collect();

    for file_result in &successful {
        if let (Some(result), Some(output_dir)) = (&file_result.result, &args.output_dir) {
            let output_name = file_result
                .path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("report");

            let extension = match args.format {
                super::process::OutputFormat::Json => "json",
                super::process::OutputFormat::Csv => "csv",
                super::process::OutputFormat::Text => "txt",
            };

            let output_path = output_dir.join(format!("{}.{}", output_name, extension));
            let content = super::process::format_result(result, args.format)?;

            fs::write(&output_path, content)?;
            debug!("Wrote output to {}", output_path.display());
        }
    }

    // Generate summary if requested
    if args.summary {
        let summary_path = args
            .output_dir
            .as_ref()
            .map(|d| d.join("summary.csv"))
            .unwrap_or_else(|| PathBuf::from("summary.csv"));

        write_summary(&summary_path, &results)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print summary
    let total_records: usize = successful
        .iter()
        .filter_map(|r| r.result.as_ref())
        .map(|r| r.records.len())
        .sum();
    let total_inserted: usize = results
        .iter()
        .filter_map(|r| r.persisted.as_ref())
        .map(|s| s.inserted)
        .sum();

    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    println!(
        "   {} successful, {} failed, {} record(s) extracted",
        style(successful.len()).green(),
        style(failed.len()).red(),
        total_records
    );
    if store.is_some() {
        println!("   {} record(s) net-new in the database", total_inserted);
    }

    if !failed.is_empty() {
        println!();
        println!("{}", style("Failed files:").red());
        for file_result in &failed {
            println!(
                "  - {}: {}",
                file_result.path.display(),
                file_result.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    Ok(())
}

fn process_single_file(
    path: &PathBuf,
    parser: &ManifestReportParser,
    config: &MdfexConfig,
) -> anyhow::Result<ExtractionResult> {
    let data = fs::read(path)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;

    let text = extractor.extract_text()?;
    if text.trim().len() < config.pdf.min_text_length {
        warn!(
            "{}: extracted only {} characters of text",
            path.display(),
            text.trim().len()
        );
    }

    Ok(parser.parse(&text))
}

fn write_summary(path: &PathBuf, results: &[FileResult]) -> anyhow::Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "filename",
        "status",
        "layout",
        "emission_date",
        "manifest_key",
        "records",
        "inserted",
        "duplicates",
        "processing_time_ms",
        "error",
    ])?;

    for file_result in results {
        let filename = file_result
            .path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("");

        if let Some(result) = &file_result.result {
            let (inserted, duplicates) = file_result
                .persisted
                .map(|s| (s.inserted.to_string(), s.duplicates.to_string()))
                .unwrap_or_default();

            wtr.write_record([
                filename,
                "success",
                &result.variant.to_string(),
                result.emission_date.as_deref().unwrap_or(""),
                result.manifest_key.as_deref().unwrap_or(""),
                &result.records.len().to_string(),
                &inserted,
                &duplicates,
                &file_result.processing_time_ms.to_string(),
                "",
            ])?;
        } else {
            wtr.write_record([
                filename,
                "error",
                "",
                "",
                "",
                "",
                "",
                "",
                &file_result.processing_time_ms.to_string(),
                file_result.error.as_deref().unwrap_or(""),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}
