//! Process command - extract records from a single report file.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use clap::Args;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, warn};

use mdfex_core::models::config::MdfexConfig;
use mdfex_core::models::record::ExtractionResult;
use mdfex_core::pdf::{PdfExtractor, PdfProcessor};
use mdfex_core::report::{ManifestReportParser, ReportParser, ReportVariant};
use mdfex_core::store::ManifestStore;

use crate::store::SqliteStore;

/// Arguments for the process command.
#[derive(Args)]
pub struct ProcessArgs {
    /// Input report file (PDF)
    #[arg(required = true)]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    format: OutputFormat,

    /// SQLite database to persist records into
    #[arg(long, requires = "flight", requires = "registration_date")]
    database: Option<PathBuf>,

    /// Flight number to file the records under
    #[arg(long, requires = "database")]
    flight: Option<String>,

    /// Registration date (YYYY-MM-DD) to file the records under
    #[arg(long, requires = "database")]
    registration_date: Option<NaiveDate>,

    /// Show extraction warnings
    #[arg(long)]
    show_warnings: bool,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output
    Json,
    /// CSV output
    Csv,
    /// Plain text summary
    Text,
}

pub async fn run(args: ProcessArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();

    // Load configuration
    let config = if let Some(path) = config_path {
        MdfexConfig::from_file(std::path::Path::new(path))?
    } else {
        MdfexConfig::default()
    };

    // Check input file exists
    if !args.input.exists() {
        anyhow::bail!("Input file not found: {}", args.input.display());
    }

    let extension = args
        .input
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    if extension != "pdf" {
        anyhow::bail!("Unsupported file format: {}", extension);
    }

    info!("Processing file: {}", args.input.display());

    // Create progress bar
    let pb = ProgressBar::new(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let result = extract_report(&args.input, &config, &pb)?;

    pb.finish_with_message("Done");

    if result.records.is_empty() {
        // An unsupported layout is an expected outcome, not a failure.
        println!(
            "{} 0 records extracted (layout: {})",
            style("ℹ").yellow(),
            result.variant
        );
    }

    // Persist if a database target was given
    if let Some(database) = &args.database {
        let flight = args.flight.as_deref().unwrap_or_default();
        let registration_date = args
            .registration_date
            .ok_or_else(|| anyhow::anyhow!("--registration-date is required with --database"))?;

        let mut store =
            SqliteStore::open(database).map_err(|e| anyhow::anyhow!("opening store: {}", e))?;
        let summary = store
            .persist(&result.records, flight, registration_date)
            .map_err(|e| anyhow::anyhow!("persisting records: {}", e))?;

        println!(
            "{} Persisted {} record(s): {} inserted, {} duplicate(s)",
            style("✓").green(),
            summary.total,
            summary.inserted,
            summary.duplicates
        );
    }

    // Format output
    let output = format_result(&result, args.format)?;

    // Write output
    if let Some(output_path) = &args.output {
        fs::write(output_path, &output)?;
        println!(
            "{} Output written to {}",
            style("✓").green(),
            output_path.display()
        );
    } else {
        println!("{}", output);
    }

    if args.show_warnings && !result.warnings.is_empty() {
        eprintln!("{}", style("Warnings:").yellow());
        for warning in &result.warnings {
            eprintln!("  - {}", warning);
        }
    }

    debug!("Total processing time: {:?}", start.elapsed());

    Ok(())
}

/// Extract records from one PDF report.
pub fn extract_report(
    path: &PathBuf,
    config: &MdfexConfig,
    pb: &ProgressBar,
) -> anyhow::Result<ExtractionResult> {
    pb.set_message("Loading PDF...");
    pb.set_position(10);

    let data = fs::read(path)?;
    let mut extractor = PdfExtractor::new();
    extractor.load(&data)?;

    debug!("PDF has {} pages", extractor.page_count());

    pb.set_message("Extracting text...");
    pb.set_position(40);

    let text = extractor.extract_text()?;
    if text.trim().len() < config.pdf.min_text_length {
        warn!(
            "Extracted only {} characters of text, layout detection may fail",
            text.trim().len()
        );
    }

    pb.set_message("Extracting records...");
    pb.set_position(70);

    let parser =
        ManifestReportParser::new().with_unnumbered_terms(config.extraction.keep_unnumbered_terms);
    let result = parser.parse(&text);

    if result.variant == ReportVariant::Unknown {
        debug!("No known layout markers found in {}", path.display());
    }

    pb.set_position(100);

    Ok(result)
}

pub fn format_result(result: &ExtractionResult, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string(result)?),
        OutputFormat::Csv => format_csv(result),
        OutputFormat::Text => Ok(format_text(result)),
    }
}

fn format_csv(result: &ExtractionResult) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "emission_date",
        "manifest_key",
        "term_number",
        "invoice_key",
        "cte_number",
        "invoice_number",
    ])?;

    for record in &result.records {
        wtr.write_record([
            &record.emission_date,
            &record.manifest_key.clone().unwrap_or_default(),
            &record.term_number,
            &record.invoice_key,
            &record.cte_number,
            &record.invoice_number,
        ])?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

pub fn format_text(result: &ExtractionResult) -> String {
    let mut output = String::new();

    output.push_str(&format!("Layout: {}\n", result.variant));
    output.push_str(&format!(
        "Emission date: {}\n",
        result.emission_date.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!(
        "Manifest key: {}\n",
        result.manifest_key.as_deref().unwrap_or("-")
    ));
    output.push_str(&format!("Records: {}\n", result.records.len()));

    for record in &result.records {
        output.push('\n');
        output.push_str(&format!("  Term:    {}\n", record.term_number));
        output.push_str(&format!("  NF-e:    {}\n", record.invoice_key));
        output.push_str(&format!("  NF num:  {}\n", record.invoice_number));
        output.push_str(&format!("  CT-e:    {}\n", record.cte_number));
    }

    output
}
