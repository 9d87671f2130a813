//! Core library for freight manifest report extraction.
//!
//! This crate provides:
//! - PDF text acquisition (lopdf + pdf-extract)
//! - Report layout classification (SEFAZ MDF-e averiguation reports)
//! - Rule-based record extraction (manifest key, NF-e keys, CT-e numbers, terms)
//! - A persistence interface with duplicate-skip semantics keyed on the NF-e key

pub mod error;
pub mod models;
pub mod pdf;
pub mod report;
pub mod store;

pub use error::{MdfexError, Result};
pub use models::config::MdfexConfig;
pub use models::record::{ExtractionResult, ManifestRecord};
pub use pdf::{PdfExtractor, PdfProcessor};
pub use report::{ManifestReportParser, ReportParser, ReportVariant};
pub use store::{ManifestStore, MemoryStore, PersistSummary};

/// Extract records from a raw PDF report payload.
///
/// Convenience entry point wiring PDF text acquisition and report parsing.
/// PDF conversion failures propagate unchanged; an unrecognized layout is
/// not an error and yields an empty record list.
pub fn extract_from_pdf(data: &[u8]) -> Result<ExtractionResult> {
    let mut extractor = PdfExtractor::new();
    extractor.load(data)?;
    let text = extractor.extract_text()?;
    Ok(ManifestReportParser::new().parse(&text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_from_pdf_surfaces_conversion_failure() {
        match extract_from_pdf(b"not a pdf") {
            Err(MdfexError::Pdf(_)) => {}
            other => panic!("expected a PDF error, got {:?}", other.map(|r| r.records)),
        }
    }
}
