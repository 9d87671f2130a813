//! Report parser combining layout classification, document-level fields, and
//! body scanning into one extraction pass.

use std::time::Instant;

use tracing::{debug, info};

use crate::models::record::ExtractionResult;

use super::header::{extract_emission_date, extract_manifest_key};
use super::scanner::{self, DocumentFields};
use super::variant::ReportVariant;

/// Trait for report parsing.
pub trait ReportParser {
    /// Parse an averiguation report from text.
    ///
    /// Never fails: an unrecognized layout or a body without matching blocks
    /// yields an empty record list, reported through warnings.
    fn parse(&self, text: &str) -> ExtractionResult;
}

/// Rule-based parser for the averiguation report family.
pub struct ManifestReportParser {
    /// Whether to keep records without any term number (explicit or carried).
    keep_unnumbered_terms: bool,
}

impl ManifestReportParser {
    /// Create a new parser with default settings.
    pub fn new() -> Self {
        Self {
            keep_unnumbered_terms: true,
        }
    }

    /// Set whether records without any term number are kept.
    pub fn with_unnumbered_terms(mut self, keep: bool) -> Self {
        self.keep_unnumbered_terms = keep;
        self
    }
}

impl Default for ManifestReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportParser for ManifestReportParser {
    fn parse(&self, text: &str) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        info!("Parsing report from {} characters of text", text.len());

        let variant = ReportVariant::classify(text);
        debug!("Classified report layout as {}", variant);

        if variant == ReportVariant::Unknown {
            warnings.push("unsupported report layout, no records extracted".to_string());
        }

        let fields = DocumentFields {
            emission_date: extract_emission_date(text),
            manifest_key: extract_manifest_key(text),
        };

        if fields.emission_date.is_none() {
            warnings.push("could not extract emission date".to_string());
        }
        if fields.manifest_key.is_none() {
            warnings.push("could not extract MDF-e manifest key".to_string());
        }

        let candidates = scanner::scan(text, variant, &fields);
        let candidate_count = candidates.len();
        let mut records = scanner::retain_valid(candidates);

        let dropped = candidate_count - records.len();
        if dropped > 0 {
            warnings.push(format!(
                "discarded {} candidate record(s) without a valid 44-digit NF-e key",
                dropped
            ));
        }

        if !self.keep_unnumbered_terms {
            records.retain(|r| !r.term_number.is_empty());
        }

        debug!("Extracted {} record(s) from {} report", records.len(), variant);

        ExtractionResult {
            variant,
            emission_date: fields.emission_date,
            manifest_key: fields.manifest_key,
            records,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn relatorio_text() -> String {
        format!(
            "RELATÓRIO DE TERMOS DE AVERIGUAÇÃO DOS MDF-ES\n\
             Data de Emissão\n\
             01/02/2023\n\
             12.345.678/0001-90 {}\n\
             - 555 - Pendente\n\
             {}\n\
             2222\n\
             3333\n",
            "9".repeat(44),
            "1".repeat(44),
        )
    }

    #[test]
    fn test_parse_relatorio_scenario() {
        let parser = ManifestReportParser::new();
        let result = parser.parse(&relatorio_text());

        assert_eq!(result.variant, ReportVariant::Relatorio);
        assert_eq!(result.emission_date.as_deref(), Some("01/02/2023"));
        assert_eq!(result.manifest_key, Some("9".repeat(44)));
        assert_eq!(result.records.len(), 1);

        let record = &result.records[0];
        assert_eq!(record.emission_date, "01/02/2023");
        assert_eq!(record.manifest_key, Some("9".repeat(44)));
        assert_eq!(record.term_number, "555");
        assert_eq!(record.invoice_key, "1".repeat(44));
        assert_eq!(record.cte_number, "3333");
        assert_eq!(record.invoice_number, "2222");
    }

    #[test]
    fn test_parse_demo_scenario() {
        let text = format!(
            "Gerado com Versão de Demonstração\n\
             Data: 10/11/2022\n\
             {}\n\
             Chave da NF-e\n\
             4444\n\
             {}\n\
             5555\n\
             6666\n",
            "9".repeat(44),
            "2".repeat(44),
        );

        let result = ManifestReportParser::new().parse(&text);
        assert_eq!(result.variant, ReportVariant::Demo);
        assert_eq!(result.records.len(), 1);

        let record = &result.records[0];
        assert_eq!(record.term_number, "6666");
        assert_eq!(record.invoice_key, "2".repeat(44));
        assert_eq!(record.cte_number, "4444");
        assert_eq!(record.invoice_number, "5555");
    }

    #[test]
    fn test_parse_unknown_layout_is_empty_not_error() {
        let result = ManifestReportParser::new().parse("completely unrelated text");

        assert_eq!(result.variant, ReportVariant::Unknown);
        assert!(result.records.is_empty());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.contains("unsupported report layout")));
    }

    #[test]
    fn test_parse_emits_warning_for_dropped_candidates() {
        // Posto block whose key token is too short to be an NF-e key.
        let text = "Versão de Demonstração\nPosto Fiscal\nNº do CT-e 123.456 789 10 11";

        let result = ManifestReportParser::new().parse(text);
        assert_eq!(result.variant, ReportVariant::DemoPosto);
        assert!(result.records.is_empty());
        assert!(result.warnings.iter().any(|w| w.contains("discarded 1")));
    }

    #[test]
    fn test_every_record_shares_document_fields() {
        let text = format!(
            "RELATÓRIO DE TERMOS DE AVERIGUAÇÃO DOS MDF-ES\n\
             Data de Emissão\n\
             01/02/2023\n\
             {}\n\
             - 1 - Ok\n{}\n10\n11\n\
             - 2 - Ok\n{}\n20\n21\n",
            "9".repeat(44),
            "1".repeat(44),
            "2".repeat(44),
        );

        let result = ManifestReportParser::new().parse(&text);
        assert_eq!(result.records.len(), 2);
        for record in &result.records {
            assert_eq!(record.emission_date, "01/02/2023");
            assert_eq!(record.manifest_key, Some("9".repeat(44)));
        }
    }

    #[test]
    fn test_unnumbered_terms_dropped_when_configured() {
        let text = format!(
            "RELATÓRIO DE TERMOS DE AVERIGUAÇÃO DOS MDF-ES\n\
             Data de Emissão\n\
             01/02/2023\n\
             {}\n10\n11\n",
            "1".repeat(44),
        );

        let keep = ManifestReportParser::new().parse(&text);
        assert_eq!(keep.records.len(), 1);
        assert_eq!(keep.records[0].term_number, "");

        let drop = ManifestReportParser::new()
            .with_unnumbered_terms(false)
            .parse(&text);
        assert!(drop.records.is_empty());
    }
}
