//! Record models produced by the report extractor.

use serde::{Deserialize, Serialize};

use crate::report::ReportVariant;

/// A single shipment record extracted from an averiguation report.
///
/// `emission_date` and `manifest_key` are document-level and shared verbatim
/// by every record from the same report. `invoice_key` is the natural
/// deduplication key downstream and is always exactly 44 digits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestRecord {
    /// Report emission date (dd/mm/yyyy), empty when the document has none.
    #[serde(default)]
    pub emission_date: String,

    /// 44-digit MDF-e manifest key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_key: Option<String>,

    /// Averiguation term number, possibly inherited from the previous record.
    #[serde(default)]
    pub term_number: String,

    /// 44-digit NF-e invoice key.
    pub invoice_key: String,

    /// CT-e transport document number, thousands separators stripped.
    #[serde(default)]
    pub cte_number: String,

    /// NF-e invoice number, thousands separators stripped.
    #[serde(default)]
    pub invoice_number: String,
}

impl ManifestRecord {
    /// Whether the record passes the validity gate: a 44-digit NF-e key.
    pub fn has_valid_invoice_key(&self) -> bool {
        self.invoice_key.len() == 44 && self.invoice_key.bytes().all(|b| b.is_ascii_digit())
    }
}

/// Result of extracting one report document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Detected report layout.
    pub variant: ReportVariant,

    /// Document-level emission date (dd/mm/yyyy).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emission_date: Option<String>,

    /// Document-level 44-digit MDF-e key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manifest_key: Option<String>,

    /// Valid records, in document order.
    pub records: Vec<ManifestRecord>,

    /// Extraction warnings.
    pub warnings: Vec<String>,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_invoice_key() {
        let record = ManifestRecord {
            emission_date: "01/02/2023".to_string(),
            manifest_key: None,
            term_number: String::new(),
            invoice_key: "1".repeat(44),
            cte_number: "3333".to_string(),
            invoice_number: "2222".to_string(),
        };
        assert!(record.has_valid_invoice_key());
    }

    #[test]
    fn test_invalid_invoice_key() {
        let mut record = ManifestRecord {
            emission_date: String::new(),
            manifest_key: None,
            term_number: String::new(),
            invoice_key: "1".repeat(30),
            cte_number: String::new(),
            invoice_number: String::new(),
        };
        assert!(!record.has_valid_invoice_key());

        record.invoice_key = format!("{}x", "1".repeat(43));
        assert!(!record.has_valid_invoice_key());
    }
}
