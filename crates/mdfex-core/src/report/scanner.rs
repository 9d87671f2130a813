//! Body record scanner for the known report layouts.
//!
//! Each layout is a non-overlapping repeating-match scan over the whole
//! document text, in order of occurrence. Unmatched regions simply produce
//! no record; the scanner never fails on malformed input.

use tracing::trace;

use crate::models::record::ManifestRecord;

use super::patterns::{DEMO_BLOCK, POSTO_BLOCK, RELATORIO_BLOCK};
use super::variant::ReportVariant;

/// Document-level fields shared by every record of one report.
#[derive(Debug, Clone, Default)]
pub struct DocumentFields {
    /// Emission date (dd/mm/yyyy), if the document carries one.
    pub emission_date: Option<String>,
    /// 44-digit MDF-e manifest key, if the document carries one.
    pub manifest_key: Option<String>,
}

/// One matched block of the full report layout. The term header is optional;
/// a missing one inherits the previous block's term number.
#[derive(Debug)]
struct RelatorioBlock {
    term_number: Option<String>,
    invoice_key: String,
    invoice_number: String,
    cte_number: String,
}

/// One matched block of the demo layout. The term is always explicit here.
#[derive(Debug)]
struct DemoBlock {
    cte_number: String,
    invoice_key: String,
    invoice_number: String,
    term_number: String,
}

/// One matched block of the posto-fiscal demo layout. All four tokens are
/// dot-punctuated; trailing ones may be absent.
#[derive(Debug)]
struct PostoBlock {
    invoice_key: String,
    term_number: String,
    invoice_number: String,
    cte_number: String,
}

/// Accumulator for the term-number carry-over fold.
struct ScanState {
    last_term: String,
    records: Vec<ManifestRecord>,
}

/// Scan the document body for candidate records.
///
/// Candidates are returned in document order and have NOT yet passed the
/// validity gate; see [`retain_valid`].
pub fn scan(text: &str, variant: ReportVariant, fields: &DocumentFields) -> Vec<ManifestRecord> {
    match variant {
        ReportVariant::Relatorio => scan_relatorio(text, fields),
        ReportVariant::Demo => scan_demo(text, fields),
        ReportVariant::DemoPosto => scan_demo_posto(text, fields),
        ReportVariant::Unknown => Vec::new(),
    }
}

/// The sole validity gate: keep only records with an exactly-44-digit NF-e
/// key. Idempotent.
pub fn retain_valid(records: Vec<ManifestRecord>) -> Vec<ManifestRecord> {
    records
        .into_iter()
        .filter(|r| r.has_valid_invoice_key())
        .collect()
}

fn scan_relatorio(text: &str, fields: &DocumentFields) -> Vec<ManifestRecord> {
    let state = RELATORIO_BLOCK
        .captures_iter(text)
        .map(|caps| RelatorioBlock {
            term_number: caps.get(1).map(|m| m.as_str().to_string()),
            invoice_key: caps[2].to_string(),
            invoice_number: caps[3].to_string(),
            cte_number: caps[4].to_string(),
        })
        .fold(
            ScanState {
                last_term: String::new(),
                records: Vec::new(),
            },
            |mut state, block| {
                if let Some(term) = block.term_number {
                    state.last_term = term;
                }
                trace!(
                    "relatorio block: term={} key={}",
                    state.last_term, block.invoice_key
                );
                state.records.push(ManifestRecord {
                    emission_date: fields.emission_date.clone().unwrap_or_default(),
                    manifest_key: fields.manifest_key.clone(),
                    term_number: state.last_term.clone(),
                    invoice_key: block.invoice_key,
                    cte_number: strip_separators(&block.cte_number),
                    invoice_number: strip_separators(&block.invoice_number),
                });
                state
            },
        );
    state.records
}

fn scan_demo(text: &str, fields: &DocumentFields) -> Vec<ManifestRecord> {
    DEMO_BLOCK
        .captures_iter(text)
        .map(|caps| DemoBlock {
            cte_number: caps[1].to_string(),
            invoice_key: caps[2].to_string(),
            invoice_number: caps[3].to_string(),
            term_number: caps[4].to_string(),
        })
        .map(|block| {
            trace!("demo block: term={} key={}", block.term_number, block.invoice_key);
            ManifestRecord {
                emission_date: fields.emission_date.clone().unwrap_or_default(),
                manifest_key: fields.manifest_key.clone(),
                term_number: strip_separators(&block.term_number),
                invoice_key: block.invoice_key,
                cte_number: strip_separators(&block.cte_number),
                invoice_number: strip_separators(&block.invoice_number),
            }
        })
        .collect()
}

fn scan_demo_posto(text: &str, fields: &DocumentFields) -> Vec<ManifestRecord> {
    POSTO_BLOCK
        .captures_iter(text)
        .map(|caps| PostoBlock {
            invoice_key: strip_separators(&caps[1]),
            term_number: strip_separators(caps.get(2).map_or("", |m| m.as_str())),
            invoice_number: strip_separators(caps.get(3).map_or("", |m| m.as_str())),
            cte_number: strip_separators(caps.get(4).map_or("", |m| m.as_str())),
        })
        .map(|block| {
            trace!("posto block: term={} key={}", block.term_number, block.invoice_key);
            ManifestRecord {
                emission_date: fields.emission_date.clone().unwrap_or_default(),
                manifest_key: fields.manifest_key.clone(),
                term_number: block.term_number,
                invoice_key: block.invoice_key,
                cte_number: block.cte_number,
                invoice_number: block.invoice_number,
            }
        })
        .collect()
}

/// Strip "." thousands separators from a captured numeric token.
fn strip_separators(token: &str) -> String {
    token.replace('.', "")
}
