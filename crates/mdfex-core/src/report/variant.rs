//! Report layout classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Marker substring of the full report layout.
const RELATORIO_MARKER: &str = "relatório de termos de averiguação dos mdf-es";

/// Marker substring left by the demo edition of the report generator.
const DEMO_MARKER: &str = "versão de demonstração";

/// Marker distinguishing the posto-fiscal demo layout.
const POSTO_MARKER: &str = "posto fiscal";

/// Known layouts of the averiguation report family.
///
/// The upstream report generator emits visually different layouts depending
/// on its license edition; classifying the document up front lets the body
/// scanner pick the correct record pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportVariant {
    /// Full "Relatório de Termos de Averiguação dos MDF-es" layout.
    Relatorio,
    /// Demo-edition layout.
    Demo,
    /// Demo-edition layout with the posto-fiscal column block.
    DemoPosto,
    /// None of the known markers present.
    Unknown,
}

fn is_relatorio(text: &str) -> bool {
    text.contains(RELATORIO_MARKER)
}

fn is_demo_posto(text: &str) -> bool {
    text.contains(DEMO_MARKER) && text.contains(POSTO_MARKER)
}

fn is_demo(text: &str) -> bool {
    text.contains(DEMO_MARKER)
}

/// Ordered classification rules, evaluated top-to-bottom, first match wins.
const RULES: &[(fn(&str) -> bool, ReportVariant)] = &[
    (is_relatorio, ReportVariant::Relatorio),
    (is_demo_posto, ReportVariant::DemoPosto),
    (is_demo, ReportVariant::Demo),
];

impl ReportVariant {
    /// Classify a document by its marker substrings. Total and deterministic;
    /// documents matching no rule are `Unknown`.
    pub fn classify(text: &str) -> Self {
        let haystack = text.to_lowercase();
        RULES
            .iter()
            .find(|(matches, _)| matches(haystack.as_str()))
            .map(|&(_, variant)| variant)
            .unwrap_or(ReportVariant::Unknown)
    }
}

impl fmt::Display for ReportVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportVariant::Relatorio => "relatorio",
            ReportVariant::Demo => "demo",
            ReportVariant::DemoPosto => "demo_posto",
            ReportVariant::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_relatorio() {
        let text = "RELATÓRIO DE TERMOS DE AVERIGUAÇÃO DOS MDF-ES\nData de Emissão";
        assert_eq!(ReportVariant::classify(text), ReportVariant::Relatorio);
    }

    #[test]
    fn test_classify_demo() {
        let text = "Gerado com versão de demonstração\nChave da NF-e";
        assert_eq!(ReportVariant::classify(text), ReportVariant::Demo);
    }

    #[test]
    fn test_classify_demo_posto() {
        let text = "Versão de Demonstração\nPosto Fiscal de fronteira\nNº do CT-e";
        assert_eq!(ReportVariant::classify(text), ReportVariant::DemoPosto);
    }

    #[test]
    fn test_relatorio_wins_over_demo_markers() {
        let text = "relatório de termos de averiguação dos mdf-es\nversão de demonstração\nposto fiscal";
        assert_eq!(ReportVariant::classify(text), ReportVariant::Relatorio);
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(
            ReportVariant::classify("some unrelated document"),
            ReportVariant::Unknown
        );
        assert_eq!(ReportVariant::classify(""), ReportVariant::Unknown);
    }

    #[test]
    fn test_posto_marker_alone_is_not_demo_posto() {
        // "posto fiscal" only matters once the demo marker is present.
        let text = "posto fiscal";
        assert_eq!(ReportVariant::classify(text), ReportVariant::Unknown);
    }
}
