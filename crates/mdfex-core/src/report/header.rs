//! Document-level field extraction: emission date and MDF-e manifest key.
//!
//! Both fields are extracted once per document and shared verbatim by every
//! record the body scanner emits.

use chrono::NaiveDate;

use super::patterns::{EMISSION_DATE_INLINE, EMISSION_DATE_LABELED, MANIFEST_KEY};

/// Extract the report emission date as a dd/mm/yyyy string.
///
/// Tries the "Data de Emissão" label with the date token on the following
/// line, then the inline "Data:" form. The first token that is a real
/// calendar date wins; returns `None` if neither pattern yields one.
pub fn extract_emission_date(text: &str) -> Option<String> {
    for pattern in [&*EMISSION_DATE_LABELED, &*EMISSION_DATE_INLINE] {
        for caps in pattern.captures_iter(text) {
            let token = &caps[1];
            if NaiveDate::parse_from_str(token, "%d/%m/%Y").is_ok() {
                return Some(token.to_string());
            }
        }
    }
    None
}

/// Extract the 44-digit MDF-e manifest key, first match in document order.
pub fn extract_manifest_key(text: &str) -> Option<String> {
    MANIFEST_KEY.captures(text).map(|caps| caps[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emission_date_labeled() {
        let text = "Relatório\nData de Emissão\n01/02/2023\n";
        assert_eq!(extract_emission_date(text), Some("01/02/2023".to_string()));
    }

    #[test]
    fn test_emission_date_inline_fallback() {
        let text = "Posto Fiscal\nData: 15/07/2022";
        assert_eq!(extract_emission_date(text), Some("15/07/2022".to_string()));
    }

    #[test]
    fn test_emission_date_labeled_wins_over_inline() {
        let text = "Data de Emissão\n01/02/2023\nData: 15/07/2022";
        assert_eq!(extract_emission_date(text), Some("01/02/2023".to_string()));
    }

    #[test]
    fn test_emission_date_rejects_impossible_dates() {
        let text = "Data: 99/99/2023\nData: 05/03/2023";
        assert_eq!(extract_emission_date(text), Some("05/03/2023".to_string()));
    }

    #[test]
    fn test_emission_date_absent() {
        assert_eq!(extract_emission_date("no dates here"), None);
    }

    #[test]
    fn test_manifest_key_first_match() {
        let first = "3".repeat(44);
        let second = "4".repeat(44);
        let text = format!("chave {}\noutra {}", first, second);
        assert_eq!(extract_manifest_key(&text), Some(first));
    }

    #[test]
    fn test_manifest_key_absent() {
        assert_eq!(extract_manifest_key("only 123456 here"), None);
    }
}
