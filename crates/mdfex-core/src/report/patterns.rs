//! Common regex patterns for averiguation report extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Emission date: "Data de Emissão" label with the date on the next line
    pub static ref EMISSION_DATE_LABELED: Regex = Regex::new(
        r"(?i)Data de Emiss[ãa]o[ \t]*\r?\n[ \t]*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // Inline fallback: "Data: dd/mm/yyyy"
    pub static ref EMISSION_DATE_INLINE: Regex = Regex::new(
        r"(?i)Data:[ \t]*(\d{2}/\d{2}/\d{4})"
    ).unwrap();

    // MDF-e manifest key: 44 consecutive digits, optionally preceded by a
    // CNPJ-formatted issuer prefix (dd.ddd.ddd/dddd-dd)
    pub static ref MANIFEST_KEY: Regex = Regex::new(
        r"(?:\d{2}\.\d{3}\.\d{3}/\d{4}-\d{2}\s+)?\b(\d{44})\b"
    ).unwrap();

    // RELATORIO block: optional "- term - status" header line, then three
    // lines: NF-e key (44 digits), invoice number, CT-e number
    pub static ref RELATORIO_BLOCK: Regex = Regex::new(
        r"(?:-[ \t]*(\d+)[ \t]*-[^\r\n]*\r?\n\s*)?\b(\d{44})\b[ \t]*\r?\n[ \t]*([0-9.]+)[ \t]*\r?\n[ \t]*([0-9.]+)"
    ).unwrap();

    // DEMO block: "Chave da NF-e" marker, then four lines: CT-e number,
    // NF-e key (44 digits), invoice number, term number
    pub static ref DEMO_BLOCK: Regex = Regex::new(
        r"(?i)Chave da NF-e[ \t]*\r?\n[ \t]*([0-9.]+)[ \t]*\r?\n[ \t]*(\d{44})[ \t]*\r?\n[ \t]*([0-9.]+)[ \t]*\r?\n[ \t]*([0-9.]+)"
    ).unwrap();

    // DEMO_POSTO block: "Nº do CT-e" marker followed by up to four
    // whitespace-separated dot-punctuated numeric tokens: NF-e key, term
    // number, invoice number, CT-e number (trailing tokens may be absent)
    pub static ref POSTO_BLOCK: Regex = Regex::new(
        r"(?i)N[ºo°]? do CT-e\s+([0-9.]+)(?:\s+([0-9.]+))?(?:\s+([0-9.]+))?(?:\s+([0-9.]+))?"
    ).unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_key_rejects_longer_digit_runs() {
        let text = "1".repeat(45);
        assert!(MANIFEST_KEY.captures(&text).is_none());
    }

    #[test]
    fn test_manifest_key_with_cnpj_prefix() {
        let key = "5".repeat(44);
        let text = format!("12.345.678/0001-90 {}", key);
        let caps = MANIFEST_KEY.captures(&text).unwrap();
        assert_eq!(&caps[1], key.as_str());
    }

    #[test]
    fn test_relatorio_block_header_optional() {
        let key = "1".repeat(44);
        let with_header = format!("- 555 - Pendente\n{}\n2222\n3333", key);
        let caps = RELATORIO_BLOCK.captures(&with_header).unwrap();
        assert_eq!(caps.get(1).unwrap().as_str(), "555");

        let without_header = format!("{}\n2222\n3333", key);
        let caps = RELATORIO_BLOCK.captures(&without_header).unwrap();
        assert!(caps.get(1).is_none());
        assert_eq!(&caps[2], key.as_str());
    }
}
