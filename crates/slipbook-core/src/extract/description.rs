//! Recipient description extraction.
//!
//! The recipient block sits under a line that is exactly "To". The next
//! one or two lines hold the name, mixed in with account numbers, wallet
//! labels and QR-footer artifacts that must not be mistaken for one.
//! Recipients written in Thai script are recorded as the literal "Thai"
//! instead of attempting per-glyph name extraction.

use super::patterns::ID_RUN;
use super::{FieldExtractor, FieldMap, Result};
use crate::normalize::{collapse_whitespace, contains_thai};
use crate::transcript::Transcript;

/// Labels that appear below the recipient and are never names.
const NON_NAME_LABELS: &[&str] = &[
    "fee",
    "bank reference no.",
    "transaction reference",
    "transaction id",
    "biller id",
    "merchant id",
    "service code",
    "reference no.",
    "refernce no.",
    "promptpay",
    "scan to verify",
    "e-wallet number",
    "k plus wallet",
    "g-wallet",
    "k+ shop",
];

fn is_label(line_lower: &str) -> bool {
    NON_NAME_LABELS.iter().any(|label| line_lower.contains(label))
}

/// Accept lines that look like names; reject labels and id-shaped lines.
fn looks_like_name(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    if is_label(&line.to_lowercase()) {
        return false;
    }
    if ID_RUN.is_match(line) {
        return false;
    }
    true
}

/// Recipient description extractor.
pub struct DescriptionExtractor;

impl DescriptionExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DescriptionExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DescriptionExtractor {
    fn name(&self) -> &'static str {
        "description"
    }

    fn fields(&self) -> &'static [&'static str] {
        &["description"]
    }

    fn extract(&self, transcript: &Transcript) -> Result<FieldMap> {
        let lines = &transcript.lines;
        let mut description = String::new();

        for (i, line) in lines.iter().enumerate() {
            if collapse_whitespace(line).to_lowercase() != "to" {
                continue;
            }

            let first = lines
                .get(i + 1)
                .map(|l| collapse_whitespace(l))
                .unwrap_or_default();
            let second = lines
                .get(i + 2)
                .map(|l| collapse_whitespace(l))
                .unwrap_or_default();

            if contains_thai(&first) || contains_thai(&second) {
                description = "Thai".to_string();
            } else {
                let mut parts = Vec::new();
                if looks_like_name(&first) {
                    parts.push(first);
                }
                if looks_like_name(&second) {
                    parts.push(second);
                }
                description = parts.join(" ");
            }
            break;
        }

        // OCR misreads of the "Scan to verify" QR footer
        let lower = description.to_lowercase();
        if lower == "verify" || lower == "veri" {
            description.clear();
        }

        let mut out = FieldMap::new();
        out.insert("description".to_string(), description);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(lines: &[&str]) -> String {
        let transcript = Transcript::from_lines(lines.iter().map(|l| l.to_string()).collect());
        DescriptionExtractor::new().extract(&transcript).unwrap()["description"].clone()
    }

    #[test]
    fn test_thai_recipient() {
        assert_eq!(extract(&["To", "สมชาย ใจดี"]), "Thai");
    }

    #[test]
    fn test_thai_on_second_line() {
        assert_eq!(extract(&["To", "K+ SHOP", "ร้านกาแฟ"]), "Thai");
    }

    #[test]
    fn test_name_with_account_number_below() {
        assert_eq!(extract(&["To", "MR JOHN HARRIS", "099-123-4567"]), "MR JOHN HARRIS");
    }

    #[test]
    fn test_two_name_lines_joined() {
        assert_eq!(extract(&["To", "SIAM TRADING", "SUKHUMVIT BRANCH"]), "SIAM TRADING SUKHUMVIT BRANCH");
    }

    #[test]
    fn test_fee_substring_rejects_line() {
        // Substring label matching is deliberate: it also catches OCR noise
        // around the fee block, at the cost of names containing "fee"
        assert_eq!(extract(&["To", "COFFEE CULTURE", "SUKHUMVIT BRANCH"]), "SUKHUMVIT BRANCH");
    }

    #[test]
    fn test_label_lines_rejected() {
        assert_eq!(extract(&["To", "PromptPay", "MS JANE DOE"]), "MS JANE DOE");
    }

    #[test]
    fn test_anchor_must_be_exact() {
        // "Top up" is not the recipient anchor
        assert_eq!(extract(&["Top up", "MR JOHN HARRIS"]), "");
    }

    #[test]
    fn test_no_anchor() {
        assert_eq!(extract(&["From", "MR JOHN HARRIS"]), "");
    }

    #[test]
    fn test_verify_artifact_discarded() {
        assert_eq!(extract(&["To", "Veri"]), "");
    }

    #[test]
    fn test_anchor_at_end_of_transcript() {
        assert_eq!(extract(&["Fee", "To"]), "");
    }
}
