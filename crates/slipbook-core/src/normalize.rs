//! OCR-artifact cleanup helpers shared by the field extractors.

/// Collapse runs of whitespace to single spaces and trim both ends.
pub fn collapse_whitespace(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Replace digit glyphs OCR commonly confuses with letters.
///
/// Only for tokens already known to be numeric (time digits, reference
/// digits). Applying it to free text would corrupt real words.
pub fn fix_digit_glyphs(token: &str) -> String {
    token
        .chars()
        .map(|c| match c {
            'O' | 'o' => '0',
            'I' | 'l' => '1',
            other => other,
        })
        .collect()
}

/// True when any code point falls in the Thai Unicode block (U+0E00..=U+0E7F).
pub fn contains_thai(text: &str) -> bool {
    text.chars().any(|c| ('\u{0E00}'..='\u{0E7F}').contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  MR  JOHN\tHARRIS "), "MR JOHN HARRIS");
        assert_eq!(collapse_whitespace(""), "");
        assert_eq!(collapse_whitespace("   "), "");
    }

    #[test]
    fn test_fix_digit_glyphs() {
        assert_eq!(fix_digit_glyphs("19:O1"), "19:01");
        assert_eq!(fix_digit_glyphs("Il"), "11");
        assert_eq!(fix_digit_glyphs("14:24"), "14:24");
    }

    #[test]
    fn test_contains_thai() {
        assert!(contains_thai("สมชาย ใจดี"));
        assert!(contains_thai("K+ ร้านค้า"));
        assert!(!contains_thai("MR JOHN HARRIS"));
        assert!(!contains_thai(""));
    }
}
