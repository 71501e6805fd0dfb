//! Shared regex patterns for receipt field extraction.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Header date line, e.g. "07 Jan 25" in "07 Jan 25,14:24"
    pub static ref HEADER_DATE: Regex = Regex::new(
        r"\b(\d{1,2})\s+([A-Za-z]{3})\s+(\d{2})\b"
    ).unwrap();

    // Time token where every digit position tolerates a confused glyph,
    // e.g. "19:O1" for 19:01
    pub static ref GLYPH_TIME: Regex = Regex::new(
        r"\b([0-2OIl][0-9OIl])[:.]([0-5OIl][0-9OIl])\b"
    ).unwrap();

    // Transaction reference prefix shaped like yyyymmddHHMM
    pub static ref REFERENCE_TS: Regex = Regex::new(
        r"\b(20\d{12})\d*\b"
    ).unwrap();

    // Money token: comma-grouped or bare digits, mandatory 2-digit fraction.
    // No trailing boundary so "759.00THB" still matches; candidates whose
    // neighbours extend the number are rejected after matching.
    pub static ref MONEY: Regex = Regex::new(
        r"\d{1,3}(?:,\d{3})*\.\d{2}|\d+\.\d{2}"
    ).unwrap();

    // Inline note with content on the same line, e.g. "Note: rent May"
    pub static ref NOTE_INLINE: Regex = Regex::new(
        r"(?i)\bnote\b[ \t]*[:\-–]?[ \t]*([^\r\n]+)"
    ).unwrap();

    // Account-number-shaped run; such lines are identifiers, not names
    pub static ref ID_RUN: Regex = Regex::new(
        r"[\d\-xX]{4,}"
    ).unwrap();
}
