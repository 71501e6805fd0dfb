//! Free-text note extraction.
//!
//! Strategy: an explicit "Note: ..." with content on the same line wins;
//! otherwise take the first line after a "Note" line that is not one of
//! the reference/fee labels banks print in the same region.

use super::patterns::NOTE_INLINE;
use super::{FieldExtractor, FieldMap, Result};
use crate::transcript::Transcript;

/// Lines that follow a "Note" label but are never note content.
const STOP_WORDS: &[&str] = &[
    "bank reference",
    "transaction reference",
    "scan to verify",
    "fee",
    "merchant id",
    "ref no",
];

fn find_note(full_text: &str) -> String {
    // Direct "Note: xxx"
    if let Some(caps) = NOTE_INLINE.captures(full_text) {
        let inline = caps[1].trim();
        if !inline.is_empty() {
            return inline.to_string();
        }
    }

    // Fallback: the line after a "Note" line
    let lines: Vec<&str> = full_text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    for (i, line) in lines.iter().enumerate() {
        if !line.to_lowercase().contains("note") {
            continue;
        }
        for candidate in lines.iter().skip(i + 1).take(2) {
            let lower = candidate.to_lowercase();
            if !STOP_WORDS.iter().any(|stop| lower.contains(stop)) {
                return candidate.to_string();
            }
        }
    }

    String::new()
}

/// Note field extractor.
pub struct NoteExtractor;

impl NoteExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for NoteExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for NoteExtractor {
    fn name(&self) -> &'static str {
        "note"
    }

    fn fields(&self) -> &'static [&'static str] {
        &["note"]
    }

    fn extract(&self, transcript: &Transcript) -> Result<FieldMap> {
        let mut out = FieldMap::new();
        out.insert("note".to_string(), find_note(&transcript.full_text));
        Ok(out)
    }
}
