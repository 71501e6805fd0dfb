//! Date and time extraction from receipt headers.
//!
//! Transfer slips carry a header line like "07 Jan 25,14:24". When OCR
//! mangles or drops it, the transaction reference number
//! (yyyymmddHHMM...) is the fallback source for whichever field is still
//! blank.

use chrono::NaiveDate;

use super::patterns::{GLYPH_TIME, HEADER_DATE, REFERENCE_TS};
use super::{FieldExtractor, FieldMap, Result};
use crate::error::ExtractionError;
use crate::normalize::fix_digit_glyphs;
use crate::transcript::Transcript;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_number(abbrev: &str) -> Option<u32> {
    let lower = abbrev.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
}

fn parse_field<T: std::str::FromStr>(value: &str, field: &str) -> Result<T> {
    value.parse().map_err(|_| ExtractionError::Parse {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Defensive clamp; a glyph-fixed minute like "75" becomes 59, not an error.
fn format_clamped(hour: u32, minute: u32) -> String {
    format!("{:02}:{:02}", hour.min(23), minute.min(59))
}

/// Parse "07 Jan 25,14:24"-style lines. Returns the formatted date and,
/// when present on the same line, the time. A candidate that does not form
/// a real calendar date is treated as a non-match.
fn parse_header_line(line: &str) -> Result<Option<(String, Option<String>)>> {
    let Some(caps) = HEADER_DATE.captures(line) else {
        return Ok(None);
    };

    let day: u32 = parse_field(&caps[1], "day")?;
    let Some(month) = month_number(&caps[2]) else {
        return Ok(None);
    };
    let year: i32 = parse_field::<i32>(&caps[3], "year")? + 2000;

    let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
        return Ok(None);
    };

    let time = match GLYPH_TIME.captures(line) {
        Some(tc) => {
            let hour: u32 = parse_field(&fix_digit_glyphs(&tc[1]), "hour")?;
            let minute: u32 = parse_field(&fix_digit_glyphs(&tc[2]), "minute")?;
            Some(format_clamped(hour, minute))
        }
        None => None,
    };

    Ok(Some((date.format("%m/%d/%Y").to_string(), time)))
}

/// Fallback: the first 12 digits of a transaction reference read as
/// yyyymmddHHMM.
fn parse_reference(lines: &[String]) -> Result<Option<(String, String)>> {
    for line in lines {
        let Some(caps) = REFERENCE_TS.captures(line) else {
            continue;
        };
        let ts = &caps[1];

        let year: i32 = parse_field(&ts[0..4], "year")?;
        let month: u32 = parse_field(&ts[4..6], "month")?;
        let day: u32 = parse_field(&ts[6..8], "day")?;
        let hour: u32 = parse_field(&ts[8..10], "hour")?;
        let minute: u32 = parse_field(&ts[10..12], "minute")?;

        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        return Ok(Some((
            date.format("%m/%d/%Y").to_string(),
            format_clamped(hour, minute),
        )));
    }
    Ok(None)
}

/// Date/time field extractor.
pub struct DateTimeExtractor;

impl DateTimeExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DateTimeExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for DateTimeExtractor {
    fn name(&self) -> &'static str {
        "date_time"
    }

    fn fields(&self) -> &'static [&'static str] {
        &["date", "time"]
    }

    fn extract(&self, transcript: &Transcript) -> Result<FieldMap> {
        let mut date = String::new();
        let mut time = String::new();

        // First header date line wins
        for line in &transcript.lines {
            if let Some((found_date, found_time)) = parse_header_line(line)? {
                date = found_date;
                if let Some(found_time) = found_time {
                    time = found_time;
                }
                break;
            }
        }

        // Fill only still-blank fields from the reference timestamp
        if date.is_empty() || time.is_empty() {
            if let Some((ref_date, ref_time)) = parse_reference(&transcript.lines)? {
                if date.is_empty() {
                    date = ref_date;
                }
                if time.is_empty() {
                    time = ref_time;
                }
            }
        }

        let mut out = FieldMap::new();
        out.insert("date".to_string(), date);
        out.insert("time".to_string(), time);
        Ok(out)
    }
}
