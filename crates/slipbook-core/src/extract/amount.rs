//! Withdrawal amount extraction.
//!
//! Three tiers, first success wins: a money token near an "Amount" label,
//! the first token in the header region above the From/To sections, and
//! finally the largest valid token anywhere in the transcript (on a
//! transfer slip the withdrawal is normally the largest figure present).

use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

use super::patterns::MONEY;
use super::{FieldExtractor, FieldMap, Result};
use crate::transcript::Transcript;

/// Largest amount accepted as a real transfer; anything above is assumed
/// to be a misread reference number.
const MAX_AMOUNT: i64 = 10_000_000;

/// Labels that introduce the amount block (English and Thai).
const AMOUNT_LABELS: &[&str] = &["amount", "total", "ยอดเงิน", "จำนวนเงิน", "จำนวน", "รวม"];

/// Markers that end the header region (English and Thai).
const SECTION_MARKERS: &[&str] = &["from", "to", "fee", "จาก", "ถึง", "ค่าธรรมเนียม"];

/// How many lines below an amount label are searched for the value.
const LABEL_WINDOW: usize = 4;

/// Validate and normalize one money candidate: strip grouping commas,
/// reject non-positive and implausibly large values, round half-up to 2
/// decimal places.
pub fn clean_amount(raw: &str) -> Option<Decimal> {
    let value = Decimal::from_str(&raw.replace(',', "")).ok()?;
    if value <= Decimal::ZERO || value > Decimal::from(MAX_AMOUNT) {
        return None;
    }
    Some(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// Canonical string form: comma-grouped with exactly 2 decimals.
pub fn format_grouped(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let rendered = format!("{:.2}", rounded);
    let (int_part, dec_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let chars: Vec<char> = digits.chars().collect();
    let mut grouped = String::new();
    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(*c);
    }

    format!("{}{}.{}", sign, grouped, dec_part)
}

/// All valid money tokens in `text`, in order of appearance. A match whose
/// neighbour extends the number (a third fraction digit, a preceding digit
/// or decimal point) is not a money token; an adjacent currency code like
/// "759.00THB" is fine.
fn money_tokens(text: &str) -> Vec<Decimal> {
    MONEY
        .find_iter(text)
        .filter(|m| {
            let before = text[..m.start()].chars().next_back();
            let after = text[m.end()..].chars().next();
            !matches!(before, Some(c) if c.is_ascii_digit() || c == '.')
                && !matches!(after, Some(c) if c.is_ascii_digit())
        })
        .filter_map(|m| clean_amount(m.as_str()))
        .collect()
}

/// Tier 1: the first valid token on an amount-label line or the few lines
/// below it.
fn label_anchored(lines: &[String]) -> Option<Decimal> {
    for (i, line) in lines.iter().enumerate() {
        let lower = line.to_lowercase();
        if !AMOUNT_LABELS.iter().any(|label| lower.contains(label)) {
            continue;
        }
        for candidate in &lines[i..(i + LABEL_WINDOW).min(lines.len())] {
            if let Some(value) = money_tokens(candidate).into_iter().next() {
                return Some(value);
            }
        }
    }
    None
}

/// Tier 2: the first valid token above the From/To section.
fn header_region(lines: &[String]) -> Option<Decimal> {
    let header_end = lines
        .iter()
        .position(|line| {
            let lower = line.to_lowercase();
            SECTION_MARKERS.iter().any(|marker| lower.contains(marker))
        })
        .unwrap_or(lines.len());

    lines[..header_end]
        .iter()
        .find_map(|line| money_tokens(line).into_iter().next())
}

/// Tier 3: the largest valid token anywhere.
fn largest_amount(text: &str) -> Option<Decimal> {
    money_tokens(text).into_iter().max()
}

/// Withdrawal amount extractor.
pub struct AmountExtractor;

impl AmountExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for AmountExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldExtractor for AmountExtractor {
    fn name(&self) -> &'static str {
        "amount"
    }

    // "thb_withdrawal" is an alias kept for older ledger deployments
    fn fields(&self) -> &'static [&'static str] {
        &["withdrawal", "thb_withdrawal"]
    }

    fn extract(&self, transcript: &Transcript) -> Result<FieldMap> {
        let found = label_anchored(&transcript.lines)
            .or_else(|| header_region(&transcript.lines))
            .or_else(|| largest_amount(&transcript.full_text));

        let rendered = found.map(format_grouped).unwrap_or_default();

        let mut out = FieldMap::new();
        out.insert("withdrawal".to_string(), rendered.clone());
        out.insert("thb_withdrawal".to_string(), rendered);
        Ok(out)
    }
}
