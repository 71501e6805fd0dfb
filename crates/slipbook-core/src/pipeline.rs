//! Extraction orchestration and schema-aware field mapping.
//!
//! The orchestrator holds the statically-known extractor set and runs
//! every enabled extractor over one transcript, in isolation: one broken
//! extractor costs its own fields, never the rest of the run.

use tracing::{debug, warn};

use crate::config::ExtractionConfig;
use crate::extract::{
    AmountExtractor, DateTimeExtractor, DescriptionExtractor, FieldExtractor, FieldMap,
    NoteExtractor,
};
use crate::ledger::{Cell, UpdateRecord};
use crate::transcript::Transcript;

/// Header aliases tolerated per extracted field, preferred spelling first.
/// "Descrition" is a long-lived header typo in deployed ledgers.
const WITHDRAWAL_COLUMNS: &[&str] = &["Withdrawal THB", "THB Withdrawal"];
const DESCRIPTION_COLUMNS: &[&str] = &["Descrition", "Description"];

/// Runs the extractor set over transcripts.
pub struct Orchestrator {
    extractors: Vec<Box<dyn FieldExtractor>>,
}

impl Orchestrator {
    /// All four extractors enabled.
    pub fn new() -> Self {
        Self::from_config(&ExtractionConfig::default())
    }

    /// Extractor set selected by configuration flags.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mut extractors: Vec<Box<dyn FieldExtractor>> = Vec::new();
        if config.date_time {
            extractors.push(Box::new(DateTimeExtractor::new()));
        }
        if config.amount {
            extractors.push(Box::new(AmountExtractor::new()));
        }
        if config.description {
            extractors.push(Box::new(DescriptionExtractor::new()));
        }
        if config.note {
            extractors.push(Box::new(NoteExtractor::new()));
        }
        Self { extractors }
    }

    /// Custom extractor set.
    pub fn with_extractors(extractors: Vec<Box<dyn FieldExtractor>>) -> Self {
        Self { extractors }
    }

    /// Run every extractor over one transcript. A failing extractor is
    /// logged with the image name and contributes nothing; the others
    /// still run.
    pub fn extract(&self, image: &str, transcript: &Transcript) -> FieldMap {
        let mut fields = FieldMap::new();
        for extractor in &self.extractors {
            match extractor.extract(transcript) {
                Ok(map) => {
                    debug!(image, extractor = extractor.name(), ?map, "extracted");
                    fields.extend(map);
                }
                Err(e) => {
                    warn!(
                        image,
                        extractor = extractor.name(),
                        error = %e,
                        "extractor failed, treating its fields as empty"
                    );
                }
            }
        }
        fields
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Map extracted fields onto the live schema. Only columns present in
/// `columns` receive values; the schema is authoritative, not the
/// extractor. The withdrawal value is coerced to a numeric cell here.
pub fn map_to_columns(fields: &FieldMap, columns: &[String]) -> UpdateRecord {
    let mut update = UpdateRecord::new();

    if let Some(date) = fields.get("date") {
        if columns.iter().any(|c| c == "Date") {
            update.set("Date", Cell::text(date));
        }
    }
    if let Some(time) = fields.get("time") {
        if columns.iter().any(|c| c == "Time") {
            update.set("Time", Cell::text(time));
        }
    }

    // Either key satisfies the mapping; older extractor builds emitted
    // only "thb_withdrawal"
    let withdrawal = fields.get("thb_withdrawal").or_else(|| fields.get("withdrawal"));
    if let (Some(raw), Some(column)) = (withdrawal, existing_column(columns, WITHDRAWAL_COLUMNS)) {
        update.set(column, Cell::numeric(raw));
    }

    if let (Some(description), Some(column)) =
        (fields.get("description"), existing_column(columns, DESCRIPTION_COLUMNS))
    {
        update.set(column, Cell::text(description));
    }

    if let Some(note) = fields.get("note") {
        if columns.iter().any(|c| c == "Note") {
            update.set("Note", Cell::text(note));
        }
    }

    update
}

fn existing_column<'a>(columns: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    candidates
        .iter()
        .find_map(|candidate| columns.iter().find(|column| column.as_str() == *candidate))
        .map(String::as_str)
}
