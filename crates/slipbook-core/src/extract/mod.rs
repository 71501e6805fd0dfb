//! Heuristic field extraction from receipt transcripts.
//!
//! Each extractor is an independent best-effort parser over one immutable
//! [`Transcript`]. Extractors always return every key they declare, with
//! an empty string standing for "not found"; an `Err` is reserved for
//! genuinely broken extraction and is downgraded to an empty family result
//! by the orchestrator.

mod patterns;

pub mod amount;
pub mod datetime;
pub mod description;
pub mod note;

pub use amount::AmountExtractor;
pub use datetime::DateTimeExtractor;
pub use description::DescriptionExtractor;
pub use note::NoteExtractor;

use std::collections::BTreeMap;

use crate::error::ExtractionError;
use crate::transcript::Transcript;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Field name to extracted value; empty string means "not found".
pub type FieldMap = BTreeMap<String, String>;

/// Trait for receipt field extractors.
pub trait FieldExtractor: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Keys this extractor always emits.
    fn fields(&self) -> &'static [&'static str];

    /// Extract this extractor's fields from one transcript.
    fn extract(&self, transcript: &Transcript) -> Result<FieldMap>;
}
