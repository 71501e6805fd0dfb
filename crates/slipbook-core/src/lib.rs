//! Core library for transfer-slip receipt ledgers.
//!
//! This crate provides:
//! - OCR transcript model and sidecar loading (OCR itself is external)
//! - Heuristic field extraction (date/time, amount, recipient, note)
//! - Extraction orchestration with per-extractor failure isolation
//! - Schema-preserving ledger reconciliation and CSV persistence

pub mod config;
pub mod error;
pub mod extract;
pub mod ledger;
pub mod normalize;
pub mod pipeline;
pub mod transcript;

pub use config::{ExtractionConfig, LedgerConfig, SlipbookConfig, TranscriptConfig};
pub use error::{ExtractionError, LedgerError, Result, SlipbookError, TranscriptError};
pub use extract::{
    AmountExtractor, DateTimeExtractor, DescriptionExtractor, FieldExtractor, FieldMap,
    NoteExtractor,
};
pub use ledger::{
    Cell, CsvStore, Ledger, LedgerStore, OverwritePolicy, Reconciler, UpdateRecord, UpsertOutcome,
};
pub use pipeline::{map_to_columns, Orchestrator};
pub use transcript::{SidecarSource, Transcript, TranscriptSource};
