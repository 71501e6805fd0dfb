//! Error types for the slipbook-core library.

use thiserror::Error;

/// Main error type for the slipbook library.
#[derive(Error, Debug)]
pub enum SlipbookError {
    /// Transcript acquisition error.
    #[error("transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// Ledger model or persistence error.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Field extraction error.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors obtaining the OCR transcript for one image.
///
/// These are image-local: the batch loop logs them and moves on to the
/// next image.
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// No transcript sidecar exists for the image.
    #[error("no transcript found at {0}")]
    Missing(String),

    /// The sidecar exists but could not be read.
    #[error("failed to read transcript: {0}")]
    Unreadable(String),

    /// The sidecar exists but is not valid transcript JSON.
    #[error("malformed transcript: {0}")]
    Malformed(String),
}

/// Errors touching the persistent ledger. These are fatal for a batch:
/// there is nowhere to write results.
#[derive(Error, Debug)]
pub enum LedgerError {
    /// No ledger file exists and no default schema is configured.
    #[error("no ledger at {0} and no default schema configured")]
    SchemaAbsent(String),

    /// The schema lacks the column rows are keyed by.
    #[error("ledger has no {0:?} column to key rows by")]
    MissingIdentityColumn(String),

    /// Failed to read the ledger file.
    #[error("failed to read ledger: {0}")]
    Read(String),

    /// Failed to write the ledger file.
    #[error("failed to write ledger: {0}")]
    Write(String),
}

/// Abnormal failure inside a single field extractor.
///
/// "Not found" is never an error; extractors report it as an empty field
/// value. An `Err` means the extractor itself broke, and the orchestrator
/// downgrades it to an empty result for that field family.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// Failed to parse a value that matched a pattern.
    #[error("failed to parse {field}: {value}")]
    Parse { field: String, value: String },
}

/// Result type for the slipbook library.
pub type Result<T> = std::result::Result<T, SlipbookError>;
