//! Configuration structures for the slipbook pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ledger::{OverwritePolicy, DEFAULT_NUMERIC_COLUMNS};

/// Main configuration for the slipbook pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SlipbookConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Ledger reconciliation configuration.
    pub ledger: LedgerConfig,

    /// Transcript sidecar configuration.
    pub transcripts: TranscriptConfig,
}

impl Default for SlipbookConfig {
    fn default() -> Self {
        Self {
            extraction: ExtractionConfig::default(),
            ledger: LedgerConfig::default(),
            transcripts: TranscriptConfig::default(),
        }
    }
}

/// Per-extractor enable flags. A disabled extractor contributes an empty
/// result for its field family, nothing else changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub date_time: bool,
    pub amount: bool,
    pub description: bool,
    pub note: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            date_time: true,
            amount: true,
            description: true,
            note: true,
        }
    }
}

/// Ledger reconciliation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Column holding the source-image filename that keys each row.
    pub identity_column: String,

    /// Fixed value written into the "Source" column when a row is created.
    pub source_value: Option<String>,

    /// How upserts treat cells that already hold a value.
    pub overwrite: OverwritePolicy,

    /// Columns coerced to 2-decimal numbers before persistence.
    pub numeric_columns: Vec<String>,

    /// Start from the built-in schema when no ledger file exists yet.
    pub create_default_schema: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            identity_column: "Image".to_string(),
            source_value: None,
            overwrite: OverwritePolicy::default(),
            numeric_columns: DEFAULT_NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
            create_default_schema: true,
        }
    }
}

/// Where transcript sidecar files live.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    /// Sidecar directory; `None` means next to each image.
    pub dir: Option<PathBuf>,

    /// Sidecar file extension.
    pub extension: String,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            dir: None,
            extension: "json".to_string(),
        }
    }
}

impl SlipbookConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SlipbookConfig::default();
        assert!(config.extraction.amount);
        assert_eq!(config.ledger.identity_column, "Image");
        assert_eq!(config.ledger.overwrite, OverwritePolicy::FillEmpty);
        assert_eq!(config.transcripts.extension, "json");
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: SlipbookConfig =
            serde_json::from_str(r#"{"ledger": {"overwrite": "replace"}}"#).unwrap();
        assert_eq!(config.ledger.overwrite, OverwritePolicy::Replace);
        assert_eq!(config.ledger.identity_column, "Image");
        assert!(config.extraction.note);
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = SlipbookConfig::default();
        config.ledger.source_value = Some("Bangkok Bank".to_string());
        config.save(&path).unwrap();

        let loaded = SlipbookConfig::from_file(&path).unwrap();
        assert_eq!(loaded.ledger.source_value.as_deref(), Some("Bangkok Bank"));
    }
}
