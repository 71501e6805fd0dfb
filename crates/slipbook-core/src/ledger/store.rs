//! Ledger persistence.
//!
//! A store is opened once per batch: load at the start, save once at the
//! end. The CSV store treats the header row as the authoritative schema
//! and writes it back verbatim.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{Cell, Ledger, DEFAULT_COLUMNS};
use crate::error::LedgerError;

/// Loads and saves the ledger dataset.
pub trait LedgerStore {
    fn load(&self) -> Result<Ledger, LedgerError>;
    fn save(&self, ledger: &Ledger) -> Result<(), LedgerError>;
}

/// CSV-file-backed ledger store.
pub struct CsvStore {
    path: PathBuf,
    default_columns: Option<Vec<String>>,
}

impl CsvStore {
    /// Store at `path`, creating the default schema when no file exists.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            default_columns: Some(DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect()),
        }
    }

    /// Refuse to invent a schema: a missing file becomes a hard error.
    pub fn without_default_schema(mut self) -> Self {
        self.default_columns = None;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for CsvStore {
    fn load(&self) -> Result<Ledger, LedgerError> {
        if !self.path.exists() {
            return match &self.default_columns {
                Some(columns) => {
                    info!(path = %self.path.display(), "no ledger file, starting from default schema");
                    Ok(Ledger::with_columns(columns.clone()))
                }
                None => Err(LedgerError::SchemaAbsent(self.path.display().to_string())),
            };
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| LedgerError::Read(e.to_string()))?;

        let columns: Vec<String> = reader
            .headers()
            .map_err(|e| LedgerError::Read(e.to_string()))?
            .iter()
            .map(|header| header.to_string())
            .collect();
        if columns.is_empty() {
            return Err(LedgerError::SchemaAbsent(self.path.display().to_string()));
        }

        let mut ledger = Ledger::with_columns(columns);
        for record in reader.records() {
            let record = record.map_err(|e| LedgerError::Read(e.to_string()))?;
            let mut row = vec![Cell::Empty; ledger.columns.len()];
            for (i, field) in record.iter().enumerate().take(row.len()) {
                row[i] = Cell::text(field);
            }
            ledger.rows.push(row);
        }

        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> Result<(), LedgerError> {
        // Write a sibling temp file and rename it into place, so an
        // interrupted save never leaves a truncated ledger behind.
        let tmp = self.path.with_extension("csv.tmp");

        let mut writer =
            csv::Writer::from_path(&tmp).map_err(|e| LedgerError::Write(e.to_string()))?;
        writer
            .write_record(ledger.columns())
            .map_err(|e| LedgerError::Write(e.to_string()))?;
        for row in ledger.rows() {
            writer
                .write_record(row.iter().map(Cell::render))
                .map_err(|e| LedgerError::Write(e.to_string()))?;
        }
        writer.flush().map_err(|e| LedgerError::Write(e.to_string()))?;
        drop(writer);

        fs::rename(&tmp, &self.path).map_err(|e| LedgerError::Write(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Reconciler, UpdateRecord};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_file_uses_default_schema() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("Finances.csv"));

        let ledger = store.load().unwrap();
        assert_eq!(ledger.columns().len(), DEFAULT_COLUMNS.len());
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_missing_file_without_default_schema_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("Finances.csv")).without_default_schema();

        let err = store.load().unwrap_err();
        assert!(matches!(err, LedgerError::SchemaAbsent(_)));
    }

    #[test]
    fn test_existing_schema_is_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Finances.csv");
        fs::write(&path, "Date,Descrition,Image\n01/07/2025,Lunch,slip-01.jpg\n").unwrap();

        let store = CsvStore::new(&path);
        let ledger = store.load().unwrap();

        assert_eq!(ledger.columns(), ["Date", "Descrition", "Image"]);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.cell(0, "Descrition").unwrap().render(), "Lunch");
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("Finances.csv"));

        let mut ledger = store.load().unwrap();
        let reconciler = Reconciler::new();
        let mut update = UpdateRecord::new();
        update.set("Withdrawal THB", Cell::numeric("2,500.00"));
        update.set("Note", Cell::text("rent May"));
        reconciler.upsert(&mut ledger, "slip-01.jpg", &update).unwrap();
        store.save(&ledger).unwrap();

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.columns(), ledger.columns());
        let row = reloaded.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(reloaded.cell(row, "Withdrawal THB").unwrap().render(), "2,500.00");
        assert_eq!(reloaded.cell(row, "Note").unwrap().render(), "rent May");
    }

    #[test]
    fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvStore::new(dir.path().join("Finances.csv"));

        let ledger = store.load().unwrap();
        store.save(&ledger).unwrap();

        assert!(store.path().exists());
        assert!(!dir.path().join("Finances.csv.tmp").exists());
    }
}
