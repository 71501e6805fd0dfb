//! Ledger model and reconciliation.
//!
//! The ledger is a row-oriented dataset keyed by source-image filename.
//! Its column set and order come from the persisted file (or the default
//! schema on first run) and are never altered by an upsert; only cell
//! values change.

mod store;

pub use store::{CsvStore, LedgerStore};

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::extract::amount::format_grouped;

/// Default schema used when no ledger file exists yet.
pub const DEFAULT_COLUMNS: &[&str] = &[
    "Date",
    "Time",
    "Withdrawal THB",
    "Deposit THB",
    "Foreign Amount",
    "FX Rate",
    "Description",
    "Account Number",
    "Merchant ID",
    "Note",
    "Sub-category",
    "Category",
    "Image",
    "Source",
    "Open",
];

/// Columns coerced to 2-decimal numbers before persistence. Both header
/// spellings of the withdrawal column are covered.
pub const DEFAULT_NUMERIC_COLUMNS: &[&str] = &[
    "Withdrawal THB",
    "THB Withdrawal",
    "Deposit THB",
    "Foreign Amount",
    "FX Rate",
];

/// A single ledger cell: text, a 2-decimal number, or nothing. Empty is
/// distinct from zero; zero is a real amount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(Decimal),
}

impl Cell {
    /// Text cell, or `Empty` for an empty string.
    pub fn text(value: &str) -> Self {
        if value.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(value.to_string())
        }
    }

    /// Numeric cell parsed from a possibly comma-grouped string, rounded
    /// half-up to 2 decimals. Unparseable input becomes `Empty`, never zero.
    pub fn numeric(raw: &str) -> Self {
        match Decimal::from_str(&raw.replace(',', "")) {
            Ok(value) => {
                Cell::Number(value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
            }
            Err(_) => Cell::Empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    /// Render for persistence: numbers in canonical grouped form.
    pub fn render(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(value) => value.clone(),
            Cell::Number(value) => format_grouped(*value),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Extracted values mapped to schema column names, ready to upsert.
#[derive(Debug, Clone, Default)]
pub struct UpdateRecord {
    cells: BTreeMap<String, Cell>,
}

impl UpdateRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, column: &str, cell: Cell) {
        self.cells.insert(column.to_string(), cell);
    }

    pub fn get(&self, column: &str) -> Option<&Cell> {
        self.cells.get(column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Cell)> + '_ {
        self.cells.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when at least one field carries a value.
    pub fn has_values(&self) -> bool {
        self.cells.values().any(|cell| !cell.is_empty())
    }
}

/// Row-oriented dataset with an authoritative, ordered column set.
#[derive(Debug, Clone)]
pub struct Ledger {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Ledger {
    pub fn with_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact header match.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column == name)
    }

    /// Index of the row whose `column` cell renders as `key`.
    pub fn find_row(&self, column: &str, key: &str) -> Option<usize> {
        let index = self.column_index(column)?;
        self.rows.iter().position(|row| row[index].render() == key)
    }

    pub fn cell(&self, row: usize, column: &str) -> Option<&Cell> {
        let index = self.column_index(column)?;
        self.rows.get(row)?.get(index)
    }
}

/// How an upsert treats cells that already hold a value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverwritePolicy {
    /// Every mapped field replaces the stored cell, blanks included.
    Replace,
    /// Write only non-empty values, and only into cells that are still
    /// empty. Stale-but-present data beats an accidental blank, and a
    /// filled cell is stable across reprocessing runs.
    #[default]
    FillEmpty,
}

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// Applies update records to the ledger without ever touching its schema.
pub struct Reconciler {
    identity_column: String,
    policy: OverwritePolicy,
    defaults: Vec<(String, String)>,
    numeric_columns: Vec<String>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self {
            identity_column: "Image".to_string(),
            policy: OverwritePolicy::default(),
            defaults: Vec::new(),
            numeric_columns: DEFAULT_NUMERIC_COLUMNS.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn from_config(config: &LedgerConfig) -> Self {
        let mut defaults = Vec::new();
        if let Some(source) = &config.source_value {
            defaults.push(("Source".to_string(), source.clone()));
        }
        Self {
            identity_column: config.identity_column.clone(),
            policy: config.overwrite,
            defaults,
            numeric_columns: config.numeric_columns.clone(),
        }
    }

    pub fn with_policy(mut self, policy: OverwritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_identity_column(mut self, column: &str) -> Self {
        self.identity_column = column.to_string();
        self
    }

    /// Fixed value written into `column` whenever a row is created.
    pub fn with_default(mut self, column: &str, value: &str) -> Self {
        self.defaults.push((column.to_string(), value.to_string()));
        self
    }

    pub fn identity_column(&self) -> &str {
        &self.identity_column
    }

    pub fn policy(&self) -> OverwritePolicy {
        self.policy
    }

    /// Update-or-insert the row for `key`. Fields naming columns outside
    /// the schema are silently dropped; the column set and order never
    /// change.
    pub fn upsert(
        &self,
        ledger: &mut Ledger,
        key: &str,
        update: &UpdateRecord,
    ) -> Result<UpsertOutcome, LedgerError> {
        let identity = ledger
            .column_index(&self.identity_column)
            .ok_or_else(|| LedgerError::MissingIdentityColumn(self.identity_column.clone()))?;

        if let Some(index) = ledger.rows.iter().position(|row| row[identity].render() == key) {
            for (column, cell) in update.iter() {
                let Some(ci) = ledger.column_index(column) else {
                    continue;
                };
                match self.policy {
                    OverwritePolicy::Replace => ledger.rows[index][ci] = cell.clone(),
                    OverwritePolicy::FillEmpty => {
                        if !cell.is_empty() && ledger.rows[index][ci].is_empty() {
                            ledger.rows[index][ci] = cell.clone();
                        }
                    }
                }
            }
            Ok(UpsertOutcome::Updated)
        } else {
            let mut row = vec![Cell::Empty; ledger.columns.len()];
            row[identity] = Cell::Text(key.to_string());
            for (column, value) in &self.defaults {
                if let Some(ci) = ledger.column_index(column) {
                    row[ci] = Cell::text(value);
                }
            }
            for (column, cell) in update.iter() {
                if let Some(ci) = ledger.column_index(column) {
                    row[ci] = cell.clone();
                }
            }
            ledger.rows.push(row);
            Ok(UpsertOutcome::Created)
        }
    }

    /// Coerce every configured numeric column to a 2-decimal number.
    /// Cells that fail coercion become empty, never zero. Run once,
    /// immediately before persistence.
    pub fn finalize(&self, ledger: &mut Ledger) {
        let indices: Vec<usize> = self
            .numeric_columns
            .iter()
            .filter_map(|column| ledger.column_index(column))
            .collect();

        for row in &mut ledger.rows {
            for &ci in &indices {
                let coerced = match &row[ci] {
                    Cell::Empty => Cell::Empty,
                    Cell::Number(value) => Cell::Number(
                        value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
                    ),
                    Cell::Text(raw) => Cell::numeric(raw),
                };
                row[ci] = coerced;
            }
        }
    }
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ledger() -> Ledger {
        Ledger::with_columns(DEFAULT_COLUMNS.iter().copied())
    }

    fn update(fields: &[(&str, Cell)]) -> UpdateRecord {
        let mut record = UpdateRecord::new();
        for (column, cell) in fields {
            record.set(column, cell.clone());
        }
        record
    }

    #[test]
    fn test_upsert_creates_row() {
        let mut l = ledger();
        let reconciler = Reconciler::new().with_default("Source", "bank-slip");

        let outcome = reconciler
            .upsert(
                &mut l,
                "slip-01.jpg",
                &update(&[("Date", Cell::text("01/07/2025"))]),
            )
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Created);
        assert_eq!(l.len(), 1);
        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.cell(row, "Date").unwrap().render(), "01/07/2025");
        assert_eq!(l.cell(row, "Source").unwrap().render(), "bank-slip");
        assert_eq!(l.cell(row, "Note").unwrap(), &Cell::Empty);
    }

    #[test]
    fn test_upsert_is_idempotent() {
        let mut l = ledger();
        let reconciler = Reconciler::new();
        let record = update(&[
            ("Date", Cell::text("01/07/2025")),
            ("Withdrawal THB", Cell::numeric("2,500.00")),
        ]);

        reconciler.upsert(&mut l, "slip-01.jpg", &record).unwrap();
        let once = l.rows().to_vec();
        reconciler.upsert(&mut l, "slip-01.jpg", &record).unwrap();

        assert_eq!(l.len(), 1);
        assert_eq!(l.rows(), once.as_slice());
    }

    #[test]
    fn test_schema_never_changes() {
        let mut l = ledger();
        let before = l.columns().to_vec();
        let reconciler = Reconciler::new();

        let record = update(&[
            ("Date", Cell::text("01/07/2025")),
            ("No Such Column", Cell::text("dropped")),
        ]);
        reconciler.upsert(&mut l, "slip-01.jpg", &record).unwrap();

        assert_eq!(l.columns(), before.as_slice());
        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.rows()[row].len(), before.len());
    }

    #[test]
    fn test_replace_policy_overwrites() {
        let mut l = ledger();
        let reconciler = Reconciler::new().with_policy(OverwritePolicy::Replace);

        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::text("first"))]))
            .unwrap();
        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::text("second"))]))
            .unwrap();

        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.cell(row, "Note").unwrap().render(), "second");
    }

    #[test]
    fn test_replace_policy_erases_with_blank() {
        let mut l = ledger();
        let reconciler = Reconciler::new().with_policy(OverwritePolicy::Replace);

        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::text("first"))]))
            .unwrap();
        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::Empty)]))
            .unwrap();

        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.cell(row, "Note").unwrap(), &Cell::Empty);
    }

    #[test]
    fn test_fill_empty_policy_keeps_filled_cells() {
        let mut l = ledger();
        let reconciler = Reconciler::new().with_policy(OverwritePolicy::FillEmpty);

        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::text("first"))]))
            .unwrap();
        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::text("second"))]))
            .unwrap();

        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.cell(row, "Note").unwrap().render(), "first");
    }

    #[test]
    fn test_fill_empty_policy_never_erases() {
        let mut l = ledger();
        let reconciler = Reconciler::new().with_policy(OverwritePolicy::FillEmpty);

        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::text("first"))]))
            .unwrap();
        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::Empty)]))
            .unwrap();

        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.cell(row, "Note").unwrap().render(), "first");
    }

    #[test]
    fn test_fill_empty_policy_fills_blanks() {
        let mut l = ledger();
        let reconciler = Reconciler::new().with_policy(OverwritePolicy::FillEmpty);

        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::Empty)]))
            .unwrap();
        reconciler
            .upsert(&mut l, "slip-01.jpg", &update(&[("Note", Cell::text("late"))]))
            .unwrap();

        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.cell(row, "Note").unwrap().render(), "late");
    }

    #[test]
    fn test_missing_identity_column() {
        let mut l = Ledger::with_columns(["Date", "Note"]);
        let err = Reconciler::new()
            .upsert(&mut l, "slip-01.jpg", &UpdateRecord::new())
            .unwrap_err();
        assert!(matches!(err, LedgerError::MissingIdentityColumn(_)));
    }

    #[test]
    fn test_finalize_rounds_half_up() {
        let mut l = ledger();
        let reconciler = Reconciler::new();
        reconciler
            .upsert(
                &mut l,
                "slip-01.jpg",
                &update(&[("Withdrawal THB", Cell::Text("1234.005".to_string()))]),
            )
            .unwrap();

        reconciler.finalize(&mut l);

        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.cell(row, "Withdrawal THB").unwrap().render(), "1,234.01");
    }

    #[test]
    fn test_finalize_rounds_down_below_midpoint() {
        let mut l = ledger();
        let reconciler = Reconciler::new();
        reconciler
            .upsert(
                &mut l,
                "slip-01.jpg",
                &update(&[("Withdrawal THB", Cell::Text("1234.004".to_string()))]),
            )
            .unwrap();

        reconciler.finalize(&mut l);

        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.cell(row, "Withdrawal THB").unwrap().render(), "1,234.00");
    }

    #[test]
    fn test_finalize_keeps_zero_and_drops_junk() {
        let mut l = ledger();
        let reconciler = Reconciler::new();
        reconciler
            .upsert(
                &mut l,
                "slip-01.jpg",
                &update(&[
                    ("Withdrawal THB", Cell::Text("0".to_string())),
                    ("FX Rate", Cell::Text("n/a".to_string())),
                ]),
            )
            .unwrap();

        reconciler.finalize(&mut l);

        let row = l.find_row("Image", "slip-01.jpg").unwrap();
        assert_eq!(l.cell(row, "Withdrawal THB").unwrap().render(), "0.00");
        assert_eq!(l.cell(row, "FX Rate").unwrap(), &Cell::Empty);
    }
}
