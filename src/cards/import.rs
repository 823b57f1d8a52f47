//! Bulk card import.
//!
//! Each record gets freshly generated numbers and is created in its own
//! transaction. A failing record is reported and skipped; it never aborts
//! the rest of the batch. Records come from CSV (`serial_number` and
//! `batch_number` columns, extra columns ignored), a JSON array, or any
//! iterator of [`ImportRecord`].

use std::io::Read;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::store::CardStore;
use crate::store::Store;

/// Columns an import file must carry.
pub const REQUIRED_COLUMNS: [&str; 2] = ["serial_number", "batch_number"];

/// One row of an import file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportRecord {
    pub serial_number: String,
    pub batch_number: String,
}

impl ImportRecord {
    pub fn new(serial_number: impl Into<String>, batch_number: impl Into<String>) -> Self {
        Self {
            serial_number: serial_number.into(),
            batch_number: batch_number.into(),
        }
    }
}

/// Outcome of an import run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Cards created.
    pub imported: usize,
    /// One message per failed record, naming its serial.
    pub errors: Vec<String>,
}

impl CardStore {
    /// Import records, generating numbers for each.
    pub fn import<S, I>(&mut self, store: &mut S, records: I) -> ImportReport
    where
        S: Store + ?Sized,
        I: IntoIterator<Item = ImportRecord>,
    {
        let mut report = ImportReport::default();
        for record in records {
            match self.create(store, &record.serial_number, &record.batch_number, None) {
                Ok(_) => report.imported += 1,
                Err(err) => {
                    warn!(serial = %record.serial_number, error = %err, "card import failed");
                    report
                        .errors
                        .push(format!("Error importing card {}: {err}", record.serial_number));
                }
            }
        }
        info!(imported = report.imported, failed = report.errors.len(), "card import finished");
        report
    }

    /// Import from CSV with a header row.
    ///
    /// The whole document is read before any card is created: a missing
    /// required column or a malformed row imports nothing.
    pub fn import_csv<S, R>(&mut self, store: &mut S, reader: R) -> ImportReport
    where
        S: Store + ?Sized,
        R: Read,
    {
        match read_csv(reader) {
            Ok(Some(records)) => self.import(store, records),
            Ok(None) => {
                warn!("card import file missing required columns");
                ImportReport {
                    imported: 0,
                    errors: vec!["CSV file missing required columns".to_string()],
                }
            }
            Err(err) => rejected(&err),
        }
    }

    /// Import from a JSON array of `{serial_number, batch_number}` objects.
    ///
    /// A document that does not parse imports nothing and reports one error.
    pub fn import_json<S: Store + ?Sized>(&mut self, store: &mut S, json: &str) -> ImportReport {
        match serde_json::from_str::<Vec<ImportRecord>>(json) {
            Ok(records) => self.import(store, records),
            Err(err) => rejected(&err),
        }
    }
}

/// `None` when a required column is absent.
fn read_csv<R: Read>(reader: R) -> csv::Result<Option<Vec<ImportRecord>>> {
    let mut reader = csv::Reader::from_reader(reader);
    let headers = reader.headers()?;
    if !REQUIRED_COLUMNS
        .iter()
        .all(|column| headers.iter().any(|header| header == *column))
    {
        return Ok(None);
    }
    reader.deserialize().collect::<csv::Result<Vec<_>>>().map(Some)
}

fn rejected(err: &dyn std::fmt::Display) -> ImportReport {
    warn!(error = %err, "card import document rejected");
    ImportReport {
        imported: 0,
        errors: vec![format!("Import error: {err}")],
    }
}
