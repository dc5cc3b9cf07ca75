//! Driven port for decoding uploaded spreadsheets.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;

use super::define_port_error;

/// A raw cell value before any coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum RawCell {
    /// Blank or error cell.
    Empty,
    /// Text as written in the sheet.
    Text(String),
    /// Numeric cell, including dates stored as serial numbers.
    Number(f64),
    /// Boolean cell.
    Bool(bool),
}

/// One data row keyed by the raw header text of its column.
pub type SheetRow = BTreeMap<String, RawCell>;

define_port_error! {
    /// Errors raised while reading a spreadsheet.
    pub enum SpreadsheetSourceError {
        /// The file could not be opened or read.
        Open { message: String } => "failed to open spreadsheet: {message}",
        /// The file is not a readable workbook or has no sheets.
        Decode { message: String } => "failed to decode spreadsheet: {message}",
    }
}

/// Reads data rows from the first sheet of a workbook.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpreadsheetSource: Send + Sync {
    /// Decode data rows in sheet order. The header row is not returned; its
    /// cells become the keys of every [`SheetRow`].
    async fn read_rows(&self, path: &Path) -> Result<Vec<SheetRow>, SpreadsheetSourceError>;
}

/// Fixture source that reads every file as an empty sheet.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSpreadsheetSource;

#[async_trait]
impl SpreadsheetSource for FixtureSpreadsheetSource {
    async fn read_rows(&self, _path: &Path) -> Result<Vec<SheetRow>, SpreadsheetSourceError> {
        Ok(Vec::new())
    }
}
