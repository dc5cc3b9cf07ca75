//! Outbound adapters for decoding uploaded spreadsheets.

mod calamine_source;

pub use calamine_source::CalamineSpreadsheetSource;
