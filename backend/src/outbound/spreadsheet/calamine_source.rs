//! `calamine`-backed spreadsheet source.
//!
//! Reads the upload through `cap_std` on a blocking thread, detects the
//! workbook format from its contents and returns the first sheet's data rows
//! keyed by the header row.

use std::io::{self, Cursor};
use std::path::Path;

use async_trait::async_trait;
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use cap_std::{ambient_authority, fs::Dir};

use crate::domain::ports::{RawCell, SheetRow, SpreadsheetSource, SpreadsheetSourceError};

/// Decodes xlsx, xls, xlsb and ods workbooks with `calamine`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CalamineSpreadsheetSource;

#[async_trait]
impl SpreadsheetSource for CalamineSpreadsheetSource {
    async fn read_rows(&self, path: &Path) -> Result<Vec<SheetRow>, SpreadsheetSourceError> {
        let path = path.to_path_buf();
        tokio::task::spawn_blocking(move || {
            let bytes = read_file(&path).map_err(|error| {
                SpreadsheetSourceError::open(format!("{error} ({})", path.display()))
            })?;
            decode_first_sheet(bytes)
        })
        .await
        .map_err(|error| SpreadsheetSourceError::open(error.to_string()))?
    }
}

fn read_file(path: &Path) -> io::Result<Vec<u8>> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "upload path must be a file"))?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
    directory.read(Path::new(file_name))
}

fn decode_first_sheet(bytes: Vec<u8>) -> Result<Vec<SheetRow>, SpreadsheetSourceError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|error| SpreadsheetSourceError::decode(error.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| SpreadsheetSourceError::decode("workbook has no sheets"))?
        .map_err(|error| SpreadsheetSourceError::decode(error.to_string()))?;
    Ok(rows_from_range(&range))
}

/// Convert a sheet range into header-keyed rows.
///
/// Columns with a blank header are dropped, and so are rows with no
/// populated cell. When a header repeats, the leftmost column wins.
fn rows_from_range(range: &Range<Data>) -> Vec<SheetRow> {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let columns: Vec<Option<String>> = header.iter().map(header_text).collect();

    rows.filter_map(|cells| {
        let mut row = SheetRow::new();
        for (column, cell) in columns.iter().zip(cells) {
            let Some(key) = column else { continue };
            row.entry(key.clone()).or_insert_with(|| raw_cell(cell));
        }
        row.values()
            .any(|cell| *cell != RawCell::Empty)
            .then_some(row)
    })
    .collect()
}

fn header_text(cell: &Data) -> Option<String> {
    let text = match cell {
        Data::Empty | Data::Error(_) => return None,
        Data::String(text) => text.clone(),
        other => other.to_string(),
    };
    (!text.trim().is_empty()).then_some(text)
}

fn raw_cell(cell: &Data) -> RawCell {
    match cell {
        Data::Int(value) => RawCell::Number(*value as f64),
        Data::Float(value) => RawCell::Number(*value),
        Data::DateTime(value) => RawCell::Number(value.as_f64()),
        Data::String(text) | Data::DateTimeIso(text) | Data::DurationIso(text) => {
            RawCell::Text(text.clone())
        }
        Data::Bool(value) => RawCell::Bool(*value),
        Data::Error(_) | Data::Empty => RawCell::Empty,
    }
}

#[cfg(test)]
mod tests {
    //! Range conversion and file error handling.
    use super::*;
    use crate::test_support::cap_fs::write_file;
    use rstest::rstest;

    fn sheet(cells: &[&[Data]]) -> Range<Data> {
        let height = u32::try_from(cells.len()).expect("row count fits u32");
        let width = u32::try_from(cells.iter().map(|row| row.len()).max().unwrap_or(0))
            .expect("column count fits u32");
        let mut range = Range::new((0, 0), (height - 1, width - 1));
        for (row_index, row) in cells.iter().enumerate() {
            for (column_index, cell) in row.iter().enumerate() {
                let position = (
                    u32::try_from(row_index).expect("row index fits u32"),
                    u32::try_from(column_index).expect("column index fits u32"),
                );
                range.set_value(position, cell.clone());
            }
        }
        range
    }

    fn text(value: &str) -> Data {
        Data::String(value.to_owned())
    }

    #[test]
    fn header_row_keys_each_data_row() {
        let range = sheet(&[
            &[text("Name"), text("Latitude"), text("Longitude")],
            &[text("Seoul Station"), Data::Float(37.5547), Data::Float(126.9706)],
        ]);

        let rows = rows_from_range(&range);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Name"], RawCell::Text("Seoul Station".to_owned()));
        assert_eq!(rows[0]["Latitude"], RawCell::Number(37.5547));
        assert_eq!(rows[0]["Longitude"], RawCell::Number(126.9706));
    }

    #[test]
    fn blank_rows_and_blank_headers_are_dropped() {
        let range = sheet(&[
            &[text("name"), Data::Empty, text("lat"), text("lng")],
            &[Data::Empty, Data::Empty, Data::Empty, Data::Empty],
            &[text("Namsan"), text("ignored"), Data::Int(37), Data::Int(127)],
        ]);

        let rows = rows_from_range(&range);

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].len(), 3);
        assert_eq!(rows[0]["lat"], RawCell::Number(37.0));
    }

    #[test]
    fn missing_cells_are_empty() {
        let range = sheet(&[
            &[text("name"), text("lat"), text("lng")],
            &[text("Namsan"), Data::Empty, Data::Empty],
        ]);

        let rows = rows_from_range(&range);

        assert_eq!(rows[0]["lat"], RawCell::Empty);
        assert_eq!(rows[0]["lng"], RawCell::Empty);
    }

    #[test]
    fn repeated_header_keeps_leftmost_column() {
        let range = sheet(&[
            &[text("name"), text("name")],
            &[text("first"), text("second")],
        ]);

        let rows = rows_from_range(&range);

        assert_eq!(rows[0]["name"], RawCell::Text("first".to_owned()));
    }

    #[test]
    fn header_only_sheet_has_no_rows() {
        let range = sheet(&[&[text("name"), text("lat"), text("lng")]]);
        assert!(rows_from_range(&range).is_empty());
    }

    #[rstest]
    #[case(Data::Bool(true), RawCell::Bool(true))]
    #[case(Data::Int(7), RawCell::Number(7.0))]
    #[case(Data::Error(calamine::CellErrorType::Div0), RawCell::Empty)]
    #[case(Data::DateTimeIso("2026-03-02".to_owned()), RawCell::Text("2026-03-02".to_owned()))]
    fn cells_convert_to_raw_values(#[case] cell: Data, #[case] expected: RawCell) {
        assert_eq!(raw_cell(&cell), expected);
    }

    #[tokio::test]
    async fn missing_file_is_an_open_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent.xlsx");

        let error = CalamineSpreadsheetSource
            .read_rows(&path)
            .await
            .expect_err("missing file should fail");

        assert!(matches!(error, SpreadsheetSourceError::Open { .. }));
    }

    #[tokio::test]
    async fn non_workbook_bytes_are_a_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.xlsx");
        write_file(&path, b"name,lat,lng\n").expect("write upload");

        let error = CalamineSpreadsheetSource
            .read_rows(&path)
            .await
            .expect_err("plain text should fail");

        assert!(matches!(error, SpreadsheetSourceError::Decode { .. }));
    }
}
