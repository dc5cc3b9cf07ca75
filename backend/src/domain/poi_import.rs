//! Spreadsheet row extraction for the import pipeline.
//!
//! Header names are normalised (trim, lowercase, whitespace runs to `_`) and
//! resolved once from the first row. Rows missing a title or a finite
//! coordinate are skipped and reported as [`RowRejection`]s rather than
//! failing the whole import.

use tracing::debug;

use super::ports::{RawCell, SheetRow};
use super::{Error, NewPoi};

const TITLE_ALIASES: [&str; 2] = ["title", "name"];
const LATITUDE_ALIASES: [&str; 2] = ["latitude", "lat"];
const LONGITUDE_ALIASES: [&str; 3] = ["longitude", "lon", "lng"];

/// Normalise a raw header name for matching.
///
/// # Examples
/// ```
/// use poi_backend::domain::poi_import::normalize_header;
///
/// assert_eq!(normalize_header("  Place   Title "), "place_title");
/// assert_eq!(normalize_header("LATITUDE"), "latitude");
/// ```
#[must_use]
pub fn normalize_header(raw: &str) -> String {
    raw.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}

/// Raw header names holding each required field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMapping {
    title: String,
    latitude: String,
    longitude: String,
}

impl ColumnMapping {
    /// Resolve the required columns from the keys of the first row.
    ///
    /// # Errors
    /// Returns [`Error::invalid_request`] naming every required column that
    /// no header matches.
    pub fn resolve<'a>(headers: impl IntoIterator<Item = &'a str>) -> Result<Self, Error> {
        let normalized: Vec<(String, &str)> = headers
            .into_iter()
            .map(|raw| (normalize_header(raw), raw))
            .collect();
        let find = |aliases: &[&str]| {
            aliases.iter().find_map(|alias| {
                normalized
                    .iter()
                    .find(|(name, _)| name.as_str() == *alias)
                    .map(|(_, raw)| (*raw).to_owned())
            })
        };

        let title = find(TITLE_ALIASES.as_slice());
        let latitude = find(LATITUDE_ALIASES.as_slice());
        let longitude = find(LONGITUDE_ALIASES.as_slice());
        match (title, latitude, longitude) {
            (Some(title), Some(latitude), Some(longitude)) => Ok(Self {
                title,
                latitude,
                longitude,
            }),
            (title, latitude, longitude) => {
                let missing: Vec<&str> = [
                    (title.is_none(), "title"),
                    (latitude.is_none(), "latitude"),
                    (longitude.is_none(), "longitude"),
                ]
                .into_iter()
                .filter_map(|(absent, name)| absent.then_some(name))
                .collect();
                Err(Error::invalid_request(format!(
                    "spreadsheet is missing required columns: {}",
                    missing.join(", ")
                )))
            }
        }
    }
}

/// Why a row was left out of the batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// Title cell is missing or blank.
    MissingTitle,
    /// Latitude cell is missing.
    MissingLatitude,
    /// Longitude cell is missing.
    MissingLongitude,
    /// Latitude is not a finite number.
    InvalidLatitude,
    /// Longitude is not a finite number.
    InvalidLongitude,
}

/// A skipped row and the reason it was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRejection {
    /// One-based data row position, excluding the header row.
    pub row_number: usize,
    /// First check the row failed.
    pub reason: RejectionReason,
}

/// Validated candidates extracted from one upload, in file order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportBatch {
    rows: Vec<NewPoi>,
    rejections: Vec<RowRejection>,
}

impl ImportBatch {
    /// Accepted candidates in file order.
    #[must_use]
    pub fn rows(&self) -> &[NewPoi] {
        &self.rows
    }

    /// Skipped rows in file order.
    #[must_use]
    pub fn rejections(&self) -> &[RowRejection] {
        &self.rejections
    }
}

/// Validate every data row and collect the accepted candidates.
///
/// An empty sheet produces an empty batch.
///
/// # Errors
/// Returns [`Error::invalid_request`] when the first row lacks a required
/// column.
pub fn extract_batch(rows: &[SheetRow]) -> Result<ImportBatch, Error> {
    let Some(first) = rows.first() else {
        return Ok(ImportBatch::default());
    };
    let mapping = ColumnMapping::resolve(first.keys().map(String::as_str))?;

    let mut batch = ImportBatch::default();
    for (row_number, row) in (1..).zip(rows) {
        match validate_row(&mapping, row) {
            Ok(candidate) => batch.rows.push(candidate),
            Err(reason) => {
                debug!(row_number, ?reason, "skipping spreadsheet row");
                batch.rejections.push(RowRejection { row_number, reason });
            }
        }
    }
    Ok(batch)
}

fn validate_row(mapping: &ColumnMapping, row: &SheetRow) -> Result<NewPoi, RejectionReason> {
    let title = row
        .get(&mapping.title)
        .and_then(cell_text)
        .ok_or(RejectionReason::MissingTitle)?;
    let latitude = coordinate(
        row.get(&mapping.latitude),
        RejectionReason::MissingLatitude,
        RejectionReason::InvalidLatitude,
    )?;
    let longitude = coordinate(
        row.get(&mapping.longitude),
        RejectionReason::MissingLongitude,
        RejectionReason::InvalidLongitude,
    )?;
    NewPoi::try_new(title, latitude, longitude).map_err(|_| RejectionReason::MissingTitle)
}

fn cell_text(cell: &RawCell) -> Option<String> {
    let text = match cell {
        RawCell::Empty => return None,
        RawCell::Text(text) => text.trim().to_owned(),
        RawCell::Number(number) => number.to_string(),
        RawCell::Bool(flag) => flag.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn coordinate(
    cell: Option<&RawCell>,
    missing: RejectionReason,
    invalid: RejectionReason,
) -> Result<f64, RejectionReason> {
    let value = match cell {
        None | Some(RawCell::Empty) => return Err(missing),
        Some(RawCell::Text(text)) if text.trim().is_empty() => return Err(missing),
        Some(RawCell::Text(text)) => text.trim().parse::<f64>().map_err(|_| invalid)?,
        Some(RawCell::Number(number)) => *number,
        Some(RawCell::Bool(_)) => return Err(invalid),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err(invalid)
    }
}
