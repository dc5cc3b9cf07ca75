//! Wire payloads and OpenAPI schema wrappers.
//!
//! Domain types stay framework-agnostic and do not derive `Serialize` or
//! `ToSchema`; the structs here mirror them in the inbound adapter layer.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::ports::PoiImportOutcome;
use crate::domain::{PointOfInterest, ScoredMatch};

/// A stored POI as returned in `resultData`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PoiPayload {
    /// Storage identifier.
    #[schema(example = 1)]
    pub id: i64,
    /// Display name.
    #[schema(example = "Gangnam Station")]
    pub name: String,
    /// Latitude in decimal degrees.
    #[schema(example = 37.4979)]
    pub latitude: f64,
    /// Longitude in decimal degrees.
    #[schema(example = 127.0276)]
    pub longitude: f64,
}

impl From<&PointOfInterest> for PoiPayload {
    fn from(poi: &PointOfInterest) -> Self {
        Self {
            id: poi.id(),
            name: poi.name().to_owned(),
            latitude: poi.latitude(),
            longitude: poi.longitude(),
        }
    }
}

/// A ranked search suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionPayload {
    /// Matched POI.
    #[serde(flatten)]
    pub poi: PoiPayload,
    /// Match score; higher is better.
    #[schema(example = 80.0)]
    pub score: f64,
}

impl From<&ScoredMatch> for SuggestionPayload {
    fn from(value: &ScoredMatch) -> Self {
        Self {
            poi: PoiPayload::from(&value.poi),
            score: value.score,
        }
    }
}

/// Summary of a committed import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcomePayload {
    /// Rows inserted.
    pub imported_count: u64,
    /// Rows skipped by validation.
    pub skipped_count: u64,
    /// RFC 3339 commit timestamp.
    #[schema(example = "2026-03-02T09:15:00+00:00")]
    pub imported_at: String,
}

impl From<&PoiImportOutcome> for ImportOutcomePayload {
    fn from(value: &PoiImportOutcome) -> Self {
        Self {
            imported_count: value.imported_count,
            skipped_count: value.skipped_count,
            imported_at: value.imported_at.to_rfc3339(),
        }
    }
}

/// OpenAPI schema for the multipart import body.
#[derive(ToSchema)]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct PoiUploadSchema {
    /// Spreadsheet (`.xlsx`, `.xls`, `.ods`) whose first sheet holds
    /// title, latitude and longitude columns.
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}
