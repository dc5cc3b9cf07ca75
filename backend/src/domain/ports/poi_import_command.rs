//! Driving port for bulk POI import.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::Error;

/// Request to replace the POI table from an uploaded spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoiImportRequest {
    /// Location of the uploaded file; `None` when nothing was attached.
    pub upload_path: Option<PathBuf>,
}

impl PoiImportRequest {
    /// Request for a file on disk.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            upload_path: Some(path.into()),
        }
    }
}

/// Result of a committed import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoiImportOutcome {
    /// Rows storage reported as inserted.
    pub imported_count: u64,
    /// Rows dropped by validation.
    pub skipped_count: u64,
    /// When the replacement was committed.
    pub imported_at: DateTime<Utc>,
}

/// Use-case port for replacing the POI table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiImportCommand: Send + Sync {
    /// Validate the upload and atomically replace every stored POI.
    async fn import(&self, request: PoiImportRequest) -> Result<PoiImportOutcome, Error>;
}
