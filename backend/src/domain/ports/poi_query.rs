//! Driving port for POI reads and ranked search.

use async_trait::async_trait;

use crate::domain::ranking::ScoredMatch;
use crate::domain::{Error, PointOfInterest};

/// Listing parameters for `GET /poi`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoiListRequest {
    /// Case-insensitive substring the name must contain.
    pub filter: Option<String>,
    /// Maximum number of rows returned.
    pub limit: Option<usize>,
}

/// Use-case port for reading POIs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiQuery: Send + Sync {
    /// Stored POIs ordered by identifier, optionally filtered and truncated.
    async fn list(&self, request: PoiListRequest) -> Result<Vec<PointOfInterest>, Error>;

    /// Ranked suggestions for `term`. A blank term yields an empty list.
    async fn search(&self, term: &str, limit: Option<usize>) -> Result<Vec<ScoredMatch>, Error>;

    /// The single best match for `term`, if any candidate scores above zero.
    async fn best_match(&self, term: &str) -> Result<Option<PointOfInterest>, Error>;
}
