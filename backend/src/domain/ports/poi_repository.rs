//! Driven port for reading stored POIs.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::PointOfInterest;

define_port_error! {
    /// Errors raised while reading POIs.
    pub enum PoiRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "poi storage connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } => "poi storage query failed: {message}",
    }
}

/// Read access to the POI table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiRepository: Send + Sync {
    /// Every stored POI, ordered by identifier.
    async fn list_all(&self) -> Result<Vec<PointOfInterest>, PoiRepositoryError>;
}

/// Fixture implementation serving a small fixed set of POIs.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePoiRepository;

const FIXTURE_POIS: [(i64, &str, f64, f64); 3] = [
    (1, "Seoul Station", 37.5547, 126.9706),
    (2, "Gangnam Station", 37.4979, 127.0276),
    (3, "Coffee Bean Gangnam", 37.4985, 127.0282),
];

#[async_trait]
impl PoiRepository for FixturePoiRepository {
    async fn list_all(&self) -> Result<Vec<PointOfInterest>, PoiRepositoryError> {
        FIXTURE_POIS
            .iter()
            .map(|(id, name, latitude, longitude)| {
                PointOfInterest::try_from_parts(*id, *name, *latitude, *longitude)
                    .map_err(|err| PoiRepositoryError::query(err.to_string()))
            })
            .collect()
    }
}
