//! PostgreSQL-backed `PoiRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::PointOfInterest;
use crate::domain::ports::{PoiRepository, PoiRepositoryError};

use super::diesel_helpers::{StorageFault, classify_diesel_error, map_pool_error_message};
use super::models::PoiRow;
use super::pool::{DbPool, PoolError};
use super::schema::pois;

/// Diesel-backed implementation of the `PoiRepository` port.
#[derive(Clone)]
pub struct DieselPoiRepository {
    pool: DbPool,
}

impl DieselPoiRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> PoiRepositoryError {
    PoiRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> PoiRepositoryError {
    match classify_diesel_error(error, "list pois") {
        StorageFault::Connection(message) => PoiRepositoryError::connection(message),
        StorageFault::Query(message) => PoiRepositoryError::query(message),
    }
}

/// Convert rows to domain POIs, skipping any that violate the invariants.
fn rows_to_pois(rows: Vec<PoiRow>) -> Vec<PointOfInterest> {
    rows.into_iter()
        .filter_map(|row| {
            match PointOfInterest::try_from_parts(row.id, row.name, row.latitude, row.longitude) {
                Ok(poi) => Some(poi),
                Err(error) => {
                    warn!(id = row.id, %error, "skipping invalid stored poi");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl PoiRepository for DieselPoiRepository {
    async fn list_all(&self) -> Result<Vec<PointOfInterest>, PoiRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<PoiRow> = pois::table
            .select(PoiRow::as_select())
            .order(pois::id.asc())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows_to_pois(rows))
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion.
    use super::*;

    #[test]
    fn invalid_rows_are_skipped() {
        let rows = vec![
            PoiRow {
                id: 1,
                name: "Seoul Station".to_owned(),
                latitude: 37.5547,
                longitude: 126.9706,
            },
            PoiRow {
                id: 2,
                name: "  ".to_owned(),
                latitude: 37.0,
                longitude: 127.0,
            },
        ];

        let pois = rows_to_pois(rows);

        assert_eq!(pois.len(), 1);
        assert_eq!(pois[0].id(), 1);
    }

    #[test]
    fn pool_failures_are_connection_errors() {
        let error = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(error, PoiRepositoryError::connection("timed out"));
    }
}
