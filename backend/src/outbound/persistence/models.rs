//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use diesel::prelude::*;

use super::schema::pois;

/// Row struct for reading from the pois table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = pois)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PoiRow {
    pub id: i64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Insertable struct for bulk POI inserts.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = pois)]
pub(crate) struct NewPoiRow<'a> {
    pub name: &'a str,
    pub latitude: f64,
    pub longitude: f64,
}
