//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly. Regenerate with
//! `diesel print-schema` after changing a migration.

diesel::table! {
    /// Points of interest, fully replaced by each import.
    pois (id) {
        /// Primary key, restarted from 1 by every import.
        id -> Int8,
        /// Display name, never blank.
        name -> Text,
        /// Latitude in decimal degrees.
        latitude -> Float8,
        /// Longitude in decimal degrees.
        longitude -> Float8,
    }
}
