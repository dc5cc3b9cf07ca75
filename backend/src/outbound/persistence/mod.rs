//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the POI storage ports backed by PostgreSQL via
//! `diesel-async` with `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types.
//! - **Internal models**: `models.rs` and `schema.rs` never leak to the
//!   domain.
//! - **Exclusive import connection**: [`DieselPoiStore`] holds one owned
//!   connection for the whole replace-all transaction.

pub(crate) mod diesel_helpers;
mod diesel_poi_repository;
mod diesel_poi_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_poi_repository::DieselPoiRepository;
pub use diesel_poi_store::{DieselPoiStore, POI_IMPORT_LOCK_KEY};
pub use migrations::{MIGRATIONS, MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
