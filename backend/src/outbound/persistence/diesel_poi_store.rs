//! PostgreSQL-backed `PoiStore` running replace-all imports in one
//! transaction on an exclusively held connection.
//!
//! `TRUNCATE` is transactional in PostgreSQL, so rolling back restores the
//! previous rows. A transaction-scoped advisory lock serialises imports
//! across processes sharing the database.

use async_trait::async_trait;
use diesel::sql_types::BigInt;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, RunQueryDsl, TransactionManager};
use tracing::warn;

use crate::domain::NewPoi;
use crate::domain::ports::{PoiReplaceTransaction, PoiStore, PoiStoreError};

use super::diesel_helpers::{StorageFault, classify_diesel_error, map_pool_error_message};
use super::models::NewPoiRow;
use super::pool::DbPool;
use super::schema::pois;

/// Advisory lock key held by every replace-all transaction.
pub const POI_IMPORT_LOCK_KEY: i64 = 0x504f_495f_494d_5054;

/// Diesel-backed implementation of the `PoiStore` port.
#[derive(Clone)]
pub struct DieselPoiStore {
    pool: DbPool,
}

impl DieselPoiStore {
    /// Create a new store with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> PoiStoreError {
    match classify_diesel_error(error, operation) {
        StorageFault::Connection(message) => PoiStoreError::connection(message),
        StorageFault::Query(message) => PoiStoreError::query(message),
    }
}

#[async_trait]
impl PoiStore for DieselPoiStore {
    async fn begin_replace(&self) -> Result<Box<dyn PoiReplaceTransaction>, PoiStoreError> {
        let mut conn = self
            .pool
            .get_owned()
            .await
            .map_err(|err| PoiStoreError::connection(map_pool_error_message(err)))?;
        AnsiTransactionManager::begin_transaction(&mut *conn)
            .await
            .map_err(|err| map_diesel_error(err, "begin transaction"))?;

        let mut transaction = DieselReplaceTransaction { conn };
        if let Err(error) = transaction.acquire_import_lock().await {
            if let Err(rollback_error) = Box::new(transaction).rollback().await {
                warn!(error = %rollback_error, "rollback after lock failure did not complete");
            }
            return Err(error);
        }
        Ok(Box::new(transaction))
    }
}

/// Open replace-all transaction owning its pooled connection.
///
/// Dropping it without commit or rollback returns a connection with an open
/// transaction; the pool manager treats that connection as broken and
/// discards it, which aborts the transaction server-side.
struct DieselReplaceTransaction {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

impl DieselReplaceTransaction {
    async fn acquire_import_lock(&mut self) -> Result<(), PoiStoreError> {
        diesel::sql_query("SELECT pg_advisory_xact_lock($1)")
            .bind::<BigInt, _>(POI_IMPORT_LOCK_KEY)
            .execute(&mut *self.conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "acquire import lock"))
    }
}

#[async_trait]
impl PoiReplaceTransaction for DieselReplaceTransaction {
    async fn truncate(&mut self) -> Result<(), PoiStoreError> {
        diesel::sql_query("TRUNCATE TABLE pois RESTART IDENTITY")
            .execute(&mut *self.conn)
            .await
            .map(|_| ())
            .map_err(|err| map_diesel_error(err, "truncate pois"))
    }

    async fn insert_chunk(&mut self, rows: &[NewPoi]) -> Result<u64, PoiStoreError> {
        if rows.is_empty() {
            return Ok(0);
        }
        let values: Vec<NewPoiRow<'_>> = rows
            .iter()
            .map(|poi| NewPoiRow {
                name: poi.name(),
                latitude: poi.latitude(),
                longitude: poi.longitude(),
            })
            .collect();
        let inserted = diesel::insert_into(pois::table)
            .values(&values)
            .execute(&mut *self.conn)
            .await
            .map_err(|err| map_diesel_error(err, "insert poi chunk"))?;
        u64::try_from(inserted).map_err(|err| PoiStoreError::query(err.to_string()))
    }

    async fn commit(self: Box<Self>) -> Result<(), PoiStoreError> {
        let mut this = *self;
        AnsiTransactionManager::commit_transaction(&mut *this.conn)
            .await
            .map_err(|err| map_diesel_error(err, "commit import"))
    }

    async fn rollback(self: Box<Self>) -> Result<(), PoiStoreError> {
        let mut this = *self;
        AnsiTransactionManager::rollback_transaction(&mut *this.conn)
            .await
            .map_err(|err| map_diesel_error(err, "rollback import"))
    }
}
