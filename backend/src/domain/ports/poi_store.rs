//! Driven port for atomically replacing the POI table.
//!
//! A [`PoiReplaceTransaction`] owns one storage connection with an open
//! transaction. It is consumed by [`PoiReplaceTransaction::commit`] or
//! [`PoiReplaceTransaction::rollback`]; dropping it without either must leave
//! storage unchanged.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::NewPoi;

define_port_error! {
    /// Errors raised by the replace-all store.
    pub enum PoiStoreError {
        /// A connection could not be acquired.
        Connection { message: String } => "poi store connection failed: {message}",
        /// A statement failed inside the transaction.
        Query { message: String } => "poi store query failed: {message}",
    }
}

/// Entry point for replace-all writes.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoiStore: Send + Sync {
    /// Acquire an exclusive connection and begin a transaction.
    async fn begin_replace(&self) -> Result<Box<dyn PoiReplaceTransaction>, PoiStoreError>;
}

/// Statements executed inside one replace-all transaction.
#[async_trait]
pub trait PoiReplaceTransaction: Send {
    /// Remove every existing row.
    async fn truncate(&mut self) -> Result<(), PoiStoreError>;

    /// Insert one chunk with a single bulk statement, returning the number of
    /// rows storage reports as inserted.
    async fn insert_chunk(&mut self, rows: &[NewPoi]) -> Result<u64, PoiStoreError>;

    /// Make the replacement visible and release the connection.
    async fn commit(self: Box<Self>) -> Result<(), PoiStoreError>;

    /// Discard every statement since `begin_replace` and release the
    /// connection.
    async fn rollback(self: Box<Self>) -> Result<(), PoiStoreError>;
}

/// Fixture store that accepts writes and discards them.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixturePoiStore;

#[async_trait]
impl PoiStore for FixturePoiStore {
    async fn begin_replace(&self) -> Result<Box<dyn PoiReplaceTransaction>, PoiStoreError> {
        Ok(Box::new(FixturePoiReplaceTransaction))
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct FixturePoiReplaceTransaction;

#[async_trait]
impl PoiReplaceTransaction for FixturePoiReplaceTransaction {
    async fn truncate(&mut self) -> Result<(), PoiStoreError> {
        Ok(())
    }

    async fn insert_chunk(&mut self, rows: &[NewPoi]) -> Result<u64, PoiStoreError> {
        u64::try_from(rows.len()).map_err(|err| PoiStoreError::query(err.to_string()))
    }

    async fn commit(self: Box<Self>) -> Result<(), PoiStoreError> {
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<(), PoiStoreError> {
        Ok(())
    }
}
