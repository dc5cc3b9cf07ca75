//! Import pipeline orchestration.
//!
//! Commit protocol, all inside one storage transaction:
//! 1. truncate the POI table;
//! 2. insert the batch in chunks of [`IMPORT_CHUNK_SIZE`], one chunk at a
//!    time, summing reported row counts;
//! 3. commit, or roll back on the first failure and return that failure.
//!
//! A rollback failure never replaces the original error; it is logged and
//! reported through [`ImportMetrics`]. Imports within one process are
//! serialised by an async mutex.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::poi_import::{ImportBatch, extract_batch};
use super::ports::{
    ImportMetrics, ImportOutcomeKind, NoOpImportMetrics, PoiImportCommand, PoiImportOutcome,
    PoiImportRequest, PoiReplaceTransaction, PoiStore, PoiStoreError, SpreadsheetSource,
    SpreadsheetSourceError, SuppressedFailureStage,
};
use super::{Error, NewPoi};

/// Rows written per bulk insert statement.
pub const IMPORT_CHUNK_SIZE: usize = 500;

/// Message returned when the request carries no file.
pub const MISSING_UPLOAD_MESSAGE: &str = "No file uploaded";

/// Domain service implementing [`PoiImportCommand`].
#[derive(Clone)]
pub struct PoiImportService<R, S> {
    reader: Arc<R>,
    store: Arc<S>,
    metrics: Arc<dyn ImportMetrics>,
    clock: Arc<dyn Clock>,
    gate: Arc<Mutex<()>>,
}

impl<R, S> PoiImportService<R, S> {
    /// Create a service reporting to `metrics`.
    pub fn new(
        reader: Arc<R>,
        store: Arc<S>,
        metrics: Arc<dyn ImportMetrics>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            reader,
            store,
            metrics,
            clock,
            gate: Arc::new(Mutex::new(())),
        }
    }

    /// Create a service that discards metrics.
    pub fn with_noop_metrics(reader: Arc<R>, store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self::new(reader, store, Arc::new(NoOpImportMetrics), clock)
    }
}

impl<R, S> PoiImportService<R, S>
where
    R: SpreadsheetSource,
    S: PoiStore,
{
    async fn load_batch(&self, path: &Path) -> Result<ImportBatch, Error> {
        let rows = self
            .reader
            .read_rows(path)
            .await
            .map_err(map_reader_error)?;
        extract_batch(&rows)
    }

    async fn replace_all(&self, rows: &[NewPoi]) -> Result<u64, Error> {
        let mut transaction = self.store.begin_replace().await.map_err(map_store_error)?;
        match write_batch(transaction.as_mut(), rows).await {
            Ok(inserted) => {
                transaction.commit().await.map_err(map_store_error)?;
                Ok(inserted)
            }
            Err(error) => {
                if let Err(rollback_error) = transaction.rollback().await {
                    warn!(
                        error = %rollback_error,
                        "rollback after failed import did not complete"
                    );
                    self.record_suppressed(SuppressedFailureStage::Rollback).await;
                }
                Err(map_store_error(error))
            }
        }
    }

    async fn record_outcome(&self, outcome: ImportOutcomeKind, imported: u64, skipped: u64) {
        if let Err(error) = self.metrics.record_import(outcome, imported, skipped).await {
            warn!(%error, outcome = outcome.as_label(), "failed to record import metrics");
        }
    }

    async fn record_suppressed(&self, stage: SuppressedFailureStage) {
        if let Err(error) = self.metrics.record_suppressed_failure(stage).await {
            warn!(%error, stage = stage.as_label(), "failed to record suppressed failure");
        }
    }
}

#[async_trait]
impl<R, S> PoiImportCommand for PoiImportService<R, S>
where
    R: SpreadsheetSource,
    S: PoiStore,
{
    async fn import(&self, request: PoiImportRequest) -> Result<PoiImportOutcome, Error> {
        let Some(path) = request.upload_path else {
            self.record_outcome(ImportOutcomeKind::Rejected, 0, 0).await;
            return Err(Error::invalid_request(MISSING_UPLOAD_MESSAGE));
        };

        let batch = match self.load_batch(&path).await {
            Ok(batch) => batch,
            Err(error) => {
                self.record_outcome(ImportOutcomeKind::Rejected, 0, 0).await;
                return Err(error);
            }
        };
        let skipped = count(batch.rejections().len())?;

        let _guard = self.gate.lock().await;
        match self.replace_all(batch.rows()).await {
            Ok(imported) => {
                self.record_outcome(ImportOutcomeKind::Committed, imported, skipped)
                    .await;
                info!(imported, skipped, "poi import committed");
                Ok(PoiImportOutcome {
                    imported_count: imported,
                    skipped_count: skipped,
                    imported_at: self.clock.utc(),
                })
            }
            Err(error) => {
                self.record_outcome(ImportOutcomeKind::RolledBack, 0, skipped)
                    .await;
                warn!(error = %error, "poi import rolled back");
                Err(error)
            }
        }
    }
}

async fn write_batch(
    transaction: &mut dyn PoiReplaceTransaction,
    rows: &[NewPoi],
) -> Result<u64, PoiStoreError> {
    transaction.truncate().await?;
    let mut inserted = 0_u64;
    for chunk in rows.chunks(IMPORT_CHUNK_SIZE) {
        inserted += transaction.insert_chunk(chunk).await?;
    }
    Ok(inserted)
}

fn count(len: usize) -> Result<u64, Error> {
    u64::try_from(len).map_err(|_| Error::internal("row count exceeds supported range"))
}

fn map_store_error(error: PoiStoreError) -> Error {
    Error::storage_failure(error.to_string())
}

fn map_reader_error(error: SpreadsheetSourceError) -> Error {
    Error::invalid_request(error.to_string())
}

#[cfg(test)]
#[path = "poi_import_service_tests.rs"]
mod tests;
