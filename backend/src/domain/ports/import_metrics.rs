//! Observability hook for import outcomes and suppressed failures.
//!
//! Cleanup steps that must not mask the primary error (rollback, temp file
//! removal) report through here instead of being silently dropped.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors exposed when recording import metrics.
    pub enum ImportMetricsError {
        /// Metric exporter rejected the write.
        Export { message: String } => "import metrics exporter failed: {message}",
    }
}

/// Final state of one import request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcomeKind {
    /// The replacement was committed.
    Committed,
    /// A storage failure rolled the replacement back.
    RolledBack,
    /// The request was rejected before any storage work.
    Rejected,
}

impl ImportOutcomeKind {
    /// Label value for metric backends.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::RolledBack => "rolled_back",
            Self::Rejected => "rejected",
        }
    }
}

/// Cleanup step whose failure was logged and swallowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuppressedFailureStage {
    /// Rolling back a failed transaction.
    Rollback,
    /// Removing an uploaded temp file.
    UploadCleanup,
}

impl SuppressedFailureStage {
    /// Label value for metric backends.
    #[must_use]
    pub const fn as_label(self) -> &'static str {
        match self {
            Self::Rollback => "rollback",
            Self::UploadCleanup => "upload_cleanup",
        }
    }
}

/// Metrics recording port for the import pipeline.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImportMetrics: Send + Sync {
    /// Record the outcome of one import with its row counts.
    async fn record_import(
        &self,
        outcome: ImportOutcomeKind,
        imported_rows: u64,
        skipped_rows: u64,
    ) -> Result<(), ImportMetricsError>;

    /// Record a cleanup failure that was suppressed.
    async fn record_suppressed_failure(
        &self,
        stage: SuppressedFailureStage,
    ) -> Result<(), ImportMetricsError>;
}

/// No-op implementation for when metrics are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoOpImportMetrics;

#[async_trait]
impl ImportMetrics for NoOpImportMetrics {
    async fn record_import(
        &self,
        _outcome: ImportOutcomeKind,
        _imported_rows: u64,
        _skipped_rows: u64,
    ) -> Result<(), ImportMetricsError> {
        Ok(())
    }

    async fn record_suppressed_failure(
        &self,
        _stage: SuppressedFailureStage,
    ) -> Result<(), ImportMetricsError> {
        Ok(())
    }
}
