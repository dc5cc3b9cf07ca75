//! Prometheus adapter for import pipeline metrics.
//!
//! Registers its counters on the registry shared with `actix-web-prom`, so
//! they are exposed through the same `/metrics` endpoint.

use async_trait::async_trait;
use prometheus::{IntCounterVec, Opts, Registry};

use crate::domain::ports::{
    ImportMetrics, ImportMetricsError, ImportOutcomeKind, SuppressedFailureStage,
};

/// Prometheus-backed import metrics recorder.
///
/// # Metrics
///
/// - `poi_imports_total{outcome}`: `committed`, `rolled_back` or `rejected`
/// - `poi_import_rows_total{kind}`: `imported` or `skipped`
/// - `poi_import_suppressed_failures_total{stage}`: `rollback` or
///   `upload_cleanup`
pub struct PrometheusImportMetrics {
    imports_total: IntCounterVec,
    rows_total: IntCounterVec,
    suppressed_total: IntCounterVec,
}

fn register(
    registry: &Registry,
    name: &str,
    help: &str,
    label: &str,
) -> Result<IntCounterVec, prometheus::Error> {
    let counter = IntCounterVec::new(Opts::new(name, help), &[label])?;
    registry.register(Box::new(counter.clone()))?;
    Ok(counter)
}

impl PrometheusImportMetrics {
    /// Create and register metrics with the given registry.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric with the same name is already registered.
    pub fn new(registry: &Registry) -> Result<Self, prometheus::Error> {
        Ok(Self {
            imports_total: register(
                registry,
                "poi_imports_total",
                "POI import requests by outcome",
                "outcome",
            )?,
            rows_total: register(
                registry,
                "poi_import_rows_total",
                "Spreadsheet rows imported or skipped",
                "kind",
            )?,
            suppressed_total: register(
                registry,
                "poi_import_suppressed_failures_total",
                "Cleanup failures logged without failing the request",
                "stage",
            )?,
        })
    }
}

#[async_trait]
impl ImportMetrics for PrometheusImportMetrics {
    async fn record_import(
        &self,
        outcome: ImportOutcomeKind,
        imported_rows: u64,
        skipped_rows: u64,
    ) -> Result<(), ImportMetricsError> {
        self.imports_total
            .with_label_values(&[outcome.as_label()])
            .inc();
        self.rows_total
            .with_label_values(&["imported"])
            .inc_by(imported_rows);
        self.rows_total
            .with_label_values(&["skipped"])
            .inc_by(skipped_rows);
        Ok(())
    }

    async fn record_suppressed_failure(
        &self,
        stage: SuppressedFailureStage,
    ) -> Result<(), ImportMetricsError> {
        self.suppressed_total
            .with_label_values(&[stage.as_label()])
            .inc();
        Ok(())
    }
}
