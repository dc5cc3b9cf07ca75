//! Outbound adapters for metrics exporting.
//!
//! Prometheus-backed implementations of domain metrics ports, feature-gated
//! behind the `metrics` feature.

mod prometheus_import;

pub use prometheus_import::PrometheusImportMetrics;
