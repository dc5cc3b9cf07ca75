//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repository and import store using
//!   Diesel ORM
//! - **spreadsheet**: workbook decoding with `calamine`
//! - **metrics**: Prometheus-backed metrics exporters (feature-gated)
//!
//! Adapters translate between domain types and infrastructure
//! representations. They contain no business logic.

#[cfg(feature = "metrics")]
pub mod metrics;
pub mod persistence;
pub mod spreadsheet;
