//! POI backend library: ranked name search over stored points of interest
//! and a transactional spreadsheet import pipeline.
//!
//! Layout follows a hexagonal split: `domain` holds the ranking and import
//! rules behind port traits, `inbound` exposes them over HTTP and `outbound`
//! adapts PostgreSQL, spreadsheet decoding and metrics to the ports.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
