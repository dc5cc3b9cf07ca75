//! HTTP inbound adapter exposing the POI endpoints.

pub mod envelope;
pub mod error;
pub mod health;
pub mod poi_import;
pub mod pois;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
