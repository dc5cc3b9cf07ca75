//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: the POI read, search, best-match and import endpoints plus
//!   the health probes
//! - **Schemas**: the response [`Envelope`] and the payloads carried in its
//!   `resultData`
//!
//! The generated specification is used by Swagger UI (debug builds) and
//! exported via `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{
    ImportOutcomePayload, PoiPayload, PoiUploadSchema, SuggestionPayload,
};
use utoipa::OpenApi;

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "POI backend API",
        description = "Point-of-interest lookup, ranked name search and spreadsheet import.",
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::pois::list_pois,
        crate::inbound::http::pois::search_pois,
        crate::inbound::http::pois::best_match,
        crate::inbound::http::poi_import::import_pois,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Envelope,
        PoiPayload,
        SuggestionPayload,
        ImportOutcomePayload,
        PoiUploadSchema
    )),
    tags(
        (name = "poi", description = "Point-of-interest lookup and import"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
