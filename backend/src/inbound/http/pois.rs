//! POI read handlers.
//!
//! ```text
//! GET /poi?q=&limit=
//! GET /poi/search?q=&limit=
//! GET /poi/best-match?q=
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

use crate::domain::Error;
use crate::domain::ports::PoiListRequest;
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::{Envelope, SUCCESS_MESSAGE};
use crate::inbound::http::schemas::{PoiPayload, SuggestionPayload};
use crate::inbound::http::state::{HttpState, Reply};

/// Query parameters for `GET /poi`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PoiListQuery {
    /// Case-insensitive substring filter on the name.
    pub q: Option<String>,
    /// Maximum number of POIs returned.
    pub limit: Option<usize>,
}

/// Query parameters for `GET /poi/search`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SearchQuery {
    /// Free-text search term. Blank or missing yields no results.
    pub q: Option<String>,
    /// Maximum number of suggestions, default 10, capped at 100.
    pub limit: Option<usize>,
}

/// Query parameters for `GET /poi/best-match`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BestMatchQuery {
    /// Free-text search term.
    pub q: Option<String>,
}

fn to_value<T: serde::Serialize>(payload: T) -> ApiResult<Value> {
    serde_json::to_value(payload)
        .map_err(|err| Error::internal(format!("failed to serialise payload: {err}")))
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

async fn load_pois(state: &HttpState, query: PoiListQuery) -> ApiResult<Reply> {
    let pois = state
        .pois
        .list(PoiListRequest {
            filter: query.q,
            limit: query.limit,
        })
        .await?;
    let payload: Vec<PoiPayload> = pois.iter().map(PoiPayload::from).collect();
    Ok(Reply {
        message: SUCCESS_MESSAGE,
        count: count(payload.len()),
        data: to_value(payload)?,
    })
}

async fn load_suggestions(state: &HttpState, query: SearchQuery) -> ApiResult<Reply> {
    let term = query.q.unwrap_or_default();
    let matches = state.pois.search(&term, query.limit).await?;
    let payload: Vec<SuggestionPayload> = matches.iter().map(SuggestionPayload::from).collect();
    Ok(Reply {
        message: SUCCESS_MESSAGE,
        count: count(payload.len()),
        data: to_value(payload)?,
    })
}

async fn load_best_match(state: &HttpState, query: BestMatchQuery) -> ApiResult<Reply> {
    let term = query.q.unwrap_or_default();
    let best = state.pois.best_match(&term).await?;
    let payload = best.as_ref().map(PoiPayload::from);
    Ok(Reply {
        message: SUCCESS_MESSAGE,
        count: u64::from(payload.is_some()),
        data: to_value(payload)?,
    })
}

/// List stored POIs ordered by identifier.
#[utoipa::path(
    get,
    path = "/poi",
    params(PoiListQuery),
    responses(
        (status = 200, description = "POIs in `resultData`", body = Envelope),
        (status = 400, description = "Invalid query", body = Envelope),
        (status = 500, description = "Storage failure", body = Envelope)
    ),
    tags = ["poi"],
    operation_id = "listPois"
)]
#[get("/poi")]
pub async fn list_pois(
    state: web::Data<HttpState>,
    query: web::Query<PoiListQuery>,
) -> HttpResponse {
    let result = load_pois(&state, query.into_inner()).await;
    state.respond(result)
}

/// Rank POIs against a free-text term.
#[utoipa::path(
    get,
    path = "/poi/search",
    params(SearchQuery),
    responses(
        (status = 200, description = "Suggestions ordered by score", body = Envelope),
        (status = 400, description = "Invalid query", body = Envelope),
        (status = 500, description = "Storage failure", body = Envelope)
    ),
    tags = ["poi"],
    operation_id = "searchPois"
)]
#[get("/poi/search")]
pub async fn search_pois(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> HttpResponse {
    let result = load_suggestions(&state, query.into_inner()).await;
    state.respond(result)
}

/// Return the single best-scoring POI for a term, or `null`.
#[utoipa::path(
    get,
    path = "/poi/best-match",
    params(BestMatchQuery),
    responses(
        (status = 200, description = "Best match in `resultData`", body = Envelope),
        (status = 500, description = "Storage failure", body = Envelope)
    ),
    tags = ["poi"],
    operation_id = "bestMatchPoi"
)]
#[get("/poi/best-match")]
pub async fn best_match(
    state: web::Data<HttpState>,
    query: web::Query<BestMatchQuery>,
) -> HttpResponse {
    let result = load_best_match(&state, query.into_inner()).await;
    state.respond(result)
}
