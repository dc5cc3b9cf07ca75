//! Uniform JSON envelope wrapping every POI response.
//!
//! ```text
//! success: {statusCode, statusMessage, errorCode: null, errorMessage: "", resultData, resultCnt}
//! failure: {statusCode, statusMessage, errorCode, errorMessage, resultData: {}, resultCnt: 0, traceId?}
//! ```

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

use crate::domain::trace_id::TRACE_ID_HEADER;
use crate::domain::{Error, ErrorCode};

/// Status message attached to plain successful reads.
pub const SUCCESS_MESSAGE: &str = "Success";

const REDACTED_MESSAGE: &str = "Internal server error";

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// HTTP status code of the response.
    pub status_code: u16,
    /// Human-readable outcome.
    pub status_message: String,
    /// HTTP status code on failure, `null` on success.
    pub error_code: Option<u16>,
    /// Failure message, empty on success.
    pub error_message: String,
    /// Payload; `{}` on failure.
    #[schema(value_type = Object)]
    pub result_data: Value,
    /// Number of items in, or rows affected by, the payload.
    pub result_cnt: u64,
    /// Request trace identifier on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace_id: Option<String>,
    /// Structured failure details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub details: Option<Value>,
}

/// Builds envelopes for handlers.
pub trait ResponseFormatter: Send + Sync {
    /// Envelope for a successful response.
    fn success(&self, message: &str, data: Value, count: u64) -> Envelope;

    /// Envelope for a failed response with `status`.
    fn failure(&self, status: StatusCode, error: &Error) -> Envelope;
}

/// Default formatter. Internal errors are redacted; storage and validation
/// messages are passed through.
#[derive(Debug, Default, Clone, Copy)]
pub struct StandardResponseFormatter;

impl ResponseFormatter for StandardResponseFormatter {
    fn success(&self, message: &str, data: Value, count: u64) -> Envelope {
        Envelope {
            status_code: StatusCode::OK.as_u16(),
            status_message: message.to_owned(),
            error_code: None,
            error_message: String::new(),
            result_data: data,
            result_cnt: count,
            trace_id: None,
            details: None,
        }
    }

    fn failure(&self, status: StatusCode, error: &Error) -> Envelope {
        let (message, details) = match error.code() {
            ErrorCode::InternalError => (REDACTED_MESSAGE.to_owned(), None),
            _ => (error.message().to_owned(), error.details().cloned()),
        };
        Envelope {
            status_code: status.as_u16(),
            status_message: message.clone(),
            error_code: Some(status.as_u16()),
            error_message: message,
            result_data: Value::Object(Map::new()),
            result_cnt: 0,
            trace_id: error.trace_id().map(str::to_owned),
            details,
        }
    }
}

/// HTTP status for a domain error code.
pub fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::StorageFailure | ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Render `error` through `formatter`, echoing the trace id header.
pub fn error_response(formatter: &dyn ResponseFormatter, error: &Error) -> HttpResponse {
    let status = status_for(error.code());
    let mut builder = HttpResponse::build(status);
    if let Some(id) = error.trace_id() {
        builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
    }
    builder.json(formatter.failure(status, error))
}
