//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while letting errors
//! raised outside a handler body (extractors, middleware) still render as
//! the standard envelope.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};

use super::envelope::{StandardResponseFormatter, error_response, status_for};
use crate::domain::Error;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        error_response(&StandardResponseFormatter, self)
    }
}

#[cfg(test)]
mod tests {
    //! Status codes and envelope bodies for domain errors.
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(Error::invalid_request("No file uploaded"), StatusCode::BAD_REQUEST, "No file uploaded")]
    #[case(
        Error::storage_failure("poi store query failed: deadlock"),
        StatusCode::INTERNAL_SERVER_ERROR,
        "poi store query failed: deadlock"
    )]
    #[case(Error::internal("secret"), StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")]
    #[actix_web::test]
    async fn renders_envelope(
        #[case] error: Error,
        #[case] status: StatusCode,
        #[case] message: &str,
    ) {
        let response = error.with_trace_id("trace-1").error_response();
        assert_eq!(response.status(), status);
        assert_eq!(
            response
                .headers()
                .get("trace-id")
                .and_then(|value| value.to_str().ok()),
            Some("trace-1")
        );

        let bytes = to_bytes(response.into_body()).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body["errorMessage"], message);
        assert_eq!(body["errorCode"], status.as_u16());
        assert_eq!(body["traceId"], "trace-1");
    }
}
