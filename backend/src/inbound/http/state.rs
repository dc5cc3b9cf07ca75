//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use actix_web::HttpResponse;
use serde_json::Value;

use super::ApiResult;
use super::envelope::{ResponseFormatter, StandardResponseFormatter, error_response};
use crate::domain::ports::{ImportMetrics, NoOpImportMetrics, PoiImportCommand, PoiQuery};

/// Successful handler output before it is wrapped in an envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Status message shown to clients.
    pub message: &'static str,
    /// Serialised payload.
    pub data: Value,
    /// Item or row count reported as `resultCnt`.
    pub count: u64,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub pois: Arc<dyn PoiQuery>,
    pub poi_import: Arc<dyn PoiImportCommand>,
    pub import_metrics: Arc<dyn ImportMetrics>,
    pub responses: Arc<dyn ResponseFormatter>,
}

impl HttpState {
    /// Build state with the standard formatter and no-op metrics.
    pub fn new(pois: Arc<dyn PoiQuery>, poi_import: Arc<dyn PoiImportCommand>) -> Self {
        Self {
            pois,
            poi_import,
            import_metrics: Arc::new(NoOpImportMetrics),
            responses: Arc::new(StandardResponseFormatter),
        }
    }

    /// Replace the metrics sink used for upload cleanup failures.
    #[must_use]
    pub fn with_import_metrics(mut self, metrics: Arc<dyn ImportMetrics>) -> Self {
        self.import_metrics = metrics;
        self
    }

    /// Replace the envelope formatter.
    #[must_use]
    pub fn with_formatter(mut self, responses: Arc<dyn ResponseFormatter>) -> Self {
        self.responses = responses;
        self
    }

    /// Wrap a handler result in the envelope.
    pub fn respond(&self, result: ApiResult<Reply>) -> HttpResponse {
        match result {
            Ok(reply) => HttpResponse::Ok().json(self.responses.success(
                reply.message,
                reply.data,
                reply.count,
            )),
            Err(error) => error_response(self.responses.as_ref(), &error),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Envelope rendering through an injected formatter.
    use super::*;
    use actix_web::body::to_bytes;
    use actix_web::http::StatusCode;
    use serde_json::json;

    use crate::inbound::http::envelope::Envelope;
    use crate::domain::Error;
    use crate::domain::ports::{MockPoiImportCommand, MockPoiQuery};

    struct TaggedFormatter;

    impl ResponseFormatter for TaggedFormatter {
        fn success(&self, message: &str, data: Value, count: u64) -> Envelope {
            let mut envelope = StandardResponseFormatter.success(message, data, count);
            envelope.status_message = format!("tagged {message}");
            envelope
        }

        fn failure(&self, status: StatusCode, error: &Error) -> Envelope {
            let mut envelope = StandardResponseFormatter.failure(status, error);
            envelope.error_message = format!("tagged {}", error.message());
            envelope
        }
    }

    fn tagged_state() -> HttpState {
        HttpState::new(
            Arc::new(MockPoiQuery::new()),
            Arc::new(MockPoiImportCommand::new()),
        )
        .with_formatter(Arc::new(TaggedFormatter))
    }

    async fn body_of(response: HttpResponse) -> Value {
        let bytes = to_bytes(response.into_body()).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[actix_web::test]
    async fn injected_formatter_renders_success() {
        let response = tagged_state().respond(Ok(Reply {
            message: "Imported",
            data: json!({ "importedCount": 2 }),
            count: 2,
        }));

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_of(response).await;
        assert_eq!(body["statusMessage"], "tagged Imported");
        assert_eq!(body["resultData"]["importedCount"], 2);
        assert_eq!(body["resultCnt"], 2);
    }

    #[actix_web::test]
    async fn injected_formatter_renders_failure() {
        let response = tagged_state().respond(Err(Error::invalid_request("No file uploaded")));

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_of(response).await;
        assert_eq!(body["errorMessage"], "tagged No file uploaded");
        assert_eq!(body["errorCode"], 400);
    }
}
