//! Spreadsheet upload handler.
//!
//! ```text
//! POST /poi/import   (multipart/form-data, field `file`)
//! ```
//!
//! The upload is spooled to a temp file in the configured upload directory,
//! handed to the import command by path, and removed once the command
//! returns, whatever the outcome.

use actix_multipart::form::MultipartForm;
use actix_multipart::form::tempfile::TempFile;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, post, web};
use tracing::{debug, warn};

use crate::domain::Error;
use crate::domain::ports::{PoiImportOutcome, PoiImportRequest, SuppressedFailureStage};
use crate::inbound::http::ApiResult;
use crate::inbound::http::envelope::Envelope;
use crate::inbound::http::schemas::{ImportOutcomePayload, PoiUploadSchema};
use crate::inbound::http::state::{HttpState, Reply};

/// Status message for a committed import.
pub const IMPORTED_MESSAGE: &str = "Imported";

/// Failure message when the body exceeds the configured upload limit.
pub const UPLOAD_TOO_LARGE_MESSAGE: &str = "Uploaded file is too large";

/// Multipart body for `POST /poi/import`.
#[derive(Debug, MultipartForm)]
pub struct PoiUploadForm {
    /// Uploaded spreadsheet.
    pub file: TempFile,
}

fn imported_reply(outcome: &PoiImportOutcome) -> ApiResult<Reply> {
    let payload = ImportOutcomePayload::from(outcome);
    let data = serde_json::to_value(payload)
        .map_err(|err| Error::internal(format!("failed to serialise import outcome: {err}")))?;
    Ok(Reply {
        message: IMPORTED_MESSAGE,
        data,
        count: outcome.imported_count,
    })
}

async fn discard_upload(state: &HttpState, upload: TempFile) {
    let path = upload.file.path().to_path_buf();
    if let Err(error) = upload.file.close() {
        warn!(%error, path = %path.display(), "failed to remove uploaded file");
        if let Err(error) = state
            .import_metrics
            .record_suppressed_failure(SuppressedFailureStage::UploadCleanup)
            .await
        {
            warn!(%error, "failed to record upload cleanup failure");
        }
    }
}

/// Replace every stored POI with the rows of an uploaded spreadsheet.
#[utoipa::path(
    post,
    path = "/poi/import",
    request_body(content = PoiUploadSchema, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Import committed; `resultCnt` holds inserted rows", body = Envelope),
        (status = 400, description = "No file uploaded or unusable spreadsheet", body = Envelope),
        (status = 500, description = "Storage failure; previous POIs kept", body = Envelope)
    ),
    tags = ["poi"],
    operation_id = "importPois"
)]
#[post("/poi/import")]
pub async fn import_pois(
    state: web::Data<HttpState>,
    form: Result<MultipartForm<PoiUploadForm>, actix_web::Error>,
) -> HttpResponse {
    let upload = match form {
        Ok(MultipartForm(form)) => Some(form.file),
        Err(error) if error.as_response_error().status_code() == StatusCode::PAYLOAD_TOO_LARGE => {
            return state.respond(Err(Error::invalid_request(UPLOAD_TOO_LARGE_MESSAGE)));
        }
        Err(error) => {
            debug!(%error, "multipart body carried no usable file");
            None
        }
    };
    let request = PoiImportRequest {
        upload_path: upload.as_ref().map(|file| file.file.path().to_path_buf()),
    };

    let result = state.poi_import.import(request).await;
    if let Some(upload) = upload {
        discard_upload(&state, upload).await;
    }
    state.respond(result.and_then(|outcome| imported_reply(&outcome)))
}
