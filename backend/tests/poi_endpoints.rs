//! End-to-end behaviour of the POI endpoints over the in-memory store.
//!
//! Imports go through the real `PoiImportService` and query through the real
//! `PoiQueryService`; only the spreadsheet decoder is replaced.

use std::path::Path;
use std::sync::Arc;

use actix_multipart::form::tempfile::TempFileConfig;
use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{App, test, web};
use async_trait::async_trait;
use poi_backend::Trace;
use poi_backend::domain::ports::{RawCell, SheetRow, SpreadsheetSource, SpreadsheetSourceError};
use poi_backend::domain::{PoiImportService, PoiQueryService};
use poi_backend::inbound::http::health::{HealthState, live, ready};
use poi_backend::inbound::http::poi_import::import_pois;
use poi_backend::inbound::http::pois::{best_match, list_pois, search_pois};
use poi_backend::inbound::http::state::HttpState;
use poi_backend::test_support::cap_fs::{count_entries, path_exists};
use poi_backend::test_support::clock::FixtureClock;
use poi_backend::test_support::poi_store::InMemoryPoiStore;
use rstest::{fixture, rstest};
use serde_json::Value;
use tempfile::TempDir;

const BOUNDARY: &str = "poi-endpoints";

/// Decoder returning fixed rows for any existing upload.
#[derive(Clone)]
struct CannedSheet {
    rows: Vec<SheetRow>,
}

#[async_trait]
impl SpreadsheetSource for CannedSheet {
    async fn read_rows(&self, path: &Path) -> Result<Vec<SheetRow>, SpreadsheetSourceError> {
        if !path_exists(path) {
            return Err(SpreadsheetSourceError::open("upload vanished"));
        }
        Ok(self.rows.clone())
    }
}

fn row(name: &str, lat: RawCell, lng: RawCell) -> SheetRow {
    SheetRow::from([
        ("Name".to_owned(), RawCell::Text(name.to_owned())),
        ("Lat".to_owned(), lat),
        ("Lng".to_owned(), lng),
    ])
}

#[fixture]
fn sheet() -> CannedSheet {
    CannedSheet {
        rows: vec![
            row("Seoul Station", RawCell::Number(37.5547), RawCell::Number(126.9706)),
            row(
                "Gangnam Station",
                RawCell::Text(" 37.4979 ".to_owned()),
                RawCell::Number(127.0276),
            ),
            row("Nowhere", RawCell::Text("north".to_owned()), RawCell::Number(127.0)),
        ],
    }
}

#[fixture]
fn upload_dir() -> TempDir {
    TempDir::new().expect("upload dir")
}

fn state(store: &InMemoryPoiStore, sheet: CannedSheet) -> HttpState {
    let store = Arc::new(store.clone());
    HttpState::new(
        Arc::new(PoiQueryService::new(store.clone())),
        Arc::new(PoiImportService::with_noop_metrics(
            Arc::new(sheet),
            store,
            Arc::new(FixtureClock::default()),
        )),
    )
}

macro_rules! app {
    ($state:expr, $upload_dir:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .app_data(web::Data::new(HealthState::new()))
                .app_data(TempFileConfig::default().directory($upload_dir.path()))
                .wrap(Trace)
                .service(list_pois)
                .service(search_pois)
                .service(best_match)
                .service(import_pois)
                .service(ready)
                .service(live),
        )
        .await
    };
}

fn upload_request(field: &str) -> test::TestRequest {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"pois.xlsx\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n\
         workbook-bytes\r\n\
         --{BOUNDARY}--\r\n"
    );
    test::TestRequest::post()
        .uri("/poi/import")
        .insert_header((
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        ))
        .set_payload(body)
}

fn names(body: &Value) -> Vec<String> {
    body["resultData"]
        .as_array()
        .expect("resultData array")
        .iter()
        .map(|poi| poi["name"].as_str().expect("name").to_owned())
        .collect()
}

#[rstest]
#[actix_web::test]
async fn import_replaces_rows_and_search_ranks_them(sheet: CannedSheet, upload_dir: TempDir) {
    let store = InMemoryPoiStore::with_named(&[("Old Place", 35.0, 129.0)]);
    let app = app!(state(&store, sheet), upload_dir);

    let res = test::call_service(&app, upload_request("file").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["resultCnt"], 2);
    assert_eq!(body["resultData"]["importedCount"], 2);
    assert_eq!(body["resultData"]["skippedCount"], 1);
    assert_eq!(count_entries(upload_dir.path()).expect("list upload dir"), 0);

    let listed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/poi").to_request(),
    )
    .await;
    assert_eq!(names(&listed), ["Seoul Station", "Gangnam Station"]);
    assert_eq!(listed["resultData"][0]["id"], 1);

    let ranked: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get()
            .uri("/poi/search?q=gangnam")
            .to_request(),
    )
    .await;
    assert_eq!(names(&ranked), ["Gangnam Station"]);
    assert!(ranked["resultData"][0]["score"].as_f64().expect("score") > 0.0);
}

#[rstest]
#[actix_web::test]
async fn failed_import_keeps_previous_rows(sheet: CannedSheet, upload_dir: TempDir) {
    let store = InMemoryPoiStore::with_named(&[("Old Place", 35.0, 129.0)]).fail_on_chunk(0);
    let app = app!(state(&store, sheet), upload_dir);

    let res = test::call_service(&app, upload_request("file").to_request()).await;
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["errorCode"], 500);
    assert_eq!(body["resultCnt"], 0);
    assert!(
        body["errorMessage"]
            .as_str()
            .expect("message")
            .contains("injected failure on chunk 0")
    );
    assert_eq!(count_entries(upload_dir.path()).expect("list upload dir"), 0);

    let listed: Value = test::call_and_read_body_json(
        &app,
        test::TestRequest::get().uri("/poi").to_request(),
    )
    .await;
    assert_eq!(names(&listed), ["Old Place"]);
}

#[rstest]
#[actix_web::test]
async fn upload_without_file_field_is_rejected(sheet: CannedSheet, upload_dir: TempDir) {
    let store = InMemoryPoiStore::with_named(&[("Old Place", 35.0, 129.0)]);
    let app = app!(state(&store, sheet), upload_dir);

    let res = test::call_service(&app, upload_request("attachment").to_request()).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(res.headers().contains_key("trace-id"));
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["errorMessage"], "No file uploaded");
    assert!(store.journal().is_empty());
    assert_eq!(store.snapshot().len(), 1);
}

#[rstest]
#[case("/poi/best-match?q=seoul%20station", Value::from("Seoul Station"), 1)]
#[case("/poi/best-match?q=seoul", Value::from("Seoul Forest"), 1)]
#[case("/poi/best-match?q=busan", Value::Null, 0)]
#[actix_web::test]
async fn best_match_returns_single_hit_or_null(
    #[case] uri: &str,
    #[case] expected_name: Value,
    #[case] expected_count: u64,
    upload_dir: TempDir,
) {
    let store = InMemoryPoiStore::with_named(&[
        ("Seoul Station", 37.5547, 126.9706),
        ("Seoul Forest", 37.5444, 127.0374),
    ]);
    let app = app!(state(&store, CannedSheet { rows: Vec::new() }), upload_dir);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(uri).to_request()).await;

    assert_eq!(body["resultCnt"], expected_count);
    let name = body["resultData"]
        .get("name")
        .cloned()
        .unwrap_or(Value::Null);
    assert_eq!(name, expected_name);
}

#[rstest]
#[actix_web::test]
async fn readiness_probe_reports_unready_until_marked(upload_dir: TempDir) {
    let store = InMemoryPoiStore::new();
    let app = app!(state(&store, CannedSheet { rows: Vec::new() }), upload_dir);

    let res = test::call_service(
        &app,
        test::TestRequest::get().uri("/health/ready").to_request(),
    )
    .await;

    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
}
