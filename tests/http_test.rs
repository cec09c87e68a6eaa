//! HTTP integration tests
//!
//! Exercises the router with `tower::ServiceExt::oneshot` against a local
//! blob store in a temp directory and an in-memory SQLite database.

mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use common::{FailingRecordStore, jpeg, jpeg_with_exif, png, record_store};
use exif::Tag;
use http_body_util::BodyExt;
use image::GenericImageView;
use photo_gallery::models::GalleryItem;
use photo_gallery::routes::routes::routes;
use photo_gallery::services::local_blob_store::LocalBlobStore;
use photo_gallery::state::AppState;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "gallery-test-boundary";
const LOCAL_BASE: &str = "http://localhost:8080/objects";

struct TestApp {
    app: Router,
    _tmp: TempDir,
}

async fn test_app() -> TestApp {
    let tmp = TempDir::new().unwrap();
    let records = record_store().await;
    let local = Arc::new(
        LocalBlobStore::new(records.db.clone(), tmp.path(), "gallery", LOCAL_BASE).unwrap(),
    );
    let state = AppState::new(records, local.clone(), Some(local), 200);
    TestApp {
        app: routes(32 * 1024 * 1024).with_state(state),
        _tmp: tmp,
    }
}

/// (filename, content type, bytes) parts under the `photos` field, plus an
/// unrelated text field.
fn multipart_body(files: &[(&str, &str, Vec<u8>)]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nignored\r\n"
        )
        .as_bytes(),
    );
    for (filename, content_type, data) in files {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photos\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(files: &[(&str, &str, Vec<u8>)]) -> Request<Body> {
    Request::post("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(files)))
        .unwrap()
}

async fn body_bytes(body: Body) -> Vec<u8> {
    body.collect().await.unwrap().to_bytes().to_vec()
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_bytes(response.into_body()).await)
}

async fn list(app: &Router, uri: &str) -> Vec<GalleryItem> {
    let (status, body) = get(app, uri).await;
    assert_eq!(status, StatusCode::OK);
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn healthz_is_ok() {
    let t = test_app().await;
    let (status, body) = get(&t.app, "/healthz").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn readyz_reports_both_checks() {
    let t = test_app().await;
    let (status, body) = get(&t.app, "/readyz").await;
    assert_eq!(status, StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["checks"]["records"]["ok"], true);
    assert_eq!(json["checks"]["blobs"]["ok"], true);
}

#[tokio::test]
async fn upload_redirects_and_gallery_lists_images() {
    let t = test_app().await;

    let response = t
        .app
        .clone()
        .oneshot(upload_request(&[
            (
                "a.jpg",
                "image/jpeg",
                jpeg_with_exif(800, 600, &[(Tag::Model, "Pixel7"), (Tag::Make, "Google")]),
            ),
            ("b.png", "image/png", png(100, 300)),
            ("", "application/octet-stream", Vec::new()),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    let mut items = list(&t.app, "/api/images").await;
    items.sort_by(|a, b| a.name.cmp(&b.name));
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "a.jpg");
    assert_eq!(items[0].camera, "Pixel7");
    assert_eq!(items[0].make, "Google");
    assert_eq!(items[0].date, "Unknown");
    assert_eq!(
        items[0].thumbnail_url,
        format!("{LOCAL_BASE}/gallery/thumbnails/a.jpg")
    );
    assert_eq!(items[1].camera, "Unknown");

    let (status, html) = get(&t.app, "/").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(html).unwrap();
    assert!(html.contains("a.jpg"));
    assert!(html.contains("b.png"));
    assert!(html.contains("Pixel7"));
}

#[tokio::test]
async fn search_is_exact_and_case_sensitive() {
    let t = test_app().await;
    t.app
        .clone()
        .oneshot(upload_request(&[
            ("p.jpg", "image/jpeg", jpeg_with_exif(50, 50, &[(Tag::Model, "iPhone")])),
            ("q.jpg", "image/jpeg", jpeg(50, 50)),
        ]))
        .await
        .unwrap();

    assert!(list(&t.app, "/api/images?search=iphone").await.is_empty());

    let hits = list(&t.app, "/api/images?search=iPhone").await;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "p.jpg");

    assert_eq!(list(&t.app, "/api/images?search=").await.len(), 2);

    let (status, html) = get(&t.app, "/?search=iPhone").await;
    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8(html).unwrap();
    assert!(html.contains("p.jpg"));
    assert!(!html.contains("q.jpg"));
}

#[tokio::test]
async fn corrupt_part_does_not_block_the_rest() {
    let t = test_app().await;
    let response = t
        .app
        .clone()
        .oneshot(upload_request(&[
            ("bad.jpg", "image/jpeg", b"not really a jpeg".to_vec()),
            ("good.jpg", "image/jpeg", jpeg(64, 64)),
        ]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let items = list(&t.app, "/api/images").await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].name, "good.jpg");
}

#[tokio::test]
async fn stored_blobs_are_served_back() {
    let t = test_app().await;
    let original = jpeg(1200, 400);
    t.app
        .clone()
        .oneshot(upload_request(&[("wide.jpg", "image/jpeg", original.clone())]))
        .await
        .unwrap();

    let response = t
        .app
        .clone()
        .oneshot(
            Request::get("/objects/gallery/thumbnails/wide.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    let thumb = body_bytes(response.into_body()).await;
    assert_eq!(
        image::load_from_memory(&thumb).unwrap().dimensions(),
        (200, 67)
    );

    let (status, body) = get(&t.app, "/objects/gallery/originals/wide.jpg").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, original);

    let (status, _) = get(&t.app, "/objects/gallery/originals/missing.jpg").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_multipart_is_a_client_error() {
    let t = test_app().await;
    let response = t
        .app
        .clone()
        .oneshot(
            Request::post("/upload")
                .header(header::CONTENT_TYPE, "multipart/form-data")
                .body(Body::from("nope"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn read_path_failure_is_a_visible_error() {
    let records = record_store().await;
    let failing = Arc::new(FailingRecordStore {
        inner: records.clone(),
        fail_name: String::new(),
    });
    let tmp = TempDir::new().unwrap();
    let local = Arc::new(
        LocalBlobStore::new(records.db.clone(), tmp.path(), "gallery", LOCAL_BASE).unwrap(),
    );
    // Closing the pool makes every query fail.
    records.db.close().await;

    let state = AppState::new(failing, local.clone(), Some(local), 200);
    let app = routes(1024 * 1024).with_state(state);

    let (status, body) = get(&app, "/").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Error:"));

    let (status, _) = get(&app, "/readyz").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn encoded_blob_url_is_served_back() {
    let t = test_app().await;
    let response = t
        .app
        .clone()
        .oneshot(upload_request(&[("trip #2?.jpg", "image/jpeg", jpeg(64, 48))]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let items = list(&t.app, "/api/images").await;
    assert_eq!(items[0].name, "trip #2?.jpg");
    assert_eq!(
        items[0].original_url,
        format!("{LOCAL_BASE}/gallery/originals/trip%20%232%3F.jpg")
    );

    let path = items[0]
        .original_url
        .strip_prefix("http://localhost:8080")
        .unwrap();
    let (status, body) = get(&t.app, path).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, jpeg(64, 48));
}
