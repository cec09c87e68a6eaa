//! Defines routes for the gallery.
//!
//! ## Structure
//! - **Gallery**
//!   - `GET  /`            : rendered gallery (supports `?search=` camera filter)
//!   - `GET  /api/images`  : gallery items as JSON (same filter)
//!   - `POST /upload`      : multipart upload, field `photos`, redirects to `/`
//!
//! - **Blobs**
//!   - `GET  /objects/{bucket}/{*key}` : serve a blob from the local backend
//!
//! - **Health**
//!   - `GET  /healthz`, `GET /readyz`

use crate::{
    handlers::{
        gallery_handlers::{index, list_images},
        health_handlers::{healthz, readyz},
        object_handlers::get_object,
        upload_handlers::upload,
    },
    state::AppState,
};
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

/// Build the router for every gallery route.
///
/// The router carries shared state (`AppState`) to all handlers. Request
/// bodies larger than `max_upload_bytes` are rejected.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        // health endpoints (mounted at root)
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // gallery
        .route("/", get(index))
        .route("/api/images", get(list_images))
        .route("/upload", post(upload))
        // local blobs
        .route("/objects/{bucket}/{*key}", get(get_object))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
}
