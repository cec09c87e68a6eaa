//! Gallery read handlers.
//!
//! - `GET /`            -> rendered gallery, optional `?search=` camera filter
//! - `GET /api/images`  -> the same items as JSON

use crate::{errors::AppError, models::GalleryItem, state::AppState};
use axum::{
    Json,
    extract::{Query, State},
    response::Html,
};
use serde::Deserialize;

use crate::views;

/// Query params accepted by the gallery views.
#[derive(Debug, Default, Deserialize)]
pub struct GalleryQuery {
    /// Exact, case-sensitive camera model.
    pub search: Option<String>,
}

/// `GET /`
pub async fn index(
    State(state): State<AppState>,
    Query(q): Query<GalleryQuery>,
) -> Result<Html<String>, AppError> {
    let items = state.gallery.list_images(q.search.as_deref()).await?;
    Ok(Html(
        views::gallery_page(&items, q.search.as_deref()).into_string(),
    ))
}

/// `GET /api/images`
pub async fn list_images(
    State(state): State<AppState>,
    Query(q): Query<GalleryQuery>,
) -> Result<Json<Vec<GalleryItem>>, AppError> {
    let items = state.gallery.list_images(q.search.as_deref()).await?;
    Ok(Json(items))
}
