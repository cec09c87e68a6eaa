//! `POST /upload`: multipart batch upload.

use crate::{errors::AppError, services::upload_pipeline::UploadFile, state::AppState};
use axum::{
    extract::{Multipart, State},
    response::Redirect,
};

/// Multipart field carrying the files.
pub const PHOTOS_FIELD: &str = "photos";

/// Read every `photos` part, run the batch, and send the browser back to the
/// gallery. Per-file failures are logged by the pipeline, not surfaced here.
pub async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(PHOTOS_FIELD) {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;
        files.push(UploadFile::new(filename, content_type, data));
    }

    tracing::debug!("received {} file part(s)", files.len());
    state.pipeline.upload_batch(files).await;

    Ok(Redirect::to("/"))
}
