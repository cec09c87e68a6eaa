//! The persisted gallery record and its display projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::camera::{CameraMetadata, PLACEHOLDER};

/// One uploaded image, keyed by its filename.
///
/// Records are written whole by the upload pipeline and only read afterwards.
/// A second upload under the same `name` replaces every field.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    /// Filename; the record's identity.
    pub name: String,

    /// Camera model, or the placeholder.
    pub camera: String,

    /// Camera manufacturer, or the placeholder.
    pub make: String,

    /// Capture timestamp text, or the placeholder.
    pub date_taken: String,

    /// Public address of the thumbnail blob.
    pub thumbnail_url: String,

    /// Public address of the full-resolution blob.
    pub original_url: String,

    /// Assigned by the record store when the record is written.
    pub uploaded_at: DateTime<Utc>,
}

/// Everything in an [`ImageRecord`] except the store-assigned timestamp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewImageRecord {
    pub name: String,
    pub camera: String,
    pub make: String,
    pub date_taken: String,
    pub thumbnail_url: String,
    pub original_url: String,
}

impl NewImageRecord {
    /// Merge extracted metadata with the two storage addresses, substituting
    /// the placeholder for every attribute the image did not carry.
    pub fn from_upload(
        name: impl Into<String>,
        metadata: &CameraMetadata,
        original_url: impl Into<String>,
        thumbnail_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            camera: CameraMetadata::or_placeholder(&metadata.model),
            make: CameraMetadata::or_placeholder(&metadata.make),
            date_taken: CameraMetadata::or_placeholder(&metadata.capture_time),
            thumbnail_url: thumbnail_url.into(),
            original_url: original_url.into(),
        }
    }
}

/// Fixed display shape handed to the gallery page and the JSON listing.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    pub name: String,
    pub camera: String,
    pub make: String,
    pub date: String,
    pub thumbnail_url: String,
    pub original_url: String,
}

impl From<ImageRecord> for GalleryItem {
    fn from(record: ImageRecord) -> Self {
        Self {
            name: or_placeholder(record.name),
            camera: or_placeholder(record.camera),
            make: or_placeholder(record.make),
            date: or_placeholder(record.date_taken),
            thumbnail_url: record.thumbnail_url,
            original_url: record.original_url,
        }
    }
}

fn or_placeholder(value: String) -> String {
    if value.trim().is_empty() {
        PLACEHOLDER.to_string()
    } else {
        value
    }
}
