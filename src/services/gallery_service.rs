//! Gallery read path: query records, project them for display.

use crate::models::GalleryItem;
use crate::services::record_store::{RecordField, RecordResult, RecordStore};
use futures::TryStreamExt;
use std::sync::Arc;

#[derive(Clone)]
pub struct GalleryService {
    records: Arc<dyn RecordStore>,
}

impl GalleryService {
    pub fn new(records: Arc<dyn RecordStore>) -> Self {
        Self { records }
    }

    /// All images, or only those whose camera model equals `camera` exactly.
    ///
    /// Matching is case-sensitive: `"iphone"` does not find `"iPhone"`.
    /// A blank filter means no filter.
    pub async fn list_images(&self, camera: Option<&str>) -> RecordResult<Vec<GalleryItem>> {
        let stream = match camera.filter(|c| !c.is_empty()) {
            Some(camera) => self
                .records
                .query_by_field(RecordField::Camera, camera.to_string()),
            None => self.records.stream_all(),
        };

        stream.map_ok(GalleryItem::from).try_collect().await
    }
}
