//! Shared handler state.

use crate::services::{
    blob_store::BlobStore, gallery_service::GalleryService, local_blob_store::LocalBlobStore,
    record_store::RecordStore, upload_pipeline::UploadPipeline,
};
use std::sync::Arc;

/// Everything a handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: UploadPipeline,
    pub gallery: GalleryService,
    pub records: Arc<dyn RecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    /// Set when blobs live on local disk, so they can be served back.
    pub local_blobs: Option<Arc<LocalBlobStore>>,
}

impl AppState {
    pub fn new(
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        local_blobs: Option<Arc<LocalBlobStore>>,
        thumbnail_max_edge: u32,
    ) -> Self {
        Self {
            pipeline: UploadPipeline::new(blobs.clone(), records.clone(), thumbnail_max_edge),
            gallery: GalleryService::new(records.clone()),
            records,
            blobs,
            local_blobs,
        }
    }
}
