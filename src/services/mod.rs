//! Domain services: tag extraction, thumbnails, the two storage gateways,
//! the upload pipeline and the gallery read path.

pub mod blob_store;
pub mod gallery_service;
pub mod gcs_blob_store;
pub mod local_blob_store;
pub mod metadata_extractor;
pub mod record_store;
pub mod thumbnail;
pub mod upload_pipeline;
