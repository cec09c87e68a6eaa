//! The upload pipeline: extract metadata, store the original, store a
//! thumbnail, persist the record.
//!
//! Files are processed one at a time and each file's steps run strictly in
//! order. A failure in any storage or persistence step abandons that file
//! only; completed steps are not rolled back, so a stored blob can outlive a
//! failed record write.

use crate::models::{ImageRecord, NewImageRecord};
use crate::services::blob_store::{BlobError, BlobStore, original_path, thumbnail_path};
use crate::services::metadata_extractor;
use crate::services::record_store::{RecordError, RecordStore};
use crate::services::thumbnail::{self, ThumbnailError};
use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("uploading original failed: {0}")]
    OriginalUpload(#[source] BlobError),
    #[error("generating thumbnail failed: {0}")]
    Thumbnail(#[from] ThumbnailError),
    #[error("uploading thumbnail failed: {0}")]
    ThumbnailUpload(#[source] BlobError),
    #[error("saving record failed: {0}")]
    Record(#[from] RecordError),
    #[error("thumbnail worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

/// One submitted file.
///
/// `data` is reference counted; every stage works on its own clone, which is
/// an independent view of the same bytes.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl UploadFile {
    pub fn new(
        filename: impl Into<String>,
        content_type: Option<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type,
            data: data.into(),
        }
    }
}

/// What happened to one file of a batch.
#[derive(Debug)]
pub enum UploadOutcome {
    Stored(ImageRecord),
    /// The entry had no filename.
    Skipped,
    Failed { filename: String, error: UploadError },
}

/// Tally of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    pub stored: Vec<ImageRecord>,
    pub skipped: usize,
    pub failed: Vec<FailedUpload>,
}

#[derive(Debug)]
pub struct FailedUpload {
    pub filename: String,
    pub error: String,
}

impl BatchReport {
    fn record(&mut self, outcome: UploadOutcome) {
        match outcome {
            UploadOutcome::Stored(record) => self.stored.push(record),
            UploadOutcome::Skipped => self.skipped += 1,
            UploadOutcome::Failed { filename, error } => self.failed.push(FailedUpload {
                filename,
                error: error.to_string(),
            }),
        }
    }
}

/// Orchestrates extraction, both blob writes and the record write.
#[derive(Clone)]
pub struct UploadPipeline {
    blobs: Arc<dyn BlobStore>,
    records: Arc<dyn RecordStore>,
    max_edge: u32,
}

impl UploadPipeline {
    pub fn new(blobs: Arc<dyn BlobStore>, records: Arc<dyn RecordStore>, max_edge: u32) -> Self {
        Self {
            blobs,
            records,
            max_edge,
        }
    }

    /// Run every step for one file and return the stored record.
    pub async fn upload(&self, file: UploadFile) -> Result<ImageRecord, UploadError> {
        let UploadFile {
            filename,
            content_type,
            data,
        } = file;

        let metadata = metadata_extractor::extract(&data);
        debug!(
            "{}: extracted metadata (empty: {})",
            filename,
            metadata.is_empty()
        );

        let original_type = content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| sniff_content_type(&data));
        let original_url = self
            .blobs
            .put(&original_path(&filename), data.clone(), &original_type)
            .await
            .map_err(UploadError::OriginalUpload)?;
        debug!("{}: original stored at {}", filename, original_url);

        let max_edge = self.max_edge;
        let source = data.clone();
        let thumb =
            tokio::task::spawn_blocking(move || thumbnail::generate(&source, max_edge)).await??;
        let thumbnail_url = self
            .blobs
            .put(
                &thumbnail_path(&filename),
                thumb.data,
                &thumb.format.content_type(),
            )
            .await
            .map_err(UploadError::ThumbnailUpload)?;
        debug!(
            "{}: {}x{} {} thumbnail stored at {}",
            filename,
            thumb.width,
            thumb.height,
            thumb.format.as_str(),
            thumbnail_url
        );

        let record = NewImageRecord::from_upload(filename, &metadata, original_url, thumbnail_url);
        Ok(self.records.upsert(record).await?)
    }

    /// Run one file with failure isolation: errors are logged and reported,
    /// never propagated. Entries without a filename are skipped silently.
    pub async fn process(&self, file: UploadFile) -> UploadOutcome {
        if file.filename.is_empty() {
            return UploadOutcome::Skipped;
        }

        let filename = file.filename.clone();
        match self.upload(file).await {
            Ok(record) => {
                info!("Uploaded {} (camera: {})", record.name, record.camera);
                UploadOutcome::Stored(record)
            }
            Err(error) => {
                warn!("Upload of {} failed: {}", filename, error);
                UploadOutcome::Failed { filename, error }
            }
        }
    }

    /// Process a batch in order. One bad file never stops the others.
    pub async fn upload_batch(&self, files: Vec<UploadFile>) -> BatchReport {
        let mut report = BatchReport::default();
        for file in files {
            let outcome = self.process(file).await;
            report.record(outcome);
        }
        info!(
            "Batch finished: {} stored, {} skipped, {} failed",
            report.stored.len(),
            report.skipped,
            report.failed.len()
        );
        report
    }
}

/// MIME type guessed from the leading bytes.
fn sniff_content_type(data: &[u8]) -> String {
    image::guess_format(data)
        .map(|format| format.to_mime_type().to_string())
        .unwrap_or_else(|_| FALLBACK_CONTENT_TYPE.to_string())
}
