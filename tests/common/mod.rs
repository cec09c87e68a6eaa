//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use photo_gallery::db;
use photo_gallery::models::{ImageRecord, NewImageRecord};
use photo_gallery::services::blob_store::{
    BlobError, BlobResult, BlobStore, DEFAULT_PUBLIC_BASE_URL,
};
use photo_gallery::services::record_store::{
    RecordError, RecordField, RecordResult, RecordStore, SqliteRecordStore,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

#[path = "../../src/test_helpers.rs"]
mod fixtures;

pub use fixtures::{encode_as, encode_jpeg as jpeg, encode_png as png, jpeg_with_exif};

pub const BUCKET: &str = "lb40-bucket";

/// An in-memory record store over a private SQLite database.
pub async fn record_store() -> Arc<SqliteRecordStore> {
    Arc::new(SqliteRecordStore::new(Arc::new(
        db::memory_pool().await.unwrap(),
    )))
}

/// A stored blob as seen by [`MemoryBlobStore`].
#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub data: Bytes,
    pub content_type: String,
}

/// Blob store fake. Writes whose path contains `fail_on` fail.
#[derive(Default)]
pub struct MemoryBlobStore {
    pub blobs: Mutex<HashMap<String, StoredBlob>>,
    pub fail_on: Option<String>,
}

impl MemoryBlobStore {
    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_on: Some(marker.to_string()),
            ..Default::default()
        }
    }

    pub fn get(&self, path: &str) -> Option<StoredBlob> {
        self.blobs.lock().unwrap().get(path).cloned()
    }

    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn bucket(&self) -> &str {
        BUCKET
    }

    fn public_base_url(&self) -> &str {
        DEFAULT_PUBLIC_BASE_URL
    }

    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> BlobResult<String> {
        if self.fail_on.as_deref().is_some_and(|m| path.contains(m)) {
            return Err(BlobError::Backend(format!("injected failure for {path}")));
        }
        self.blobs.lock().unwrap().insert(
            path.to_string(),
            StoredBlob {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(self.public_url(path))
    }

    async fn ping(&self) -> BlobResult<()> {
        Ok(())
    }
}

/// Record store wrapper whose upserts fail for one filename.
pub struct FailingRecordStore {
    pub inner: Arc<SqliteRecordStore>,
    pub fail_name: String,
}

#[async_trait]
impl RecordStore for FailingRecordStore {
    async fn upsert(&self, record: NewImageRecord) -> RecordResult<ImageRecord> {
        if record.name == self.fail_name {
            return Err(RecordError::Sqlx(sqlx::Error::PoolClosed));
        }
        self.inner.upsert(record).await
    }

    fn stream_all(&self) -> BoxStream<'_, RecordResult<ImageRecord>> {
        self.inner.stream_all()
    }

    fn query_by_field(
        &self,
        field: RecordField,
        value: String,
    ) -> BoxStream<'_, RecordResult<ImageRecord>> {
        self.inner.query_by_field(field, value)
    }

    async fn ping(&self) -> RecordResult<()> {
        Err(RecordError::Sqlx(sqlx::Error::PoolClosed))
    }
}
