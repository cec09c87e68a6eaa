//! Google Cloud Storage backend via `object_store`.

use crate::services::blob_store::{
    BlobError, BlobResult, BlobStore, ensure_bucket_name_safe, ensure_key_safe,
};
use async_trait::async_trait;
use bytes::Bytes;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use std::sync::Arc;
use tracing::debug;

pub struct GcsBlobStore {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    public_base_url: String,
}

impl GcsBlobStore {
    /// Connect to `bucket`. With `credentials_path` unset the builder falls
    /// back to `GOOGLE_*` environment variables and application defaults.
    pub fn new(
        bucket: impl Into<String>,
        credentials_path: Option<&str>,
        public_base_url: impl Into<String>,
    ) -> BlobResult<Self> {
        let bucket = bucket.into();
        ensure_bucket_name_safe(&bucket)?;

        let mut builder = GoogleCloudStorageBuilder::from_env().with_bucket_name(&bucket);
        if let Some(path) = credentials_path {
            builder = builder.with_service_account_path(path);
        }
        let store = builder.build().map_err(backend_error)?;

        Ok(Self::with_store(Arc::new(store), bucket, public_base_url))
    }

    /// Wrap an already-configured `object_store` client.
    pub fn with_store(
        store: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

fn backend_error(err: object_store::Error) -> BlobError {
    BlobError::Backend(err.to_string())
}

#[async_trait]
impl BlobStore for GcsBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> BlobResult<String> {
        ensure_key_safe(path)?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let size = data.len();
        self.store
            .put_opts(&Path::from(path), PutPayload::from(data), opts)
            .await
            .map_err(backend_error)?;

        debug!("stored gs://{}/{} ({} bytes)", self.bucket, path, size);
        Ok(self.public_url(path))
    }

    async fn ping(&self) -> BlobResult<()> {
        self.store
            .list_with_delimiter(None)
            .await
            .map(|_| ())
            .map_err(backend_error)
    }
}
