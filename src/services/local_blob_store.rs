//! src/services/local_blob_store.rs
//!
//! LocalBlobStore: a `BlobStore` backed by local disk for payloads and
//! SQLite for per-blob bookkeeping. Payloads are sharded beneath
//! `base_path/{bucket}/{shard}/{shard}/{key}`.

use crate::models::Blob;
use crate::services::blob_store::{
    BlobError, BlobResult, BlobStore, ensure_bucket_name_safe, ensure_key_safe,
};
use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use sqlx::SqlitePool;
use std::{
    io::{self, ErrorKind},
    path::{Path, PathBuf},
    sync::Arc,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct LocalBlobStore {
    /// Shared SQLite connection pool used for blob bookkeeping.
    pub db: Arc<SqlitePool>,

    /// Base directory on disk where payloads are stored.
    pub base_path: PathBuf,

    bucket: String,
    public_base_url: String,
}

impl LocalBlobStore {
    /// Create a store writing into `bucket` beneath `base_path`.
    pub fn new(
        db: Arc<SqlitePool>,
        base_path: impl Into<PathBuf>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
    ) -> BlobResult<Self> {
        let bucket = bucket.into();
        ensure_bucket_name_safe(&bucket)?;
        Ok(Self {
            db,
            base_path: base_path.into(),
            bucket,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn bucket_root(&self) -> PathBuf {
        self.base_path.join(&self.bucket)
    }

    /// Two-level shard identifiers: the first two bytes of MD5(bucket/key)
    /// as lowercase hex. Keeps directory fan-out bounded.
    fn blob_shards(bucket: &str, key: &str) -> (String, String) {
        let digest = md5::compute(format!("{}/{}", bucket, key));
        (format!("{:02x}", digest[0]), format!("{:02x}", digest[1]))
    }

    /// `base_path/bucket/{shard}/{shard}/{key}`. Parents may not exist yet.
    fn blob_path(&self, key: &str) -> PathBuf {
        let (shard_a, shard_b) = Self::blob_shards(&self.bucket, key);
        let mut path = self.bucket_root();
        path.push(shard_a);
        path.push(shard_b);
        path.push(key);
        path
    }

    async fn fetch_blob(&self, key: &str) -> BlobResult<Blob> {
        sqlx::query_as::<_, Blob>(
            "SELECT bucket, key, content_type, size_bytes, etag, last_modified
             FROM blobs WHERE bucket = ? AND key = ?",
        )
        .bind(&self.bucket)
        .bind(key)
        .fetch_one(&*self.db)
        .await
        .map_err(|err| match err {
            sqlx::Error::RowNotFound => BlobError::NotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            },
            other => BlobError::Sqlx(other),
        })
    }

    /// Write a payload to disk and upsert its bookkeeping row.
    ///
    /// The payload lands in a temporary file next to its final location,
    /// is synced, then renamed over any previous payload. The temp file is
    /// removed if any step before the rename fails.
    pub async fn write_blob(&self, key: &str, content_type: &str, data: Bytes) -> BlobResult<Blob> {
        ensure_key_safe(key)?;

        let file_path = self.blob_path(key);
        let parent = file_path
            .parent()
            .map(Path::to_path_buf)
            .ok_or_else(|| BlobError::Io(io::Error::other("blob path missing parent directory")))?;
        fs::create_dir_all(&parent).await?;
        let tmp_path = parent.join(format!(".tmp-{}", Uuid::new_v4()));

        if let Err(err) = write_synced(&tmp_path, &data).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(BlobError::Io(err));
        }

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(BlobError::Io(err));
            }
        }

        let size_bytes = data.len() as i64;
        let etag = format!("{:x}", md5::compute(&data));

        let blob = sqlx::query_as::<_, Blob>(
            r#"
            INSERT INTO blobs (bucket, key, content_type, size_bytes, etag, last_modified)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT(bucket, key) DO UPDATE SET
                content_type = excluded.content_type,
                size_bytes = excluded.size_bytes,
                etag = excluded.etag,
                last_modified = excluded.last_modified
            RETURNING bucket, key, content_type, size_bytes, etag, last_modified
            "#,
        )
        .bind(&self.bucket)
        .bind(key)
        .bind(content_type)
        .bind(size_bytes)
        .bind(&etag)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        debug!(
            "stored {}/{} ({} bytes, etag {})",
            self.bucket, key, size_bytes, etag
        );
        Ok(blob)
    }

    /// Open a stored blob for reading.
    ///
    /// Returns `NotFound` for other buckets, unknown keys, and rows whose
    /// payload has gone missing from disk.
    pub async fn get_blob_reader(&self, bucket: &str, key: &str) -> BlobResult<(Blob, File)> {
        ensure_key_safe(key)?;
        if bucket != self.bucket {
            return Err(BlobError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            });
        }
        let blob = self.fetch_blob(key).await?;

        let file = File::open(self.blob_path(key)).await.map_err(|err| {
            if err.kind() == ErrorKind::NotFound {
                BlobError::NotFound {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                }
            } else {
                BlobError::Io(err)
            }
        })?;

        Ok((blob, file))
    }
}

async fn write_synced(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut file = File::create(path).await?;
    file.write_all(data).await?;
    file.flush().await?;
    file.sync_all().await
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    fn public_base_url(&self) -> &str {
        &self.public_base_url
    }

    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> BlobResult<String> {
        self.write_blob(path, content_type, data).await?;
        Ok(self.public_url(path))
    }

    /// Write, read back and delete a probe file under the bucket root.
    async fn ping(&self) -> BlobResult<()> {
        let root = self.bucket_root();
        fs::create_dir_all(&root).await?;
        let probe = root.join(format!(".readyz-{}", Uuid::new_v4()));
        fs::write(&probe, b"readyz").await?;
        let read_back = fs::read(&probe).await;
        let _ = fs::remove_file(&probe).await;
        if read_back? != b"readyz" {
            return Err(BlobError::Backend("probe file content mismatch".into()));
        }
        Ok(())
    }
}
