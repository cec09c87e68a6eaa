//! Bookkeeping row for a blob held by the local disk backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Metadata for one stored blob. The payload itself lives on disk.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct Blob {
    /// Bucket the blob belongs to.
    pub bucket: String,

    /// Path inside the bucket, e.g. `thumbnails/a.jpg`.
    pub key: String,

    /// MIME type recorded at write time.
    pub content_type: String,

    /// Payload size in bytes.
    pub size_bytes: i64,

    /// MD5 of the payload, lowercase hex.
    pub etag: String,

    /// Time of the last write.
    pub last_modified: DateTime<Utc>,
}
