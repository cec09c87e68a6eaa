//! Object store gateway.
//!
//! A `BlobStore` durably writes a named blob into one bucket and hands back a
//! public address for it. Addresses are derived, never looked up: every
//! backend produces `{base}/{bucket}/{path}`, so a caller that already knows
//! the bucket and path can rebuild the URL without a round trip.

use async_trait::async_trait;
use bytes::Bytes;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use std::io;
use thiserror::Error;

/// Public host for Google Cloud Storage objects.
pub const DEFAULT_PUBLIC_BASE_URL: &str = "https://storage.googleapis.com";

/// Prefix under which full-resolution uploads are stored.
pub const ORIGINALS_PREFIX: &str = "originals";

/// Prefix under which thumbnails are stored.
pub const THUMBNAILS_PREFIX: &str = "thumbnails";

const MAX_BLOB_KEY_LEN: usize = 1024;

/// Everything outside the RFC 3986 unreserved set is escaped inside a segment.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');
const BUCKET_NAME_MIN_LEN: usize = 3;
const BUCKET_NAME_MAX_LEN: usize = 63;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("bucket `{name}` invalid: {reason}")]
    InvalidBucketName { name: String, reason: String },
    #[error("invalid blob key `{0}`")]
    InvalidKey(String),
    #[error("blob `{key}` not found in bucket `{bucket}`")]
    NotFound { bucket: String, key: String },
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type BlobResult<T> = Result<T, BlobError>;

/// Durable named-blob storage with deterministic public addresses.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bucket every write lands in.
    fn bucket(&self) -> &str;

    /// Base the public address is built on, without a trailing slash.
    fn public_base_url(&self) -> &str;

    /// Public address of `path` in this store's bucket.
    fn public_url(&self, path: &str) -> String {
        public_url(self.public_base_url(), self.bucket(), path)
    }

    /// Write `data` under `path`, replacing anything already there, and
    /// return the blob's public address.
    async fn put(&self, path: &str, data: Bytes, content_type: &str) -> BlobResult<String>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> BlobResult<()>;
}

/// `{base}/{bucket}/{path}`, with each path segment percent-encoded.
pub fn public_url(base: &str, bucket: &str, path: &str) -> String {
    let encoded: Vec<String> = path
        .trim_start_matches('/')
        .split('/')
        .map(|segment| utf8_percent_encode(segment, PATH_SEGMENT).to_string())
        .collect();
    format!(
        "{}/{}/{}",
        base.trim_end_matches('/'),
        bucket,
        encoded.join("/")
    )
}

/// `originals/{filename}`.
pub fn original_path(filename: &str) -> String {
    format!("{}/{}", ORIGINALS_PREFIX, filename)
}

/// `thumbnails/{filename}`.
pub fn thumbnail_path(filename: &str) -> String {
    format!("{}/{}", THUMBNAILS_PREFIX, filename)
}

/// Basic key validation to avoid trivial path traversal vectors.
///
/// Rejects empty or oversized keys, keys that begin with `/`, `.` or `..`
/// segments, backslashes and control characters. Dots inside a file name
/// (`IMG..1.jpg`) are fine.
pub fn ensure_key_safe(key: &str) -> BlobResult<()> {
    let invalid = key.is_empty()
        || key.len() > MAX_BLOB_KEY_LEN
        || key.starts_with('/')
        || key.split('/').any(|segment| segment == "." || segment == "..")
        || key
            .bytes()
            .any(|b| b.is_ascii_control() || b == b'\\' || b == b'\0');
    if invalid {
        return Err(BlobError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Validate bucket name format.
///
/// Enforces cloud bucket naming rules:
/// - 3–63 characters
/// - lowercase letters, digits, dots, hyphens only
/// - cannot start/end with dot or hyphen
/// - cannot contain consecutive dots or dot-hyphen patterns
/// - cannot look like an IPv4 address
pub fn ensure_bucket_name_safe(name: &str) -> BlobResult<()> {
    let invalid = |reason: &str| {
        Err(BlobError::InvalidBucketName {
            name: name.to_string(),
            reason: reason.into(),
        })
    };

    if name.trim() != name {
        return invalid("cannot begin or end with whitespace");
    }

    let len = name.len();
    if !(BUCKET_NAME_MIN_LEN..=BUCKET_NAME_MAX_LEN).contains(&len) {
        return invalid("must be between 3 and 63 characters");
    }

    if !name
        .chars()
        .all(|c| matches!(c, 'a'..='z' | '0'..='9' | '.' | '-'))
    {
        return invalid("allowed characters are lowercase letters, digits, dots, and hyphens");
    }

    if name.starts_with(['.', '-']) || name.ends_with(['.', '-']) {
        return invalid("must start and end with a lowercase letter or digit");
    }

    if name.contains("..") || name.contains("-.") || name.contains(".-") {
        return invalid("cannot contain consecutive dots or dot-hyphen combinations");
    }

    if is_ipv4_like(name) {
        return invalid("must not be formatted like an IP address");
    }

    Ok(())
}

/// Check if a string matches IPv4-like dotted decimal form.
fn is_ipv4_like(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() == 4
        && parts.iter().all(|segment| {
            !segment.is_empty()
                && segment.len() <= 3
                && segment.chars().all(|c| c.is_ascii_digit())
                && segment.parse::<u8>().is_ok()
        })
}
