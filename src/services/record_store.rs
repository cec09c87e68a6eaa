//! Metadata record store.
//!
//! Records are flat and keyed by filename. Writes are whole-record upserts;
//! reads are either a full scan or an exact match on one field.

use crate::models::{ImageRecord, NewImageRecord};
use async_trait::async_trait;
use chrono::Utc;
use futures::{StreamExt, stream::BoxStream};
use sqlx::SqlitePool;
use std::{fmt, sync::Arc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

pub type RecordResult<T> = Result<T, RecordError>;

/// Fields that support exact-match queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordField {
    Camera,
    Make,
}

impl RecordField {
    pub fn column(self) -> &'static str {
        match self {
            Self::Camera => "camera",
            Self::Make => "make",
        }
    }

    fn select_sql(self) -> &'static str {
        match self {
            Self::Camera => {
                "SELECT name, camera, make, date_taken, thumbnail_url, original_url, uploaded_at
                 FROM images WHERE camera = ?
                 ORDER BY uploaded_at DESC, name ASC"
            }
            Self::Make => {
                "SELECT name, camera, make, date_taken, thumbnail_url, original_url, uploaded_at
                 FROM images WHERE make = ?
                 ORDER BY uploaded_at DESC, name ASC"
            }
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Persistence for [`ImageRecord`]s.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Write `record` under its `name`, replacing every field of any existing
    /// record. The store assigns `uploaded_at`.
    async fn upsert(&self, record: NewImageRecord) -> RecordResult<ImageRecord>;

    /// Every record, in no guaranteed order.
    fn stream_all(&self) -> BoxStream<'_, RecordResult<ImageRecord>>;

    /// Records whose `field` equals `value` exactly (case-sensitive).
    fn query_by_field(
        &self,
        field: RecordField,
        value: String,
    ) -> BoxStream<'_, RecordResult<ImageRecord>>;

    /// Cheap reachability check for readiness probes.
    async fn ping(&self) -> RecordResult<()>;
}

/// `RecordStore` over the `images` table.
#[derive(Clone)]
pub struct SqliteRecordStore {
    pub db: Arc<SqlitePool>,
}

impl SqliteRecordStore {
    pub fn new(db: Arc<SqlitePool>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RecordStore for SqliteRecordStore {
    async fn upsert(&self, record: NewImageRecord) -> RecordResult<ImageRecord> {
        let stored = sqlx::query_as::<_, ImageRecord>(
            r#"
            INSERT INTO images (
                name, camera, make, date_taken, thumbnail_url, original_url, uploaded_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                camera = excluded.camera,
                make = excluded.make,
                date_taken = excluded.date_taken,
                thumbnail_url = excluded.thumbnail_url,
                original_url = excluded.original_url,
                uploaded_at = excluded.uploaded_at
            RETURNING name, camera, make, date_taken, thumbnail_url, original_url, uploaded_at
            "#,
        )
        .bind(&record.name)
        .bind(&record.camera)
        .bind(&record.make)
        .bind(&record.date_taken)
        .bind(&record.thumbnail_url)
        .bind(&record.original_url)
        .bind(Utc::now())
        .fetch_one(&*self.db)
        .await?;

        Ok(stored)
    }

    fn stream_all(&self) -> BoxStream<'_, RecordResult<ImageRecord>> {
        sqlx::query_as::<_, ImageRecord>(
            "SELECT name, camera, make, date_taken, thumbnail_url, original_url, uploaded_at
             FROM images
             ORDER BY uploaded_at DESC, name ASC",
        )
        .fetch(&*self.db)
        .map(|row| row.map_err(RecordError::from))
        .boxed()
    }

    fn query_by_field(
        &self,
        field: RecordField,
        value: String,
    ) -> BoxStream<'_, RecordResult<ImageRecord>> {
        sqlx::query_as::<_, ImageRecord>(field.select_sql())
            .bind(value)
            .fetch(&*self.db)
            .map(|row| row.map_err(RecordError::from))
            .boxed()
    }

    async fn ping(&self) -> RecordResult<()> {
        sqlx::query_scalar::<_, i64>("SELECT 1")
            .fetch_one(&*self.db)
            .await?;
        Ok(())
    }
}
