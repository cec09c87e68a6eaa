//! Startup wiring shared by both binaries.

use crate::config::{StorageBackend, StoreConfig};
use crate::db;
use crate::services::{
    blob_store::BlobStore, gcs_blob_store::GcsBlobStore, local_blob_store::LocalBlobStore,
    record_store::SqliteRecordStore,
};
use crate::state::AppState;
use anyhow::{Context, Result};
use std::{fs, path::Path, sync::Arc};

/// Opened collaborators, ready to hand to the pipeline and gallery.
pub struct Stores {
    pub records: Arc<SqliteRecordStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub local_blobs: Option<Arc<LocalBlobStore>>,
}

impl Stores {
    pub fn into_state(self, thumbnail_max_edge: u32) -> AppState {
        AppState::new(
            self.records,
            self.blobs,
            self.local_blobs,
            thumbnail_max_edge,
        )
    }
}

/// Connect the database, apply the schema and build the configured blob
/// backend.
pub async fn open_stores(cfg: &StoreConfig) -> Result<Stores> {
    let db = Arc::new(db::connect(&cfg.database_url).await?);
    db::run_migrations(&db).await?;

    let records = Arc::new(SqliteRecordStore::new(db.clone()));

    let (blobs, local_blobs) = match cfg.backend {
        StorageBackend::Local => {
            if !Path::new(&cfg.storage_dir).exists() {
                fs::create_dir_all(&cfg.storage_dir)
                    .with_context(|| format!("creating storage directory {}", cfg.storage_dir))?;
                tracing::info!("Created storage directory at {}", cfg.storage_dir);
            }
            let local = Arc::new(LocalBlobStore::new(
                db.clone(),
                &cfg.storage_dir,
                &cfg.bucket,
                &cfg.public_base_url,
            )?);
            let blobs: Arc<dyn BlobStore> = local.clone();
            (blobs, Some(local))
        }
        StorageBackend::Gcs => {
            let gcs = GcsBlobStore::new(
                &cfg.bucket,
                cfg.credentials.as_deref(),
                &cfg.public_base_url,
            )
            .context("configuring Google Cloud Storage")?;
            let blobs: Arc<dyn BlobStore> = Arc::new(gcs);
            (blobs, None)
        }
    };

    Ok(Stores {
        records,
        blobs,
        local_blobs,
    })
}
