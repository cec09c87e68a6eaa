use crate::services::blob_store::{DEFAULT_PUBLIC_BASE_URL, ensure_bucket_name_safe};
use crate::services::thumbnail::DEFAULT_MAX_EDGE;
use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use std::{env, path::PathBuf, str::FromStr};

/// Where blobs are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// Local disk beneath `storage_dir`.
    Local,
    /// Google Cloud Storage.
    Gcs,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "gcs" => Ok(Self::Gcs),
            other => bail!("unknown storage backend `{}` (expected `local` or `gcs`)", other),
        }
    }
}

/// Storage-side configuration shared by the server and the batch uploader.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub bucket: String,
    pub backend: StorageBackend,
    pub storage_dir: String,
    pub credentials: Option<String>,
    pub public_base_url: String,
    pub database_url: String,
    pub thumbnail_max_edge: u32,
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub store: StoreConfig,
}

/// Storage flags; each overrides its `GALLERY_*` environment variable.
#[derive(clap::Args, Debug, Default, Clone)]
pub struct StoreArgs {
    /// Bucket for originals and thumbnails (overrides GALLERY_BUCKET)
    #[arg(long)]
    pub bucket: Option<String>,

    /// Blob backend (overrides GALLERY_STORAGE_BACKEND)
    #[arg(long, value_enum)]
    pub storage_backend: Option<StorageBackend>,

    /// Directory for the local blob backend (overrides GALLERY_STORAGE_DIR)
    #[arg(long)]
    pub storage_dir: Option<String>,

    /// Service-account key file for GCS (overrides GALLERY_CREDENTIALS)
    #[arg(long)]
    pub credentials: Option<String>,

    /// Base of public blob URLs (overrides GALLERY_PUBLIC_BASE_URL)
    #[arg(long)]
    pub public_base_url: Option<String>,

    /// Database URL (overrides GALLERY_DATABASE_URL)
    #[arg(long)]
    pub database_url: Option<String>,

    /// Longer-edge bound for thumbnails (overrides GALLERY_THUMBNAIL_MAX_EDGE)
    #[arg(long)]
    pub thumbnail_max_edge: Option<u32>,
}

/// Command-line + environment configuration for the server.
#[derive(Parser, Debug)]
#[command(author, version, about = "Photo gallery web server")]
pub struct ServerArgs {
    /// Host to bind to (overrides GALLERY_HOST)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to (overrides GALLERY_PORT)
    #[arg(long)]
    pub port: Option<u16>,

    /// Largest accepted request body in bytes (overrides GALLERY_MAX_UPLOAD_BYTES)
    #[arg(long)]
    pub max_upload_bytes: Option<usize>,

    #[command(flatten)]
    pub store: StoreArgs,

    /// Run migrations and exit
    #[arg(long)]
    pub migrate: bool,
}

/// Command-line configuration for the batch uploader.
#[derive(Parser, Debug)]
#[command(author, version, about = "Upload an image or a directory of images to the gallery")]
pub struct UploadArgs {
    /// Path to an image file or a directory of images
    #[arg(long)]
    pub dir: PathBuf,

    #[command(flatten)]
    pub store: StoreArgs,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.into())
}

fn env_parse<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|err| anyhow::anyhow!("{}", err))
            .with_context(|| format!("parsing {} value `{}`", name, value)),
        Err(env::VarError::NotPresent) => Ok(default),
        Err(err) => Err(err).with_context(|| format!("reading {}", name)),
    }
}

impl StoreConfig {
    /// Merge flags over environment over defaults.
    pub fn from_env_and_args(args: StoreArgs) -> Result<Self> {
        let env_backend = env_parse("GALLERY_STORAGE_BACKEND", StorageBackend::Local)?;
        let env_max_edge = env_parse("GALLERY_THUMBNAIL_MAX_EDGE", DEFAULT_MAX_EDGE)?;

        let cfg = Self {
            bucket: args
                .bucket
                .unwrap_or_else(|| env_or("GALLERY_BUCKET", "gallery")),
            backend: args.storage_backend.unwrap_or(env_backend),
            storage_dir: args
                .storage_dir
                .unwrap_or_else(|| env_or("GALLERY_STORAGE_DIR", "./data/blobs")),
            credentials: args
                .credentials
                .or_else(|| env::var("GALLERY_CREDENTIALS").ok()),
            public_base_url: args.public_base_url.unwrap_or_else(|| {
                env_or("GALLERY_PUBLIC_BASE_URL", DEFAULT_PUBLIC_BASE_URL)
            }),
            database_url: args.database_url.unwrap_or_else(|| {
                env_or("GALLERY_DATABASE_URL", "sqlite://./data/meta/gallery.db")
            }),
            thumbnail_max_edge: args.thumbnail_max_edge.unwrap_or(env_max_edge),
        };

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        ensure_bucket_name_safe(&self.bucket).context("validating bucket name")?;
        if self.thumbnail_max_edge == 0 {
            bail!("thumbnail max edge must be at least 1");
        }
        Ok(())
    }
}

impl AppConfig {
    /// Parse environment variables + CLI args into AppConfig and migrate flag.
    pub fn from_env_and_args() -> Result<(Self, bool)> {
        Self::from_args(ServerArgs::parse())
    }

    pub fn from_args(args: ServerArgs) -> Result<(Self, bool)> {
        let env_host = env_or("GALLERY_HOST", "0.0.0.0");
        let env_port = env_parse("GALLERY_PORT", 8080u16)?;
        let env_max_upload = env_parse("GALLERY_MAX_UPLOAD_BYTES", 100 * 1024 * 1024usize)?;

        let cfg = Self {
            host: args.host.unwrap_or(env_host),
            port: args.port.unwrap_or(env_port),
            max_upload_bytes: args.max_upload_bytes.unwrap_or(env_max_upload),
            store: StoreConfig::from_env_and_args(args.store)?,
        };

        Ok((cfg, args.migrate))
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
