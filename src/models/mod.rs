//! Core data models for the gallery.
//!
//! `ImageRecord` is the persisted unit; `CameraMetadata` is the transient
//! result of tag extraction; `Blob` is local-backend bookkeeping. Rows map to
//! SQLite via `sqlx::FromRow` and serialize as JSON via `serde`.

pub mod blob;
pub mod camera;
pub mod image_record;

pub use blob::Blob;
pub use camera::{CameraMetadata, PLACEHOLDER};
pub use image_record::{GalleryItem, ImageRecord, NewImageRecord};
