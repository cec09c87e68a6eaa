//! Best-effort camera metadata extraction.
//!
//! Reads the EXIF tag table from any container `kamadak-exif` understands
//! (JPEG, PNG, TIFF, WebP, HEIF) and keeps only the allow-listed tags.
//! Anything that goes wrong yields empty metadata; extraction never blocks an
//! upload.

use crate::models::CameraMetadata;
use exif::{Exif, In, Reader, Tag, Value};
use std::io::Cursor;
use tracing::debug;

/// Extract the recognized camera attributes from raw image bytes.
pub fn extract(data: &[u8]) -> CameraMetadata {
    let mut cursor = Cursor::new(data);
    let exif = match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(err) => {
            debug!("no usable EXIF data: {}", err);
            return CameraMetadata::default();
        }
    };

    CameraMetadata {
        make: field_text(&exif, Tag::Make),
        model: field_text(&exif, Tag::Model),
        capture_time: field_text(&exif, Tag::DateTimeOriginal),
        software: field_text(&exif, Tag::Software),
    }
}

/// Coerce a tag's value to text. ASCII values are trimmed of padding NULs and
/// whitespace; other value types use the library's display form.
fn field_text(exif: &Exif, tag: Tag) -> Option<String> {
    let field = exif.get_field(tag, In::PRIMARY)?;
    let text = match &field.value {
        Value::Ascii(values) => values
            .iter()
            .filter_map(|raw| std::str::from_utf8(raw).ok())
            .map(|s| s.trim_matches('\u{0}').trim())
            .find(|s| !s.is_empty())
            .map(str::to_string),
        _ => Some(field.display_value().to_string()),
    };
    text.filter(|s| !s.is_empty())
}
