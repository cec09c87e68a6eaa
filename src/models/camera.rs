//! Camera attributes recovered from an image's embedded tag table.

use serde::{Deserialize, Serialize};

/// Literal stored in place of any attribute that could not be recovered.
pub const PLACEHOLDER: &str = "Unknown";

/// The small allow-listed subset of EXIF attributes the gallery keeps.
///
/// Every field is optional: `None` means the source image did not carry the
/// tag (or carried an empty one). Callers that persist the metadata substitute
/// [`PLACEHOLDER`] via [`CameraMetadata::or_placeholder`].
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CameraMetadata {
    /// Camera manufacturer (`Make`).
    pub make: Option<String>,

    /// Camera model (`Model`).
    pub model: Option<String>,

    /// Capture timestamp as written by the camera (`DateTimeOriginal`).
    pub capture_time: Option<String>,

    /// Firmware or editing software (`Software`).
    pub software: Option<String>,
}

impl CameraMetadata {
    /// True when no recognized tag was found.
    pub fn is_empty(&self) -> bool {
        self.make.is_none()
            && self.model.is_none()
            && self.capture_time.is_none()
            && self.software.is_none()
    }

    /// Return the value or the placeholder.
    pub fn or_placeholder(value: &Option<String>) -> String {
        value.clone().unwrap_or_else(|| PLACEHOLDER.to_string())
    }
}
