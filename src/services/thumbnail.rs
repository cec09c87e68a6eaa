//! Thumbnail generation.
//!
//! Decodes the source, scales it to fit inside a square bounding box without
//! ever enlarging it, and re-encodes in the source format when that format is
//! one we can write. Everything else is written as JPEG.

use bytes::Bytes;
use image::{DynamicImage, GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;
use thiserror::Error;

/// Longer-edge bound used when nothing else is configured.
pub const DEFAULT_MAX_EDGE: u32 = 200;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("could not read image: {0}")]
    Read(#[from] std::io::Error),
    #[error("could not decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("could not encode thumbnail: {0}")]
    Encode(#[source] image::ImageError),
    #[error("thumbnail bound must be at least 1 pixel")]
    InvalidBound,
}

/// Encodings a thumbnail can be written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
}

impl ThumbnailFormat {
    /// Encoding used when the source format is unknown or not writable.
    pub const FALLBACK: ThumbnailFormat = ThumbnailFormat::Jpeg;

    fn from_source(format: ImageFormat) -> Option<Self> {
        match format {
            ImageFormat::Jpeg => Some(Self::Jpeg),
            ImageFormat::Png => Some(Self::Png),
            ImageFormat::Gif => Some(Self::Gif),
            ImageFormat::WebP => Some(Self::WebP),
            _ => None,
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Jpeg => ImageFormat::Jpeg,
            Self::Png => ImageFormat::Png,
            Self::Gif => ImageFormat::Gif,
            Self::WebP => ImageFormat::WebP,
        }
    }

    /// Lowercase format name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::WebP => "webp",
        }
    }

    /// `image/{format}`.
    pub fn content_type(self) -> String {
        format!("image/{}", self.as_str())
    }
}

/// An encoded thumbnail and what it was encoded as.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub data: Bytes,
    pub format: ThumbnailFormat,
    pub width: u32,
    pub height: u32,
}

/// Dimensions that fit `source` inside a `max_edge` square, keeping the
/// aspect ratio. Sources already inside the box are returned unchanged.
pub fn fit_within(source: (u32, u32), max_edge: u32) -> (u32, u32) {
    let (width, height) = source;
    let longer = width.max(height);
    if longer <= max_edge || longer == 0 {
        return source;
    }

    if width >= height {
        let ratio = max_edge as f64 / width as f64;
        (max_edge, ((height as f64 * ratio).round() as u32).max(1))
    } else {
        let ratio = max_edge as f64 / height as f64;
        (((width as f64 * ratio).round() as u32).max(1), max_edge)
    }
}

/// Produce a thumbnail whose longer edge is at most `max_edge`.
///
/// Only borrows `data`, so the caller keeps its buffer for other uses.
pub fn generate(data: &[u8], max_edge: u32) -> Result<Thumbnail, ThumbnailError> {
    if max_edge == 0 {
        return Err(ThumbnailError::InvalidBound);
    }

    let reader = ImageReader::new(Cursor::new(data)).with_guessed_format()?;
    let format = reader
        .format()
        .and_then(ThumbnailFormat::from_source)
        .unwrap_or(ThumbnailFormat::FALLBACK);
    let img = reader.decode().map_err(ThumbnailError::Decode)?;

    let (width, height) = fit_within(img.dimensions(), max_edge);
    let scaled = if (width, height) == img.dimensions() {
        img
    } else {
        img.thumbnail_exact(width, height)
    };

    let encodable = match format {
        ThumbnailFormat::Jpeg => DynamicImage::ImageRgb8(scaled.to_rgb8()),
        ThumbnailFormat::Gif | ThumbnailFormat::WebP => {
            DynamicImage::ImageRgba8(scaled.to_rgba8())
        }
        ThumbnailFormat::Png => scaled,
    };

    let mut out = Cursor::new(Vec::new());
    encodable
        .write_to(&mut out, format.image_format())
        .map_err(ThumbnailError::Encode)?;

    Ok(Thumbnail {
        data: Bytes::from(out.into_inner()),
        format,
        width,
        height,
    })
}
