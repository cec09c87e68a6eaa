//! Shared test utilities: synthetic images, with and without EXIF tags.
//!
//! Compiled into the unit tests and, via `#[path]`, into `tests/common`.

use bytes::Bytes;
use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_parts::{ImageEXIF, jpeg::Jpeg};
use std::io::Cursor;

/// A gradient so encoders have something other than a flat fill to chew on.
fn gradient(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

/// Encode a synthetic image in the given format.
pub fn encode_as(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = match format {
        ImageFormat::Gif | ImageFormat::WebP => {
            DynamicImage::ImageRgba8(gradient(width, height).to_rgba8())
        }
        _ => gradient(width, height),
    };
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format).unwrap();
    out.into_inner()
}

pub fn encode_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode_as(width, height, ImageFormat::Jpeg)
}

pub fn encode_png(width: u32, height: u32) -> Vec<u8> {
    encode_as(width, height, ImageFormat::Png)
}

/// Serialize ASCII tags into a bare TIFF/EXIF block.
pub fn exif_block(tags: &[(Tag, &str)]) -> Vec<u8> {
    let fields: Vec<Field> = tags
        .iter()
        .map(|(tag, text)| Field {
            tag: *tag,
            ifd_num: In::PRIMARY,
            value: Value::Ascii(vec![text.as_bytes().to_vec()]),
        })
        .collect();

    let mut writer = Writer::new();
    for field in &fields {
        writer.push_field(field);
    }
    let mut out = Cursor::new(Vec::new());
    writer.write(&mut out, false).unwrap();
    out.into_inner()
}

/// A JPEG carrying an APP1 EXIF segment with the given tags.
pub fn jpeg_with_exif(width: u32, height: u32, tags: &[(Tag, &str)]) -> Vec<u8> {
    let mut jpeg = Jpeg::from_bytes(Bytes::from(encode_jpeg(width, height))).unwrap();
    jpeg.set_exif(Some(Bytes::from(exif_block(tags))));
    jpeg.encoder().bytes().to_vec()
}
