//! Generators for synthetic vector-field imagery.
//!
//! Red encodes U and green encodes V, each normalized to `0..=255` over the
//! dataset's component range, the same layout the real imagery uses.

use std::io::Cursor;

use dataset_loader::DecodedImage;
use image::{ImageOutputFormat, Rgba, RgbaImage};

/// A field with the same `(u, v)` bytes everywhere.
pub fn uniform_field(width: u32, height: u32, u: u8, v: u8) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba([u, v, 0, 255]))
}

/// A field whose U grows west to east and V grows south to north.
pub fn gradient_field(width: u32, height: u32) -> RgbaImage {
    let scale = |i: u32, n: u32| (i * 255 / n.saturating_sub(1).max(1)) as u8;
    RgbaImage::from_fn(width, height, |x, y| {
        Rgba([scale(x, width), scale(height - 1 - y, height), 0, 255])
    })
}

/// [`uniform_field`] as a decoded image.
pub fn uniform_image(width: u32, height: u32, u: u8, v: u8) -> DecodedImage {
    DecodedImage::new(uniform_field(width, height, u, v))
}

/// Encode an image as PNG bytes.
pub fn png_bytes(image: &RgbaImage) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, ImageOutputFormat::Png)
        .unwrap_or_else(|e| panic!("png encoding failed: {}", e));
    out.into_inner()
}
