//! Vector-field image decoding.

use std::sync::Arc;

use async_trait::async_trait;
use image::RgbaImage;
use ocean_common::{SyncError, SyncResult};

/// A decoded RGBA bitmap, ready for upload to the simulation.
///
/// Cheap to clone; the pixel buffer is shared.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pixels: Arc<RgbaImage>,
}

impl DecodedImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            pixels: Arc::new(pixels),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// RGBA of the pixel at `(x, y)`, clamped to the image edges.
    /// An image without pixels reads as transparent everywhere.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        if self.is_empty() {
            return [0, 0, 0, 0];
        }
        let x = x.min(self.width().saturating_sub(1));
        let y = y.min(self.height().saturating_sub(1));
        self.pixels.get_pixel(x, y).0
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

/// Fetches imagery and decodes it into a bitmap.
///
/// Channel semantics are not interpreted here.
#[async_trait]
pub trait ImageDecoder: Send + Sync {
    async fn decode(&self, url: &str) -> SyncResult<DecodedImage>;
}

/// Decode image bytes fetched from `url`.
pub fn decode_image(url: &str, bytes: &[u8]) -> SyncResult<DecodedImage> {
    let decoded = image::load_from_memory(bytes).map_err(|e| SyncError::decode(url, e))?;
    let rgba = decoded.to_rgba8();
    if rgba.width() == 0 || rgba.height() == 0 {
        return Err(SyncError::decode(url, "image has no pixels"));
    }
    Ok(DecodedImage::new(rgba))
}
