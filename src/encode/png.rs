use std::io::Cursor;

use anyhow::Context;

use crate::foundation::core::PixelBuffer;
use crate::foundation::error::{ShadowError, ShadowResult};

/// Turns a rendered [`PixelBuffer`] into the bytes the cache stores and returns.
///
/// The render cache persists entries as `<fingerprint>.<extension>`.
pub trait ImageCodec: Send + Sync {
    /// Encode `pixels` as a complete image file.
    fn encode(&self, pixels: &PixelBuffer) -> ShadowResult<Vec<u8>>;

    /// File extension of encoded images, without the dot.
    fn extension(&self) -> &'static str {
        "png"
    }
}

/// Lossless RGBA8 PNG codec backed by the `image` crate.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec;

impl PngCodec {
    /// Decode PNG (or any format `image` was built with) back into pixels.
    pub fn decode(bytes: &[u8]) -> ShadowResult<PixelBuffer> {
        let img = image::load_from_memory(bytes).context("decode shadow image from memory")?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        PixelBuffer::from_rgba8(width, height, rgba.as_raw())
    }
}

impl ImageCodec for PngCodec {
    fn encode(&self, pixels: &PixelBuffer) -> ShadowResult<Vec<u8>> {
        let (width, height) = (pixels.width(), pixels.height());
        if width == 0 || height == 0 {
            return Err(ShadowError::encoding(format!(
                "cannot encode an empty {width}x{height} image"
            )));
        }
        let img = image::RgbaImage::from_raw(width, height, pixels.to_rgba8()).ok_or_else(
            || ShadowError::encoding("pixel buffer does not match its dimensions"),
        )?;

        let mut out = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .map_err(|e| ShadowError::encoding(format!("png encode failed: {e}")))?;
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
