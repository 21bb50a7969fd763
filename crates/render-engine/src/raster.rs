//! The rendered output buffer and its encodings.

use std::io::Cursor;
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use image::{ImageFormat, RgbaImage};

use birthcard_common::error::{BirthcardError, BirthcardResult};

pub const PNG_MIME: &str = "image/png";

/// A fully composited RGBA image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    image: RgbaImage,
}

impl Raster {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Raw RGBA bytes, row-major.
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_raw()
    }

    pub fn encode_png(&self) -> BirthcardResult<Vec<u8>> {
        let mut out = Cursor::new(Vec::new());
        self.image
            .write_to(&mut out, ImageFormat::Png)
            .map_err(|e| BirthcardError::Other(anyhow::anyhow!("PNG encoding failed: {e}")))?;
        Ok(out.into_inner())
    }

    pub fn to_base64_png(&self) -> BirthcardResult<String> {
        Ok(STANDARD.encode(self.encode_png()?))
    }

    /// `data:image/png;base64,...`, the form the storage backend accepts.
    pub fn to_data_url(&self) -> BirthcardResult<String> {
        Ok(format!("data:{PNG_MIME};base64,{}", self.to_base64_png()?))
    }

    pub fn save_png(&self, path: &Path) -> BirthcardResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.encode_png()?)?;
        Ok(())
    }
}

/// Source-over blend of `src` into the pixel at `(x, y)`, scaled by `coverage`.
///
/// Out-of-bounds coordinates are ignored.
pub(crate) fn blend_pixel(canvas: &mut RgbaImage, x: i64, y: i64, src: [u8; 4], coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let alpha = (src[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if alpha <= 0.0 {
        return;
    }
    let dst = canvas.get_pixel_mut(x as u32, y as u32);
    let inv = 1.0 - alpha;
    for channel in 0..3 {
        let blended = src[channel] as f32 * alpha + dst.0[channel] as f32 * inv;
        dst.0[channel] = blended.round().clamp(0.0, 255.0) as u8;
    }
    let dst_alpha = dst.0[3] as f32 / 255.0;
    dst.0[3] = ((alpha + dst_alpha * inv) * 255.0).round().clamp(0.0, 255.0) as u8;
}
