//! Encoding of rendered visual content into a binary payload.

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::domain::Blob;

pub const DEFAULT_IMAGE_TYPE: &str = "image/png";
pub const DEFAULT_IMAGE_QUALITY: f32 = 0.92;

/// Something that can encode its pixels at a MIME type, like a canvas.
pub trait Canvas {
    /// `None` when the encoder yields no result.
    fn to_blob(&self, mime: &str, quality: f32) -> Option<Blob>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct CanvasEncoding {
    pub mime: String,
    /// 0.0 to 1.0, used by lossy formats only.
    pub quality: f32,
}

impl Default for CanvasEncoding {
    fn default() -> Self {
        Self {
            mime: DEFAULT_IMAGE_TYPE.to_string(),
            quality: DEFAULT_IMAGE_QUALITY,
        }
    }
}

impl CanvasEncoding {
    pub fn new(mime: impl Into<String>, quality: f32) -> Self {
        Self {
            mime: mime.into(),
            quality,
        }
    }
}

impl Canvas for DynamicImage {
    fn to_blob(&self, mime: &str, quality: f32) -> Option<Blob> {
        let format = ImageFormat::from_mime_type(mime)?;
        let mut buf = Cursor::new(Vec::new());
        match format {
            ImageFormat::Jpeg => {
                let q = (quality.clamp(0.0, 1.0) * 100.0).round().max(1.0) as u8;
                let encoder = JpegEncoder::new_with_quality(&mut buf, q);
                DynamicImage::ImageRgb8(self.to_rgb8())
                    .write_with_encoder(encoder)
                    .ok()?;
            }
            other => self.write_to(&mut buf, other).ok()?,
        }
        Some(Blob::new(buf.into_inner(), mime))
    }
}
