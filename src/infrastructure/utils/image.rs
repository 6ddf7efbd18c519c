use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, DynamicImage};
use infer::{Infer, MatcherType};

use crate::{
    constants::{DEFAULT_JPEG_QUALITY, DEFAULT_MAX_IMAGE_WIDTH},
    errors::ImageError,
    settings::AppConfig,
};

pub const JPEG_CONTENT_TYPE: &str = "image/jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSettings {
    pub max_width: u32,
    pub jpeg_quality: u8,
}

impl Default for ImageSettings {
    fn default() -> Self {
        ImageSettings {
            max_width: DEFAULT_MAX_IMAGE_WIDTH,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl From<&AppConfig> for ImageSettings {
    fn from(config: &AppConfig) -> Self {
        ImageSettings {
            max_width: config.max_image_width,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: &'static str,
}

/// Returns the MIME type of `bytes` when they hold an image.
pub fn sniff_image_type(bytes: &[u8]) -> Result<&'static str, ImageError> {
    let kind = Infer::new()
        .get(bytes)
        .ok_or_else(|| ImageError::UnsupportedType("unknown".to_string()))?;

    if kind.matcher_type() != MatcherType::Image {
        return Err(ImageError::UnsupportedType(kind.mime_type().to_string()));
    }
    Ok(kind.mime_type())
}

/// Shrinks the image to at most `max_width` pixels wide, keeping the aspect
/// ratio, and re-encodes it as JPEG. Narrower images keep their size.
pub fn compress_image(bytes: &[u8], settings: ImageSettings) -> Result<CompressedImage, ImageError> {
    let decoded = image::load_from_memory(bytes)?;
    let resized = bound_width(decoded, settings.max_width);
    let rgb = resized.to_rgb8();

    let mut out = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut out, settings.jpeg_quality.clamp(1, 100));
    rgb.write_with_encoder(encoder)?;

    Ok(CompressedImage {
        bytes: out.into_inner(),
        width: rgb.width(),
        height: rgb.height(),
        content_type: JPEG_CONTENT_TYPE,
    })
}

/// Runs `compress_image` on the blocking pool.
pub async fn compress_image_blocking(
    bytes: Vec<u8>,
    settings: ImageSettings,
) -> Result<CompressedImage, ImageError> {
    tokio::task::spawn_blocking(move || compress_image(&bytes, settings))
        .await
        .map_err(|e| ImageError::TaskFailed(e.to_string()))?
}

fn bound_width(image: DynamicImage, max_width: u32) -> DynamicImage {
    let (width, height) = (image.width(), image.height());
    if width <= max_width || max_width == 0 {
        return image;
    }

    let scaled_height = ((height as u64 * max_width as u64) / width as u64).max(1) as u32;
    image.resize_exact(max_width, scaled_height, FilterType::CatmullRom)
}
