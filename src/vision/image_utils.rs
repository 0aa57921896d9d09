// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image decoding and re-encoding for the detection pipeline

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use image::{GrayImage, ImageFormat, Luma, RgbImage};
use thiserror::Error;

/// Default maximum accepted image size (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// JPEG quality used for annotated output
pub const JPEG_QUALITY: u8 = 40;

/// Prefix that turns a base64 payload into an embeddable data URI
pub const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

/// Custom error types for image processing
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image data is too large: {0} bytes (max: {1} bytes)")]
    TooLarge(usize, usize),

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to decode image: {0}")]
    DecodeFailed(String),

    #[error("Failed to encode image: {0}")]
    EncodeFailed(String),

    #[error("Image data is empty")]
    EmptyData,
}

/// A decoded image in the two pixel layouts the pipeline needs
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Colour pixels, source for annotated output
    pub rgb: RgbImage,
    /// Single-channel pixels, input to the detectors
    pub gray: GrayImage,
    /// Detected container format
    pub format: ImageFormat,
}

impl DecodedImage {
    /// Build from an RGB buffer, deriving the grayscale layout
    pub fn from_rgb(rgb: RgbImage, format: ImageFormat) -> Self {
        let gray = to_gray(&rgb);
        Self { rgb, gray, format }
    }

    pub fn width(&self) -> u32 {
        self.rgb.width()
    }

    pub fn height(&self) -> u32 {
        self.rgb.height()
    }
}

/// Decode raw image bytes (uploads, request bodies, fetched URLs)
///
/// # Arguments
/// * `bytes` - Raw image bytes
/// * `max_size` - Largest accepted buffer in bytes
///
/// # Returns
/// * `Ok(DecodedImage)` - RGB and grayscale pixels
/// * `Err(ImageError)` - If the bytes are not a recognizable image
pub fn decode_image_bytes(bytes: &[u8], max_size: usize) -> Result<DecodedImage, ImageError> {
    if bytes.len() > max_size {
        return Err(ImageError::TooLarge(bytes.len(), max_size));
    }

    if bytes.is_empty() {
        return Err(ImageError::EmptyData);
    }

    // Detect format from magic bytes
    let format = detect_format(bytes)?;

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| ImageError::DecodeFailed(e.to_string()))?;

    Ok(DecodedImage::from_rgb(img.to_rgb8(), format))
}

/// Grayscale conversion with BT.601 weights, matching the cascade classifiers'
/// own colour conversion
pub fn to_gray(rgb: &RgbImage) -> GrayImage {
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        Luma([luma.round().clamp(0.0, 255.0) as u8])
    })
}

/// Encode an image as a JPEG data URI that HTML and JSON consumers can embed directly
pub fn encode_for_embedding(image: &RgbImage) -> Result<String, ImageError> {
    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .encode_image(image)
        .map_err(|e| ImageError::EncodeFailed(e.to_string()))?;

    let mut encoded = String::with_capacity(DATA_URI_PREFIX.len() + jpeg.len() * 4 / 3 + 4);
    encoded.push_str(DATA_URI_PREFIX);
    STANDARD.encode_string(&jpeg, &mut encoded);
    Ok(encoded)
}

/// Detect image format from magic bytes
///
/// # Arguments
/// * `bytes` - Raw image data
///
/// # Returns
/// * `Ok(ImageFormat)` - Detected format
/// * `Err(ImageError::UnsupportedFormat)` - If format cannot be detected
pub fn detect_format(bytes: &[u8]) -> Result<ImageFormat, ImageError> {
    if bytes.len() < 4 {
        return Err(ImageError::UnsupportedFormat);
    }

    match bytes {
        // PNG: 89 50 4E 47 (0x89 P N G)
        [0x89, 0x50, 0x4E, 0x47, ..] => Ok(ImageFormat::Png),

        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Ok(ImageFormat::Jpeg),

        // WebP: RIFF .... WEBP
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Ok(ImageFormat::WebP),

        // GIF: GIF87a or GIF89a
        [0x47, 0x49, 0x46, 0x38, x, ..] if *x == 0x37 || *x == 0x39 => Ok(ImageFormat::Gif),

        // BMP: BM
        [0x42, 0x4D, ..] => Ok(ImageFormat::Bmp),

        // TIFF: II (little-endian) or MM (big-endian)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Ok(ImageFormat::Tiff),

        _ => Err(ImageError::UnsupportedFormat),
    }
}
